use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_MARKET_URL: &str = "http://127.0.0.1:8082";

const SESSION_FILE: &str = "session.json";

/// Service endpoints and the current login, persisted between invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub auth_url: String,
    pub market_url: String,
    pub username: Option<String>,
    pub token: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            market_url: DEFAULT_MARKET_URL.to_string(),
            username: None,
            token: None,
            logged_in_at: None,
        }
    }
}

impl SessionConfig {
    pub fn login(&mut self, username: &str, token: String) {
        self.username = Some(username.to_string());
        self.token = Some(token);
        self.logged_in_at = Some(Utc::now());
    }

    pub fn logout(&mut self) {
        self.username = None;
        self.token = None;
        self.logged_in_at = None;
    }

    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'folio auth login <username>' first"))
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FOLIO_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("folio").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<SessionConfig> {
    let session_file = get_config_dir()?.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(SessionConfig::default());
    }

    let content = fs::read_to_string(session_file)?;
    let session: SessionConfig = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session(session: &SessionConfig) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join(SESSION_FILE);

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}
