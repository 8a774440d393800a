use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub auth_client: AuthClientConfig,
    pub market: MarketConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub auth_port: u16,
    pub market_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent the services run on in-memory repositories.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_expiry_minutes: i64,
}

/// Settings for the market-data service's calls into the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Report an unreachable auth service as 503 instead of folding it into 401.
    pub separate_unavailable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_ttl_secs: u64,
    /// Upper bound on cached `(function, symbol)` series
    pub cache_max_entries: u64,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("AUTH_PORT") {
            self.server.auth_port = v.parse().unwrap_or(self.server.auth_port);
        }
        if let Ok(v) = env::var("MARKET_PORT") {
            self.server.market_port = v.parse().unwrap_or(self.server.market_port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }

        // Auth client overrides
        if let Ok(v) = env::var("AUTH_BASE_URL") {
            self.auth_client.base_url = v;
        }
        if let Ok(v) = env::var("AUTH_CLIENT_TIMEOUT_SECS") {
            self.auth_client.timeout_secs = v.parse().unwrap_or(self.auth_client.timeout_secs);
        }
        if let Ok(v) = env::var("AUTH_SEPARATE_UNAVAILABLE") {
            self.auth_client.separate_unavailable = v.parse().unwrap_or(self.auth_client.separate_unavailable);
        }

        // Market data overrides
        if let Ok(v) = env::var("ALPHA_VANTAGE_API_KEY") {
            self.market.api_key = v;
        }
        if let Ok(v) = env::var("ALPHA_VANTAGE_BASE_URL") {
            self.market.base_url = v;
        }
        if let Ok(v) = env::var("MARKET_CACHE_TTL_SECS") {
            self.market.cache_ttl_secs = v.parse().unwrap_or(self.market.cache_ttl_secs);
        }
        if let Ok(v) = env::var("MARKET_CACHE_MAX_ENTRIES") {
            self.market.cache_max_entries = v.parse().unwrap_or(self.market.cache_max_entries);
        }
        if let Ok(v) = env::var("MARKET_TIMEOUT_SECS") {
            self.market.timeout_secs = v.parse().unwrap_or(self.market.timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                auth_port: 8081,
                market_port: 8082,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_expiry_minutes: 60,
            },
            auth_client: AuthClientConfig {
                base_url: "http://127.0.0.1:8081".to_string(),
                timeout_secs: 5,
                separate_unavailable: false,
            },
            market: MarketConfig {
                api_key: "demo".to_string(),
                base_url: "https://www.alphavantage.co/query".to_string(),
                cache_ttl_secs: 600,
                cache_max_entries: 1_000,
                timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                auth_port: 8081,
                market_port: 8082,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_expiry_minutes: 60,
            },
            auth_client: AuthClientConfig {
                base_url: "http://auth-service:8081".to_string(),
                timeout_secs: 5,
                separate_unavailable: false,
            },
            market: MarketConfig {
                api_key: String::new(),
                base_url: "https://www.alphavantage.co/query".to_string(),
                cache_ttl_secs: 600,
                cache_max_entries: 1_000,
                timeout_secs: 15,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                auth_port: 8081,
                market_port: 8082,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_expiry_minutes: 60,
            },
            auth_client: AuthClientConfig {
                base_url: "http://auth-service:8081".to_string(),
                timeout_secs: 3,
                separate_unavailable: false,
            },
            market: MarketConfig {
                api_key: String::new(),
                base_url: "https://www.alphavantage.co/query".to_string(),
                cache_ttl_secs: 600,
                cache_max_entries: 1_000,
                timeout_secs: 10,
            },
        }
    }

    pub fn auth_bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.auth_port)
    }

    pub fn market_bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.market_port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_expiry_minutes, 60);
        assert_eq!(config.market.cache_ttl_secs, 600);
        assert_eq!(config.market.cache_max_entries, 1_000);
        assert!(config.database.url.is_none());
        assert!(!config.auth_client.separate_unavailable);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn test_bind_addresses() {
        let config = AppConfig::development();
        assert_eq!(config.auth_bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.market_bind_addr(), "127.0.0.1:8082");
    }
}
