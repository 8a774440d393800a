use clap::Subcommand;
use reqwest::Method;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::{output_success, output_value, resolve_password};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the bearer token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Auth service base URL, remembered for later commands")]
        auth_url: Option<String>,
        #[arg(long, help = "Market-data service base URL, remembered for later commands")]
        market_url: Option<String>,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Full name")]
        full_name: Option<String>,
        #[arg(long, help = "Phone number, 8-15 digits with optional leading +")]
        phone: Option<String>,
        #[arg(long, help = "Date of birth (YYYY-MM-DD)")]
        dob: Option<String>,
    },

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        AuthCommands::Login {
            username,
            password,
            auth_url,
            market_url,
        } => {
            if let Some(url) = auth_url {
                session.auth_url = url;
            }
            if let Some(url) = market_url {
                session.market_url = url;
            }
            let password = resolve_password(password)?;

            let client = ApiClient::new(session.clone())?;
            let response = client
                .auth_post_public("/auth/v1/login", &json!({ "username": username, "password": password }))
                .await?;
            let token = response
                .get("token")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow::anyhow!("Login response did not contain a token"))?;

            session.login(&username, token.to_string());
            save_session(&session)?;
            output_success(
                &output_format,
                &format!("Logged in as {}", username),
                Some(json!({ "username": username })),
            )
        }
        AuthCommands::Logout => {
            session.logout();
            save_session(&session)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Register {
            username,
            email,
            password,
            full_name,
            phone,
            dob,
        } => {
            let password = resolve_password(password)?;
            let client = ApiClient::new(session)?;
            let user = client
                .auth_post_public(
                    "/users/v1/register",
                    &json!({
                        "username": username,
                        "email": email,
                        "password": password,
                        "fullName": full_name,
                        "phoneNumber": phone,
                        "dateOfBirth": dob,
                    }),
                )
                .await?;
            output_success(&output_format, &format!("Registered user {}", username), Some(user))
        }
        AuthCommands::Whoami => {
            let client = ApiClient::new(session)?;
            let user = client.auth_request(Method::GET, "/users/me").await?;
            output_value(&output_format, &user)
        }
    }
}
