use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::{output_investments, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PortfolioCommands {
    #[command(about = "Create your portfolio (no-op when it exists)")]
    Create,

    #[command(about = "Show holdings valued at the latest close")]
    Summary,

    #[command(about = "Show totals and gain/loss percentage")]
    Analytics,

    #[command(about = "Record an investment")]
    Add {
        #[arg(help = "Ticker symbol")]
        symbol: String,
        #[arg(help = "Quantity bought")]
        quantity: String,
        #[arg(long, help = "Buy price; defaults to the close on --date, or the latest close")]
        price: Option<String>,
        #[arg(long, help = "Investment date (YYYY-MM-DD)")]
        date: Option<String>,
    },

    #[command(about = "Remove an investment")]
    Remove {
        #[arg(help = "Investment ID")]
        id: i64,
    },
}

pub async fn handle(cmd: PortfolioCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(load_session()?)?;

    match cmd {
        PortfolioCommands::Create => {
            let created = client.market_post::<Value>("/api/v1/portfolio/create", None).await?;
            let id = created.get("portfolioId").cloned().unwrap_or(Value::Null);
            output_success(&output_format, &format!("Portfolio {} ready", id), Some(created))
        }
        PortfolioCommands::Summary => {
            let summary = client.market_get("/api/v1/portfolio/summary", &[]).await?;
            match output_format {
                OutputFormat::Json => output_value(&output_format, &summary),
                OutputFormat::Text => {
                    for key in ["portfolioId", "totalInvested", "currentValue", "gainLoss"] {
                        if let Some(value) = summary.get(key) {
                            println!("{}: {}", key, value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()));
                        }
                    }
                    let investments = summary
                        .get("investments")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    output_investments(&investments);
                    Ok(())
                }
            }
        }
        PortfolioCommands::Analytics => {
            let analytics = client.market_get("/api/v1/portfolio/analytics", &[]).await?;
            output_value(&output_format, &analytics)
        }
        PortfolioCommands::Add {
            symbol,
            quantity,
            price,
            date,
        } => {
            let body = json!({
                "assetSymbol": symbol,
                "quantity": quantity,
                "buyPrice": price,
                "investmentDate": date,
            });
            let created = client.market_post("/api/v1/portfolio/investment", Some(&body)).await?;
            let id = created.get("investmentId").cloned().unwrap_or(Value::Null);
            output_success(&output_format, &format!("Added investment {}", id), Some(created))
        }
        PortfolioCommands::Remove { id } => {
            client.market_delete(&format!("/api/v1/portfolio/investment/{}", id)).await?;
            output_success(&output_format, &format!("Removed investment {}", id), None)
        }
    }
}
