use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum StockCommands {
    #[command(about = "Raw daily time series for a symbol")]
    Daily {
        #[arg(help = "Ticker symbol")]
        symbol: String,
    },

    #[command(about = "Raw weekly time series for a symbol")]
    Weekly {
        #[arg(help = "Ticker symbol")]
        symbol: String,
    },

    #[command(about = "Raw monthly time series for a symbol")]
    Monthly {
        #[arg(help = "Ticker symbol")]
        symbol: String,
    },

    #[command(about = "Search symbols by keyword")]
    Search {
        #[arg(help = "Search keyword")]
        keyword: String,
    },

    #[command(about = "Open/high/low/close/volume for one trading day")]
    ByDate {
        #[arg(help = "Ticker symbol")]
        symbol: String,
        #[arg(help = "Date (YYYY-MM-DD)")]
        date: String,
    },

    #[command(about = "Percentage change in close between two dates")]
    Change {
        #[arg(help = "Ticker symbol")]
        symbol: String,
        #[arg(help = "From date (YYYY-MM-DD)")]
        from: String,
        #[arg(help = "To date (YYYY-MM-DD)")]
        to: String,
    },
}

pub async fn handle(cmd: StockCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(load_session()?)?;

    let value = match cmd {
        StockCommands::Daily { symbol } => {
            client.market_get("/api/v1/stock/daily", &[("symbol", symbol.as_str())]).await?
        }
        StockCommands::Weekly { symbol } => {
            client.market_get("/api/v1/stock/weekly", &[("symbol", symbol.as_str())]).await?
        }
        StockCommands::Monthly { symbol } => {
            client.market_get("/api/v1/stock/monthly", &[("symbol", symbol.as_str())]).await?
        }
        StockCommands::Search { keyword } => {
            client
                .market_get("/api/v1/stock/search", &[("keyword", keyword.as_str())])
                .await?
        }
        StockCommands::ByDate { symbol, date } => {
            client
                .market_get(
                    "/api/v1/stock/daily/by-date",
                    &[("symbol", symbol.as_str()), ("date", date.as_str())],
                )
                .await?
        }
        StockCommands::Change { symbol, from, to } => {
            client
                .market_get(
                    "/api/v1/stock/percentage-change",
                    &[("symbol", symbol.as_str()), ("fromDate", from.as_str()), ("toDate", to.as_str())],
                )
                .await?
        }
    };

    output_value(&output_format, &value)
}
