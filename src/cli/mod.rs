pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - Command-line client for the auth and market-data services")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and account management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Portfolio and investment operations")]
    Portfolio {
        #[command(subcommand)]
        cmd: commands::portfolio::PortfolioCommands,
    },

    #[command(about = "Market data lookups")]
    Stock {
        #[command(subcommand)]
        cmd: commands::stock::StockCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Portfolio { cmd } => commands::portfolio::handle(cmd, output_format).await,
        Commands::Stock { cmd } => commands::stock::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["folio", "--json", "portfolio", "add", "AAPL", "10", "--price", "150.00"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Portfolio {
                cmd: commands::portfolio::PortfolioCommands::Add { symbol, quantity, price, date },
            } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(quantity, "10");
                assert_eq!(price.as_deref(), Some("150.00"));
                assert!(date.is_none());
            }
            _ => panic!("expected portfolio add"),
        }
    }

    #[test]
    fn stock_change_takes_two_dates() {
        let cli = Cli::try_parse_from(["folio", "stock", "change", "AAPL", "2024-01-04", "2024-01-08"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stock {
                cmd: commands::stock::StockCommands::Change { .. }
            }
        ));
    }
}
