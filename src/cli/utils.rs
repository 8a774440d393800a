use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a response body: pretty JSON for `--json`, `key: value` lines otherwise
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match (output_format, value) {
        (OutputFormat::Json, _) => println!("{}", serde_json::to_string_pretty(value)?),
        (OutputFormat::Text, Value::Object(map)) => {
            for (key, field) in map {
                match field {
                    Value::String(s) => println!("{}: {}", key, s),
                    Value::Array(items) => println!("{}: {} item(s)", key, items.len()),
                    other => println!("{}: {}", key, other),
                }
            }
        }
        (OutputFormat::Text, Value::String(s)) => println!("{}", s),
        (OutputFormat::Text, other) => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

/// Print the investments table of a portfolio summary in text mode
pub fn output_investments(investments: &[Value]) {
    if investments.is_empty() {
        println!("No investments");
        return;
    }

    println!("{:<8} {:<8} {:>10} {:>12} {:>12} {:>12}", "ID", "SYMBOL", "QTY", "BUY", "CURRENT", "GAIN/LOSS");
    for inv in investments {
        let field = |name: &str| match inv.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        println!(
            "{:<8} {:<8} {:>10} {:>12} {:>12} {:>12}",
            field("id"),
            field("assetSymbol"),
            field("quantity"),
            field("buyPrice"),
            field("currentPrice"),
            field("gainLoss")
        );
    }
}

/// Use the given password or read one line from stdin
pub fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
