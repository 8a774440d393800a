use chrono::NaiveDate;
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::alpha_vantage::{MarketDataSource, UpstreamError};

pub const TIME_SERIES_DAILY: &str = "TIME_SERIES_DAILY";
pub const TIME_SERIES_WEEKLY: &str = "TIME_SERIES_WEEKLY";
pub const TIME_SERIES_MONTHLY: &str = "TIME_SERIES_MONTHLY";

const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("{0}")]
    Validation(String),
    #[error("No price for {symbol} on {date}")]
    PriceNotAvailable { symbol: String, date: String },
    #[error("No market data for {0}")]
    NoData(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<UpstreamError> for MarketDataError {
    fn from(err: UpstreamError) -> Self {
        MarketDataError::Upstream(err.to_string())
    }
}

/// One trading day for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageChange {
    pub symbol: String,
    /// Rendered as e.g. `"10.25%"`
    pub percentage_change: String,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: Decimal,
    #[serde(rename = "2. high")]
    high: Decimal,
    #[serde(rename = "3. low")]
    low: Decimal,
    #[serde(rename = "4. close")]
    close: Decimal,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Parse a `YYYY-MM-DD` query value.
pub fn parse_date(value: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| MarketDataError::InvalidDate(value.to_string()))
}

fn normalize_symbol(symbol: &str) -> Result<String, MarketDataError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(MarketDataError::Validation("symbol is required".to_string()));
    }
    Ok(symbol.to_uppercase())
}

/// Bodies that carry an error or throttling notice instead of data
fn is_cacheable(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            !map.is_empty()
                && !map.contains_key("Error Message")
                && !map.contains_key("Note")
                && !map.contains_key("Information")
        }
        _ => false,
    }
}

/// Time series lookups with a per `(function, symbol)` TTL cache in front of the provider.
pub struct MarketDataService {
    source: Arc<dyn MarketDataSource>,
    cache: Cache<(String, String), String>,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn MarketDataSource>, cache_ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(cache_ttl)
            .build();

        Self { source, cache }
    }

    pub async fn daily(&self, symbol: &str) -> Result<String, MarketDataError> {
        self.time_series(TIME_SERIES_DAILY, symbol).await
    }

    pub async fn weekly(&self, symbol: &str) -> Result<String, MarketDataError> {
        self.time_series(TIME_SERIES_WEEKLY, symbol).await
    }

    pub async fn monthly(&self, symbol: &str) -> Result<String, MarketDataError> {
        self.time_series(TIME_SERIES_MONTHLY, symbol).await
    }

    pub async fn search(&self, keyword: &str) -> Result<String, MarketDataError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(MarketDataError::Validation("keyword is required".to_string()));
        }
        Ok(self.source.search_symbol(keyword).await?)
    }

    async fn time_series(&self, function: &str, symbol: &str) -> Result<String, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;
        let key = (function.to_string(), symbol);

        if let Some(body) = self.cache.get(&key).await {
            debug!("Cache hit for {} {}", key.0, key.1);
            return Ok(body);
        }

        let body = self.source.fetch_time_series(function, &key.1).await?;
        if is_cacheable(&body) {
            self.cache.insert(key, body.clone()).await;
        } else {
            warn!("Not caching {} {}: provider returned no data", key.0, key.1);
        }
        Ok(body)
    }

    async fn daily_bars(&self, symbol: &str) -> Result<BTreeMap<String, DailyBar>, MarketDataError> {
        let body = self.daily(symbol).await?;
        let mut doc: Value = serde_json::from_str(&body)
            .map_err(|e| MarketDataError::Upstream(format!("invalid JSON from provider: {}", e)))?;

        let Some(series) = doc.get_mut(DAILY_SERIES_KEY).map(Value::take) else {
            return Err(MarketDataError::NoData(symbol.trim().to_uppercase()));
        };
        // Date keys are ISO strings, so map order is chronological
        serde_json::from_value(series)
            .map_err(|e| MarketDataError::Upstream(format!("unexpected time series shape: {}", e)))
    }

    pub async fn daily_by_date(&self, symbol: &str, date: &str) -> Result<StockData, MarketDataError> {
        let date = parse_date(date)?;
        let symbol = normalize_symbol(symbol)?;
        let bars = self.daily_bars(&symbol).await?;

        let key = date.format("%Y-%m-%d").to_string();
        let bar = bars.get(&key).ok_or_else(|| MarketDataError::PriceNotAvailable {
            symbol: symbol.clone(),
            date: key.clone(),
        })?;

        let volume = bar.volume.trim().parse().map_err(|_| {
            MarketDataError::Upstream(format!("unparseable volume '{}' for {} on {}", bar.volume, symbol, key))
        })?;

        Ok(StockData {
            symbol,
            date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume,
        })
    }

    /// Close on a given trading day, `None` when the provider has no bar for it.
    pub async fn close_on(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, MarketDataError> {
        let bars = self.daily_bars(symbol).await?;
        Ok(bars.get(&date.format("%Y-%m-%d").to_string()).map(|bar| bar.close))
    }

    /// Close of the most recent trading day in the daily series.
    pub async fn latest_close(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        let bars = self.daily_bars(symbol).await?;
        bars.values()
            .next_back()
            .map(|bar| bar.close)
            .ok_or_else(|| MarketDataError::NoData(symbol.trim().to_uppercase()))
    }

    pub async fn percentage_change(
        &self,
        symbol: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<PercentageChange, MarketDataError> {
        let from = parse_date(from_date)?;
        let to = parse_date(to_date)?;
        let symbol = normalize_symbol(symbol)?;

        let unavailable =
            || MarketDataError::Validation("Could not calculate percentage change. Check symbol or date range.".to_string());

        let bars = self.daily_bars(&symbol).await.map_err(|e| match e {
            MarketDataError::NoData(_) => unavailable(),
            other => other,
        })?;
        let close_at = |d: NaiveDate| bars.get(&d.format("%Y-%m-%d").to_string()).map(|bar| bar.close);

        let (Some(start), Some(end)) = (close_at(from), close_at(to)) else {
            return Err(unavailable());
        };
        if start.is_zero() {
            return Err(unavailable());
        }

        let change = ((end - start) * Decimal::ONE_HUNDRED / start).round_dp(2);
        Ok(PercentageChange {
            symbol,
            percentage_change: format!("{:.2}%", change),
        })
    }

}
