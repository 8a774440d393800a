use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Symbol record created lazily on first investment. Not authoritative reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
}

impl NewAsset {
    pub const UNKNOWN_TYPE: &'static str = "UNKNOWN";

    /// Placeholder asset for a symbol nobody has invested in before.
    pub fn unknown(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            asset_type: Self::UNKNOWN_TYPE.to_string(),
        }
    }
}
