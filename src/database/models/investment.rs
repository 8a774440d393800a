use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Investment {
    pub id: i64,
    pub portfolio_id: i64,
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub buy_price: Decimal,
    pub investment_date: Option<NaiveDate>,
}

impl Investment {
    /// Cost basis: buy price times quantity
    pub fn invested(&self) -> Decimal {
        self.buy_price * self.quantity
    }
}

#[derive(Debug, Clone)]
pub struct NewInvestment {
    pub portfolio_id: i64,
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub buy_price: Decimal,
    pub investment_date: Option<NaiveDate>,
}
