use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One portfolio per user; investments reference it by `portfolio_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: i64,
    pub user_id: i64,
}
