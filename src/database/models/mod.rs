pub mod asset;
pub mod investment;
pub mod portfolio;
pub mod user;

pub use asset::{Asset, NewAsset};
pub use investment::{Investment, NewInvestment};
pub use portfolio::Portfolio;
pub use user::{NewUser, Role, User};
