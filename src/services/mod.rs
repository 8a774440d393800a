pub mod market_data_service;
pub mod portfolio_service;
pub mod user_service;

pub use market_data_service::{MarketDataError, MarketDataService, PercentageChange, StockData};
pub use portfolio_service::{
    AddInvestmentRequest, InvestmentDto, PortfolioAnalytics, PortfolioError, PortfolioService, PortfolioSummary,
};
pub use user_service::{RegisterRequest, UpdateProfileRequest, UserError, UserResponse, UserService};
