pub(crate) mod cash_model;
pub(crate) mod cash_service;

pub use cash_model::{AvailableCash, CashSummary, LiquidAccountItem};
pub use cash_service::CashService;
