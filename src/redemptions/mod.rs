pub(crate) mod redemptions_model;
pub(crate) mod redemptions_service;

pub use redemptions_model::{
    CashFlowEvent, CashFlowForecast, CashFlowSource, PendingRedeemItem, PendingRedeems,
};
pub use redemptions_service::RedemptionService;
