use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// In-flight redemption money for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRedeemItem {
    pub product_id: String,
    pub product_name: String,
    /// Requested minus settled, never negative.
    pub pending_amount: Decimal,
    pub earliest_request_date: Option<NaiveDate>,
    /// Latest settle date declared on any open request, when one was given.
    pub estimated_settle_date: Option<NaiveDate>,
}

/// Total in-flight redemption money with per-product detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRedeems {
    pub total_pending: Decimal,
    pub items: Vec<PendingRedeemItem>,
}

/// Where a projected inflow comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowSource {
    /// An open redemption expected to land on its settle date.
    Redeem,
    /// A term product reaching maturity, estimated from its latest buy.
    Maturity,
}

/// One projected cash inflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEvent {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub source: CashFlowSource,
    pub product_id: String,
    pub product_name: String,
}

/// Horizon totals over the projected inflows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowForecast {
    pub items: Vec<CashFlowEvent>,
    pub total_7d: Decimal,
    pub total_30d: Decimal,
}
