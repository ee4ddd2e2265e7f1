use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::products::{LiquidityRule, Product, ProductRepositoryTrait};
use crate::transactions::{Transaction, TransactionCategory, TransactionRepositoryTrait};

use super::redemptions_model::{
    CashFlowEvent, CashFlowForecast, CashFlowSource, PendingRedeemItem, PendingRedeems,
};

const FORECAST_SHORT_DAYS: u64 = 7;
const FORECAST_LONG_DAYS: u64 = 30;

/// Service tracking in-flight redemptions and projecting future inflows.
///
/// Ledger amounts are magnitudes; direction comes from the category, so all
/// sums below work on absolute values.
pub struct RedemptionService {
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    product_repo: Arc<dyn ProductRepositoryTrait>,
}

impl RedemptionService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
        product_repo: Arc<dyn ProductRepositoryTrait>,
    ) -> Self {
        Self {
            transaction_repo,
            product_repo,
        }
    }

    /// Redemption money that left products but has not landed on an account:
    /// Σ|redeem_request| − Σ|redeem_settle|, clamped at zero, with per-product
    /// detail for everything still outstanding.
    pub fn pending_redeems(&self, product_id: Option<&str>) -> Result<PendingRedeems> {
        let requests = self
            .transaction_repo
            .list_by_category(TransactionCategory::RedeemRequest, product_id)?;
        let settles = self
            .transaction_repo
            .list_by_category(TransactionCategory::RedeemSettle, product_id)?;

        let total_requested: Decimal = requests.iter().map(|tx| tx.amount.abs()).sum();
        let total_settled: Decimal = settles.iter().map(|tx| tx.amount.abs()).sum();
        let total_pending = (total_requested - total_settled).max(Decimal::ZERO);

        let mut requested_by_product: HashMap<String, Vec<&Transaction>> = HashMap::new();
        for request in &requests {
            requested_by_product
                .entry(request.product_id.clone())
                .or_default()
                .push(request);
        }

        let mut settled_by_product: HashMap<String, Decimal> = HashMap::new();
        for settle in &settles {
            *settled_by_product
                .entry(settle.product_id.clone())
                .or_default() += settle.amount.abs();
        }

        let mut items: Vec<PendingRedeemItem> = Vec::new();
        for (pid, product_requests) in requested_by_product {
            let requested: Decimal = product_requests.iter().map(|tx| tx.amount.abs()).sum();
            let settled = settled_by_product.get(&pid).copied().unwrap_or_default();
            let pending = (requested - settled).max(Decimal::ZERO);
            if pending.is_zero() {
                continue;
            }

            items.push(PendingRedeemItem {
                product_name: self.product_name(&pid),
                product_id: pid,
                pending_amount: pending,
                earliest_request_date: product_requests.iter().map(|tx| tx.trade_date).min(),
                estimated_settle_date: product_requests
                    .iter()
                    .filter_map(|tx| tx.settle_date)
                    .max(),
            });
        }
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        Ok(PendingRedeems {
            total_pending,
            items,
        })
    }

    /// Projected inflows over `[start, start + days]`, date-ascending.
    ///
    /// Two sources: open redemption requests landing on their settle date
    /// (or trade date + the product's T+N rule), and term products maturing
    /// at latest-buy-date + term. The maturity leg is a rule-of-thumb
    /// estimate, not lot-accurate accounting.
    pub fn future_cash_flow(
        &self,
        start: Option<NaiveDate>,
        days: u64,
    ) -> Result<Vec<CashFlowEvent>> {
        let start = start.unwrap_or_else(|| chrono::Local::now().date_naive());
        let end = start + Days::new(days);

        let products: HashMap<String, Product> = self
            .product_repo
            .list()?
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();

        let mut events: Vec<CashFlowEvent> = Vec::new();

        // Settled amounts are consumed against requests oldest-first, so only
        // the still-open tail of each request projects an inflow.
        let requests = self
            .transaction_repo
            .list_by_category(TransactionCategory::RedeemRequest, None)?;
        let mut remaining_settled: HashMap<String, Decimal> = HashMap::new();
        for settle in self
            .transaction_repo
            .list_by_category(TransactionCategory::RedeemSettle, None)?
        {
            *remaining_settled
                .entry(settle.product_id.clone())
                .or_default() += settle.amount.abs();
        }

        for request in requests {
            let amount = request.amount.abs();
            let settled = remaining_settled
                .entry(request.product_id.clone())
                .or_default();

            let pending = if *settled >= amount {
                *settled -= amount;
                continue;
            } else {
                let pending = amount - *settled;
                *settled = Decimal::ZERO;
                pending
            };

            let product = products.get(&request.product_id);
            let estimated_date = match (request.settle_date, product) {
                (Some(settle_date), _) => settle_date,
                (None, Some(product)) => {
                    request.trade_date + Days::new(product.settle_days.max(0) as u64)
                }
                (None, None) => request.trade_date + Days::new(1),
            };

            if estimated_date >= start && estimated_date <= end {
                events.push(CashFlowEvent {
                    date: estimated_date,
                    amount: pending,
                    source: CashFlowSource::Redeem,
                    product_name: product
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "unknown product".to_string()),
                    product_id: request.product_id,
                });
            }
        }

        // Term products: estimate maturity as latest buy date + term.
        let buys = self
            .transaction_repo
            .list_by_category(TransactionCategory::Buy, None)?;
        let mut buys_by_product: HashMap<String, (NaiveDate, Decimal)> = HashMap::new();
        for buy in buys {
            let entry = buys_by_product
                .entry(buy.product_id.clone())
                .or_insert((buy.trade_date, Decimal::ZERO));
            entry.0 = entry.0.max(buy.trade_date);
            entry.1 += buy.amount.abs();
        }

        for (pid, (latest_buy, total_amount)) in buys_by_product {
            let Some(product) = products.get(&pid) else {
                continue;
            };
            let Some(term_days) = product.term_days.filter(|d| *d > 0) else {
                continue;
            };
            if product.liquidity_rule == LiquidityRule::Open {
                continue;
            }

            let maturity = latest_buy + Days::new(term_days as u64);
            if maturity >= start && maturity <= end {
                events.push(CashFlowEvent {
                    date: maturity,
                    amount: total_amount,
                    source: CashFlowSource::Maturity,
                    product_id: pid,
                    product_name: product.name.clone(),
                });
            }
        }

        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.product_id.cmp(&b.product_id)));

        Ok(events)
    }

    /// 30-day forecast with a 7-day subtotal, for the cash dashboard.
    pub fn summarize_future_cash_flow(&self) -> Result<CashFlowForecast> {
        let start = chrono::Local::now().date_naive();
        let items = self.future_cash_flow(Some(start), FORECAST_LONG_DAYS)?;

        let short_horizon = start + Days::new(FORECAST_SHORT_DAYS);
        let total_7d = items
            .iter()
            .filter(|event| event.date <= short_horizon)
            .map(|event| event.amount)
            .sum();
        let total_30d = items.iter().map(|event| event.amount).sum();

        Ok(CashFlowForecast {
            items,
            total_7d,
            total_30d,
        })
    }

    fn product_name(&self, product_id: &str) -> String {
        self.product_repo
            .get_by_id(product_id)
            .map(|product| product.name)
            .unwrap_or_else(|_| "unknown product".to_string())
    }
}
