pub mod db;

pub mod accounts;
pub mod analytics;
pub mod cash;
pub mod constants;
pub mod errors;
pub mod institutions;
pub mod products;
pub mod reconciliation;
pub mod redemptions;
pub mod schema;
pub mod snapshots;
pub mod transactions;
pub mod valuations;

pub use errors::{Error, Result};
