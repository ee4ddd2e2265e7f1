pub(crate) mod reconciliation_model;
pub(crate) mod reconciliation_repository;
pub(crate) mod reconciliation_service;
mod reconciliation_service_tests;

pub use reconciliation_model::{
    AccountDiffItem, ReconciliationWarning, RedeemCheckItem, RedeemStatus, Severity,
    ValuationGapItem, WarningRecord, WarningStatus, WarningType,
};
pub use reconciliation_repository::{WarningRepository, WarningRepositoryTrait};
pub use reconciliation_service::ReconciliationService;
