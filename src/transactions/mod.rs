pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;
pub(crate) mod transactions_service;

pub use transactions_model::{
    NewTransaction, Paginated, Transaction, TransactionCategory, TransactionFilter,
};
pub use transactions_repository::{TransactionRepository, TransactionRepositoryTrait};
pub use transactions_service::TransactionService;
