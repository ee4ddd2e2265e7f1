pub(crate) mod accounts_model;
pub(crate) mod accounts_repository;
pub(crate) mod accounts_service;

pub use accounts_model::{Account, AccountType, AccountUpdate, NewAccount};
pub use accounts_repository::{AccountRepository, AccountRepositoryTrait};
pub use accounts_service::AccountService;
