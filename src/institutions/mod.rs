pub(crate) mod institutions_model;
pub(crate) mod institutions_repository;
pub(crate) mod institutions_service;

pub use institutions_model::{Institution, NewInstitution};
pub use institutions_repository::{InstitutionRepository, InstitutionRepositoryTrait};
pub use institutions_service::InstitutionService;
