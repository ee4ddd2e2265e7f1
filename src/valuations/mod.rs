pub(crate) mod series;
pub(crate) mod valuations_model;
pub(crate) mod valuations_repository;
pub(crate) mod valuations_service;

pub use series::build_daily_series;
pub use valuations_model::{
    NewValuationPoint, SeriesPoint, UpsertReport, ValuationPoint, ValueSource,
};
pub use valuations_repository::{ValuationRepository, ValuationRepositoryTrait};
pub use valuations_service::ValuationService;
