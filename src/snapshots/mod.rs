pub(crate) mod snapshots_model;
pub(crate) mod snapshots_repository;
pub(crate) mod snapshots_service;

pub use snapshots_model::{
    DashboardSummary, NewSnapshot, Snapshot, SnapshotBatchReport, TypeTotal,
};
pub use snapshots_repository::{SnapshotRepository, SnapshotRepositoryTrait};
pub use snapshots_service::SnapshotService;
