pub(crate) mod products_model;
pub(crate) mod products_repository;
pub(crate) mod products_service;

pub use products_model::{
    LiquidityRule, NewProduct, Product, ProductType, ProductUpdate, RiskLevel,
};
pub use products_repository::{ProductRepository, ProductRepositoryTrait};
pub use products_service::ProductService;
