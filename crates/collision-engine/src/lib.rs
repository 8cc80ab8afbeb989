pub mod catalog;
pub mod engine;
pub mod enricher;
pub mod scorer;
pub mod selector;

pub use catalog::{CatalogHandle, DomainCatalog};
pub use engine::CollisionEngine;
