//! SeaORM-backed policy storage

pub mod adapter;
pub mod entities;
pub mod migrations;

pub use adapter::SeaOrmAdapter;
pub use entities::*;
pub use migrations::Migrator;
