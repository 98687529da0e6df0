pub mod analysis;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod export;
pub mod remote;

pub use db::{Database, DbPool};
pub use error::MaintenanceError;
