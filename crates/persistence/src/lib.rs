//! Persistence layer for the equipment tracker.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The PostgreSQL lifecycle store and user directory

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use repositories::{PgLifecycleStore, UserDirectory};
