//! Domain services for the equipment tracker.
//!
//! The lifecycle manager owns every service-state transition; stores sit
//! behind the traits in [`store`].

pub mod audit;
pub mod lifecycle;
pub mod memory_store;
pub mod store;

pub use audit::{audit_helpers, AuditEntryBuilder};
pub use lifecycle::{AssetLifecycle, LifecycleError, LifecycleOptions, ServiceLifecycleManager};
pub use memory_store::{InMemoryLifecycleStore, MemoryTx};
pub use store::{ActorDirectory, LifecycleStore, StoreError};
