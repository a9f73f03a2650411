//! Repository implementations backed by PostgreSQL.

pub mod lifecycle;
pub mod user;

pub use lifecycle::PgLifecycleStore;
pub use user::UserDirectory;
