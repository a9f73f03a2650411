//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod trace_id;
pub mod user_auth;

pub use metrics::{
    init_metrics, metrics_handler, metrics_middleware, record_lifecycle_transition,
    spawn_pool_metrics, POOL_METRICS_INTERVAL,
};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
pub use user_auth::{require_user_auth, UserAuth};
