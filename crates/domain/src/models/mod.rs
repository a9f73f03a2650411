//! Domain models for the equipment tracker.

pub mod actor;
pub mod asset;
pub mod audit_entry;
pub mod lifecycle_request;

pub use actor::{display_name_or_unknown, ActorContext, ActorProfile, UNKNOWN_USER};
pub use asset::{Asset, ServiceState, TransitionError};
pub use audit_entry::{
    AssetAction, AuditEntry, AuditEntryView, ChangelogResponse, ServiceOutPayload,
    ServiceReturnPayload, StatusChangedPayload,
};
pub use lifecycle_request::{
    MarkOutOfServiceRequest, OutOfServiceCommand, ReturnToServiceCommand, ReturnToServiceRequest,
};
