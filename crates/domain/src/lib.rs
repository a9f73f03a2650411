//! Domain layer for the equipment tracker.
//!
//! This crate contains:
//! - Domain models (Asset, AuditEntry, ActorContext)
//! - The service lifecycle manager and its storage traits
//! - An in-memory store used by tests and local runs

pub mod models;
pub mod services;
