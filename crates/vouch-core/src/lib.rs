//! Shared plumbing for Vouch services: health probes, request-id and trace
//! layers, tracing initialisation and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
