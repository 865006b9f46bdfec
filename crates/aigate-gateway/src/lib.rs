//! aigate gateway library entry.
//!
//! This crate wires the policy engine, collaborator seams (completion
//! backend, holdings lookup, usage store), metrics and the HTTP binding into
//! the AI request gateway. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod backend;
pub mod config;
pub mod holdings;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod services;
pub mod store;
