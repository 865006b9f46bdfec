//! aigate core: transport-agnostic policy primitives for the AI request gateway.
//!
//! This crate defines the tier table, the prompt classifier, usage records,
//! the request/response value objects and the error surface shared by the
//! gateway service and its HTTP binding. It carries no runtime or transport
//! dependencies so the policy tables can be tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible
//! paths surface as `GatewayError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod classify;
pub mod error;
pub mod model;
pub mod protocol;
pub mod tier;
pub mod usage;

/// Shared result type.
pub use error::{BackendError, ClientCode, GatewayError, Result};
pub use model::{ModelId, PreferredModel};
pub use tier::{Tier, TierId, TierTable};
