//! Top-level facade crate for aigate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use aigate_core::*;
}

pub mod gateway {
    pub use aigate_gateway::*;
}
