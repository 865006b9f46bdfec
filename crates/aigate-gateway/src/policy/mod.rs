//! Policy layer (tier ladder, model routing, fallback).
//!
//! Compiles the policy section of the config into read-only lookup tables
//! that the gateway service consults for every request.

pub mod engine;

pub use engine::{PolicyEngine, Selection, SelectionReason};
