//! Request/response value objects exchanged with gateway callers.
//!
//! These are transport-agnostic; the HTTP binding serializes them as JSON
//! with snake_case field names.

pub mod request;
pub mod response;

pub use request::{address_usage_key, user_usage_key, GatewayRequest, ANONYMOUS_USER};
pub use response::{GatewayResponse, UsageStats};
