//! Gateway services.

pub mod ai_gateway;

pub use ai_gateway::{AiGateway, DEFAULT_COMPLETION_TIMEOUT};
