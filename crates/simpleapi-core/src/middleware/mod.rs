//! Middleware implementations
//!
//! Middleware are ordinary chain handlers: they do their work and call
//! [`Context::next`](crate::Context::next) to continue with the rest of
//! the route's chain.

pub mod cors;
pub mod logger;

// Re-exports for convenience
pub use cors::{Cors, CorsConfig};
pub use logger::{format_duration, Logger};
