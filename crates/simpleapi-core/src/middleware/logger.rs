//! Access log middleware
//!
//! Times the rest of the chain and emits one `tracing` event per request.

use crate::handler::Handler;
use crate::{Context, Result};
use std::time::{Duration, Instant};

/// Access log middleware
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for Logger {
    fn call(&self, ctx: &mut Context) -> Result<()> {
        let start = Instant::now();
        let result = ctx.next();
        let elapsed = start.elapsed();

        let status = match &result {
            Ok(()) => ctx.status(),
            Err(err) => err.status(),
        };
        let request = ctx.request();

        tracing::info!(
            status = status.as_u16(),
            elapsed = %format_duration(elapsed),
            remote = request.remote_addr.as_deref().unwrap_or("-"),
            method = %request.method,
            path = %request.path,
            "request"
        );

        result
    }
}

/// Human-readable duration: `µs` below 1ms, `ms` below 1s, else seconds
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_millis(1) {
        format!("{}µs", d.as_micros())
    } else if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler, Chain};
    use crate::{Error, Method, Request, StatusCode};
    use simpleapi_router::Params;
    use std::sync::Arc;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_logger_passes_result_through() {
        let chain = Chain::new(vec![
            Arc::new(Logger::new()) as Arc<dyn Handler>,
            handler(|ctx| ctx.text(StatusCode::CREATED, "done")),
        ]);
        let mut ctx = Context::new(Request::new(Method::Post, "/items"), Params::new(), chain);
        assert!(ctx.next().is_ok());
        assert_eq!(ctx.status(), StatusCode::CREATED);

        let failing = Chain::new(vec![
            Arc::new(Logger::new()) as Arc<dyn Handler>,
            handler(|_ctx| Err(Error::Internal("boom".to_string()))),
        ]);
        let mut ctx = Context::new(Request::new(Method::Get, "/"), Params::new(), failing);
        assert!(matches!(ctx.next(), Err(Error::Internal(_))));
    }
}
