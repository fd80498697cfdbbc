//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! Adds CORS headers to every response of the chain it is placed in.

use crate::handler::Handler;
use crate::{Context, Method, Result};
use smallvec::SmallVec;

/// CORS configuration
#[derive(Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = all)
    pub origins: SmallVec<[String; 4]>,
    /// Allowed methods
    pub methods: SmallVec<[Method; 8]>,
    /// Allowed headers
    pub headers: SmallVec<[String; 8]>,
    /// Allow credentials
    pub credentials: bool,
    /// Max age (seconds) advertised to browsers
    pub max_age: Option<u32>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: SmallVec::new(), // Empty = allow all
            methods: smallvec::smallvec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ],
            headers: smallvec::smallvec![
                "Accept".to_string(),
                "Content-Type".to_string(),
                "Content-Length".to_string(),
                "Accept-Encoding".to_string(),
                "X-CSRF-Token".to_string(),
                "Authorization".to_string(),
            ],
            credentials: false,
            max_age: None,
        }
    }
}

impl CorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    pub fn allow_method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn allow_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn allow_credentials(mut self) -> Self {
        self.credentials = true;
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }
}

/// CORS middleware
pub struct Cors {
    config: CorsConfig,
}

impl Cors {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    /// Allow every origin with the default methods and headers
    pub fn permissive() -> Self {
        Self::new(CorsConfig::default())
    }

    fn allowed_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.config.origins.is_empty() {
            return Some("*".to_string());
        }
        let origin = origin?;
        self.config
            .origins
            .iter()
            .any(|o| o == origin || o == "*")
            .then(|| origin.to_string())
    }

    fn methods_string(&self) -> String {
        self.config
            .methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Handler for Cors {
    fn call(&self, ctx: &mut Context) -> Result<()> {
        let origin = self.allowed_origin(ctx.request().header("origin"));

        if let Some(origin) = origin {
            ctx.set_header("Access-Control-Allow-Origin", origin);
            ctx.set_header("Access-Control-Allow-Methods", self.methods_string());
            if !self.config.headers.is_empty() {
                ctx.set_header("Access-Control-Allow-Headers", self.config.headers.join(", "));
            }
            if self.config.credentials {
                ctx.set_header("Access-Control-Allow-Credentials", "true");
            }
            if let Some(max_age) = self.config.max_age {
                ctx.set_header("Access-Control-Max-Age", max_age.to_string());
            }
        }

        ctx.next()
    }
}
