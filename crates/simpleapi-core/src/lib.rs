//! simpleapi-core: Small HTTP toolkit around the simpleapi router
//!
//! Handlers are registered on an [`App`] together with the request values
//! they bind. Building the app produces an OpenAPI document and a frozen
//! [`Service`] that routes requests through each route's handler chain.
//!
//! ## Features
//! - `native` - Native server with tokio/hyper
//!
//! ## Example
//! ```
//! use simpleapi_core::{handler, App, Method, Request, StatusCode};
//!
//! let mut app = App::new();
//! app.get(
//!     "/hello/{name}",
//!     vec![handler(|ctx| {
//!         let body = format!("hello {}", ctx.param("name"));
//!         ctx.text(StatusCode::OK, body)
//!     })],
//! )
//! .unwrap();
//!
//! let service = app.build();
//! let res = service.dispatch(Request::new(Method::Get, "/hello/world"));
//! assert_eq!(res.body_string().as_deref(), Some("hello world"));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod app;
pub mod bind;
pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
pub mod request;
pub mod response;

#[cfg(feature = "native")]
pub mod server;

// Re-exports
pub use app::{App, AppConfig, Endpoint, Service};
pub use bind::{field, Bind, Binder, FromParam, Location, ParamDescriptor, ParamKind};
pub use context::Context;
pub use error::{Error, Result};
pub use handler::{handler, typed, Chain, Handler};
pub use openapi::{Document, Info, OpenApiBuilder, Operation};
pub use request::{Method, Request, RequestBuilder};
pub use response::{Response, StatusCode};
pub use simpleapi_router::{Match, Param, Params, Router};

// Middleware re-exports
pub use middleware::{Cors, CorsConfig, Logger};

#[cfg(feature = "native")]
pub use server::{create_optimized_socket, from_parts, run, serve, to_hyper_response, ServerConfig};
