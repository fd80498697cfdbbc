//! Application: route registration, documentation and dispatch
//!
//! Routes are registered on an [`App`] during startup. [`App::build`]
//! then folds the documented endpoints into an OpenAPI document and
//! freezes everything into a [`Service`], which is read-only and can be
//! shared across request tasks without locking.

use crate::handler::{handler, Chain, Handler};
use crate::openapi::{swagger_ui, Document, Info, OpenApiBuilder, Operation, ResponseSpec};
use crate::{Context, Error, Method, Request, Response, Result, StatusCode};
use simpleapi_router::Router;
use std::sync::Arc;
use url::Url;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Title of the OpenAPI document
    pub title: String,
    /// Version of the OpenAPI document
    pub version: String,
    /// Serve the Swagger UI and the OpenAPI document
    pub docs: bool,
    pub docs_path: String,
    pub spec_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "simpleapi".to_string(),
            version: "1.0.0".to_string(),
            docs: true,
            docs_path: "/docs".to_string(),
            spec_path: "/openapi.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn docs(mut self, enabled: bool) -> Self {
        self.docs = enabled;
        self
    }

    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = path.into();
        self
    }

    pub fn spec_path(mut self, path: impl Into<String>) -> Self {
        self.spec_path = path.into();
        self
    }
}

/// Route registry under construction
pub struct App {
    config: AppConfig,
    router: Router<Chain>,
    operations: OpenApiBuilder,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let info = Info::new(config.title.clone(), config.version.clone());
        Self {
            config,
            router: Router::new(),
            operations: OpenApiBuilder::new(info),
        }
    }

    /// Register a chain for `path` under the comma-separated verbs in
    /// `method` (empty means `GET`), without documenting it
    ///
    /// Registering the same path and verb again replaces the chain.
    pub fn add_handler(
        &mut self,
        path: &str,
        method: &str,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Result<()> {
        self.route(path, method, handlers, None).map(|_| ())
    }

    /// Like [`App::add_handler`], also recording `name` for [`App::url_for`]
    pub fn add_named(
        &mut self,
        name: &str,
        path: &str,
        method: &str,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Result<()> {
        self.route(path, method, handlers, Some(name)).map(|_| ())
    }

    pub fn get(&mut self, path: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<()> {
        self.add_handler(path, Method::Get.as_str(), handlers)
    }

    pub fn post(&mut self, path: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<()> {
        self.add_handler(path, Method::Post.as_str(), handlers)
    }

    pub fn put(&mut self, path: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<()> {
        self.add_handler(path, Method::Put.as_str(), handlers)
    }

    pub fn delete(&mut self, path: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<()> {
        self.add_handler(path, Method::Delete.as_str(), handlers)
    }

    /// Start a documented endpoint
    pub fn endpoint(&mut self, path: &str) -> Endpoint<'_> {
        Endpoint {
            app: self,
            operation: Operation::new(path, Method::Get),
            name: None,
            handlers: Vec::new(),
        }
    }

    /// Build a URL for the route registered under `name`
    ///
    /// Returns `None` for unknown names or when a `{param}` of the
    /// pattern has no value in `params`. Values are percent-encoded as
    /// path segments. A trailing catch-all is dropped.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        url_for(&self.router, name, params)
    }

    /// Freeze the routes and build the OpenAPI document
    ///
    /// The docs routes are only added where no `GET` route was registered
    /// under the same pattern.
    pub fn build(mut self) -> Service {
        let document = Arc::new(self.operations.build());

        if self.config.docs {
            let ui = swagger_ui(&self.config.spec_path);
            let docs = handler(move |ctx: &mut Context| ctx.html(StatusCode::OK, ui.as_str()));
            let served = Arc::clone(&document);
            let openapi = handler(move |ctx: &mut Context| ctx.json(StatusCode::OK, &*served));

            for (path, chain) in [
                (self.config.docs_path.clone(), Chain::new(vec![docs])),
                (self.config.spec_path.clone(), Chain::new(vec![openapi])),
            ] {
                // user routes win over the built-in docs
                if self.router.contains(&path, Method::Get.as_str()) {
                    tracing::warn!(path = %path, "docs route shadowed by a registered route");
                    continue;
                }
                self.router.add(&path, Method::Get.as_str(), chain, None);
            }
        }

        tracing::debug!(
            paths = document.paths.len(),
            methods = ?self.router.methods(),
            "application built"
        );

        Service {
            router: self.router,
            document,
        }
    }

    fn route(
        &mut self,
        path: &str,
        method: &str,
        handlers: Vec<Arc<dyn Handler>>,
        name: Option<&str>,
    ) -> Result<Chain> {
        if handlers.is_empty() {
            return Err(Error::EmptyChain {
                method: method.to_string(),
                path: path.to_string(),
            });
        }

        let chain = Chain::new(handlers);
        tracing::debug!(path, method, handlers = chain.len(), "route registered");
        self.router.add(path, method, chain.clone(), name);
        Ok(chain)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Documented endpoint builder, see [`App::endpoint`]
pub struct Endpoint<'a> {
    app: &'a mut App,
    operation: Operation,
    name: Option<String>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl Endpoint<'_> {
    /// Verb of the endpoint, `GET` unless set
    pub fn method(mut self, method: Method) -> Self {
        self.operation.method = method;
        self
    }

    pub fn get(self) -> Self {
        self.method(Method::Get)
    }

    pub fn post(self) -> Self {
        self.method(Method::Post)
    }

    pub fn put(self) -> Self {
        self.method(Method::Put)
    }

    pub fn delete(self) -> Self {
        self.method(Method::Delete)
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.operation.tags.push(tag.into());
        self
    }

    pub fn response(mut self, code: u16, description: impl Into<String>) -> Self {
        self.operation.responses.push(ResponseSpec {
            code,
            description: description.into(),
        });
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a handler to the endpoint's chain
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Register the route and record it for documentation
    pub fn register(self) -> Result<()> {
        let Endpoint {
            app,
            mut operation,
            name,
            handlers,
        } = self;

        let chain = app.route(
            &operation.path,
            operation.method.as_str(),
            handlers,
            name.as_deref(),
        )?;
        operation.params = chain.params();
        app.operations.add(operation);
        Ok(())
    }
}

/// Frozen application serving requests
pub struct Service {
    router: Router<Chain>,
    document: Arc<Document>,
}

impl Service {
    /// Route a request and run its chain
    ///
    /// Unmatched requests get 404. Binding failures answer 400, any other
    /// handler error 500.
    pub fn dispatch(&self, request: Request) -> Response {
        let Some(matched) = self
            .router
            .find_call(&request.path, request.method.as_str())
        else {
            tracing::debug!(method = %request.method, path = %request.path, "no route");
            return Response::not_found();
        };

        let mut ctx = Context::new(request, matched.params, matched.handler.clone());
        match ctx.next() {
            Ok(()) => ctx.into_response(),
            Err(err) => {
                let status = err.status();
                let request = ctx.request();
                if status.is_server_error() {
                    tracing::error!(method = %request.method, path = %request.path, error = %err, "handler failed");
                    Response::internal_error(status.reason_phrase())
                } else {
                    tracing::warn!(method = %request.method, path = %request.path, error = %err, "bad request");
                    Response::bad_request(&err.to_string())
                }
            }
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn router(&self) -> &Router<Chain> {
        &self.router
    }

    /// See [`App::url_for`]
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        url_for(&self.router, name, params)
    }
}

fn url_for(router: &Router<Chain>, name: &str, params: &[(&str, &str)]) -> Option<String> {
    let pattern = router.find_pattern(name);
    if pattern.is_empty() {
        return None;
    }

    let inner = pattern.strip_prefix('/').unwrap_or(pattern);
    let inner = inner.strip_suffix('/').unwrap_or(inner);

    // only the path of the base is kept
    let mut url = Url::parse("http://localhost/").ok()?;
    {
        let mut path = url.path_segments_mut().ok()?;
        path.pop_if_empty();
        for segment in inner.split('/') {
            if segment == "*" {
                break;
            }
            let value = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(key) => params.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)?,
                None => segment,
            };
            path.push(value);
        }
    }

    Some(url.path().to_string())
}
