//! Per-request context threaded through a handler chain

use crate::bind::Binder;
use crate::handler::Chain;
use crate::{Request, Response, Result, StatusCode};
use serde::Serialize;
use simpleapi_router::Params;
use std::any::Any;
use std::collections::HashMap;

/// Request state shared by every handler of a chain
pub struct Context {
    request: Request,
    params: Params,
    response: Response,
    chain: Chain,
    cursor: usize,
    storage: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new(request: Request, params: Params, chain: Chain) -> Self {
        Self {
            request,
            params,
            response: Response::default(),
            chain,
            cursor: 0,
            storage: HashMap::new(),
        }
    }

    /// Run the next handler of the chain
    ///
    /// Returns `Ok(())` without doing anything once the chain is exhausted.
    pub fn next(&mut self) -> Result<()> {
        let Some(handler) = self.chain.get(self.cursor) else {
            return Ok(());
        };
        self.cursor += 1;
        handler.call(self)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Parameters captured by the router
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Path parameter `name`, `""` when absent
    pub fn param(&self, name: &str) -> &str {
        self.params.by_name(name)
    }

    pub fn binder(&self) -> Binder<'_> {
        Binder::new(&self.request, &self.params)
    }

    /// Status of the response written so far
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.response.set_header(name, value);
    }

    /// Write `data` as a JSON response
    pub fn json<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        data: &T,
    ) -> Result<()> {
        let body = serde_json::to_vec(data)?;
        self.write(status, "application/json", body);
        Ok(())
    }

    /// Write an HTML response
    pub fn html(&mut self, status: StatusCode, html: impl Into<String>) -> Result<()> {
        self.write(status, "text/html; charset=utf-8", html.into().into_bytes());
        Ok(())
    }

    /// Write a plain text response
    pub fn text(&mut self, status: StatusCode, text: impl Into<String>) -> Result<()> {
        self.write(status, "text/plain; charset=utf-8", text.into().into_bytes());
        Ok(())
    }

    fn write(&mut self, status: StatusCode, content_type: &str, body: Vec<u8>) {
        self.response.write(status, content_type, body);
    }

    /// Store a value for later handlers of the chain
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.storage.insert(key.into(), Box::new(value));
    }

    /// Stored value under `key`, if present and of type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.storage.get(key).and_then(|v| v.downcast_ref())
    }

    pub fn has(&self, key: &str) -> bool {
        self.storage.contains_key(key)
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler;
    use crate::Method;
    use simpleapi_router::Param;

    fn request() -> Request {
        Request::new(Method::Get, "/hello/world")
    }

    #[test]
    fn test_next_runs_in_order() {
        let chain = Chain::new(vec![
            handler(|ctx| {
                ctx.set("seen", vec!["first"]);
                ctx.next()?;
                ctx.set_header("x-after", "1");
                Ok(())
            }),
            handler(|ctx| {
                let seen = ctx.get::<Vec<&'static str>>("seen").cloned().unwrap_or_default();
                ctx.text(StatusCode::CREATED, seen.join(","))
            }),
        ]);

        let mut ctx = Context::new(request(), Params::new(), chain);
        ctx.next().unwrap();

        let res = ctx.into_response();
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body_string().as_deref(), Some("first"));
        assert_eq!(res.header("x-after"), Some("1"));
    }

    #[test]
    fn test_handler_not_calling_next_stops_chain() {
        let chain = Chain::new(vec![
            handler(|ctx| ctx.text(StatusCode::OK, "stop")),
            handler(|ctx| ctx.text(StatusCode::INTERNAL_SERVER_ERROR, "unreachable")),
        ]);

        let mut ctx = Context::new(request(), Params::new(), chain);
        ctx.next().unwrap();
        assert_eq!(ctx.status(), StatusCode::OK);
        assert_eq!(ctx.response().body_string().as_deref(), Some("stop"));
    }

    #[test]
    fn test_next_past_end_is_noop() {
        let mut ctx = Context::new(request(), Params::new(), Chain::new(Vec::new()));
        assert!(ctx.next().is_ok());
        assert!(ctx.next().is_ok());
    }

    #[test]
    fn test_json_and_params() {
        let params = Params::from(vec![Param::new("name", "world")]);
        let chain = Chain::new(vec![handler(|ctx| {
            let name = ctx.param("name").to_string();
            ctx.json(StatusCode::OK, &serde_json::json!({ "hello": name }))
        })]);

        let mut ctx = Context::new(request(), params, chain);
        ctx.next().unwrap();
        assert_eq!(ctx.response().content_type(), Some("application/json"));
        assert_eq!(
            ctx.response().body_string().as_deref(),
            Some(r#"{"hello":"world"}"#)
        );
        assert_eq!(ctx.param("missing"), "");
    }

    #[test]
    fn test_storage() {
        let mut ctx = Context::new(request(), Params::new(), Chain::new(Vec::new()));
        ctx.set("user", 42u64);

        assert!(ctx.has("user"));
        assert_eq!(ctx.get::<u64>("user"), Some(&42));
        assert_eq!(ctx.get::<String>("user"), None);
        assert!(!ctx.has("other"));
    }
}
