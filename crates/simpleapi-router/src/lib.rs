//! simpleapi-router: Zero-dependency segment trie HTTP router
//!
//! The router behind simpleapi's dispatcher. It knows nothing about
//! requests or responses: handlers are opaque values of type `H`, and a
//! lookup hands back a reference to one together with the captured
//! parameters.
//!
//! ## Path Syntax
//! - `users` - Literal segment
//! - `{name}` - Named parameter (captures one segment)
//! - `*` - Catch-all (matches the remaining path, captures nothing)
//!
//! ## Priority
//! 1. Literal match (highest)
//! 2. Parameter match, in registration order
//! 3. Catch-all match (lowest)
//!
//! Patterns and request paths are normalized by appending a single
//! trailing slash when missing, so `/users` and `/users/` are the same
//! route.
//!
//! ## Example
//! ```
//! use simpleapi_router::Router;
//!
//! let mut router = Router::new();
//! router.add("/users", "", 0, None);
//! router.add("/users/{id}", "GET,DELETE", 1, Some("user"));
//!
//! let m = router.find_call("/users/42", "DELETE").unwrap();
//! assert_eq!(*m.handler, 1);
//! assert_eq!(m.params.by_name("id"), "42");
//!
//! assert_eq!(router.find_pattern("user"), "/users/{id}/");
//! assert!(router.find_call("/users", "POST").is_none());
//! ```

use std::collections::{BTreeSet, HashMap};

/// Verb used when a route is registered without a method
pub const DEFAULT_METHOD: &str = "GET";

/// A single captured path parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered parameters captured by a lookup, outermost first
///
/// Keys are not guaranteed to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first parameter named `key`, or `""` when absent
    pub fn by_name(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Value of the first parameter named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param::new(key, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Route match result
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'r, H> {
    /// The matched handler
    pub handler: &'r H,
    /// Captured path parameters in root-to-leaf order
    pub params: Params,
}

/// Kind of a single pattern segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
    Wildcard,
}

impl<'a> Segment<'a> {
    fn parse(segment: &'a str) -> Self {
        if segment == "*" {
            return Segment::Wildcard;
        }
        match segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            Some(name) => Segment::Param(name),
            None => Segment::Literal(segment),
        }
    }
}

/// Trie node for path segment matching
#[derive(Debug)]
struct Node<H> {
    /// Literal children (key = path segment)
    literals: HashMap<String, Node<H>>,
    /// Parameter children ({id}) in registration order
    params: Vec<(String, Node<H>)>,
    /// Catch-all child (*)
    wildcard: Option<Box<Node<H>>>,
    /// Uppercased verb -> handler
    handlers: HashMap<String, H>,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            params: Vec::new(),
            wildcard: None,
            handlers: HashMap::new(),
        }
    }
}

impl<H> Node<H> {
    fn child_mut(&mut self, segment: &str) -> &mut Node<H> {
        match Segment::parse(segment) {
            Segment::Literal(s) => self.literals.entry(s.to_string()).or_default(),
            Segment::Param(name) => {
                let idx = match self.params.iter().position(|(n, _)| n == name) {
                    Some(idx) => idx,
                    None => {
                        self.params.push((name.to_string(), Node::default()));
                        self.params.len() - 1
                    }
                };
                &mut self.params[idx].1
            }
            Segment::Wildcard => &mut **self.wildcard.get_or_insert_with(Default::default),
        }
    }

    fn child(&self, segment: &str) -> Option<&Node<H>> {
        match Segment::parse(segment) {
            Segment::Literal(s) => self.literals.get(s),
            Segment::Param(name) => self.params.iter().find(|(n, _)| n == name).map(|(_, n)| n),
            Segment::Wildcard => self.wildcard.as_deref(),
        }
    }
}

/// Segment trie HTTP router
///
/// Registration happens through `&mut self` during startup; afterwards the
/// router is read-only and can be shared across threads without locking.
#[derive(Debug)]
pub struct Router<H> {
    root: Node<H>,
    /// Route name -> normalized pattern
    reverse: HashMap<String, String>,
    /// Every verb registered anywhere in the trie
    verbs: BTreeSet<String>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            reverse: HashMap::new(),
            verbs: BTreeSet::new(),
        }
    }
}

impl<H> Router<H> {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern` under every verb in `method`
    ///
    /// # Arguments
    /// * `pattern` - URL pattern with optional `{params}` and a trailing `*`
    /// * `method` - Comma-separated verbs; empty means `GET`
    /// * `handler` - Opaque handler value
    /// * `name` - Optional route name for [`Router::find_pattern`]
    ///
    /// Registering the same pattern and verb again replaces the handler.
    ///
    /// # Example
    /// ```
    /// use simpleapi_router::Router;
    ///
    /// let mut router = Router::new();
    /// router.add("/hello", "get,post", "hello", None);
    /// assert_eq!(*router.find_call("/hello/", "POST").unwrap().handler, "hello");
    /// ```
    pub fn add(&mut self, pattern: &str, method: &str, handler: H, name: Option<&str>)
    where
        H: Clone,
    {
        let pattern = normalize(pattern);

        let mut node = &mut self.root;
        for segment in segments(&pattern) {
            node = node.child_mut(segment);
        }

        for verb in verbs(method) {
            self.verbs.insert(verb.clone());
            node.handlers.insert(verb, handler.clone());
        }

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.reverse.insert(name.to_string(), pattern);
        }
    }

    /// Find the handler registered for `path` and `method`
    ///
    /// # Returns
    /// `Some(Match)` with the handler and captured params, or `None` if no
    /// route matches. There is no verb fallback: `HEAD` does not match a
    /// `GET` route.
    ///
    /// # Example
    /// ```
    /// use simpleapi_router::Router;
    ///
    /// let mut router = Router::new();
    /// router.add("/files/{dir}/*", "GET", 7, None);
    ///
    /// let m = router.find_call("/files/docs/a/b.txt", "get").unwrap();
    /// assert_eq!(*m.handler, 7);
    /// assert_eq!(m.params.by_name("dir"), "docs");
    /// assert_eq!(m.params.len(), 1);
    /// ```
    pub fn find_call(&self, path: &str, method: &str) -> Option<Match<'_, H>> {
        let method = method.to_uppercase();
        let path = normalize(path);
        let segments: Vec<&str> = segments(&path).collect();

        let mut params = Vec::new();
        Self::find_node(&self.root, &segments, &method, &mut params).map(|handler| Match {
            handler,
            params: Params(params),
        })
    }

    fn find_node<'r>(
        node: &'r Node<H>,
        segments: &[&str],
        method: &str,
        params: &mut Vec<Param>,
    ) -> Option<&'r H> {
        let Some((&segment, rest)) = segments.split_first() else {
            return node.handlers.get(method);
        };

        // Priority 1: literal
        if let Some(child) = node.literals.get(segment) {
            if let Some(handler) = Self::find_node(child, rest, method, params) {
                return Some(handler);
            }
        }

        // Priority 2: parameters, first registered first
        for (name, child) in &node.params {
            params.push(Param::new(name.as_str(), segment));
            if let Some(handler) = Self::find_node(child, rest, method, params) {
                return Some(handler);
            }
            params.pop();
        }

        // Priority 3: catch-all, remainder is not captured
        node.wildcard
            .as_ref()
            .and_then(|wildcard| wildcard.literals.get(""))
            .and_then(|terminal| terminal.handlers.get(method))
    }

    /// Check if `pattern` itself is registered for `method`
    ///
    /// Compares patterns, not paths: `/users/{id}` does not contain
    /// `/users/me`.
    ///
    /// # Example
    /// ```
    /// use simpleapi_router::Router;
    ///
    /// let mut router = Router::new();
    /// router.add("/users/{id}", "GET", 1, None);
    /// assert!(router.contains("/users/{id}/", "get"));
    /// assert!(!router.contains("/users/me", "GET"));
    /// assert!(!router.contains("/users/{id}", "POST"));
    /// ```
    pub fn contains(&self, pattern: &str, method: &str) -> bool {
        let pattern = normalize(pattern);
        let mut node = &self.root;
        for segment in segments(&pattern) {
            match node.child(segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        verbs(method).iter().all(|verb| node.handlers.contains_key(verb))
    }

    /// Normalized pattern registered under `name`, or `""` if unknown
    pub fn find_pattern(&self, name: &str) -> &str {
        self.reverse.get(name).map(String::as_str).unwrap_or("")
    }

    /// Check if a method has any routes registered
    pub fn has_method(&self, method: &str) -> bool {
        self.verbs.contains(&method.to_uppercase())
    }

    /// Get all registered methods, sorted
    pub fn methods(&self) -> Vec<String> {
        self.verbs.iter().cloned().collect()
    }
}

/// Append a trailing slash unless one is already present
pub fn normalize(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Split a normalized path into segments; the last one is always empty
fn segments(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .strip_prefix('/')
        .unwrap_or(normalized)
        .split('/')
}

/// Uppercased verbs of a method specifier, `GET` when none are given
fn verbs(method: &str) -> Vec<String> {
    let verbs: Vec<String> = method
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_uppercase)
        .collect();

    if verbs.is_empty() {
        vec![DEFAULT_METHOD.to_string()]
    } else {
        verbs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_methods_for_same_route() {
        let mut router = Router::new();
        router.add("/hello", "GET", "get_correct", None);
        router.add("/hello", "POST", "post_correct", None);
        router.add("/hello", "PUT", "put_correct", None);

        for path in ["/hello", "/hello/"] {
            assert_eq!(*router.find_call(path, "GET").unwrap().handler, "get_correct");
            assert_eq!(*router.find_call(path, "POST").unwrap().handler, "post_correct");
            assert_eq!(*router.find_call(path, "PUT").unwrap().handler, "put_correct");
            assert!(router.find_call(path, "DELETE").is_none());
        }
    }

    #[test]
    fn test_url_params() {
        let mut router = Router::new();
        router.add("/hello/{name}", "GET", "get_correct", None);
        router.add("/{a}/{b}/{c}", "GET", "abc_get_correct", None);

        let m = router.find_call("/hello/sattvik", "GET").unwrap();
        assert_eq!(*m.handler, "get_correct");
        assert_eq!(m.params.by_name("name"), "sattvik");
        assert_eq!(m.params.by_name("missing"), "");

        let m = router.find_call("/hello/sattvik/chakravarthy", "GET").unwrap();
        assert_eq!(*m.handler, "abc_get_correct");
        assert_eq!(
            m.params,
            Params::from(vec![
                Param::new("a", "hello"),
                Param::new("b", "sattvik"),
                Param::new("c", "chakravarthy"),
            ])
        );
        assert_eq!(m.params.by_name("d"), "");
    }

    #[test]
    fn test_empty_method_is_get() {
        let mut router = Router::new();
        router.add("/hello/{name}", "", "get_correct", None);
        router.add("/{a}/{b}/{c}", " , ", "abc_get_correct", None);

        let m = router.find_call("/hello/sattvik", "GET").unwrap();
        assert_eq!(*m.handler, "get_correct");
        assert_eq!(m.params.by_name("name"), "sattvik");

        let m = router.find_call("/x/y/z", "GET").unwrap();
        assert_eq!(*m.handler, "abc_get_correct");
        assert!(router.find_call("/hello/sattvik", "POST").is_none());
    }

    #[test]
    fn test_comma_separated_methods() {
        let mut router = Router::new();
        router.add("/items", "get, Post,put", 1, None);

        assert_eq!(*router.find_call("/items", "GET").unwrap().handler, 1);
        assert_eq!(*router.find_call("/items", "post").unwrap().handler, 1);
        assert_eq!(*router.find_call("/items", "PUT").unwrap().handler, 1);
        assert!(router.find_call("/items", "PATCH").is_none());
    }

    #[test]
    fn test_route_naming() {
        let mut router = Router::new();
        router.add("/hello/{name}", "", "get_correct", Some("hello"));
        router.add("/{a}/{b}/{c}", "", "abc_get_correct", Some("abc"));

        assert_eq!(router.find_pattern("hello"), "/hello/{name}/");
        assert_eq!(router.find_pattern("abc"), "/{a}/{b}/{c}/");
        assert_eq!(router.find_pattern("unknown"), "");
    }

    #[test]
    fn test_route_name_overwrite() {
        let mut router = Router::new();
        router.add("/old", "", 1, Some("page"));
        router.add("/new/", "", 2, Some("page"));

        assert_eq!(router.find_pattern("page"), "/new/");
    }

    #[test]
    fn test_catch_all_with_params() {
        let mut router = Router::new();
        router.add("/hello/{name}", "", "get_correct", Some("hello"));
        router.add("/{a}/{b}/{c}/*", "", "abc_get_correct", Some("abc"));

        let m = router.find_call("/hello/sattvik/c/extra/path", "GET").unwrap();
        assert_eq!(*m.handler, "abc_get_correct");
        assert_eq!(m.params.by_name("a"), "hello");
        assert_eq!(m.params.by_name("b"), "sattvik");
        assert_eq!(m.params.by_name("c"), "c");
        assert_eq!(m.params.len(), 3);
    }

    #[test]
    fn test_catch_all_requires_prefix() {
        let mut router = Router::new();
        router.add("/static/*", "", 1, None);

        assert_eq!(*router.find_call("/static/js/app.js", "GET").unwrap().handler, 1);
        assert_eq!(*router.find_call("/static/", "GET").unwrap().handler, 1);
        assert!(router.find_call("/other/app.js", "GET").is_none());
    }

    #[test]
    fn test_catch_all_not_at_end_never_matches() {
        let mut router = Router::new();
        router.add("/a/*/b", "", 1, None);

        assert!(router.find_call("/a/x/b", "GET").is_none());
    }

    #[test]
    fn test_priority_literal_over_param() {
        let mut router = Router::new();
        router.add("/users/{id}", "", 1, None);
        router.add("/users/me", "", 2, None);

        assert_eq!(*router.find_call("/users/me", "GET").unwrap().handler, 2);
        assert_eq!(*router.find_call("/users/123", "GET").unwrap().handler, 1);
    }

    #[test]
    fn test_failed_literal_falls_through_to_param() {
        let mut router = Router::new();
        router.add("/users/me/settings", "", 1, None);
        router.add("/users/{id}/posts", "", 2, None);

        let m = router.find_call("/users/me/posts", "GET").unwrap();
        assert_eq!(*m.handler, 2);
        assert_eq!(m.params.by_name("id"), "me");
    }

    #[test]
    fn test_priority_param_over_wildcard() {
        let mut router = Router::new();
        router.add("/api/{version}", "", 1, None);
        router.add("/api/*", "", 2, None);

        assert_eq!(*router.find_call("/api/v1", "GET").unwrap().handler, 1);
        let m = router.find_call("/api/v1/users", "GET").unwrap();
        assert_eq!(*m.handler, 2);
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_sibling_params_in_registration_order() {
        let mut router = Router::new();
        router.add("/{first}/x", "", 1, None);
        router.add("/{second}/y", "", 2, None);
        router.add("/{third}/y", "", 3, None);

        let m = router.find_call("/v/x", "GET").unwrap();
        assert_eq!(*m.handler, 1);
        assert_eq!(m.params.by_name("first"), "v");

        // "first" fails deeper, its capture is discarded
        let m = router.find_call("/v/y", "GET").unwrap();
        assert_eq!(*m.handler, 2);
        assert_eq!(m.params, Params::from(vec![Param::new("second", "v")]));
    }

    #[test]
    fn test_duplicate_param_names_first_wins() {
        let mut router = Router::new();
        router.add("/{id}/{id}", "", 1, None);

        let m = router.find_call("/outer/inner", "GET").unwrap();
        assert_eq!(m.params.len(), 2);
        assert_eq!(m.params.by_name("id"), "outer");
    }

    #[test]
    fn test_last_write_wins() {
        let mut router = Router::new();
        router.add("/hello", "GET", "first", None);
        router.add("/hello/", "GET", "second", None);

        assert_eq!(*router.find_call("/hello", "GET").unwrap().handler, "second");
    }

    #[test]
    fn test_verb_and_segment_do_not_collide() {
        let mut router = Router::new();
        router.add("/a", "GET", 1, None);
        router.add("/a/GET", "GET", 2, None);

        assert_eq!(*router.find_call("/a", "GET").unwrap().handler, 1);
        assert_eq!(*router.find_call("/a/GET", "GET").unwrap().handler, 2);
    }

    #[test]
    fn test_no_head_fallback() {
        let mut router = Router::new();
        router.add("/resource", "GET", 1, None);

        assert!(router.find_call("/resource", "HEAD").is_none());
        assert!(router.find_call("/resource", "OPTIONS").is_none());
    }

    #[test]
    fn test_root_path() {
        let mut router = Router::new();
        router.add("/", "", 0, None);
        router.add("/api", "", 1, None);

        assert_eq!(*router.find_call("/", "GET").unwrap().handler, 0);
        assert_eq!(*router.find_call("", "GET").unwrap().handler, 0);
        assert_eq!(*router.find_call("/api", "GET").unwrap().handler, 1);
        assert!(router.find_call("/missing", "GET").is_none());
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let mut router = Router::new();
        router.add("/{a}/{b}", "", 5, None);

        let first = router.find_call("/x/y", "GET").unwrap();
        let second = router.find_call("/x/y", "GET").unwrap();
        assert!(std::ptr::eq(first.handler, second.handler));
        assert_eq!(first.params, second.params);
    }

    #[test]
    fn test_methods() {
        let mut router = Router::new();
        router.add("/users", "GET", 1, None);
        router.add("/users", "POST", 2, None);
        router.add("/users/{id}", "delete", 3, None);

        assert!(router.has_method("GET"));
        assert!(router.has_method("post"));
        assert!(router.has_method("DELETE"));
        assert!(!router.has_method("PUT"));
        assert_eq!(router.methods(), vec!["DELETE", "GET", "POST"]);
    }

    #[test]
    fn test_contains() {
        let mut router = Router::new();
        router.add("/{page}", "GET", 1, None);
        router.add("/static/*", "GET,HEAD", 2, None);

        assert!(router.contains("/{page}", "GET"));
        assert!(!router.contains("/docs", "GET"));
        assert!(!router.contains("/{other}", "GET"));
        assert!(router.contains("/static/*", "get, head"));
        assert!(!router.contains("/static/*", "GET,POST"));
        assert!(!router.contains("/static", "GET"));
    }

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("*"), Segment::Wildcard);
        assert_eq!(Segment::parse("{id}"), Segment::Param("id"));
        assert_eq!(Segment::parse("users"), Segment::Literal("users"));
        assert_eq!(Segment::parse("{broken"), Segment::Literal("{broken"));
        assert_eq!(Segment::parse(""), Segment::Literal(""));
    }
}
