//! Response written by a handler chain

use bytes::Bytes;
use smallvec::SmallVec;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Reason phrase for the codes this crate answers with
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: SmallVec<[(String, String); 8]>,
    pub body: Bytes,
}

impl Response {
    /// Empty response with `status`
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: SmallVec::new(),
            body: Bytes::new(),
        }
    }

    /// Response carrying `body` as `content_type`
    pub fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut res = Self::new(status);
        res.write(status, content_type, body);
        res
    }

    pub fn not_found() -> Self {
        Self::with_body(StatusCode::NOT_FOUND, TEXT_PLAIN, "Not Found")
    }

    pub fn bad_request(message: &str) -> Self {
        Self::with_body(StatusCode::BAD_REQUEST, TEXT_PLAIN, message.to_string())
    }

    pub fn internal_error(message: &str) -> Self {
        Self::with_body(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, message.to_string())
    }

    /// Replace status, content type and body, keeping other headers
    pub fn write(&mut self, status: StatusCode, content_type: &str, body: impl Into<Bytes>) {
        self.status = status;
        self.set_header("content-type", content_type);
        self.body = body.into();
    }

    /// Header value, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value of the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as a string, if it is UTF-8
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(!StatusCode::NOT_FOUND.is_server_error());
        assert_eq!(StatusCode::from(404).to_string(), "404 Not Found");
        assert_eq!(StatusCode(418).reason_phrase(), "Unknown");
    }

    #[test]
    fn test_error_responses() {
        let res = Response::bad_request("bad page");
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.content_type(), Some(TEXT_PLAIN));
        assert_eq!(res.body_string().as_deref(), Some("bad page"));

        assert_eq!(Response::not_found().body_string().as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_write_keeps_other_headers() {
        let mut res = Response::default();
        res.set_header("Access-Control-Allow-Origin", "*");
        res.set_header("Content-Type", "text/html");
        res.write(StatusCode::CREATED, "application/json", "{}");

        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.content_type(), Some("application/json"));
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        assert_eq!(res.headers.len(), 2);
    }
}
