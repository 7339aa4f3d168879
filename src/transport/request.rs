use serde_json::Value;

/// HTTP method of a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request issued by a component.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use widgetvisor::{Method, Request};
///
/// let req = Request::get("http://pulse/Machine/Status?MachineId=3")
///     .bust_cache("_", 1234);
/// assert_eq!(req.url, "http://pulse/Machine/Status?MachineId=3&_=1234");
///
/// let post = Request::post("http://pulse/Reason/Save", json!({"id": 1}));
/// assert_eq!(post.method, Method::Post);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// JSON body (POST only).
    pub body: Option<Value>,
    /// Extra headers, in insertion order.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// A GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// A POST request with a JSON body.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    #[inline]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends `param=value` to the query string so that caches are skipped.
    pub fn bust_cache(mut self, param: &str, value: impl std::fmt::Display) -> Self {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        self.url = format!("{}{sep}{param}={value}", self.url);
        self
    }
}
