//! Transport exchange types.
//!
//! The server loop is an external collaborator: it hands the entry
//! application a [`RawRequest`] and writes the returned [`Response`] to its
//! sink. Manifold itself never touches sockets or HTTP framing.

/// Raw transport input for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    /// Request method, used as the dispatch capability (e.g. `"GET"`).
    pub method: String,
    /// Request path.
    pub path: String,
    /// Request body, if any.
    pub body: Vec<u8>,
}

impl RawRequest {
    /// Create a raw request with an empty body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body: Vec::new(),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// The response handed back to the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
}

impl Response {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    /// A 404 response.
    pub fn not_found() -> Self {
        Self::with_status(404, "Not Found")
    }

    /// A 500 response.
    pub fn server_error() -> Self {
        Self::with_status(500, "Internal Server Error")
    }

    /// A response with an explicit status code.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response body.
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_constructors() {
        assert_eq!(Response::ok("hi").status(), 200);
        assert_eq!(Response::ok("hi").body(), "hi");
        assert_eq!(Response::not_found().status(), 404);
        assert_eq!(Response::server_error().status(), 500);
        assert_eq!(Response::with_status(204, "").status(), 204);
    }

    #[test]
    fn test_raw_request_builders() {
        let req = RawRequest::get("/items/1");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/items/1");
        assert!(req.body.is_empty());

        let req = RawRequest::post("/items").with_body("payload");
        assert_eq!(req.method, "POST");
        assert_eq!(req.body, b"payload");
    }
}
