use std::collections::BTreeMap;

use formwork_core::Submission;

use crate::submission::decode;

/// HTTP method of the request being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Per-request inputs, passed explicitly instead of read from globals.
///
/// `session` is the caller's session store; it is read for the process
/// token and written when a new one is issued, and the caller persists it
/// between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Decoded query string.
    pub query: Submission,
    /// Decoded request body; empty for GET.
    pub body: Submission,
    pub session: BTreeMap<String, String>,
}

impl RequestContext {
    /// A GET request for `query`.
    #[must_use]
    pub fn get(query: &str, session: BTreeMap<String, String>) -> Self {
        Self {
            method: Method::Get,
            query: decode(query),
            body: Submission::new(),
            session,
        }
    }

    /// A POST of the urlencoded `body` to a URL with `query`.
    #[must_use]
    pub fn post(query: &str, body: &str, session: BTreeMap<String, String>) -> Self {
        Self {
            method: Method::Post,
            query: decode(query),
            body: decode(body),
            session,
        }
    }

    /// Scalar body value.
    #[must_use]
    pub fn posted(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(|v| v.as_text())
    }

    /// Scalar query value.
    #[must_use]
    pub fn queried(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(|v| v.as_text())
    }
}
