use std::sync::{Arc, Mutex, PoisonError};

/// A request as the server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string, empty if there was none.
    pub query: String,
}

impl RecordedRequest {
    /// e.g. `/cars/?page=0&size=10&city=Warsaw`
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Every request received by one server, in arrival order.
///
/// Lets tests count how many requests a client really sent.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &str, path: &str, query: &str) {
        tracing::trace!(method, path, query, "request received");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method: method.to_string(),
                path: path.to_string(),
                query: query.to_string(),
            });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests with this method to this path, whatever their
    /// query.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn clear(&self) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
