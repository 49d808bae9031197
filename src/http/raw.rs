use super::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version};

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A snapshot of the request head, handed to handlers that ask for it.
///
/// The body is not included, it is consumed while binding parameters.
#[derive(Clone, Debug)]
pub struct RawRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

impl RawRequest {
    pub(crate) fn from_request(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
            headers: req.headers().clone(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of the header `name`, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A handle to the headers of the response being built.
///
/// Headers set here are applied after the method's own headers, so they take
/// precedence over them.
#[derive(Clone, Debug, Default)]
pub struct ResponseWriter {
    headers: Arc<Mutex<HeaderMap>>,
}

impl ResponseWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any previous values.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().insert(name, value);
    }

    /// Add a header value, keeping any previous values.
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().append(name, value);
    }

    pub(crate) fn take_headers(&self) -> HeaderMap {
        mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, HeaderMap> {
        self.headers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
