//! HTTP types used by methods.

mod body;
mod raw;

pub use body::{Body, BodyError};
pub use bytes::Bytes;
pub use raw::{RawRequest, ResponseWriter};

pub use ::http::header::HeaderName;
pub use ::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri, Version};

/// An HTTP request.
pub type Request = ::http::Request<Body>;

/// An HTTP response.
pub type Response = ::http::Response<Body>;
