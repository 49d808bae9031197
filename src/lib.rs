//! Expose plain async functions as HTTP API methods.
//!
//! A [`Method`] wraps a handler function together with its path, whether it
//! needs authentication, and the query or form parameters it takes. The
//! handler's argument and return types describe how requests are bound to it
//! and how its results are written out.
//!
//! ```
//! use fnapi::http::{Body, Request, StatusCode};
//! use fnapi::{Json, MethodFactory, ParamSpec};
//!
//! async fn add(a: i64, b: i64) -> (Json<i64>, StatusCode) {
//!     (Json(a + b), StatusCode::ACCEPTED)
//! }
//!
//! # async fn run() {
//! let method = MethodFactory::new().build(
//!     "/add",
//!     add,
//!     false,
//!     vec![ParamSpec::int("a").required(), ParamSpec::int("b")],
//! );
//!
//! let mut req = Request::new(Body::empty());
//! *req.uri_mut() = "/add?a=1&b=2".parse().unwrap();
//!
//! let res = method.serve(req).await;
//! assert_eq!(res.status(), StatusCode::ACCEPTED);
//! # }
//! ```

mod auth;
mod extract;
mod factory;
mod handler;
mod log;
mod method;
mod param;
mod payload;
mod pipeline;
mod respond;
mod responder;
mod send;
mod serializer;
mod signature;

pub mod http;

pub use async_trait::async_trait;
pub use auth::{
    bearer_token, AuthContext, Identity, Token, TokenRejection, TokenValidator, UserId, UserName,
    ValidationError,
};
pub use extract::{BindError, File, FileError, Form, FormConfig, FormError, FORM_BODY_LIMIT, MULTIPART_MEMORY_LIMIT};
pub use factory::{Config, MethodFactory, DEFAULT_CONTENT_TYPE};
pub use handler::{Arg, ArgMismatch, Args, Endpoint, FnEndpoint, FromArg, Handler, Manual};
pub use log::{Logger, TracingLogger};
pub use method::Method;
pub use param::{ParamKind, ParamSpec};
pub use payload::{ContentType, Json, Payload, PayloadStream};
pub use respond::{IntoReturn, IntoReturns, Outcome, ReturnValue, Returns};
pub use responder::{ErrorResponder, GeneralErrorResponder, GeneralStatus};
pub use send::{BoxError, BoxFuture, BoxStream};
pub use serializer::{JsonSerializer, Serializer};
pub use signature::{RegistrationError, Role, Signature, Slot, MAX_RETURNS};
