//! Bearer token authentication.

use crate::extract::{self, FormConfig};
use crate::http::{header, HeaderMap, Request, StatusCode};
use crate::log::Logger;
use crate::respond::Outcome;
use crate::responder::ErrorResponder;
use crate::send::BoxError;

use std::fmt;
use std::ops::Deref;

use async_trait::async_trait;

/// The bearer token of an authenticated request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Token(pub String);

/// The id of the authenticated user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserId(pub i64);

/// The name of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserName(pub String);

macro_rules! deref {
    ($($ty:ty => $target:ty),* $(,)?) => {$(
        impl Deref for $ty {
            type Target = $target;

            fn deref(&self) -> &$target {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    )*};
}

deref! {
    Token => str,
    UserId => i64,
    UserName => str,
}

/// The user a token belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: i64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }
}

/// The identity of the user making the current request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
}

/// Why a token was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("no token")]
    NoToken,
    #[error("bad token")]
    BadToken,
    #[error("token expired")]
    Expired,
}

/// The error returned by a [`TokenValidator`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The token is not valid. Answered with 401.
    #[error("token rejected: {0}")]
    Rejected(#[from] TokenRejection),
    /// The token could not be checked. Answered with 500.
    #[error("failed to validate token")]
    Internal(#[source] BoxError),
}

/// Resolves a bearer token to the user it belongs to.
///
/// Any `Fn(&str) -> Result<Identity, ValidationError>` is a validator:
///
/// ```
/// use fnapi::{Identity, MethodFactory, TokenRejection, ValidationError};
///
/// let factory = MethodFactory::new().token_validator(|token: &str| {
///     match token {
///         "secret" => Ok(Identity::new(7, "admin")),
///         _ => Err(ValidationError::Rejected(TokenRejection::BadToken)),
///     }
/// });
/// ```
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Identity, ValidationError>;
}

#[async_trait]
impl<F> TokenValidator for F
where
    F: Fn(&str) -> Result<Identity, ValidationError> + Send + Sync,
{
    async fn validate(&self, token: &str) -> Result<Identity, ValidationError> {
        self(token)
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// Surrounding whitespace and the `Bearer` marker are stripped, an empty
/// token counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer").unwrap_or(value).trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_owned())
}

/// Authenticates requests for a method that requires it.
pub(crate) struct AuthGate<'a> {
    pub(crate) validator: &'a dyn TokenValidator,
    pub(crate) responder: &'a dyn ErrorResponder,
    pub(crate) log: &'a dyn Logger,
    pub(crate) token_param: Option<&'a str>,
    pub(crate) form: &'a FormConfig,
}

impl AuthGate<'_> {
    /// Resolve the identity behind the request, or the outcome to answer with.
    pub(crate) async fn check(&self, req: &mut Request) -> Result<AuthContext, Outcome> {
        let token = match self.token(req).await {
            Some(token) => token,
            None => return Err(self.reject(TokenRejection::NoToken)),
        };

        match self.validator.validate(&token).await {
            Ok(identity) => Ok(AuthContext {
                token,
                user_id: identity.user_id,
                user_name: identity.user_name,
            }),
            Err(ValidationError::Rejected(reason)) => Err(self.reject(reason)),
            Err(err @ ValidationError::Internal(_)) => {
                self.log.warn_with_cause("Token validation failed", &err);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                Err(Outcome::rejection(self.responder.respond(None, status), status))
            }
        }
    }

    async fn token(&self, req: &mut Request) -> Option<String> {
        if let Some(token) = bearer_token(req.headers()) {
            return Some(token);
        }

        let name = self.token_param?;
        match extract::form(req, self.form).await {
            Ok(form) => form
                .value(name)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(ToOwned::to_owned),
            Err(err) => {
                self.log.warn_with_cause("Failed to read token parameter", &*err);
                None
            }
        }
    }

    fn reject(&self, reason: TokenRejection) -> Outcome {
        let status = StatusCode::UNAUTHORIZED;
        Outcome::rejection(self.responder.respond(Some(&reason), status), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HeaderName, HeaderValue};
    use rstest::rstest;

    #[rstest]
    #[case::basic("Authorization", "Bearer TOKEN", Some("TOKEN"))]
    #[case::bad_header("BadHeader", "Bearer TOKEN", None)]
    #[case::empty_value("Authorization", "", None)]
    #[case::empty_token("Authorization", "Bearer ", None)]
    #[case::whitespace_token("Authorization", "Bearer            ", None)]
    #[case::trim_token("Authorization", "     Bearer TOKEN    ", Some("TOKEN"))]
    #[case::spaced_token("Authorization", "Bearer T O K E N", Some("T O K E N"))]
    #[case::base64_token(
        "Authorization",
        "Bearer ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=",
        Some("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=")
    )]
    fn bearer(#[case] name: &'static str, #[case] value: &'static str, #[case] token: Option<&str>) {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static(value),
        );

        assert_eq!(bearer_token(&headers).as_deref(), token);
    }

    #[test]
    fn missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn closure_validator() {
        let validator = |token: &str| match token {
            "good" => Ok(Identity::new(7, "a")),
            _ => Err(ValidationError::Rejected(TokenRejection::BadToken)),
        };

        assert_eq!(validator.validate("good").await.unwrap(), Identity::new(7, "a"));
        assert!(matches!(
            validator.validate("bad").await,
            Err(ValidationError::Rejected(TokenRejection::BadToken))
        ));
    }
}
