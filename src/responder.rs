//! Error responders decide what to send back when a request fails.
//!
//! The returned value is serialized like any other payload, and it reaches the
//! client as-is, so responders should only expose safe data.

use crate::http::StatusCode;

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Builds the payload of an error response.
///
/// `error` is `None` when the cause should not be revealed, for example when
/// token validation failed internally.
pub trait ErrorResponder: Send + Sync {
    fn respond(&self, error: Option<&(dyn StdError + 'static)>, status: StatusCode) -> Value;
}

impl<F> ErrorResponder for F
where
    F: Fn(Option<&(dyn StdError + 'static)>, StatusCode) -> Value + Send + Sync,
{
    fn respond(&self, error: Option<&(dyn StdError + 'static)>, status: StatusCode) -> Value {
        self(error, status)
    }
}

/// The payload sent by [`GeneralErrorResponder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralStatus {
    pub success: bool,
    pub code: u16,
}

/// The default responder: `{"success": false, "code": <status>}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralErrorResponder;

impl ErrorResponder for GeneralErrorResponder {
    fn respond(&self, _: Option<&(dyn StdError + 'static)>, status: StatusCode) -> Value {
        serde_json::to_value(GeneralStatus {
            success: false,
            code: status.as_u16(),
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_status() {
        let value = GeneralErrorResponder.respond(None, StatusCode::UNAUTHORIZED);
        assert_eq!(value, serde_json::json!({ "success": false, "code": 401 }));
    }

    #[test]
    fn general_status_field_order() {
        let value = GeneralErrorResponder.respond(None, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"success":false,"code":400}"#
        );
    }
}
