//! Handler return values, and how they fold into an [`Outcome`].

use crate::http::StatusCode;
use crate::log::Logger;
use crate::payload::{ContentType, Json, Payload, PayloadStream};
use crate::send::BoxError;
use crate::signature::Role;

use serde::Serialize;
use serde_json::Value;

/// The result of handling a request, before it is written out.
///
/// Every part is optional: the status defaults to 200, or 500 when `error` is
/// set, and the content type defaults to the method's.
///
/// Handlers may return an `Outcome` directly, which declares all four roles.
#[derive(Debug, Default)]
pub struct Outcome {
    pub payload: Option<Payload>,
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub error: Option<BoxError>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn error(mut self, error: impl Into<BoxError>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// An early answer built from the error responder's output.
    pub(crate) fn rejection(payload: Value, status: StatusCode) -> Self {
        Self::new().payload(payload).status(status)
    }
}

/// A single value returned by a handler.
#[derive(Debug)]
pub enum ReturnValue {
    Payload(Option<Payload>),
    /// `0` leaves the status unset.
    Status(u16),
    /// An empty string leaves the content type unset.
    ContentType(String),
    Error(Option<BoxError>),
}

impl ReturnValue {
    pub fn role(&self) -> Role {
        match self {
            ReturnValue::Payload(_) => Role::Payload,
            ReturnValue::Status(_) => Role::Status,
            ReturnValue::ContentType(_) => Role::ContentType,
            ReturnValue::Error(_) => Role::Error,
        }
    }
}

/// The values returned by one handler call, in declaration order.
#[derive(Debug, Default)]
pub struct Returns(pub Vec<ReturnValue>);

impl IntoIterator for Returns {
    type Item = ReturnValue;
    type IntoIter = std::vec::IntoIter<ReturnValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A type a handler can return as one of its values.
pub trait IntoReturn {
    const ROLE: Role;

    fn into_return(self) -> ReturnValue;
}

/// The full return type of a handler.
///
/// Implemented for `()`, every [`IntoReturn`] type, tuples of up to four of
/// them, [`Outcome`], and `Result<T, E>` where `T` is itself a return type.
pub trait IntoReturns {
    /// The roles of the returned values, in order.
    fn roles() -> Vec<Role>;

    fn into_returns(self) -> Returns;
}

impl IntoReturn for Payload {
    const ROLE: Role = Role::Payload;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Payload(Some(self))
    }
}

impl IntoReturn for Option<Payload> {
    const ROLE: Role = Role::Payload;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Payload(self)
    }
}

impl IntoReturn for PayloadStream {
    const ROLE: Role = Role::Payload;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Payload(Some(Payload::stream(self)))
    }
}

impl IntoReturn for Value {
    const ROLE: Role = Role::Payload;

    fn into_return(self) -> ReturnValue {
        match self {
            Value::Null => ReturnValue::Payload(None),
            value => ReturnValue::Payload(Some(Payload::value(value))),
        }
    }
}

impl<T> IntoReturn for Json<T>
where
    T: Serialize,
{
    const ROLE: Role = Role::Payload;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Payload(Some(Payload::json(&self.0)))
    }
}

impl IntoReturn for u16 {
    const ROLE: Role = Role::Status;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Status(self)
    }
}

impl IntoReturn for StatusCode {
    const ROLE: Role = Role::Status;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Status(self.as_u16())
    }
}

impl IntoReturn for ContentType {
    const ROLE: Role = Role::ContentType;

    fn into_return(self) -> ReturnValue {
        ReturnValue::ContentType(self.0)
    }
}

impl IntoReturn for mime::Mime {
    const ROLE: Role = Role::ContentType;

    fn into_return(self) -> ReturnValue {
        ReturnValue::ContentType(self.to_string())
    }
}

impl IntoReturn for Option<BoxError> {
    const ROLE: Role = Role::Error;

    fn into_return(self) -> ReturnValue {
        ReturnValue::Error(self)
    }
}

impl IntoReturns for () {
    fn roles() -> Vec<Role> {
        Vec::new()
    }

    fn into_returns(self) -> Returns {
        Returns::default()
    }
}

macro_rules! single_return {
    ($($ty:ty),* $(,)?) => {$(
        impl IntoReturns for $ty {
            fn roles() -> Vec<Role> {
                vec![<$ty as IntoReturn>::ROLE]
            }

            fn into_returns(self) -> Returns {
                Returns(vec![self.into_return()])
            }
        }
    )*};
}

single_return! {
    Payload,
    Option<Payload>,
    PayloadStream,
    Value,
    u16,
    StatusCode,
    ContentType,
    mime::Mime,
    Option<BoxError>,
}

impl<T> IntoReturns for Json<T>
where
    T: Serialize,
{
    fn roles() -> Vec<Role> {
        vec![Role::Payload]
    }

    fn into_returns(self) -> Returns {
        Returns(vec![self.into_return()])
    }
}

macro_rules! tuple_return {
    ($($ty:ident),*) => {
        impl<$($ty,)*> IntoReturns for ($($ty,)*)
        where
            $($ty: IntoReturn,)*
        {
            fn roles() -> Vec<Role> {
                vec![$($ty::ROLE),*]
            }

            #[allow(non_snake_case)]
            fn into_returns(self) -> Returns {
                let ($($ty,)*) = self;
                Returns(vec![$($ty.into_return()),*])
            }
        }
    };
}

tuple_return!(A);
tuple_return!(A, B);
tuple_return!(A, B, C);
tuple_return!(A, B, C, D);

impl IntoReturns for Outcome {
    fn roles() -> Vec<Role> {
        vec![Role::Payload, Role::Status, Role::ContentType, Role::Error]
    }

    fn into_returns(self) -> Returns {
        Returns(vec![
            ReturnValue::Payload(self.payload),
            ReturnValue::Status(self.status.unwrap_or(0)),
            ReturnValue::ContentType(self.content_type.unwrap_or_default()),
            ReturnValue::Error(self.error),
        ])
    }
}

/// `Ok` values return as `T` does, errors fill the error role.
impl<T, E> IntoReturns for Result<T, E>
where
    T: IntoReturns,
    E: Into<BoxError>,
{
    fn roles() -> Vec<Role> {
        let mut roles = T::roles();
        roles.push(Role::Error);
        roles
    }

    fn into_returns(self) -> Returns {
        match self {
            Ok(ok) => {
                let mut returns = ok.into_returns();
                returns.0.push(ReturnValue::Error(None));
                returns
            }
            Err(err) => Returns(vec![ReturnValue::Error(Some(err.into()))]),
        }
    }
}

/// Fold returned values into an [`Outcome`].
///
/// `declared` holds the roles validated at registration, a value with any
/// other role is a fault in the handler's signature.
pub(crate) fn interpret(returns: Returns, declared: &[Role], path: &str, log: &dyn Logger) -> Outcome {
    let mut outcome = Outcome::new();

    for value in returns {
        let role = value.role();
        if !declared.contains(&role) {
            log.fatal(&format!(
                "Unknown return value ({}) for API handler for path: {}",
                role, path
            ));
        }

        match value {
            ReturnValue::Payload(payload) => outcome.payload = payload,
            ReturnValue::Status(0) => {}
            ReturnValue::Status(status) => outcome.status = Some(status),
            ReturnValue::ContentType(content_type) if content_type.is_empty() => {}
            ReturnValue::ContentType(content_type) => outcome.content_type = Some(content_type),
            ReturnValue::Error(error) => outcome.error = error,
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::TracingLogger;

    fn roles<R: IntoReturns>() -> Vec<Role> {
        R::roles()
    }

    #[test]
    fn tuple_roles() {
        assert_eq!(roles::<()>(), vec![]);
        assert_eq!(roles::<(Json<u8>, u16)>(), vec![Role::Payload, Role::Status]);
        assert_eq!(
            roles::<(Option<BoxError>, StatusCode, Value)>(),
            vec![Role::Error, Role::Status, Role::Payload]
        );
        assert_eq!(
            roles::<Result<(Value, ContentType), std::io::Error>>(),
            vec![Role::Payload, Role::ContentType, Role::Error]
        );
        assert_eq!(roles::<(u16, StatusCode)>(), vec![Role::Status, Role::Status]);
    }

    #[test]
    fn fold_all_roles() {
        let returns = (
            Json(vec![1, 2, 3]),
            StatusCode::CREATED,
            ContentType::new("text/csv"),
            None::<BoxError>,
        )
            .into_returns();

        let outcome = interpret(
            returns,
            &roles::<(Json<Vec<u8>>, StatusCode, ContentType, Option<BoxError>)>(),
            "/p",
            &TracingLogger,
        );

        assert_eq!(
            outcome.payload.as_ref().and_then(Payload::as_value),
            Some(&serde_json::json!([1, 2, 3]))
        );
        assert_eq!(outcome.status, Some(201));
        assert_eq!(outcome.content_type.as_deref(), Some("text/csv"));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn unset_values() {
        let returns = (Value::Null, 0u16, ContentType::default()).into_returns();
        let outcome = interpret(
            returns,
            &[Role::Payload, Role::Status, Role::ContentType],
            "/p",
            &TracingLogger,
        );

        assert!(outcome.payload.is_none());
        assert!(outcome.status.is_none());
        assert!(outcome.content_type.is_none());
    }

    #[test]
    fn result_error() {
        let result: Result<Json<u8>, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let outcome = interpret(
            result.into_returns(),
            &[Role::Payload, Role::Error],
            "/p",
            &TracingLogger,
        );

        assert!(outcome.payload.is_none());
        assert_eq!(outcome.error.unwrap().to_string(), "boom");
    }
}
