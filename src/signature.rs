//! Handler signatures, and the checks run against them when a method is
//! registered.
//!
//! Every check happens once, before the method serves any request, so the
//! binder and the return interpreter can assume a well-formed shape.

use crate::param::{ParamKind, ParamSpec};

use std::collections::HashSet;
use std::fmt;

/// The maximum number of values a handler may return.
pub const MAX_RETURNS: usize = 4;

/// The declared type of a single handler parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The bearer token of the request.
    Token,
    /// The id of the authenticated user.
    UserId,
    /// The name of the authenticated user.
    UserName,
    /// The raw request head.
    Request,
    /// The response header handle.
    Response,
    Int,
    String,
    File,
}

impl Slot {
    /// The declared parameter kind this slot consumes, or `None` for
    /// implicit slots.
    pub fn kind(self) -> Option<ParamKind> {
        match self {
            Slot::Int => Some(ParamKind::Int),
            Slot::String => Some(ParamKind::String),
            Slot::File => Some(ParamKind::File),
            Slot::Token | Slot::UserId | Slot::UserName | Slot::Request | Slot::Response => None,
        }
    }

    pub fn is_implicit(self) -> bool {
        self.kind().is_none()
    }

    /// Whether the slot carries the identity of an authenticated user.
    pub fn is_identity(self) -> bool {
        matches!(self, Slot::Token | Slot::UserId | Slot::UserName)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Token => "token",
            Slot::UserId => "user id",
            Slot::UserName => "user name",
            Slot::Request => "request",
            Slot::Response => "response writer",
            Slot::Int => "int",
            Slot::String => "string",
            Slot::File => "File",
        })
    }
}

/// The meaning of a value returned by a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Payload,
    Status,
    ContentType,
    Error,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Payload => "payload",
            Role::Status => "status",
            Role::ContentType => "content type",
            Role::Error => "error",
        })
    }
}

/// The parameter and return shape of a handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Slot>,
    pub returns: Vec<Role>,
}

impl Signature {
    pub fn new(params: Vec<Slot>, returns: Vec<Role>) -> Self {
        Self { params, returns }
    }

    fn implicit_count(&self) -> usize {
        self.params.iter().filter(|slot| slot.is_implicit()).count()
    }
}

/// A method definition that cannot be served.
///
/// These are programming mistakes, reported when the method is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("bad path for API handler")]
    EmptyPath,
    #[error("empty name for param of API handler ({path})")]
    EmptyParamName { path: String },
    #[error("param ({name}) of API handler ({path}) is declared more than once")]
    DuplicateParam { path: String, name: String },
    #[error("API handler ({path}) requested a {slot} without authentication: special identity parameters require authentication")]
    IdentityWithoutAuth { path: String, slot: Slot },
    #[error("API handler ({path}) actually expects {actual} parameters, but is defined to expect {expected} ({declared} defined, {implicit} implicit)")]
    Arity {
        path: String,
        actual: usize,
        expected: usize,
        declared: usize,
        implicit: usize,
    },
    #[error("API handler ({path}) takes a {actual} where param ({name}) is declared as {expected}")]
    KindMismatch {
        path: String,
        name: String,
        expected: ParamKind,
        actual: Slot,
    },
    #[error("API handler ({path}) has too many return values, got {count}, maximum is 4")]
    TooManyReturns { path: String, count: usize },
    #[error("API handler ({path}) has duplicate return values ({role}), each role may be returned once")]
    DuplicateReturn { path: String, role: Role },
    #[error("API method ({path}) expects authentication, but no token validator has been set")]
    MissingTokenValidator { path: String },
}

/// Check a handler's signature against the declared parameters.
pub(crate) fn validate(
    path: &str,
    auth: bool,
    params: &[ParamSpec],
    signature: &Signature,
) -> Result<(), RegistrationError> {
    if path.is_empty() {
        return Err(RegistrationError::EmptyPath);
    }

    let mut names = HashSet::with_capacity(params.len());
    for param in params {
        if param.name.is_empty() {
            return Err(RegistrationError::EmptyParamName { path: path.into() });
        }

        if !names.insert(param.name.as_str()) {
            return Err(RegistrationError::DuplicateParam {
                path: path.into(),
                name: param.name.clone(),
            });
        }
    }

    if let Some(slot) = signature.params.iter().find(|slot| slot.is_identity()) {
        if !auth {
            return Err(RegistrationError::IdentityWithoutAuth {
                path: path.into(),
                slot: *slot,
            });
        }
    }

    let implicit = signature.implicit_count();
    if signature.params.len() != params.len() + implicit {
        return Err(RegistrationError::Arity {
            path: path.into(),
            actual: signature.params.len(),
            expected: params.len() + implicit,
            declared: params.len(),
            implicit,
        });
    }

    let explicit = signature.params.iter().filter_map(|slot| slot.kind().map(|kind| (slot, kind)));
    for ((slot, kind), param) in explicit.zip(params) {
        if kind != param.kind {
            return Err(RegistrationError::KindMismatch {
                path: path.into(),
                name: param.name.clone(),
                expected: param.kind,
                actual: *slot,
            });
        }
    }

    if signature.returns.len() > MAX_RETURNS {
        return Err(RegistrationError::TooManyReturns {
            path: path.into(),
            count: signature.returns.len(),
        });
    }

    let mut seen = HashSet::with_capacity(signature.returns.len());
    for role in &signature.returns {
        if !seen.insert(*role) {
            return Err(RegistrationError::DuplicateReturn {
                path: path.into(),
                role: *role,
            });
        }
    }

    Ok(())
}
