use super::form::{form, query, Form, FormConfig, FormError};
use super::File;
use crate::auth::{AuthContext, Token, UserId, UserName};
use crate::handler::Arg;
use crate::http::{RawRequest, Request, ResponseWriter};
use crate::log::Logger;
use crate::param::{ParamKind, ParamSpec};
use crate::signature::Slot;

use std::num::ParseIntError;
use std::sync::Arc;

/// The error returned when a request does not carry a declared parameter.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("missing required parameter `{0}`")]
    Missing(String),
    #[error("missing required file `{0}`")]
    MissingFile(String),
    #[error("parameter `{name}` is not an integer: {raw:?}")]
    NotAnInt {
        name: String,
        raw: String,
        #[source]
        source: ParseIntError,
    },
    #[error("failed to parse form for parameter `{name}`")]
    Form {
        name: String,
        #[source]
        source: Arc<FormError>,
    },
}

/// Builds the positional argument list of a handler.
pub(crate) struct Binder<'a> {
    pub(crate) slots: &'a [Slot],
    pub(crate) params: &'a [ParamSpec],
    pub(crate) form: &'a FormConfig,
    pub(crate) log: &'a dyn Logger,
}

impl Binder<'_> {
    pub(crate) async fn bind(
        &self,
        req: &mut Request,
        auth: AuthContext,
        writer: &ResponseWriter,
    ) -> Result<Vec<Arg>, BindError> {
        let mut args = Vec::with_capacity(self.slots.len());
        let mut params = self.params.iter();
        let mut form_cache: Option<Arc<Form>> = None;

        for slot in self.slots {
            let arg = match slot {
                Slot::Token => Arg::Token(Token(auth.token.clone())),
                Slot::UserId => Arg::UserId(UserId(auth.user_id)),
                Slot::UserName => Arg::UserName(UserName(auth.user_name.clone())),
                Slot::Request => Arg::Request(RawRequest::from_request(req)),
                Slot::Response => Arg::Response(writer.clone()),
                Slot::Int | Slot::String | Slot::File => {
                    // registration guarantees one declared parameter per explicit slot
                    let spec = match params.next() {
                        Some(spec) => spec,
                        None => break,
                    };

                    let form = match &form_cache {
                        Some(form) => form.clone(),
                        None => {
                            let parsed = self.parse_form(req, spec).await?;
                            form_cache = Some(parsed.clone());
                            parsed
                        }
                    };

                    self.explicit(&form, spec)?
                }
            };

            args.push(arg);
        }

        Ok(args)
    }

    /// The request's form, or only its query values when the body is malformed.
    async fn parse_form(&self, req: &mut Request, spec: &ParamSpec) -> Result<Arc<Form>, BindError> {
        let err = match form(req, self.form).await {
            Ok(form) => return Ok(form),
            Err(err) => err,
        };

        self.log
            .warn_with_cause("Failed to parse request body, using query values only", &*err);

        query(req.uri()).map(Arc::new).map_err(|_| BindError::Form {
            name: spec.name.clone(),
            source: err,
        })
    }

    fn explicit(&self, form: &Form, spec: &ParamSpec) -> Result<Arg, BindError> {
        match spec.kind {
            ParamKind::File => match form.file(&spec.name) {
                Some(file) => Ok(Arg::File(file)),
                None if spec.required => {
                    self.log
                        .warn(&format!("Missing required file parameter {}", spec.name));
                    Err(BindError::MissingFile(spec.name.clone()))
                }
                None => Ok(Arg::File(File::none())),
            },
            ParamKind::String => {
                let value = self.value(form, spec)?;
                Ok(Arg::String(value.to_owned()))
            }
            ParamKind::Int => {
                let raw = self.value(form, spec)?;

                if raw.is_empty() {
                    return Ok(Arg::Int(0));
                }

                raw.parse::<i64>().map(Arg::Int).map_err(|err| {
                    self.log.warn_with_cause(
                        &format!("Parameter {} is not an integer: {:?}", spec.name, raw),
                        &err,
                    );

                    BindError::NotAnInt {
                        name: spec.name.clone(),
                        raw: raw.to_owned(),
                        source: err,
                    }
                })
            }
        }
    }

    /// The trimmed value of a text parameter, empty when optional and missing.
    fn value<'f>(&self, form: &'f Form, spec: &ParamSpec) -> Result<&'f str, BindError> {
        let value = form.value(&spec.name).map(str::trim).unwrap_or_default();

        if value.is_empty() && spec.required {
            self.log
                .warn(&format!("Missing required parameter {}", spec.name));
            return Err(BindError::Missing(spec.name.clone()));
        }

        Ok(value)
    }
}
