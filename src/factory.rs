//! Building methods from handlers.

use crate::auth::TokenValidator;
use crate::extract::FormConfig;
use crate::handler::{Endpoint, Handler};
use crate::log::{Logger, TracingLogger};
use crate::method::Method;
use crate::param::ParamSpec;
use crate::responder::{ErrorResponder, GeneralErrorResponder};
use crate::serializer::{JsonSerializer, Serializer};
use crate::signature::{self, RegistrationError};

use std::sync::Arc;

use serde::Deserialize;

/// The content type of responses, unless a handler says otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Builds [`Method`]s that share the same collaborators.
///
/// ```
/// use fnapi::{Json, MethodFactory, ParamSpec};
///
/// async fn echo(text: String) -> Json<String> {
///     Json(text)
/// }
///
/// let method = MethodFactory::new().build("/echo", echo, false, vec![ParamSpec::string("text")]);
/// assert_eq!(method.path(), "/echo");
/// ```
#[derive(Clone)]
pub struct MethodFactory {
    logger: Arc<dyn Logger>,
    serializer: Arc<dyn Serializer>,
    content_type: String,
    error_responder: Arc<dyn ErrorResponder>,
    token_validator: Option<Arc<dyn TokenValidator>>,
    token_param: Option<String>,
    form: FormConfig,
}

impl MethodFactory {
    /// Create a factory with the default collaborators.
    pub fn new() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            serializer: Arc::new(JsonSerializer),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            error_responder: Arc::new(GeneralErrorResponder),
            token_validator: None,
            token_param: None,
            form: FormConfig::new(),
        }
    }

    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Set the default content type of responses.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn error_responder(mut self, responder: impl ErrorResponder + 'static) -> Self {
        self.error_responder = Arc::new(responder);
        self
    }

    /// Set the validator of bearer tokens, required by methods that need
    /// authentication.
    pub fn token_validator(mut self, validator: impl TokenValidator + 'static) -> Self {
        self.token_validator = Some(Arc::new(validator));
        self
    }

    /// Also accept the token from the named query or form value, when the
    /// `Authorization` header carries none.
    pub fn token_param(mut self, name: impl Into<String>) -> Self {
        self.token_param = Some(name.into());
        self
    }

    pub fn form_config(mut self, config: FormConfig) -> Self {
        self.form = config;
        self
    }

    /// Apply loaded settings. Unset settings keep their current value.
    pub fn with_config(mut self, config: &Config) -> Self {
        if let Some(content_type) = &config.content_type {
            self.content_type = content_type.clone();
        }

        if let Some(token_param) = &config.token_param {
            self.token_param = Some(token_param.clone());
        }

        if let Some(limit) = config.memory_limit {
            self.form = self.form.memory_limit(limit);
        }

        if let Some(limit) = config.body_limit {
            self.form = self.form.body_limit(limit);
        }

        self
    }

    /// Build a method, panicking through the logger if the definition is
    /// invalid.
    pub fn build<H, T>(&self, path: impl Into<String>, handler: H, auth: bool, params: Vec<ParamSpec>) -> Method
    where
        H: Handler<T>,
    {
        match self.try_build(path, handler, auth, params) {
            Ok(method) => method,
            Err(err) => self.logger.panic(&err.to_string()),
        }
    }

    /// Build a method, returning an error if the definition is invalid.
    pub fn try_build<H, T>(
        &self,
        path: impl Into<String>,
        handler: H,
        auth: bool,
        params: Vec<ParamSpec>,
    ) -> Result<Method, RegistrationError>
    where
        H: Handler<T>,
    {
        let path = path.into();
        let handler_name = std::any::type_name::<H>();
        let endpoint = handler.into_endpoint();
        let signature = endpoint.signature();

        signature::validate(&path, auth, &params, &signature)?;

        let token_validator = match (&self.token_validator, auth) {
            (None, true) => return Err(RegistrationError::MissingTokenValidator { path }),
            (validator, true) => validator.clone(),
            (_, false) => None,
        };

        Ok(Method {
            path,
            auth,
            params,
            signature,
            handler_name,
            endpoint: Box::new(endpoint) as Box<dyn Endpoint>,
            logger: self.logger.clone(),
            serializer: self.serializer.clone(),
            content_type: self.content_type.clone(),
            error_responder: self.error_responder.clone(),
            token_validator,
            token_param: self.token_param.clone(),
            form: self.form.clone(),
        })
    }
}

impl Default for MethodFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings of a [`MethodFactory`] that can be loaded from a file.
///
/// ```
/// use fnapi::{Config, MethodFactory};
///
/// let config: Config = serde_json::from_str(r#"{ "token_param": "token" }"#).unwrap();
/// let factory = MethodFactory::new().with_config(&config);
/// # drop(factory);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub content_type: Option<String>,
    pub token_param: Option<String>,
    pub memory_limit: Option<usize>,
    pub body_limit: Option<usize>,
}
