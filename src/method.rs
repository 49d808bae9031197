//! A registered API method.

use crate::auth::{AuthContext, AuthGate, TokenValidator};
use crate::extract::{self, Binder, FormConfig};
use crate::handler::{Args, Endpoint};
use crate::http::{self, Request, Response, ResponseWriter, StatusCode};
use crate::log::Logger;
use crate::param::ParamSpec;
use crate::pipeline::{self, Pipeline};
use crate::respond::{self, Outcome};
use crate::responder::ErrorResponder;
use crate::serializer::Serializer;
use crate::signature::Signature;

use std::fmt;
use std::sync::Arc;

/// A handler with its path, parameters and collaborators.
///
/// Methods are built by a [`MethodFactory`](crate::MethodFactory) and are
/// immutable afterwards, share one in an `Arc` to serve requests concurrently.
pub struct Method {
    pub(crate) path: String,
    pub(crate) auth: bool,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) signature: Signature,
    pub(crate) handler_name: &'static str,
    pub(crate) endpoint: Box<dyn Endpoint>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) serializer: Arc<dyn Serializer>,
    pub(crate) content_type: String,
    pub(crate) error_responder: Arc<dyn ErrorResponder>,
    pub(crate) token_validator: Option<Arc<dyn TokenValidator>>,
    pub(crate) token_param: Option<String>,
    pub(crate) form: FormConfig,
}

impl Method {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth_required(&self) -> bool {
        self.auth
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The type name of the handler.
    pub fn handler_name(&self) -> &str {
        self.handler_name
    }

    /// Handle a request.
    ///
    /// Never fails: authentication, binding and handler errors all become
    /// responses built by the error responder.
    pub async fn serve(&self, mut req: Request) -> Response {
        if req.method() == http::Method::OPTIONS {
            return pipeline::preflight();
        }

        self.logger.debug(&req.uri().to_string());

        extract::setup(&mut req);
        let writer = ResponseWriter::new();
        let outcome = self.dispatch(&mut req, &writer).await;

        let pipeline = Pipeline {
            serializer: &*self.serializer,
            responder: &*self.error_responder,
            log: &self.logger,
            content_type: &self.content_type,
        };

        pipeline.emit(outcome, writer.take_headers())
    }

    async fn dispatch(&self, req: &mut Request, writer: &ResponseWriter) -> Outcome {
        let auth = match &self.token_validator {
            Some(validator) => {
                let gate = AuthGate {
                    validator: &**validator,
                    responder: &*self.error_responder,
                    log: &*self.logger,
                    token_param: self.token_param.as_deref(),
                    form: &self.form,
                };

                match gate.check(req).await {
                    Ok(auth) => auth,
                    Err(rejection) => return rejection,
                }
            }
            None => AuthContext::default(),
        };

        let binder = Binder {
            slots: &self.signature.params,
            params: &self.params,
            form: &self.form,
            log: &*self.logger,
        };

        let args = match binder.bind(req, auth, writer).await {
            Ok(args) => args,
            Err(err) => {
                let status = StatusCode::BAD_REQUEST;
                return Outcome::rejection(self.error_responder.respond(Some(&err), status), status);
            }
        };

        match self.endpoint.call(Args::new(args)).await {
            Ok(returns) => respond::interpret(returns, &self.signature.returns, &self.path, &*self.logger),
            Err(mismatch) => Outcome::new().error(mismatch),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path)?;
        writeln!(f, "   Authentication Required: {}", self.auth)?;

        if self.params.is_empty() {
            writeln!(f, "   Params: None")?;
        } else {
            writeln!(f, "   Params:")?;
            for param in &self.params {
                writeln!(f, "      {}", param)?;
            }
        }

        write!(f, "   Handler: {}", self.handler_name)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("path", &self.path)
            .field("auth", &self.auth)
            .field("params", &self.params)
            .field("signature", &self.signature)
            .field("handler", &self.handler_name)
            .finish_non_exhaustive()
    }
}
