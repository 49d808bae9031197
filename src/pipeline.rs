//! Writing an [`Outcome`] out as a response.

use crate::http::{header, Body, HeaderMap, HeaderValue, Response, StatusCode};
use crate::log::Logger;
use crate::payload::{Payload, PayloadKind, PayloadStream, Release};
use crate::respond::Outcome;
use crate::responder::ErrorResponder;
use crate::send::{BoxError, BoxStream};
use crate::serializer::Serializer;

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use serde_json::Value;

/// Allow requests from any origin.
pub(crate) fn allow_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Accept, Content-Type, Content-Length, Accept-Encoding, Authorization"),
    );
}

/// The answer to a CORS preflight request.
pub(crate) fn preflight() -> Response {
    let mut response = Response::new(Body::empty());
    allow_cors(response.headers_mut());
    response
}

pub(crate) struct Pipeline<'a> {
    pub(crate) serializer: &'a dyn Serializer,
    pub(crate) responder: &'a dyn ErrorResponder,
    pub(crate) log: &'a Arc<dyn Logger>,
    pub(crate) content_type: &'a str,
}

impl Pipeline<'_> {
    /// Build the response for `outcome`, with the headers the handler set.
    pub(crate) fn emit(&self, outcome: Outcome, headers: HeaderMap) -> Response {
        let Outcome {
            payload,
            status,
            content_type,
            error,
        } = outcome;

        let (status, body) = match error {
            Some(error) => self.error(&*error, status),
            None => self.payload(payload, status),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status(status);

        let content_type = content_type.as_deref().unwrap_or(self.content_type);
        let response_headers = response.headers_mut();
        allow_cors(response_headers);

        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                response_headers.insert(header::CONTENT_TYPE, value);
            }
            Err(err) => self
                .log
                .warn_with_cause(&format!("Invalid content type: {:?}", content_type), &err),
        }

        response_headers.extend(headers);
        response
    }

    fn payload(&self, payload: Option<Payload>, status: Option<u16>) -> (Option<u16>, Body) {
        let value = match payload.map(Payload::into_kind) {
            Some(PayloadKind::Stream(stream)) => {
                return (Some(status.unwrap_or(200)), self.stream(stream));
            }
            Some(PayloadKind::Unserializable(err)) => return self.error(&err, status),
            Some(PayloadKind::Value(value)) => value,
            None => Value::Null,
        };

        match self.serializer.serialize(&value) {
            Ok(body) => {
                self.log.debug(&format!("Successful Response:\n{}", body));
                (Some(status.unwrap_or(200)), line(body))
            }
            Err(err) => self.error(&*err, status),
        }
    }

    fn error(&self, error: &(dyn std::error::Error + 'static), status: Option<u16>) -> (Option<u16>, Body) {
        self.log.error_with_cause("API Error", error);

        let status = status.unwrap_or(500);
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = self
            .serializer
            .serialize(&self.responder.respond(Some(error), code))
            .unwrap_or_default();

        (Some(status), line(body))
    }

    fn stream(&self, stream: PayloadStream) -> Body {
        let (stream, release) = stream.into_parts();

        Body::stream(Streamed {
            stream,
            release,
            log: self.log.clone(),
            done: false,
        })
    }

    fn status(&self, status: Option<u16>) -> StatusCode {
        let status = status.unwrap_or(200);

        StatusCode::from_u16(status).unwrap_or_else(|err| {
            self.log
                .error_with_cause(&format!("Invalid response status: {}", status), &err);
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

fn line(mut body: String) -> Body {
    body.push('\n');
    Body::from(body)
}

pin_project_lite::pin_project! {
    /// A payload stream that logs failures, and runs its release hook once
    /// fully written.
    struct Streamed {
        #[pin]
        stream: BoxStream<'static, Result<Bytes, BoxError>>,
        release: Option<Release>,
        log: Arc<dyn Logger>,
        done: bool,
    }
}

impl Stream for Streamed {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        match this.stream.poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                // the response is already partially written, end it here
                this.log.error_with_cause("Failed to stream the response", &*err);
                *this.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(None) => {
                *this.done = true;

                if let Some(release) = this.release.take() {
                    if let Err(err) = release() {
                        this.log.warn_with_cause(
                            "Error releasing a response stream, but the response still went out fine",
                            &*err,
                        );
                    }
                }

                Poll::Ready(None)
            }
        }
    }
}
