use crate::send::{BoxError, BoxStream};

use std::fmt;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;

/// The body a handler responds with.
///
/// Values are handed to the method's serializer, streams are copied into the
/// response as they are.
pub struct Payload {
    kind: PayloadKind,
}

pub(crate) enum PayloadKind {
    Value(Value),
    Stream(PayloadStream),
    Unserializable(serde_json::Error),
}

impl Payload {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            kind: PayloadKind::Value(value.into()),
        }
    }

    /// Convert a serializable value into a payload.
    ///
    /// If the conversion fails, the response fails like a serializer error
    /// would.
    pub fn json<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let kind = match serde_json::to_value(value) {
            Ok(value) => PayloadKind::Value(value),
            Err(err) => PayloadKind::Unserializable(err),
        };

        Self { kind }
    }

    pub fn stream(stream: PayloadStream) -> Self {
        Self {
            kind: PayloadKind::Stream(stream),
        }
    }

    /// Returns the value, if this payload holds one.
    pub fn as_value(&self) -> Option<&Value> {
        match &self.kind {
            PayloadKind::Value(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn into_kind(self) -> PayloadKind {
        self.kind
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::value(value)
    }
}

impl From<PayloadStream> for Payload {
    fn from(stream: PayloadStream) -> Self {
        Payload::stream(stream)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PayloadKind::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PayloadKind::Stream(_) => f.write_str("Stream"),
            PayloadKind::Unserializable(err) => f.debug_tuple("Unserializable").field(err).finish(),
        }
    }
}

pub(crate) type Release = Box<dyn FnOnce() -> Result<(), BoxError> + Send + Sync>;

/// A payload that is streamed into the response body.
///
/// An optional release hook runs once the whole stream has been written,
/// for example to close the file it reads from.
pub struct PayloadStream {
    stream: BoxStream<'static, Result<Bytes, BoxError>>,
    release: Option<Release>,
}

impl PayloadStream {
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            stream: Box::pin(stream.map(|chunk| -> Result<Bytes, BoxError> {
                chunk.map_err(Into::into)
            })),
            release: None,
        }
    }

    /// A stream of a single chunk.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        let chunk: Result<Bytes, BoxError> = Ok(bytes.into());
        Self::new(futures_util::stream::iter(Some(chunk)))
    }

    /// Run `release` after the stream has been fully written.
    pub fn on_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.release = Some(Box::new(release));
        self
    }

    pub(crate) fn into_parts(self) -> (BoxStream<'static, Result<Bytes, BoxError>>, Option<Release>) {
        (self.stream, self.release)
    }
}

impl fmt::Debug for PayloadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadStream")
            .field("release", &self.release.is_some())
            .finish()
    }
}

/// Respond with a serializable value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Override the content type of a single response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentType(pub String);

impl ContentType {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self(content_type.into())
    }
}

impl From<mime::Mime> for ContentType {
    fn from(mime: mime::Mime) -> Self {
        Self(mime.to_string())
    }
}
