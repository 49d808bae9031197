use crate::send::{BoxError, BoxStream};

use std::pin::Pin;
use std::task::{Context, Poll};
use std::{fmt, mem};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;

/// Respresents the body of an HTTP message.
pub struct Body {
    kind: BodyKind,
}

enum BodyKind {
    Stream(BoxStream<'static, Result<Bytes, BoxError>>),
    Once(Bytes),
    Empty,
}

pin_project_lite::pin_project! {
    struct MapErr<S> {
        #[pin]
        stream: S,
    }
}

impl<S, E> Stream for MapErr<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    type Item = Result<Bytes, BoxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project()
            .stream
            .poll_next(cx)
            .map(|item| item.map(|chunk| chunk.map_err(Into::into)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

impl Body {
    /// Create a `Body` from a stream of bytes.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Body {
            kind: BodyKind::Stream(Box::pin(MapErr { stream })),
        }
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Body {
            kind: BodyKind::Once(bytes.into()),
        }
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Body {
            kind: BodyKind::Empty,
        }
    }

    /// Take the body out, leaving an empty one in its place.
    pub fn take(&mut self) -> Body {
        mem::take(self)
    }

    /// Read the whole body into memory.
    ///
    /// Fails as soon as more than `limit` bytes have been read.
    pub async fn collect(mut self, limit: usize) -> Result<Bytes, BodyError> {
        let mut buf = BytesMut::new();

        while let Some(chunk) = self.next().await {
            let chunk = chunk.map_err(BodyError::Io)?;

            if buf.len() + chunk.len() > limit {
                return Err(BodyError::Overflow(limit));
            }

            buf.extend_from_slice(&chunk);
        }

        Ok(buf.freeze())
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.kind {
            BodyKind::Stream(stream) => stream.as_mut().poll_next(cx),
            BodyKind::Once(bytes) => {
                let bytes = mem::take(bytes);
                self.kind = BodyKind::Empty;
                Poll::Ready(Some(Ok(bytes)))
            }
            BodyKind::Empty => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.kind {
            BodyKind::Stream(stream) => stream.size_hint(),
            BodyKind::Once(bytes) => (bytes.len(), Some(bytes.len())),
            BodyKind::Empty => (0, Some(0)),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::once(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::once(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::once(text)
    }
}

/// The error returned by [`Body::collect`].
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("body larger than limit of {0} bytes")]
    Overflow(usize),
    #[error("failed to read body: {0}")]
    Io(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_stream() {
        let chunks = futures_util::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]);

        let bytes = Body::stream(chunks).collect(64).await.unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn collect_over_limit() {
        let err = Body::once("0123456789").collect(4).await.unwrap_err();
        assert!(matches!(err, BodyError::Overflow(4)));
    }

    #[tokio::test]
    async fn take_leaves_empty() {
        let mut body = Body::once("abc");
        let taken = Body::take(&mut body);

        assert_eq!(body.size_hint(), (0, Some(0)));
        assert_eq!(&Body::collect(taken, 16).await.unwrap()[..], b"abc");
    }
}
