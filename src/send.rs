use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;

/// A boxed future that can be moved across threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed stream that can be shared across threads.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + Sync + 'a>>;

/// A type-erased error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub trait Boxed: Future + Send + Sized {
    fn boxed<'a>(self) -> BoxFuture<'a, Self::Output>
    where
        Self: 'a,
    {
        Box::pin(self)
    }
}

impl<F> Boxed for F where F: Future + Send {}
