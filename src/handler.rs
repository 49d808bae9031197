//! Handlers, and the arguments they are called with.

use crate::auth::{Token, UserId, UserName};
use crate::extract::File;
use crate::http::{RawRequest, ResponseWriter};
use crate::respond::{IntoReturns, Returns};
use crate::send::{BoxFuture, Boxed};
use crate::signature::{Signature, Slot};

use std::future::Future;
use std::marker::PhantomData;

/// A bound argument.
#[derive(Debug)]
pub enum Arg {
    Token(Token),
    UserId(UserId),
    UserName(UserName),
    Request(RawRequest),
    Response(ResponseWriter),
    Int(i64),
    String(String),
    File(File),
}

impl Arg {
    pub fn slot(&self) -> Slot {
        match self {
            Arg::Token(_) => Slot::Token,
            Arg::UserId(_) => Slot::UserId,
            Arg::UserName(_) => Slot::UserName,
            Arg::Request(_) => Slot::Request,
            Arg::Response(_) => Slot::Response,
            Arg::Int(_) => Slot::Int,
            Arg::String(_) => Slot::String,
            Arg::File(_) => Slot::File,
        }
    }
}

/// A type a handler can take as a parameter.
pub trait FromArg: Sized + Send + 'static {
    const SLOT: Slot;

    fn from_arg(arg: Arg) -> Option<Self>;
}

macro_rules! from_arg {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl FromArg for $ty {
            const SLOT: Slot = Slot::$variant;

            fn from_arg(arg: Arg) -> Option<Self> {
                match arg {
                    Arg::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    )*};
}

from_arg! {
    Token => Token,
    UserId => UserId,
    UserName => UserName,
    RawRequest => Request,
    ResponseWriter => Response,
    i64 => Int,
    String => String,
    File => File,
}

/// A handler asked for an argument it was not bound to.
///
/// Only possible when an [`Endpoint`] reports a signature it does not follow.
#[derive(Debug, thiserror::Error)]
#[error("handler expected a {expected} argument, found {found:?}")]
pub struct ArgMismatch {
    pub expected: Slot,
    pub found: Option<Slot>,
}

/// The bound arguments of a call, consumed in order.
#[derive(Debug)]
pub struct Args {
    args: std::vec::IntoIter<Arg>,
}

impl Args {
    pub fn new(args: Vec<Arg>) -> Self {
        Self {
            args: args.into_iter(),
        }
    }

    /// Take the next argument as a `T`.
    pub fn take<T>(&mut self) -> Result<T, ArgMismatch>
    where
        T: FromArg,
    {
        let arg = self.args.next().ok_or(ArgMismatch {
            expected: T::SLOT,
            found: None,
        })?;

        let found = arg.slot();
        T::from_arg(arg).ok_or(ArgMismatch {
            expected: T::SLOT,
            found: Some(found),
        })
    }
}

/// A type-erased handler.
///
/// Plain async functions become endpoints through [`Handler`]. Implement this
/// trait directly to describe a signature by hand.
pub trait Endpoint: Send + Sync + 'static {
    fn signature(&self) -> Signature;

    fn call(&self, args: Args) -> BoxFuture<'_, Result<Returns, ArgMismatch>>;
}

/// Marks handlers that implement [`Endpoint`] themselves.
pub struct Manual;

/// A value that can be registered as a method's handler.
///
/// Implemented for async functions of up to eight [`FromArg`] parameters whose
/// output implements [`IntoReturns`], and for every [`Endpoint`].
pub trait Handler<T>: Send + Sync + 'static {
    type Endpoint: Endpoint;

    fn into_endpoint(self) -> Self::Endpoint;
}

impl<E> Handler<Manual> for E
where
    E: Endpoint,
{
    type Endpoint = E;

    fn into_endpoint(self) -> E {
        self
    }
}

/// An async function, as an [`Endpoint`].
pub struct FnEndpoint<F, T> {
    f: F,
    _args: PhantomData<fn() -> T>,
}

macro_rules! handler_fn {
    ($($ty:ident),*) => {
        impl<F, Fut, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoReturns + 'static,
            $($ty: FromArg,)*
        {
            type Endpoint = FnEndpoint<F, ($($ty,)*)>;

            fn into_endpoint(self) -> Self::Endpoint {
                FnEndpoint {
                    f: self,
                    _args: PhantomData,
                }
            }
        }

        impl<F, Fut, R, $($ty,)*> Endpoint for FnEndpoint<F, ($($ty,)*)>
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoReturns + 'static,
            $($ty: FromArg,)*
        {
            fn signature(&self) -> Signature {
                Signature::new(vec![$($ty::SLOT),*], R::roles())
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, mut args: Args) -> BoxFuture<'_, Result<Returns, ArgMismatch>> {
                $(
                    let $ty = match args.take::<$ty>() {
                        Ok(arg) => arg,
                        Err(err) => return async move { Err(err) }.boxed(),
                    };
                )*

                let fut = (self.f)($($ty),*);
                async move { Ok(fut.await.into_returns()) }.boxed()
            }
        }
    };
}

handler_fn!();
handler_fn!(A1);
handler_fn!(A1, A2);
handler_fn!(A1, A2, A3);
handler_fn!(A1, A2, A3, A4);
handler_fn!(A1, A2, A3, A4, A5);
handler_fn!(A1, A2, A3, A4, A5, A6);
handler_fn!(A1, A2, A3, A4, A5, A6, A7);
handler_fn!(A1, A2, A3, A4, A5, A6, A7, A8);
