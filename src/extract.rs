//! Reading handler arguments out of requests.

mod bind;
mod file;
mod form;
mod multipart;

pub use bind::BindError;
pub use file::{File, FileError};
pub use form::{Form, FormConfig, FormError, FORM_BODY_LIMIT, MULTIPART_MEMORY_LIMIT};

pub(crate) use bind::Binder;
pub(crate) use form::form;

pub(crate) fn setup(req: &mut crate::http::Request) {
    req.extensions_mut().insert(form::CachedForm::default());
}
