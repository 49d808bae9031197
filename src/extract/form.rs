use super::multipart;
use super::File;
use crate::http::{header, BodyError, Request, Uri};

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// How much of a multipart body is kept in memory, larger uploads are spilled
/// to temporary files.
pub const MULTIPART_MEMORY_LIMIT: usize = 4 * 1024 * 1024;

/// The largest urlencoded body that will be read.
pub const FORM_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Configuration for form parsing.
#[derive(Clone, Debug)]
pub struct FormConfig {
    pub(crate) memory_limit: usize,
    pub(crate) body_limit: usize,
}

impl FormConfig {
    /// Create a [`FormConfig`] instance.
    pub fn new() -> Self {
        Self {
            memory_limit: MULTIPART_MEMORY_LIMIT,
            body_limit: FORM_BODY_LIMIT,
        }
    }

    /// Set the number of multipart bytes kept in memory.
    ///
    /// By default the limit is 4MiB.
    pub fn memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Set the maximum size of form values.
    ///
    /// This bounds urlencoded bodies. All text values of a multipart body
    /// together may take up to the memory limit plus this limit. By default
    /// the limit is 10MiB.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The values and files sent with a request.
///
/// Body values come before query values, so they win when a name appears in
/// both.
#[derive(Debug, Default)]
pub struct Form {
    pub(crate) values: Vec<(String, String)>,
    pub(crate) files: Vec<(String, File)>,
}

impl Form {
    /// Returns the first value named `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first file uploaded as `name`.
    pub fn file(&self, name: &str) -> Option<File> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, file)| file.clone())
    }
}

#[derive(Default)]
pub(crate) struct CachedForm(OnceCell<Result<Arc<Form>, Arc<FormError>>>);

/// Parse the request's form, once.
///
/// The body is consumed by the first call, later calls return the same result.
pub(crate) async fn form(req: &mut Request, config: &FormConfig) -> Result<Arc<Form>, Arc<FormError>> {
    if let Some(parsed) = cached(req) {
        return parsed;
    }

    let parsed = read(req, config).await.map(Arc::new).map_err(Arc::new);

    match req.extensions().get::<CachedForm>() {
        Some(cache) => cache.0.get_or_init(|| parsed).clone(),
        None => {
            let cache = CachedForm::default();
            let _ = cache.0.set(parsed.clone());
            req.extensions_mut().insert(cache);
            parsed
        }
    }
}

fn cached(req: &Request) -> Option<Result<Arc<Form>, Arc<FormError>>> {
    req.extensions()
        .get::<CachedForm>()
        .and_then(|cache| cache.0.get())
        .cloned()
}

async fn read(req: &mut Request, config: &FormConfig) -> Result<Form, FormError> {
    let mut form = Form::default();

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok());

    match content_type {
        Some(mime) if is_url_encoded(&mime) => {
            let body = req
                .body_mut()
                .take()
                .collect(config.body_limit)
                .await
                .map_err(FormError::Body)?;

            form.values = serde_urlencoded::from_bytes(&body).map_err(FormError::Deser)?;
        }
        Some(mime) if is_multipart(&mime) => {
            let boundary = mime
                .get_param(mime::BOUNDARY)
                .ok_or(FormError::Boundary)?
                .to_string();

            multipart::read(req.body_mut().take(), boundary, config, &mut form).await?;
        }
        _ => {}
    }

    form.values.extend(query(req.uri())?.values);
    Ok(form)
}

/// The values of the query string alone.
pub(crate) fn query(uri: &Uri) -> Result<Form, FormError> {
    let values = match uri.query() {
        Some(query) => serde_urlencoded::from_str(query).map_err(FormError::Deser)?,
        None => Vec::new(),
    };

    Ok(Form {
        values,
        files: Vec::new(),
    })
}

fn is_url_encoded(mime: &mime::Mime) -> bool {
    mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
}

fn is_multipart(mime: &mime::Mime) -> bool {
    mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA
}

/// The error returned when a request's form cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("failed to read form body: {0}")]
    Body(#[source] BodyError),
    #[error("failed to deserialize form: {0}")]
    Deser(#[source] serde_urlencoded::de::Error),
    #[error("multipart content type without a boundary")]
    Boundary,
    #[error("failed to read multipart body: {0}")]
    Multipart(#[source] multer::Error),
    #[error("multipart form values larger than limit of {0} bytes")]
    TooLarge(usize),
    #[error("multipart form value ({0}) is not valid utf-8")]
    Utf8(String),
    #[error("failed to spill multipart file to disk: {0}")]
    Spill(#[source] std::io::Error),
}
