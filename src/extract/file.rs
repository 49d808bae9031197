use bytes::Bytes;
use tempfile::NamedTempFile;

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

/// A file uploaded with a multipart request.
///
/// Optional file parameters that were not sent are bound to an invalid file,
/// see [`File::is_valid`].
#[derive(Clone, Default)]
pub struct File {
    upload: Option<Arc<Upload>>,
}

pub(crate) struct Upload {
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) storage: Storage,
}

pub(crate) enum Storage {
    Memory(Bytes),
    Disk(NamedTempFile),
}

impl File {
    /// An invalid file.
    pub fn none() -> File {
        File::default()
    }

    pub(crate) fn new(upload: Upload) -> File {
        File {
            upload: Some(Arc::new(upload)),
        }
    }

    /// Whether the file was actually uploaded.
    pub fn is_valid(&self) -> bool {
        self.upload.is_some()
    }

    /// The name the client gave the file.
    pub fn file_name(&self) -> Option<&str> {
        self.upload.as_ref()?.file_name.as_deref()
    }

    /// The content type the client sent with the file.
    pub fn content_type(&self) -> Option<&str> {
        self.upload.as_ref()?.content_type.as_deref()
    }

    /// Read the whole content of the file.
    pub fn data(&self) -> Result<Bytes, FileError> {
        let upload = self.upload.as_ref().ok_or(FileError::Invalid)?;

        match &upload.storage {
            Storage::Memory(bytes) => Ok(bytes.clone()),
            Storage::Disk(file) => {
                let mut data = Vec::new();
                file.reopen()?.read_to_end(&mut data)?;
                Ok(data.into())
            }
        }
    }

    /// Whether the file was written to disk instead of being kept in memory.
    pub fn is_on_disk(&self) -> bool {
        matches!(
            self.upload.as_deref(),
            Some(Upload {
                storage: Storage::Disk(_),
                ..
            })
        )
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.upload {
            Some(upload) => f
                .debug_struct("File")
                .field("file_name", &upload.file_name)
                .field("content_type", &upload.content_type)
                .finish_non_exhaustive(),
            None => f.write_str("File(invalid)"),
        }
    }
}

/// The error returned by [`File::data`].
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot get data of invalid file")]
    Invalid,
    #[error("failed to read uploaded file: {0}")]
    Io(#[from] io::Error),
}
