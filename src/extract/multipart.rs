use super::file::{Storage, Upload};
use super::form::{Form, FormConfig, FormError};
use super::File;
use crate::http::Body;

use std::io::Write;

use bytes::{Bytes, BytesMut};
use multer::{Field, Multipart};
use tempfile::NamedTempFile;

/// Read a multipart body into `form`.
///
/// Up to `config.memory_limit` bytes of files are kept in memory, a file that
/// would go past that is written to a temporary file instead. Text values also
/// use up that budget, and all of them together may not exceed
/// `config.memory_limit + config.body_limit` bytes.
pub(crate) async fn read(
    body: Body,
    boundary: String,
    config: &FormConfig,
    form: &mut Form,
) -> Result<(), FormError> {
    let mut multipart = Multipart::new(body, boundary);
    let mut budget = config.memory_limit;
    let mut text = TextLimit {
        used: 0,
        max: config.memory_limit.saturating_add(config.body_limit),
    };

    while let Some(field) = multipart.next_field().await.map_err(FormError::Multipart)? {
        let name = match field.name() {
            Some(name) => name.to_owned(),
            None => continue,
        };

        if field.file_name().is_some() {
            let file = read_file(field, &mut budget).await?;
            form.files.push((name, file));
        } else {
            let value = read_value(field, &mut budget, &mut text).await?;
            let value = String::from_utf8(value.to_vec()).map_err(|_| FormError::Utf8(name.clone()))?;
            form.values.push((name, value));
        }
    }

    Ok(())
}

async fn read_file(mut field: Field<'_>, budget: &mut usize) -> Result<File, FormError> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(ToString::to_string);

    let mut buf = BytesMut::new();
    let mut spilled: Option<NamedTempFile> = None;

    while let Some(chunk) = field.chunk().await.map_err(FormError::Multipart)? {
        if let Some(file) = spilled.as_mut() {
            file.write_all(&chunk).map_err(FormError::Spill)?;
            continue;
        }

        if buf.len() + chunk.len() > *budget {
            let mut file = NamedTempFile::new().map_err(FormError::Spill)?;
            file.write_all(&buf).map_err(FormError::Spill)?;
            file.write_all(&chunk).map_err(FormError::Spill)?;
            buf = BytesMut::new();
            spilled = Some(file);
            continue;
        }

        buf.extend_from_slice(&chunk);
    }

    let storage = match spilled {
        Some(mut file) => {
            file.flush().map_err(FormError::Spill)?;
            Storage::Disk(file)
        }
        None => {
            *budget -= buf.len();
            Storage::Memory(buf.freeze())
        }
    };

    Ok(File::new(Upload {
        file_name,
        content_type,
        storage,
    }))
}

/// The text bytes read so far across the whole form.
struct TextLimit {
    used: usize,
    max: usize,
}

async fn read_value(mut field: Field<'_>, budget: &mut usize, text: &mut TextLimit) -> Result<Bytes, FormError> {
    let mut buf = BytesMut::new();

    while let Some(chunk) = field.chunk().await.map_err(FormError::Multipart)? {
        if text.used + chunk.len() > text.max {
            return Err(FormError::TooLarge(text.max));
        }

        text.used += chunk.len();
        buf.extend_from_slice(&chunk);
    }

    *budget = budget.saturating_sub(buf.len());
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn body(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut raw = String::new();
        for (name, file_name, content) in parts {
            raw.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => raw.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                    name, file_name
                )),
                None => raw.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)),
            }
            raw.push_str(content);
            raw.push_str("\r\n");
        }
        raw.push_str(&format!("--{}--\r\n", BOUNDARY));
        Body::once(raw)
    }

    #[tokio::test]
    async fn values_and_files() {
        let mut form = Form::default();
        let body = body(&[("a", None, "1"), ("upload", Some("a.txt"), "contents")]);

        read(body, BOUNDARY.into(), &FormConfig::new(), &mut form).await.unwrap();

        assert_eq!(form.value("a"), Some("1"));
        let file = form.file("upload").unwrap();
        assert_eq!(file.file_name(), Some("a.txt"));
        assert_eq!(file.content_type(), Some("text/plain"));
        assert!(!file.is_on_disk());
        assert_eq!(file.data().unwrap(), "contents");
    }

    #[tokio::test]
    async fn spill_to_disk() {
        let mut form = Form::default();
        let body = body(&[("small", Some("s.txt"), "abc"), ("big", Some("b.txt"), "0123456789")]);
        let config = FormConfig::new().memory_limit(8);

        read(body, BOUNDARY.into(), &config, &mut form).await.unwrap();

        let small = form.file("small").unwrap();
        let big = form.file("big").unwrap();
        assert!(!small.is_on_disk());
        assert!(big.is_on_disk());
        assert_eq!(big.data().unwrap(), "0123456789");
    }

    #[tokio::test]
    async fn value_too_large() {
        let mut form = Form::default();
        let body = body(&[("a", None, "0123456789")]);
        let config = FormConfig::new().memory_limit(4).body_limit(4);

        let err = read(body, BOUNDARY.into(), &config, &mut form).await.unwrap_err();
        assert!(matches!(err, FormError::TooLarge(8)));
    }

    #[tokio::test]
    async fn values_share_one_limit() {
        let names: Vec<String> = (0..50).map(|i| format!("v{}", i)).collect();
        let parts: Vec<_> = names.iter().map(|name| (name.as_str(), None, "abcd")).collect();
        let config = FormConfig::new().memory_limit(4).body_limit(4);

        let mut form = Form::default();
        let err = read(body(&parts), BOUNDARY.into(), &config, &mut form).await.unwrap_err();

        assert!(matches!(err, FormError::TooLarge(8)));
        assert_eq!(form.values.len(), 2);
    }
}
