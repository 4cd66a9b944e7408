//! Multipart form reading and per-file media validation.
//!
//! Handlers read the whole form up front with [`MultipartForm::read`], validate
//! every field and file, and only then start writing to the media store. That
//! way a bad request never leaves objects behind.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use castlane_core::error::CoreError;
use castlane_core::media::{self, MediaKind, MediaType};
use castlane_core::types::DbId;
use castlane_storage::UploadBatch;

use crate::error::{AppError, AppResult};

/// One file part of a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A file that passed classification and size checks.
#[derive(Debug)]
pub struct ValidatedMedia {
    pub media: MediaType,
    pub bytes: Vec<u8>,
}

/// A fully buffered multipart form: text fields by name plus file parts in order.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Buffer every part. Parts named in `file_fields` are kept as files;
    /// everything else is read as text (a repeated text field keeps the last value).
    pub async fn read(mut multipart: Multipart, file_fields: &[&str]) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            if file_fields.contains(&name.as_str()) {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                form.files.push(UploadedFile {
                    field: name,
                    filename,
                    content_type,
                    bytes,
                });
            } else {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Text value of a field, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value of a required field; blank counts as missing.
    pub fn required_text(&self, name: &str) -> AppResult<&str> {
        self.text(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Missing required field '{name}'"
                )))
            })
    }

    /// Remove and return every file part named `name`, in submission order.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, rest): (Vec<UploadedFile>, Vec<UploadedFile>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == name);
        self.files = rest;
        taken
    }

    /// Remove and return the single file part named `name`.
    ///
    /// Rejects the request if the field was sent more than once.
    pub fn take_file(&mut self, name: &str) -> AppResult<Option<UploadedFile>> {
        let mut files = self.take_files(name);
        if files.len() > 1 {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Field '{name}' accepts a single file"
            ))));
        }
        Ok(files.pop())
    }
}

/// Classify a file, check it is of `expected` kind and within size limits.
///
/// The content must match the declared format: images are decoded far enough
/// to read their dimensions, videos are checked for their container signature.
pub fn validate_file(file: UploadedFile, expected: MediaKind) -> AppResult<ValidatedMedia> {
    let media = media::classify(file.content_type.as_deref(), file.filename.as_deref())?;
    media::expect_kind(&media, expected, &file.field)?;
    media::validate_size(expected, file.bytes.len(), &file.field)?;
    match expected {
        MediaKind::Image => {
            media::read_image_dimensions(&file.bytes, &media)?;
        }
        MediaKind::Video => media::sniff_video(&file.bytes, &media)?,
    }
    Ok(ValidatedMedia {
        media,
        bytes: file.bytes.to_vec(),
    })
}

/// Upload a validated file under `prefix/owner/` and return its public URL.
pub async fn store(
    batch: &mut UploadBatch,
    prefix: &str,
    owner: DbId,
    file: ValidatedMedia,
) -> AppResult<String> {
    let key = media::object_key(prefix, owner, file.media.extension);
    let stored = batch.put(&key, file.bytes, file.media.mime).await?;
    Ok(stored.url)
}

/// Keep the batch when `result` succeeded, otherwise remove everything it
/// uploaded before returning the error.
pub async fn settle<T>(batch: UploadBatch, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            let kept = batch.commit();
            tracing::debug!(objects = kept.len(), "Upload batch committed");
            Ok(value)
        }
        Err(err) => {
            if !batch.is_empty() {
                tracing::warn!(objects = batch.len(), error = %err, "Rolling back uploads");
                batch.discard().await;
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use castlane_storage::{MediaStore, MemoryMediaStore};

    use super::*;

    fn file(field: &str, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            filename: None,
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn take_files_preserves_order_and_leaves_others() {
        let mut form = MultipartForm::default();
        form.files.push(file("images", None, b"1"));
        form.files.push(file("sample_video", None, b"v"));
        form.files.push(file("images", None, b"2"));

        let images = form.take_files("images");
        assert_eq!(images.len(), 2);
        assert_eq!(&images[0].bytes[..], b"1");
        assert_eq!(&images[1].bytes[..], b"2");
        assert_eq!(form.files.len(), 1);
    }

    #[test]
    fn take_file_rejects_duplicates() {
        let mut form = MultipartForm::default();
        form.files.push(file("video", None, b"a"));
        form.files.push(file("video", None, b"b"));
        assert_matches!(form.take_file("video"), Err(AppError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn required_text_treats_blank_as_missing() {
        let mut form = MultipartForm::default();
        form.fields.insert("name".into(), "   ".into());
        assert!(form.required_text("name").is_err());
        assert!(form.required_text("gender").is_err());
    }

    #[test]
    fn validate_file_rejects_wrong_kind() {
        let result = validate_file(file("images", Some("video/mp4"), b"data"), MediaKind::Image);
        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn validate_file_rejects_undecodable_image() {
        let result = validate_file(file("images", Some("image/png"), b"not a png"), MediaKind::Image);
        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn validate_file_checks_video_signature() {
        let validated =
            validate_file(file("video", Some("video/mp4"), b"\x00\x00\x00\x18ftyp"), MediaKind::Video)
                .unwrap();
        assert_eq!(validated.media.extension, "mp4");

        let result = validate_file(file("video", Some("video/mp4"), b"plain text"), MediaKind::Video);
        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn settle_keeps_objects_on_success() {
        let store = Arc::new(MemoryMediaStore::new("http://media.test"));
        let mut batch = UploadBatch::new(store.clone());
        batch.put("models/images/1/a.png", vec![1], "image/png").await.unwrap();

        let value = settle(batch, Ok(7)).await.unwrap();
        assert_eq!(value, 7);
        assert!(store.contains("models/images/1/a.png").await);
    }

    #[tokio::test]
    async fn settle_discards_objects_on_error() {
        let store = Arc::new(MemoryMediaStore::new("http://media.test"));
        store.put("unrelated", vec![0], "image/png").await.unwrap();
        let mut batch = UploadBatch::new(store.clone());
        batch.put("models/images/1/a.png", vec![1], "image/png").await.unwrap();
        batch.put("models/images/1/b.png", vec![2], "image/png").await.unwrap();

        let result: AppResult<()> = settle(batch, Err(AppError::BadRequest("boom".into()))).await;
        assert_matches!(result, Err(AppError::BadRequest(_)));
        assert_eq!(store.keys().await, vec!["unrelated".to_string()]);
    }
}
