//! Media classification, size limits, and object key generation.
//!
//! Uploaded files are classified from their declared content type, falling
//! back to the filename extension when the client omits it. Only the formats
//! listed in [`ALLOWED_MEDIA`] are accepted, and the bytes must match the
//! declared format.

use std::io::Cursor;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum size of a single uploaded image (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum size of a single uploaded video (100 MiB).
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Key prefix for model gallery images.
pub const PREFIX_MODEL_IMAGES: &str = "models/images";

/// Key prefix for model sample videos.
pub const PREFIX_MODEL_VIDEOS: &str = "models/videos";

/// Key prefix for editor showreel uploads.
pub const PREFIX_EDITOR_VIDEOS: &str = "editors/videos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Video => MAX_VIDEO_BYTES,
        }
    }
}

/// A recognised media format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
    pub kind: MediaKind,
    pub mime: &'static str,
    pub extension: &'static str,
}

/// Accepted formats as `(mime, extensions, kind)`. The first extension is canonical.
const ALLOWED_MEDIA: &[(&str, &[&str], MediaKind)] = &[
    ("image/jpeg", &["jpg", "jpeg"], MediaKind::Image),
    ("image/png", &["png"], MediaKind::Image),
    ("image/webp", &["webp"], MediaKind::Image),
    ("video/mp4", &["mp4"], MediaKind::Video),
    ("video/webm", &["webm"], MediaKind::Video),
    ("video/quicktime", &["mov"], MediaKind::Video),
];

/// Classify an upload from its content type and/or filename.
///
/// A specific content type wins; `application/octet-stream` or a missing
/// content type defers to the filename extension.
pub fn classify(content_type: Option<&str>, filename: Option<&str>) -> Result<MediaType, CoreError> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    if let Some(ct) = declared {
        return ALLOWED_MEDIA
            .iter()
            .find(|(mime, _, _)| *mime == ct)
            .map(|(mime, exts, kind)| MediaType {
                kind: *kind,
                mime: *mime,
                extension: exts[0],
            })
            .ok_or_else(|| CoreError::Validation(format!("Unsupported media type '{ct}'")));
    }

    let ext = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| {
            CoreError::Validation("Cannot determine media type: no content type or extension".into())
        })?;

    ALLOWED_MEDIA
        .iter()
        .find(|(_, exts, _)| exts.iter().any(|e| *e == ext))
        .map(|(mime, exts, kind)| MediaType {
            kind: *kind,
            mime: *mime,
            extension: exts[0],
        })
        .ok_or_else(|| CoreError::Validation(format!("Unsupported file extension '.{ext}'")))
}

/// Ensure a classified upload is of the expected kind.
pub fn expect_kind(media: &MediaType, expected: MediaKind, field: &str) -> Result<(), CoreError> {
    if media.kind != expected {
        return Err(CoreError::Validation(format!(
            "Field '{field}' must be an {}, got {}",
            expected.label(),
            media.mime
        )));
    }
    Ok(())
}

/// Reject empty files and files above the per-kind limit.
pub fn validate_size(kind: MediaKind, len: usize, field: &str) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation(format!("Field '{field}' is an empty file")));
    }
    if len > kind.max_bytes() {
        return Err(CoreError::Validation(format!(
            "Field '{field}' exceeds the {} MiB {} limit",
            kind.max_bytes() / (1024 * 1024),
            kind.label()
        )));
    }
    Ok(())
}

/// Read the pixel dimensions of an image from its header.
///
/// Fails when the bytes are not a decodable PNG, JPEG, or WebP image, or when
/// they decode as a different format than `media` declares.
pub fn read_image_dimensions(bytes: &[u8], media: &MediaType) -> Result<(u32, u32), CoreError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    let actual = match reader.format() {
        Some(image::ImageFormat::Jpeg) => "image/jpeg",
        Some(image::ImageFormat::Png) => "image/png",
        Some(image::ImageFormat::WebP) => "image/webp",
        _ => return Err(CoreError::Validation("Unreadable image: unknown format".into())),
    };
    if actual != media.mime {
        return Err(CoreError::Validation(format!(
            "File declared as {} is actually {actual}",
            media.mime
        )));
    }

    reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))
}

/// Top-level ISO-BMFF boxes that may open an MP4 or QuickTime file.
const BMFF_LEADING_BOXES: &[&[u8; 4]] = &[b"ftyp", b"moov", b"mdat", b"wide", b"free", b"skip"];

/// EBML magic that opens every WebM file.
const EBML_MAGIC: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];

/// Check that a video's bytes start with the container signature of its
/// declared type.
///
/// MP4 and QuickTime share the ISO-BMFF layout and are not told apart.
pub fn sniff_video(bytes: &[u8], media: &MediaType) -> Result<(), CoreError> {
    let matches = match media.mime {
        "video/mp4" | "video/quicktime" => bytes
            .get(4..8)
            .is_some_and(|tag| BMFF_LEADING_BOXES.iter().any(|b| b.as_slice() == tag)),
        "video/webm" => bytes.starts_with(EBML_MAGIC),
        _ => false,
    };
    if !matches {
        return Err(CoreError::Validation(format!(
            "File content is not a valid {} video",
            media.mime
        )));
    }
    Ok(())
}

/// Build a unique object key: `{prefix}/{owner}/{uuid}.{extension}`.
pub fn object_key(prefix: &str, owner: DbId, extension: &str) -> String {
    format!("{prefix}/{owner}/{}.{extension}", uuid::Uuid::new_v4())
}
