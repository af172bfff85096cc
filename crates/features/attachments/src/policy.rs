//! Upload rules: accepted MIME types, the size ceiling and object key naming.

use crate::error::AttachmentsError;

pub const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// 10 MiB, inclusive.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const MAX_EXTENSION_LEN: usize = 10;

/// Rejects a disallowed type before the size so a huge `.exe` reports 415.
///
/// # Errors
/// [`AttachmentsError::UnsupportedType`] or [`AttachmentsError::TooLarge`].
pub fn check(content_type: &str, size: u64, limit: u64) -> Result<(), AttachmentsError> {
    if !ALLOWED_TYPES.contains(&content_type) {
        return Err(AttachmentsError::UnsupportedType { content_type: content_type.to_owned() });
    }
    if size > limit {
        return Err(AttachmentsError::TooLarge { limit_mb: limit / (1024 * 1024) });
    }
    Ok(())
}

/// `<uuid simple>.<ext>`; `bin` when the name has no usable extension.
#[must_use]
pub fn object_key(filename: &str) -> String {
    format!("{}.{}", uuid::Uuid::new_v4().simple(), extension(filename))
}

fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(|| "bin".to_owned(), str::to_ascii_lowercase)
}
