//! Decoding of base64 file payloads
//!
//! Browsers send files either as plain base64 or as a data URL
//! (`data:application/pdf;base64,JVBERi0...`).

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub const CONTENT_TYPE_MAX: usize = 255;

/// A decoded upload, ready to be handed to object storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    /// Original file name (used as the key suffix and for type guessing)
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl DecodedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Split an optional data-URL header from the payload and decode it.
///
/// Returns the media type found in the header (if any) and the bytes.
pub fn decode_base64_payload(content: &str) -> Result<(Option<String>, Vec<u8>), String> {
    let content = content.trim();

    let (media_type, body) = match content.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| "is not a valid data URL".to_string())?;
            let mut parts = header.split(';');
            let media_type = parts
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                return Err("must be base64 encoded".to_string());
            }
            (media_type, body)
        }
        None => (None, content),
    };

    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("is empty".to_string());
    }

    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .map_err(|_| "is not valid base64".to_string())?;

    if bytes.is_empty() {
        return Err("is empty".to_string());
    }
    Ok((media_type, bytes))
}

/// Accepts `type/subtype` media types, optionally followed by `;` parameters
pub fn check_content_type(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.chars().count() > CONTENT_TYPE_MAX {
        return Err(format!(
            "is too long (maximum is {} characters)",
            CONTENT_TYPE_MAX
        ));
    }
    let essence = value.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((kind, subtype)) if is_token(kind) && is_token(subtype) => Ok(()),
        _ => Err("must be a media type like type/subtype".to_string()),
    }
}

fn is_token(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
}

/// Declared type, then data-URL type, then a guess from the file name
pub fn resolve_content_type(
    declared: Option<&str>,
    from_payload: Option<&str>,
    file_name: &str,
) -> String {
    declared
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or(from_payload)
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first()
                .map(|m| m.to_string())
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
        })
}

/// Decode a payload into a [`DecodedFile`], enforcing the size limit
pub fn decode_file(
    file_name: &str,
    content: &str,
    declared_type: Option<&str>,
    max_size: usize,
) -> Result<DecodedFile, String> {
    let (media_type, bytes) = decode_base64_payload(content)?;
    if let Some(media_type) = media_type.as_deref() {
        check_content_type(media_type).map_err(|message| format!("media type {}", message))?;
    }
    if bytes.len() > max_size {
        return Err(format!(
            "is too large ({} bytes, maximum is {} bytes)",
            bytes.len(),
            max_size
        ));
    }
    let content_type = resolve_content_type(declared_type, media_type.as_deref(), file_name);
    Ok(DecodedFile::new(file_name, bytes, content_type))
}
