// src/dtos/file_dtos.rs
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported file type: {0}")]
    Unsupported(String),
}

/// File bytes on their way into a storage bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: mime::Mime, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type_for(path);
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, content_type, bytes))
    }

    /// Accepts `data:image/png;base64,...` or a bare base64 payload (taken as JPEG).
    pub fn from_data_url(file_name: impl Into<String>, data: &str) -> Result<Self, FileError> {
        let (content_type, payload) = match data.split_once(',') {
            Some((header, payload)) => {
                let declared = header
                    .trim_start_matches("data:")
                    .trim_end_matches(";base64");
                let content_type: mime::Mime = declared
                    .parse()
                    .map_err(|_| FileError::Unsupported(declared.to_string()))?;
                (content_type, payload)
            }
            None => (mime::IMAGE_JPEG, data),
        };

        if content_type.type_() != mime::IMAGE {
            return Err(FileError::Unsupported(content_type.to_string()));
        }

        let bytes = general_purpose::STANDARD.decode(payload.trim())?;
        Ok(Self::new(file_name, content_type, bytes))
    }
}

fn content_type_for(path: &Path) -> mime::Mime {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
