use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Folder the upload endpoint files blog images under.
pub const BLOG_UPLOAD_FOLDER: &str = "blogs";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct UploadResult {
    #[serde(default)]
    pub files: Vec<String>,
}

impl UploadResult {
    pub fn first_path(&self) -> Result<&str> {
        self.files
            .first()
            .map(String::as_str)
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| Error::Upload("server returned no file path".to_string()))
    }
}

/// An image picked by the user, held in memory until it is sent.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    /// MIME type sniffed from the bytes; anything that is not a known image
    /// format is refused.
    pub fn content_type(&self) -> Result<&'static str> {
        image::guess_format(&self.bytes)
            .map(|format| format.to_mime_type())
            .map_err(|_| Error::Upload(format!("{} is not a supported image", self.file_name)))
    }
}
