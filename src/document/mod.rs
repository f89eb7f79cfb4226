//! User-selected documents and their base64 encoding
//!
//! A [`Document`] only records where the bytes live and what they are; the
//! bytes are read when the document is encoded for a request.

pub mod encoder;
pub mod mime;

pub use encoder::{encode, EncodedDocument};

use crate::models::MediaKind;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    name: String,
    media_type: String,
    size: u64,
}

impl Document {
    /// Stat the file and detect its media type from the leading bytes.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }

        let mut file = tokio::fs::File::open(&path).await?;
        let mut head = [0u8; mime::SNIFF_LEN];
        let mut filled = 0;
        while filled < head.len() {
            let read = file.read(&mut head[filled..]).await?;
            if read == 0 {
                break;
            }
            filled += read;
        }

        let media_type = mime::detect_media_type(&path, &head[..filled]).to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!("Opened {} as {} ({} bytes)", name, media_type, metadata.len());

        Ok(Self {
            path,
            name,
            media_type,
            size: metadata.len(),
        })
    }

    /// Override the detected media type with a declared one.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> Result<MediaKind> {
        MediaKind::classify(&self.media_type)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind(), Ok(MediaKind::Image))
    }

    /// Size formatted the way the upload view shows it, e.g. `12.34 KB`.
    pub fn display_size(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_open_detects_png_signature() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
            .unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.media_type(), "image/png");
        assert_eq!(doc.size(), 8);
        assert!(doc.is_image());
        assert!(doc.name().ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_open_short_pdf() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF").unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.media_type(), "application/pdf");
        assert_eq!(doc.kind().unwrap(), MediaKind::Pdf);
        assert!(!doc.is_image());
    }

    #[tokio::test]
    async fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(dir.path().join("gone.png")).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_open_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_declared_media_type_overrides_detection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text").unwrap();

        let doc = Document::open(file.path())
            .await
            .unwrap()
            .with_media_type("text/plain");
        assert!(matches!(doc.kind(), Err(Error::UnsupportedMedia(_))));
    }

    #[tokio::test]
    async fn test_display_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 2048]).unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.display_size(), "2.00 KB");
    }
}
