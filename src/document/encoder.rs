use super::Document;
use crate::Result;
use base64::Engine as _;

/// Base64 payload of a document plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub media_type: String,
    pub data: String,
}

impl EncodedDocument {
    /// `data:` URL used for image previews.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Read the document's bytes and base64-encode them.
///
/// Fails with [`crate::Error::Io`] when the backing file can no longer be read,
/// e.g. it was removed after selection.
pub async fn encode(document: &Document) -> Result<EncodedDocument> {
    let bytes = tokio::fs::read(document.path()).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", document.path().display(), e);
        e
    })?;

    tracing::debug!(
        "Encoding {} ({} bytes, {})",
        document.name(),
        bytes.len(),
        document.media_type()
    );

    Ok(EncodedDocument {
        media_type: document.media_type().to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[tokio::test]
    async fn test_encode_decodes_back_to_original_bytes() {
        let original: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&original).unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        let encoded = encode(&doc).await.unwrap();

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&encoded.data)
            .unwrap();
        assert_eq!(decoded, original);
        assert_eq!(encoded.media_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_encode_does_not_modify_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 ledger").unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        encode(&doc).await.unwrap();

        assert_eq!(std::fs::read(file.path()).unwrap(), b"%PDF-1.4 ledger");
    }

    #[tokio::test]
    async fn test_encode_removed_file_is_io_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        let doc = Document::open(file.path()).await.unwrap();

        file.close().unwrap();

        let err = encode(&doc).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_data_url() {
        let encoded = EncodedDocument {
            media_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        };
        assert_eq!(encoded.data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }
}
