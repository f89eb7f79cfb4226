use std::path::Path;

/// Number of leading bytes needed to recognize every supported signature.
pub const SNIFF_LEN: usize = 12;

/// Media type fallback for files that are neither a known image nor a PDF.
pub const OCTET_STREAM: &str = "application/octet-stream";

pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some("image/tiff"),
        [0x25, 0x50, 0x44, 0x46, ..] => Some("application/pdf"),
        _ => None,
    }
}

pub fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Content signature first, then extension, then `application/octet-stream`.
pub fn detect_media_type(path: &Path, head: &[u8]) -> &'static str {
    sniff_media_type(head)
        .or_else(|| media_type_from_extension(path))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Unrecognized document format for {} (first bytes: {:02X?})",
                path.display(),
                &head[..head.len().min(4)]
            );
            OCTET_STREAM
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            sniff_media_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some("image/png")
        );
    }

    #[test]
    fn test_detect_tiff_both_byte_orders() {
        assert_eq!(
            sniff_media_type(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00]),
            Some("image/tiff")
        );
        assert_eq!(
            sniff_media_type(&[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x08]),
            Some("image/tiff")
        );
        assert_eq!(
            detect_media_type(Path::new("scan.bin"), &[0x49, 0x49, 0x2A, 0x00]),
            "image/tiff"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(
            sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            sniff_media_type(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            Some("image/webp")
        );
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(sniff_media_type(b"%PDF-1.7\n"), Some("application/pdf"));
    }

    #[test]
    fn test_signature_wins_over_extension() {
        assert_eq!(
            detect_media_type(Path::new("letter.pdf"), &[0xFF, 0xD8, 0xFF, 0xE0]),
            "image/jpeg"
        );
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(
            detect_media_type(Path::new("scan.TIFF"), &[0x00, 0x01]),
            "image/tiff"
        );
    }

    #[test]
    fn test_unknown_falls_back_to_octet_stream() {
        assert_eq!(detect_media_type(Path::new("notes.txt"), b"hello"), OCTET_STREAM);
        assert_eq!(detect_media_type(Path::new("empty"), &[]), OCTET_STREAM);
    }
}
