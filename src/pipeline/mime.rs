//! MIME resolution from the file extension.
//!
//! `mime_guess` covers the common extensions; the manual table below makes
//! sure the three receipt formats always resolve even if the guess database
//! changes or the extension is oddly cased.

use std::path::Path;

/// Guess the MIME type of `path` from its extension.
///
/// Returns `None` when neither `mime_guess` nor the PDF/JPEG/PNG fallback
/// recognises the extension.
pub fn resolve_mime_type(path: &Path) -> Option<String> {
    if let Some(guess) = mime_guess::from_path(path).first() {
        return Some(guess.essence_str().to_string());
    }
    fallback_mime_type(path).map(str::to_string)
}

fn fallback_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// `true` for images and PDFs, the only payloads a receipt can arrive as.
pub fn is_supported(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type.starts_with("application/pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_formats_always_resolve() {
        for (name, expected) in [
            ("uctenka_1.pdf", "application/pdf"),
            ("uctenka_1.PDF", "application/pdf"),
            ("uctenka_1.jpg", "image/jpeg"),
            ("uctenka_1.JPEG", "image/jpeg"),
            ("uctenka_1.png", "image/png"),
            ("uctenka_1.Png", "image/png"),
        ] {
            assert_eq!(
                resolve_mime_type(Path::new(name)).as_deref(),
                Some(expected),
                "{name}"
            );
        }
    }

    #[test]
    fn fallback_table_covers_receipt_formats() {
        assert_eq!(fallback_mime_type(Path::new("a.Pdf")), Some("application/pdf"));
        assert_eq!(fallback_mime_type(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(fallback_mime_type(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(fallback_mime_type(Path::new("a.txt")), None);
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(resolve_mime_type(Path::new("uctenka_1.zzqq")), None);
        assert_eq!(resolve_mime_type(Path::new("uctenka_noext")), None);
    }

    #[test]
    fn other_types_resolve_but_are_unsupported() {
        let mime = resolve_mime_type(Path::new("uctenka_1.txt")).unwrap();
        assert_eq!(mime, "text/plain");
        assert!(!is_supported(&mime));
    }

    #[test]
    fn images_and_pdf_are_supported() {
        assert!(is_supported("image/webp"));
        assert!(is_supported("image/heic"));
        assert!(is_supported("application/pdf"));
        assert!(!is_supported("application/json"));
    }
}
