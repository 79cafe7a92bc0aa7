//! File extensions for binary names.

const EXTENSIONS: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/msword", "doc"),
    ("application/octet-stream", "bin"),
    ("application/pdf", "pdf"),
    ("application/rdf+xml", "rdf"),
    ("application/xml", "xml"),
    ("application/zip", "zip"),
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("image/gif", "gif"),
    ("image/jp2", "jp2"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/tiff", "tif"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("text/xml", "xml"),
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
];

/// Extension for a mime type, ignoring parameters and case.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    EXTENSIONS
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// `name` qualified with the extension for `mime_type`.
///
/// Names that already carry the extension are returned unchanged.
pub fn qualified_name(name: &str, mime_type: Option<&str>) -> String {
    match mime_type.and_then(extension_for) {
        Some(ext) => {
            let suffix = format!(".{ext}");
            let lower = name.to_ascii_lowercase();
            if lower.ends_with(&suffix) {
                name.to_string()
            } else {
                format!("{name}{suffix}")
            }
        }
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types() {
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
        assert_eq!(extension_for("text/XML"), Some("xml"));
        assert_eq!(extension_for("text/plain; charset=UTF-8"), Some("txt"));
        assert_eq!(extension_for("application/x-unknown"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn qualifies_names_once() {
        assert_eq!(qualified_name("DS1", Some("application/pdf")), "DS1.pdf");
        assert_eq!(qualified_name("thesis.PDF", Some("application/pdf")), "thesis.PDF");
        assert_eq!(qualified_name("DS1.txt", Some("text/plain")), "DS1.txt");
        assert_eq!(qualified_name("DS1", Some("application/x-unknown")), "DS1");
        assert_eq!(qualified_name("DS1", None), "DS1");
    }
}
