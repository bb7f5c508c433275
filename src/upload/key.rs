//! Upload ids and storage keys.
//!
//! An upload id is a nanoid, optionally followed by `/<slug>` derived from
//! the file name. The storage key is the id plus `.<extension>`.

/// Maximum number of file name characters kept in a slug.
pub const SLUG_MAX_CHARS: usize = 20;

/// Extension used when the content type has no subtype.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Known content types and their extensions.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("image/webp", "webp"),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/xml", "xml"),
    ("text/css", "css"),
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("audio/ogg", "ogg"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("video/ogg", "ogg"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("application/x-tar", "tar"),
    ("application/gzip", "gz"),
    ("application/zip", "zip"),
    ("application/vnd.rar", "rar"),
    ("application/pdf", "pdf"),
    ("application/javascript", "js"),
    ("application/octet-stream", "bin"),
];

/// Content type used when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Generate a fresh random id.
pub fn new_nanoid() -> String {
    nanoid::nanoid!()
}

/// Turn a name into a URL-safe slug.
///
/// Keeps the first [`SLUG_MAX_CHARS`] characters, lowercases, trims,
/// replaces spaces and `/` with `-`, optionally drops the last extension
/// and percent-encodes the result.
pub fn slugify(name: &str, drop_extension: bool) -> String {
    let mut slug: String = name.chars().take(SLUG_MAX_CHARS).collect();
    slug = slug.to_lowercase().trim().replace([' ', '/'], "-");

    if drop_extension {
        if let Some(dot) = slug.rfind('.') {
            slug.truncate(dot);
        }
    }

    urlencoding::encode(&slug).into_owned()
}

/// Build an upload id from a nanoid and an optional file name.
///
/// Anonymous uploads, nameless files and names whose slug comes out empty
/// get the bare nanoid.
pub fn upload_id(nanoid: &str, file_name: Option<&str>, anonymize: bool) -> String {
    match file_name {
        Some(name) if !anonymize => {
            let slug = slugify(name, true);
            if slug.is_empty() {
                nanoid.to_string()
            } else {
                format!("{nanoid}/{slug}")
            }
        }
        _ => nanoid.to_string(),
    }
}

/// Extension for a content type.
///
/// Known types come from the table; otherwise the subtype is used
/// (`foo/bar-baz` gives `bar-baz`), and [`FALLBACK_EXTENSION`] when there
/// is no subtype.
pub fn extension_for(content_type: &str) -> String {
    let essence = mime_essence(content_type);

    if let Some((_, ext)) = MIME_EXTENSIONS.iter().find(|(mime, _)| *mime == essence) {
        return (*ext).to_string();
    }

    match essence.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype.to_string(),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// Lowercased content type without parameters (`text/plain; charset=x` gives `text/plain`).
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Re-encode an id whose slug was percent-decoded (`X/café` gives `X/caf%C3%A9`).
///
/// Slugs are stored fully encoded and nanoids need no encoding, so this
/// restores the stored form.
pub fn encode_id(id: &str) -> String {
    match id.split_once('/') {
        Some((nanoid, slug)) => format!("{nanoid}/{}", urlencoding::encode(slug)),
        None => id.to_string(),
    }
}

/// Storage key for an id and content type.
pub fn storage_key(id: &str, content_type: &str) -> String {
    format!("{id}.{}", extension_for(content_type))
}

/// Content type the object is stored with.
///
/// Markup that browsers would render is served as plain text.
pub fn served_content_type(content_type: &str) -> &str {
    match content_type {
        "text/html" | "text/xml" => "text/plain",
        other => other,
    }
}

/// The parts of an existing storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts {
    /// Leading random id.
    pub nanoid: String,
    /// Extension without the dot.
    pub extension: String,
}

/// Split a storage key into its nanoid and extension.
pub fn parse_key(key: &str) -> KeyParts {
    let nanoid_end = key.find(['/', '.']).unwrap_or(key.len());
    let last_segment = key.rsplit('/').next().unwrap_or(key);

    let extension = match last_segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => FALLBACK_EXTENSION.to_string(),
    };

    KeyParts {
        nanoid: key[..nanoid_end].to_string(),
        extension,
    }
}

/// Key an existing upload moves to when renamed.
pub fn renamed_key(current: &str, label: &str, anonymize: bool) -> String {
    let parts = parse_key(current);
    let slug = slugify(label, false);

    if anonymize || slug.is_empty() {
        format!("{}.{}", parts.nanoid, parts.extension)
    } else {
        format!("{}/{}.{}", parts.nanoid, slug, parts.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanoid_shape() {
        let id = new_nanoid();
        assert_eq!(id.len(), 21);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[test]
    fn test_slugify_file_name() {
        assert_eq!(slugify("My Holiday Photo.JPG", true), "my-holiday-photo");
        assert_eq!(slugify("a/b c.tar.gz", true), "a-b-c.tar");
        assert_eq!(slugify("  spaced.png", true), "spaced");
    }

    #[test]
    fn test_slugify_truncates_before_dropping_extension() {
        // 20 chars: "abcdefghijklmnopqrst"; the real extension is cut off.
        assert_eq!(
            slugify("abcdefghijklmnopqrstuvwxyz.png", true),
            "abcdefghijklmnopqrst"
        );
        assert_eq!(slugify("abcdefghijklmnop.qrstuvwxyz", true), "abcdefghijklmnop");
    }

    #[test]
    fn test_slugify_percent_encodes() {
        assert_eq!(slugify("café.png", true), "caf%C3%A9");
        assert_eq!(slugify("50%?.txt", true), "50%25%3F");
    }

    #[test]
    fn test_slugify_without_dropping_extension() {
        assert_eq!(slugify("Report v2.final", false), "report-v2.final");
    }

    #[test]
    fn test_upload_id() {
        assert_eq!(upload_id("abc", Some("Photo.png"), false), "abc/photo");
        assert_eq!(upload_id("abc", Some("Photo.png"), true), "abc");
        assert_eq!(upload_id("abc", None, false), "abc");
        assert_eq!(upload_id("abc", Some(".png"), false), "abc");
        assert_eq!(upload_id("abc", Some("README"), false), "abc/readme");
    }

    #[test]
    fn test_extension_from_table() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/gzip"), "gz");
        assert_eq!(extension_for("text/plain; charset=utf-8"), "txt");
        assert_eq!(
            extension_for("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            "xlsx"
        );
    }

    #[test]
    fn test_extension_falls_back_to_subtype() {
        assert_eq!(extension_for("foo/bar-baz"), "bar-baz");
        assert_eq!(extension_for("video/x-matroska"), "x-matroska");
    }

    #[test]
    fn test_extension_without_slash() {
        assert_eq!(extension_for("garbage"), "bin");
        assert_eq!(extension_for(""), "bin");
        assert_eq!(extension_for("image/"), "bin");
    }

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence("Text/HTML; charset=utf-8"), "text/html");
        assert_eq!(mime_essence(""), "");
    }

    #[test]
    fn test_encode_id_restores_stored_form() {
        let id = upload_id("V1StG", Some("Café Menu.jpg"), false);
        assert_eq!(id, "V1StG/caf%C3%A9-menu");

        let decoded = urlencoding::decode(&id).unwrap();
        assert_eq!(encode_id(&decoded), id);
        assert_eq!(encode_id(&id), "V1StG/caf%25C3%25A9-menu");
        assert_eq!(encode_id("V1StG"), "V1StG");
        assert_eq!(encode_id("V1StG/plain-name"), "V1StG/plain-name");
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("abc/photo", "image/png"), "abc/photo.png");
        assert_eq!(storage_key("abc", "foo/bar-baz"), "abc.bar-baz");
    }

    #[test]
    fn test_served_content_type() {
        assert_eq!(served_content_type("text/html"), "text/plain");
        assert_eq!(served_content_type("text/xml"), "text/plain");
        assert_eq!(served_content_type("image/png"), "image/png");
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(
            parse_key("V1StGXR8_Z5jdHi6B-myT/holiday.jpg"),
            KeyParts {
                nanoid: "V1StGXR8_Z5jdHi6B-myT".to_string(),
                extension: "jpg".to_string()
            }
        );
        assert_eq!(parse_key("abc.tar").nanoid, "abc");
        assert_eq!(parse_key("abc.tar").extension, "tar");
        assert_eq!(parse_key("abc/my.file.gz").extension, "gz");
        assert_eq!(parse_key("abc").extension, "bin");
        assert_eq!(parse_key("abc/noext").extension, "bin");
    }

    #[test]
    fn test_renamed_key() {
        assert_eq!(renamed_key("abc/old.png", "New Name", false), "abc/new-name.png");
        assert_eq!(renamed_key("abc/old.png", "New Name", true), "abc.png");
        assert_eq!(renamed_key("abc.png", "Shown", false), "abc/shown.png");
        assert_eq!(renamed_key("abc.png", "Shown", true), "abc.png");
        assert_eq!(renamed_key("abc.png", "a/b", false), "abc/a-b.png");
    }
}
