//! Static extension → MIME classification table
//!
//! Lookup is case-insensitive on the extension. Misses are classified by
//! the row encoder as type "unknown" with the raw extension as subtype.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static MIME_BY_EXTENSION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Text and source
        ("txt", "text/plain"),
        ("log", "text/plain"),
        ("md", "text/markdown"),
        ("csv", "text/csv"),
        ("html", "text/html"),
        ("htm", "text/html"),
        ("css", "text/css"),
        ("js", "text/javascript"),
        ("ts", "text/typescript"),
        ("c", "text/x-c"),
        ("h", "text/x-c"),
        ("cpp", "text/x-c++"),
        ("cs", "text/x-csharp"),
        ("rs", "text/x-rust"),
        ("py", "text/x-python"),
        ("java", "text/x-java"),
        ("sh", "text/x-shellscript"),
        ("ps1", "text/x-powershell"),
        ("bat", "text/x-msdos-batch"),
        ("xml", "text/xml"),
        ("yml", "text/yaml"),
        ("yaml", "text/yaml"),
        ("toml", "text/x-toml"),
        ("ini", "text/plain"),
        ("json", "application/json"),
        // Documents
        ("pdf", "application/pdf"),
        ("rtf", "application/rtf"),
        ("doc", "application/msword"),
        ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        ("xls", "application/vnd.ms-excel"),
        ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        ("ppt", "application/vnd.ms-powerpoint"),
        ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
        // Archives
        ("zip", "application/zip"),
        ("7z", "application/x-7z-compressed"),
        ("rar", "application/vnd.rar"),
        ("tar", "application/x-tar"),
        ("gz", "application/gzip"),
        ("bz2", "application/x-bzip2"),
        ("xz", "application/x-xz"),
        ("cab", "application/vnd.ms-cab-compressed"),
        // Executables and libraries
        ("exe", "application/vnd.microsoft.portable-executable"),
        ("dll", "application/vnd.microsoft.portable-executable"),
        ("sys", "application/vnd.microsoft.portable-executable"),
        ("msi", "application/x-msdownload"),
        ("iso", "application/x-iso9660-image"),
        ("vhd", "application/x-virtualbox-vhd"),
        ("vhdx", "application/x-virtualbox-vhd"),
        ("wasm", "application/wasm"),
        // Images
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
        ("bmp", "image/bmp"),
        ("webp", "image/webp"),
        ("tif", "image/tiff"),
        ("tiff", "image/tiff"),
        ("svg", "image/svg+xml"),
        ("ico", "image/vnd.microsoft.icon"),
        ("heic", "image/heic"),
        ("raw", "image/x-raw"),
        // Audio
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
        ("flac", "audio/flac"),
        ("ogg", "audio/ogg"),
        ("m4a", "audio/mp4"),
        ("wma", "audio/x-ms-wma"),
        ("aac", "audio/aac"),
        // Video
        ("mp4", "video/mp4"),
        ("mkv", "video/x-matroska"),
        ("avi", "video/x-msvideo"),
        ("mov", "video/quicktime"),
        ("wmv", "video/x-ms-wmv"),
        ("webm", "video/webm"),
        ("m4v", "video/mp4"),
        ("mpg", "video/mpeg"),
        ("mpeg", "video/mpeg"),
        // Fonts
        ("ttf", "font/ttf"),
        ("otf", "font/otf"),
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
        // Databases and data
        ("db", "application/vnd.sqlite3"),
        ("sqlite", "application/vnd.sqlite3"),
        ("parquet", "application/vnd.apache.parquet"),
    ])
});

/// Looks up the "type/subtype" classification for an extension.
pub fn lookup(extension: &str) -> Option<&'static str> {
    if extension.is_empty() {
        return None;
    }
    if extension.chars().all(|c| !c.is_ascii_uppercase()) {
        return MIME_BY_EXTENSION.get(extension).copied();
    }
    MIME_BY_EXTENSION
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}
