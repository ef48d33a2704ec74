use md5::{Digest, Md5};
use std::collections::HashMap;
use std::path::Path;

/// Detect Content-Type based on file extension
///
/// Returns the MIME type for common file formats. Falls back to
/// "application/octet-stream" for unknown types.
pub fn detect_content_type(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        // Image formats
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Video and audio
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",

        // Documents
        Some("pdf") => "application/pdf",

        // Text and static site formats
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown",

        // Archive formats
        Some("zip") => "application/zip",
        Some("tar") => "application/x-tar",
        Some("gz") => "application/gzip",

        // Default
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Parse metadata string into HashMap
///
/// Expected format: "key1=value1,key2=value2"
///
/// # Examples
///
/// ```
/// use yig_s3_sdk::s3::parse_metadata;
///
/// let metadata = parse_metadata("author=John,project=Demo");
/// assert_eq!(metadata.get("author"), Some(&"John".to_string()));
/// ```
pub fn parse_metadata(metadata_str: &str) -> HashMap<String, String> {
    metadata_str
        .split(',')
        .filter_map(|pair| {
            let mut parts = pair.split('=');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();

            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

/// Hex MD5 of a payload, which is the ETag S3 assigns to a single-part upload
pub fn content_md5_hex(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// Strip the surrounding quotes S3 puts on ETag values
pub fn trim_etag(etag: &str) -> &str {
    etag.trim_matches('"')
}
