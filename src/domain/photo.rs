//! Photos are stored inline as `data:` URLs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw image bytes as a base64 `data:` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// MIME type of a `data:` URL, if it is one.
pub fn data_url_mime(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let header = &rest[..rest.find(',')?];
    let mime = header.split(';').next().unwrap_or_default();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Approximate decoded size of a base64 `data:` URL payload, in bytes.
pub fn data_url_size(url: &str) -> usize {
    match url.find(',') {
        Some(pos) => {
            let payload = url[pos + 1..].trim_end_matches('=');
            payload.len() * 3 / 4
        }
        None => 0,
    }
}
