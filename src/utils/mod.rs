use std::ffi::OsStr;
use std::path::{Component, Path};

use percent_encoding::percent_decode_str;

use crate::errors::DocError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Turn a raw request path into a slash-separated path relative to the serving root.
///
/// The path is percent-decoded, empty and `.` segments are dropped and `..` is rejected.
/// The serving root itself maps to the empty string.
pub fn resolve_request_path(raw: &str) -> Result<String, DocError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| DocError::InvalidPath)?;
    let normalized = normalize_request_path(&decoded);
    ensure_safe_path(&normalized)?;
    Ok(normalized)
}

pub fn normalize_request_path(req_path: &str) -> String {
    req_path
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

pub fn ensure_safe_path(req_path: &str) -> Result<(), DocError> {
    for comp in Path::new(req_path).components() {
        match comp {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DocError::InvalidPath);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Join a child name onto a root-relative directory path
pub fn join_rel(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// Extension of a file name without the leading dot
pub fn extension(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(OsStr::to_str)
}
