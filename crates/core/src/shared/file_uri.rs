//! `file://` prefix handling for paths crossing the bridge.

pub const FILE_SCHEME: &str = "file://";

/// Drops a leading `file://`, leaving plain paths untouched.
pub fn strip_file_scheme(uri: &str) -> &str {
    uri.strip_prefix(FILE_SCHEME).unwrap_or(uri)
}

/// Prefixes `file://` unless the path already carries it.
pub fn ensure_file_scheme(path: &str) -> String {
    if path.starts_with(FILE_SCHEME) {
        path.to_string()
    } else {
        format!("{FILE_SCHEME}{path}")
    }
}
