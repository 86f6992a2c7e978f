//! Conversions between LSP URIs, file paths, and the strings used to key
//! model source locations.

use std::path::{Path, PathBuf};

use tower_lsp_server::ls_types::Uri;
use url::Url;

use crate::jar;

/// Decode a `file:` URI into a local path. Other schemes return `None`.
pub fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    let url = Url::parse(uri.as_str()).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// Encode a local path as a `file:` URI.
pub fn path_to_uri(path: &Path) -> Option<Uri> {
    let url = Url::from_file_path(path).ok()?;
    url.as_str().parse().ok()
}

/// The string used to key a file in the model: the decoded path for `file:`
/// URIs, the URI itself for anything else (e.g. `smithyjar:`).
pub fn uri_to_source_key(uri: &Uri) -> String {
    match uri_to_path(uri) {
        Some(path) => path.display().to_string(),
        None => uri.as_str().to_string(),
    }
}

/// Convert a model source key back to a URI: jar keys parse directly, file
/// keys encode as `file:` URIs.
pub fn source_key_to_uri(key: &str) -> Option<Uri> {
    if jar::is_jar_uri(key) {
        key.parse().ok()
    } else {
        path_to_uri(Path::new(key))
    }
}
