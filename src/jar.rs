//! `smithyjar:` URIs and on-demand reading of model files from jars.
//!
//! The URI form is `smithyjar:<absolute-jar-path>!/<entry-path>`. Jar files
//! are referenced from the semantic model but never edited; diagnostics are
//! suppressed for them.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const SCHEME_PREFIX: &str = "smithyjar:";

/// Directory inside a jar where Smithy models conventionally live.
const MODEL_PREFIX: &str = "META-INF/smithy/";

#[derive(Debug, Error)]
pub enum JarError {
    #[error("invalid smithyjar URI '{0}'")]
    InvalidUri(String),
    #[error("failed to open jar '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read jar '{path}': {source}")]
    Archive {
        path: String,
        source: zip::result::ZipError,
    },
    #[error("failed to read entry '{entry}' in '{path}': {source}")]
    Entry {
        path: String,
        entry: String,
        source: std::io::Error,
    },
}

/// A parsed `smithyjar:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarUri {
    pub jar: PathBuf,
    pub entry: String,
}

impl JarUri {
    pub fn parse(uri: &str) -> Result<Self, JarError> {
        let rest = uri
            .strip_prefix(SCHEME_PREFIX)
            .ok_or_else(|| JarError::InvalidUri(uri.to_string()))?;
        let (jar, entry) = rest
            .split_once("!/")
            .ok_or_else(|| JarError::InvalidUri(uri.to_string()))?;
        if jar.is_empty() || entry.is_empty() {
            return Err(JarError::InvalidUri(uri.to_string()));
        }
        Ok(Self {
            jar: PathBuf::from(jar),
            entry: entry.to_string(),
        })
    }

    pub fn to_uri_string(&self) -> String {
        format_jar_uri(&self.jar, &self.entry)
    }

    pub fn read(&self) -> Result<String, JarError> {
        read_entry(&self.jar, &self.entry)
    }
}

pub fn format_jar_uri(jar: &Path, entry: &str) -> String {
    format!("{SCHEME_PREFIX}{}!/{entry}", jar.display())
}

pub fn is_jar_uri(uri: &str) -> bool {
    uri.starts_with(SCHEME_PREFIX)
}

fn open_archive(jar: &Path) -> Result<zip::ZipArchive<std::fs::File>, JarError> {
    let file = std::fs::File::open(jar).map_err(|source| JarError::Open {
        path: jar.display().to_string(),
        source,
    })?;
    zip::ZipArchive::new(file).map_err(|source| JarError::Archive {
        path: jar.display().to_string(),
        source,
    })
}

/// Read a single entry's text from a jar.
pub fn read_entry(jar: &Path, entry: &str) -> Result<String, JarError> {
    let mut archive = open_archive(jar)?;
    let mut zipped = archive.by_name(entry).map_err(|source| JarError::Archive {
        path: jar.display().to_string(),
        source,
    })?;
    let mut text = String::new();
    zipped
        .read_to_string(&mut text)
        .map_err(|source| JarError::Entry {
            path: jar.display().to_string(),
            entry: entry.to_string(),
            source,
        })?;
    Ok(text)
}

/// Read every model file bundled in a jar, returned as
/// `(smithyjar URI, text)` pairs in entry order.
pub fn model_entries(jar: &Path) -> Result<Vec<(String, String)>, JarError> {
    let mut archive = open_archive(jar)?;
    let names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            name.ends_with(".smithy")
                || (name.starts_with(MODEL_PREFIX) && name.ends_with(".json"))
        })
        .map(str::to_string)
        .collect();

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let mut zipped = archive.by_name(&name).map_err(|source| JarError::Archive {
            path: jar.display().to_string(),
            source,
        })?;
        let mut text = String::new();
        zipped
            .read_to_string(&mut text)
            .map_err(|source| JarError::Entry {
                path: jar.display().to_string(),
                entry: name.clone(),
                source,
            })?;
        entries.push((format_jar_uri(jar, &name), text));
    }
    Ok(entries)
}
