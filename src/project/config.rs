//! Loading and merging of `smithy-build.json` and `.smithy-project.json`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::syntax::parse_json;

pub const SMITHY_BUILD_JSON: &str = "smithy-build.json";
pub const SMITHY_PROJECT_JSON: &str = ".smithy-project.json";

/// The two build-file kinds a project can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFileKind {
    SmithyBuild,
    SmithyProject,
}

impl BuildFileKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            SMITHY_BUILD_JSON => Some(Self::SmithyBuild),
            SMITHY_PROJECT_JSON => Some(Self::SmithyProject),
            _ => None,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::SmithyBuild => SMITHY_BUILD_JSON,
            Self::SmithyProject => SMITHY_PROJECT_JSON,
        }
    }
}

/// `smithy-build.json`, as written. Unknown properties are tolerated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmithyBuildJson {
    pub version: Option<String>,
    pub sources: Vec<String>,
    pub imports: Vec<String>,
    pub output_directory: Option<String>,
    pub maven: Option<MavenConfig>,
    /// Parsed but not interpreted.
    pub projections: Option<serde_json::Value>,
    /// Parsed but not interpreted.
    pub plugins: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MavenConfig {
    pub dependencies: Vec<String>,
    pub repositories: Vec<MavenRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MavenRepository {
    pub url: String,
    pub http_credentials: Option<String>,
}

/// `.smithy-project.json`: editor-oriented config naming pre-downloaded
/// dependency jars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmithyProjectJson {
    pub sources: Vec<String>,
    pub imports: Vec<String>,
    pub dependencies: Vec<ProjectDependency>,
    pub output_directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDependency {
    pub name: String,
    pub path: String,
}

/// The merged configuration of a project root.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Relative paths (files or directories) of model sources.
    pub sources: Vec<String>,
    pub imports: Vec<String>,
    pub maven: Option<MavenConfig>,
    pub dependencies: Vec<ProjectDependency>,
    pub output_directory: Option<String>,
    /// Build files discovered at the root.
    pub found_files: Vec<PathBuf>,
    /// Per-file load failures; the project is broken but keeps whatever was
    /// readable.
    pub load_errors: Vec<String>,
}

impl ProjectConfig {
    /// Detect and merge the build files in `root`. Missing files are not
    /// errors; malformed files are recorded on `load_errors`.
    pub fn load_from_dir(root: &Path) -> Self {
        let mut config = ProjectConfig::default();

        let build_path = root.join(SMITHY_BUILD_JSON);
        if build_path.is_file() {
            config.found_files.push(build_path.clone());
            if let Some(build) = load_file::<SmithyBuildJson>(&build_path, &mut config.load_errors)
            {
                config.sources.extend(build.sources);
                config.imports.extend(build.imports);
                config.maven = build.maven;
                config.output_directory = build.output_directory;
            }
        }

        let project_path = root.join(SMITHY_PROJECT_JSON);
        if project_path.is_file() {
            config.found_files.push(project_path.clone());
            if let Some(project) =
                load_file::<SmithyProjectJson>(&project_path, &mut config.load_errors)
            {
                for source in project.sources {
                    if !config.sources.contains(&source) {
                        config.sources.push(source);
                    }
                }
                for import in project.imports {
                    if !config.imports.contains(&import) {
                        config.imports.push(import);
                    }
                }
                config.dependencies = project.dependencies;
                if config.output_directory.is_none() {
                    config.output_directory = project.output_directory;
                }
            }
        }

        config
    }

    pub fn is_broken(&self) -> bool {
        !self.load_errors.is_empty()
    }
}

/// Read and deserialize one build file through the tolerant node-tree
/// parser. Node-level errors and deserialization failures both land in
/// `errors`; whatever parsed still comes back.
fn load_file<T: for<'de> Deserialize<'de>>(path: &Path, errors: &mut Vec<String>) -> Option<T> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            errors.push(format!("failed to read {}: {e}", path.display()));
            return None;
        }
    };
    let node = parse_json(&text);
    for (_, message) in node.errors() {
        errors.push(format!("{}: {message}", path.display()));
    }
    match serde_json::from_value(node.to_json()) {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(format!("failed to parse {}: {e}", path.display()));
            None
        }
    }
}
