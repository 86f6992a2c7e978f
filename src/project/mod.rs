//! A project: a set of tracked files sharing a config and a validated
//! semantic model.

pub mod config;
pub mod file;

pub use config::{BuildFileKind, ProjectConfig, SMITHY_BUILD_JSON, SMITHY_PROJECT_JSON};
pub use file::{
    BuildFile, DocumentShape, DocumentShapeKind, IdlFile, ProjectFile, document_shape_at,
    extract_document_shapes, find_definition,
};

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use tower_lsp_server::ls_types::Uri;

use crate::document::Document;
use crate::jar;
use crate::model::{Assembler, AssemblyMode, SourceFile, ValidatedModel};
use crate::uri::uri_to_path;

/// The kind of project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// Loaded from build files at a root directory.
    Normal,
    /// A synthetic single-file project hosting an orphan open file.
    Detached,
    /// A root with no build files and no sources.
    Empty,
}

#[derive(Debug)]
pub struct Project {
    /// Map key in ServerState: the root directory for Normal/Empty
    /// projects, the file's URI for Detached ones.
    root: String,
    dir: PathBuf,
    kind: ProjectKind,
    pub config: ProjectConfig,
    files: HashMap<PathBuf, ProjectFile>,
    /// Model JSON AST files loaded from disk (tracked for assembly, not
    /// editing).
    json_model_paths: Vec<PathBuf>,
    /// Model files read out of dependency jars at load time.
    jar_sources: Vec<SourceFile>,
    /// Dependency resolution failures, reported to the client as log
    /// messages.
    pub load_errors: Vec<String>,
    model: Arc<ValidatedModel>,
}

impl Project {
    /// Load a project from a root directory: read config, collect sources,
    /// read dependency jars, and assemble a validated model. Never fails —
    /// problems land in `load_errors` and in the model's events.
    pub fn load(root: &Path) -> Project {
        let config = ProjectConfig::load_from_dir(root);
        let mut load_errors = Vec::new();
        let mut files = HashMap::new();
        let mut json_model_paths = Vec::new();

        for build_path in &config.found_files {
            if let Some(kind) = build_path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(BuildFileKind::from_file_name)
            {
                match std::fs::read_to_string(build_path) {
                    Ok(text) => {
                        files.insert(
                            build_path.clone(),
                            ProjectFile::Build(file::BuildFile::new(kind, text)),
                        );
                    }
                    Err(e) => {
                        load_errors.push(format!("failed to read {}: {e}", build_path.display()))
                    }
                }
            }
        }

        for path in collect_model_paths(root, &config) {
            if path.extension().is_some_and(|e| e == "json") {
                json_model_paths.push(path);
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    files.insert(path, ProjectFile::Idl(IdlFile::new(text)));
                }
                Err(e) => load_errors.push(format!("failed to read {}: {e}", path.display())),
            }
        }

        let mut jar_sources = Vec::new();
        for dependency in &config.dependencies {
            let jar_path = root.join(&dependency.path);
            match jar::model_entries(&jar_path) {
                Ok(entries) => {
                    for (uri, text) in entries {
                        jar_sources.push(SourceFile::new(uri, text));
                    }
                }
                Err(e) => load_errors.push(format!("dependency `{}`: {e}", dependency.name)),
            }
        }

        let kind = if config.found_files.is_empty() && files.is_empty() {
            ProjectKind::Empty
        } else {
            ProjectKind::Normal
        };

        let mut project = Project {
            root: root.display().to_string(),
            dir: root.to_path_buf(),
            kind,
            config,
            files,
            json_model_paths,
            jar_sources,
            load_errors,
            model: Arc::new(ValidatedModel::default()),
        };
        project.update_and_validate_model();
        project
    }

    /// Build a single-file project for a file that belongs to no known
    /// project root. The root is the file's URI.
    pub fn load_detached(uri: &Uri, text: &str) -> Project {
        let path = uri_to_path(uri).unwrap_or_else(|| PathBuf::from(uri.as_str()));
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut files = HashMap::new();
        files.insert(path, ProjectFile::Idl(IdlFile::new(text)));
        let mut project = Project {
            root: uri.as_str().to_string(),
            dir,
            kind: ProjectKind::Detached,
            config: ProjectConfig::default(),
            files,
            json_model_paths: Vec::new(),
            jar_sources: Vec::new(),
            load_errors: Vec::new(),
            model: Arc::new(ValidatedModel::default()),
        };
        project.update_and_validate_model();
        project
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    /// The latest validated model. An `Arc` snapshot: handlers keep reading
    /// their copy while newer assemblies replace this field.
    pub fn model(&self) -> Arc<ValidatedModel> {
        Arc::clone(&self.model)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn get_file(&self, path: &Path) -> Option<&ProjectFile> {
        self.files.get(path)
    }

    pub fn get_file_mut(&mut self, path: &Path) -> Option<&mut ProjectFile> {
        self.files.get_mut(path)
    }

    pub fn get_project_file(&self, uri: &Uri) -> Option<&ProjectFile> {
        self.files.get(&uri_to_path(uri)?)
    }

    pub fn get_document(&self, uri: &Uri) -> Option<&Document> {
        self.get_project_file(uri).map(ProjectFile::document)
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Absolute paths of all tracked `.smithy` files.
    pub fn all_smithy_file_paths(&self) -> BTreeSet<PathBuf> {
        self.files
            .iter()
            .filter(|(_, f)| matches!(f, ProjectFile::Idl(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Add and remove tracked files after disk changes. Does not
    /// reassemble the model.
    pub fn update_files(&mut self, created: &[PathBuf], deleted: &[PathBuf]) {
        for path in deleted {
            self.files.remove(path);
        }
        for path in created {
            if self.files.contains_key(path) {
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    let file = match path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .and_then(BuildFileKind::from_file_name)
                    {
                        Some(kind) => ProjectFile::Build(file::BuildFile::new(kind, text)),
                        None => ProjectFile::Idl(IdlFile::new(text)),
                    };
                    self.files.insert(path.clone(), file);
                }
                Err(e) => self
                    .load_errors
                    .push(format!("failed to read {}: {e}", path.display())),
            }
        }
    }

    /// Re-feed the current in-memory texts to the assembler without the
    /// validator set: the fast per-keystroke path.
    pub fn update_model_without_validating(&mut self) {
        self.assemble(AssemblyMode::Resolve);
    }

    /// Full revalidation, used on save and on load.
    pub fn update_and_validate_model(&mut self) {
        self.assemble(AssemblyMode::Validate);
    }

    fn assemble(&mut self, mode: AssemblyMode) {
        let mut sources: Vec<SourceFile> = Vec::new();
        let mut paths: Vec<&PathBuf> = self
            .files
            .iter()
            .filter(|(_, f)| matches!(f, ProjectFile::Idl(_)))
            .map(|(path, _)| path)
            .collect();
        paths.sort();
        for path in paths {
            if let Some(file) = self.files.get(path) {
                sources.push(SourceFile::new(
                    path.display().to_string(),
                    file.document().borrow_text(),
                ));
            }
        }
        for path in &self.json_model_paths {
            if let Ok(text) = std::fs::read_to_string(path) {
                sources.push(SourceFile::new(path.display().to_string(), text));
            }
        }
        sources.extend(self.jar_sources.iter().cloned());

        let mut model = Assembler::assemble(mode, &sources);
        model.broken = self.config.is_broken();
        self.model = Arc::new(model);
    }
}

/// Resolve the config's sources and imports to concrete model file paths.
/// Directories are walked recursively for `.smithy` and `.json` files.
fn collect_model_paths(root: &Path, config: &ProjectConfig) -> BTreeSet<PathBuf> {
    let mut paths = BTreeSet::new();
    for relative in config.sources.iter().chain(&config.imports) {
        let absolute = root.join(relative);
        if absolute.is_file() {
            paths.insert(absolute);
            continue;
        }
        if !absolute.is_dir() {
            continue;
        }
        let walker = WalkBuilder::new(&absolute)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build();
        for entry in walker.flatten() {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "smithy" || ext == "json")
            {
                paths.insert(path.to_path_buf());
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, ShapeId};

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn project_with_model(dir: &Path) -> Project {
        write(
            &dir.join(SMITHY_BUILD_JSON),
            r#"{"version": "1.0", "sources": ["model/"]}"#,
        );
        write(
            &dir.join("model/a.smithy"),
            "$version: \"2\"\nnamespace demo\nstructure Foo {}\n",
        );
        write(
            &dir.join("model/b.smithy"),
            "$version: \"2\"\nnamespace demo\nstructure Bar { foo: Foo }\n",
        );
        Project::load(dir)
    }

    #[test]
    fn load_builds_model_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_with_model(dir.path());
        assert_eq!(project.kind(), ProjectKind::Normal);
        assert_eq!(project.all_smithy_file_paths().len(), 2);
        let model = project.model();
        assert!(model.events.is_empty(), "events: {:?}", model.events);
        let member = model
            .shape(&ShapeId::parse("demo#Bar$foo").unwrap())
            .unwrap();
        assert_eq!(member.target.as_ref().unwrap().absolute(), "demo#Foo");
    }

    #[test]
    fn empty_root_is_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::load(dir.path());
        assert_eq!(project.kind(), ProjectKind::Empty);
        assert_eq!(project.file_count(), 0);
    }

    #[test]
    fn detached_project_hosts_single_file() {
        let uri: Uri = "file:///tmp/a.smithy".parse().unwrap();
        let project =
            Project::load_detached(&uri, "$version: \"2\"\nnamespace demo\nstructure Foo {}\n");
        assert_eq!(project.kind(), ProjectKind::Detached);
        assert_eq!(project.root(), "file:///tmp/a.smithy");
        assert_eq!(project.file_count(), 1);
        assert!(project.get_project_file(&uri).is_some());
        assert!(project.model().events.is_empty());
    }

    #[test]
    fn detached_project_reports_unresolved() {
        let uri: Uri = "file:///tmp/a.smithy".parse().unwrap();
        let project = Project::load_detached(
            &uri,
            "$version: \"2\"\nnamespace demo\nstructure Foo { bar: Bar }\n",
        );
        let model = project.model();
        assert_eq!(model.events.len(), 1);
        assert_eq!(model.events[0].severity, Severity::Error);
    }

    #[test]
    fn update_files_adds_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = project_with_model(dir.path());
        let c = dir.path().join("model/c.smithy");
        write(&c, "$version: \"2\"\nnamespace demo\nstructure Baz {}\n");
        let a = dir.path().join("model/a.smithy");
        project.update_files(std::slice::from_ref(&c), std::slice::from_ref(&a));
        assert!(project.contains_path(&c));
        assert!(!project.contains_path(&a));
    }

    #[test]
    fn edit_then_update_model_reflects_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = project_with_model(dir.path());
        let b = dir.path().join("model/b.smithy");
        {
            let file = project.get_file_mut(&b).unwrap();
            file.document_mut()
                .apply_edit(None, "$version: \"2\"\nnamespace demo\nstructure Bar { foo: Gone }\n");
            file.reparse();
        }
        project.update_model_without_validating();
        let model = project.model();
        assert_eq!(model.events.len(), 1);
        assert!(model.events[0].message.contains("demo#Gone"));
    }

    #[test]
    fn broken_config_keeps_discoverable_sources() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(SMITHY_BUILD_JSON), r#"{"sources": ["#);
        let project = Project::load(dir.path());
        assert_eq!(project.kind(), ProjectKind::Normal);
        assert!(project.model().broken);
    }

    #[test]
    fn loads_model_from_dependency_jar() {
        use std::io::Write as _;
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("libs/lib.jar");
        std::fs::create_dir_all(jar_path.parent().unwrap()).unwrap();
        let file = std::fs::File::create(&jar_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("META-INF/smithy/lib.smithy", options).unwrap();
        zip.write_all(b"$version: \"2\"\nnamespace lib\nstructure Widget {}\n")
            .unwrap();
        zip.finish().unwrap();

        write(
            &dir.path().join(SMITHY_PROJECT_JSON),
            r#"{"sources": ["model/"], "dependencies": [{"name": "lib", "path": "libs/lib.jar"}]}"#,
        );
        write(
            &dir.path().join("model/a.smithy"),
            "$version: \"2\"\nnamespace demo\nuse lib#Widget\nstructure Foo { w: Widget }\n",
        );
        let project = Project::load(dir.path());
        assert!(project.load_errors.is_empty(), "{:?}", project.load_errors);
        let model = project.model();
        assert!(model.events.is_empty(), "events: {:?}", model.events);
        let widget = model.shape(&ShapeId::parse("lib#Widget").unwrap()).unwrap();
        assert!(
            widget
                .source
                .as_ref()
                .unwrap()
                .file
                .starts_with("smithyjar:")
        );
    }

    #[test]
    fn missing_dependency_jar_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(SMITHY_PROJECT_JSON),
            r#"{"dependencies": [{"name": "lib", "path": "libs/missing.jar"}]}"#,
        );
        let project = Project::load(dir.path());
        assert_eq!(project.load_errors.len(), 1);
        assert!(project.load_errors[0].contains("lib"));
    }
}
