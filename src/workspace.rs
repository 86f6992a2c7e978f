//! File-system event routing: which projects need file updates, which need
//! full reloads, and which directories look like brand-new project roots.
//! Also computes the glob patterns registered with client-side watchers.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tower_lsp_server::ls_types::{FileChangeType, FileEvent};

use crate::project::{Project, ProjectKind, SMITHY_BUILD_JSON, SMITHY_PROJECT_JSON};
use crate::uri::uri_to_path;

/// Per-project matchers for routing file events.
pub struct FilePatterns {
    smithy: GlobSet,
    build: GlobSet,
}

impl FilePatterns {
    /// Build matchers from a project's sources and imports. A project with
    /// no configured sources watches its whole root.
    pub fn for_project(project: &Project) -> FilePatterns {
        let root = project.dir();
        let mut smithy = GlobSetBuilder::new();
        for pattern in smithy_glob_patterns(root, project) {
            if let Ok(glob) = Glob::new(&pattern) {
                smithy.add(glob);
            }
        }
        let mut build = GlobSetBuilder::new();
        for name in [SMITHY_BUILD_JSON, SMITHY_PROJECT_JSON] {
            if let Ok(glob) = Glob::new(&root.join(name).display().to_string()) {
                build.add(glob);
            }
        }
        FilePatterns {
            smithy: smithy.build().unwrap_or_else(|_| GlobSet::empty()),
            build: build.build().unwrap_or_else(|_| GlobSet::empty()),
        }
    }

    pub fn matches_smithy(&self, path: &Path) -> bool {
        self.smithy.is_match(path)
    }

    pub fn matches_build(&self, path: &Path) -> bool {
        self.build.is_match(path)
    }
}

fn smithy_glob_patterns(root: &Path, project: &Project) -> Vec<String> {
    let mut dirs: Vec<PathBuf> = project
        .config
        .sources
        .iter()
        .chain(&project.config.imports)
        .map(|relative| root.join(relative))
        .collect();
    if dirs.is_empty() {
        dirs.push(root.to_path_buf());
    }
    dirs.into_iter()
        .map(|path| {
            if path.extension().is_some() {
                path.display().to_string()
            } else {
                format!("{}/**/*.smithy", path.display().to_string().trim_end_matches('/'))
            }
        })
        .collect()
}

/// Client-side watcher patterns for smithy files, one per project source.
pub fn smithy_watch_patterns<'a>(projects: impl Iterator<Item = &'a Project>) -> Vec<String> {
    let mut patterns = BTreeSet::new();
    for project in projects {
        if project.kind() == ProjectKind::Detached {
            continue;
        }
        let root = project.dir();
        let mut sources: Vec<PathBuf> = project
            .config
            .sources
            .iter()
            .chain(&project.config.imports)
            .map(|relative| root.join(relative))
            .collect();
        if sources.is_empty() {
            sources.push(root.to_path_buf());
        }
        for path in sources {
            if path.extension().is_some() {
                patterns.insert(path.display().to_string());
            } else {
                patterns.insert(format!(
                    "{}/**/*.{{smithy,json}}",
                    path.display().to_string().trim_end_matches('/')
                ));
            }
        }
    }
    patterns.into_iter().collect()
}

/// The single client-side watcher pattern for build files.
pub fn build_watch_pattern() -> String {
    format!("**/{{{SMITHY_BUILD_JSON},{SMITHY_PROJECT_JSON}}}")
}

/// The changes one project needs after a batch of file events.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectChange {
    pub changed_build_files: BTreeSet<PathBuf>,
    pub created_smithy_files: BTreeSet<PathBuf>,
    pub deleted_smithy_files: BTreeSet<PathBuf>,
}

impl ProjectChange {
    pub fn needs_reload(&self) -> bool {
        !self.changed_build_files.is_empty()
    }
}

/// The aggregate outcome of a batch of file events.
#[derive(Debug, Default)]
pub struct WorkspaceChanges {
    pub by_project: HashMap<String, ProjectChange>,
    pub new_project_roots: Vec<PathBuf>,
}

/// Route a batch of file events. Set-based: ordering within the batch does
/// not matter.
pub fn compute_changes(
    events: &[FileEvent],
    projects: &HashMap<String, Project>,
    workspace_paths: &BTreeSet<PathBuf>,
) -> WorkspaceChanges {
    let matchers: Vec<(String, FilePatterns)> = projects
        .iter()
        .filter(|(_, p)| p.kind() != ProjectKind::Detached)
        .map(|(root, project)| (root.clone(), FilePatterns::for_project(project)))
        .collect();

    let mut changes = WorkspaceChanges::default();
    for event in events {
        let Some(path) = uri_to_path(&event.uri) else {
            continue;
        };

        if path.extension().is_some_and(|ext| ext == "smithy") {
            if let Some((root, _)) = matchers.iter().find(|(_, m)| m.matches_smithy(&path)) {
                let change = changes.by_project.entry(root.clone()).or_default();
                match event.typ {
                    FileChangeType::CREATED => {
                        change.created_smithy_files.insert(path);
                    }
                    FileChangeType::DELETED => {
                        change.deleted_smithy_files.insert(path);
                    }
                    // Content changes arrive through text-document events.
                    _ => {}
                }
            }
            continue;
        }

        if let Some((root, _)) = matchers.iter().find(|(_, m)| m.matches_build(&path)) {
            changes
                .by_project
                .entry(root.clone())
                .or_default()
                .changed_build_files
                .insert(path);
            continue;
        }

        // A build file appearing somewhere new inside a workspace marks its
        // directory as a fresh project root.
        if event.typ == FileChangeType::CREATED
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == SMITHY_BUILD_JSON || n == SMITHY_PROJECT_JSON)
            && workspace_paths.iter().any(|ws| path.starts_with(ws))
        {
            if let Some(parent) = path.parent() {
                let parent = parent.to_path_buf();
                if !changes.new_project_roots.contains(&parent) {
                    changes.new_project_roots.push(parent);
                }
            }
        }
    }
    changes
}

/// Recursively scan a workspace folder for project roots: directories
/// holding a `smithy-build.json`.
pub fn scan_project_roots(folder: &Path) -> Vec<PathBuf> {
    let mut roots = BTreeSet::new();
    let walker = WalkBuilder::new(folder)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .build();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if entry.path().file_name().and_then(|n| n.to_str()) == Some(SMITHY_BUILD_JSON) {
            if let Some(parent) = entry.path().parent() {
                roots.insert(parent.to_path_buf());
            }
        }
    }
    roots.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SMITHY_BUILD_JSON;
    use crate::uri::path_to_uri;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn event(path: &Path, typ: FileChangeType) -> FileEvent {
        FileEvent {
            uri: path_to_uri(path).unwrap(),
            typ,
        }
    }

    fn loaded_project(dir: &Path) -> (String, HashMap<String, Project>) {
        write(
            &dir.join(SMITHY_BUILD_JSON),
            r#"{"sources": ["model/"]}"#,
        );
        write(
            &dir.join("model/a.smithy"),
            "$version: \"2\"\nnamespace demo\nstructure Foo {}\n",
        );
        let project = Project::load(dir);
        let root = project.root().to_string();
        let mut projects = HashMap::new();
        projects.insert(root.clone(), project);
        (root, projects)
    }

    #[test]
    fn created_smithy_file_routes_to_project() {
        let dir = tempfile::tempdir().unwrap();
        let (root, projects) = loaded_project(dir.path());
        let new_file = dir.path().join("model/new.smithy");
        let changes = compute_changes(
            &[event(&new_file, FileChangeType::CREATED)],
            &projects,
            &BTreeSet::new(),
        );
        let change = changes.by_project.get(&root).unwrap();
        assert!(change.created_smithy_files.contains(&new_file));
        assert!(!change.needs_reload());
    }

    #[test]
    fn changed_smithy_content_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (_, projects) = loaded_project(dir.path());
        let file = dir.path().join("model/a.smithy");
        let changes = compute_changes(
            &[event(&file, FileChangeType::CHANGED)],
            &projects,
            &BTreeSet::new(),
        );
        assert!(changes.by_project.is_empty());
    }

    #[test]
    fn build_file_change_requests_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (root, projects) = loaded_project(dir.path());
        let build = dir.path().join(SMITHY_BUILD_JSON);
        let changes = compute_changes(
            &[event(&build, FileChangeType::CHANGED)],
            &projects,
            &BTreeSet::new(),
        );
        assert!(changes.by_project.get(&root).unwrap().needs_reload());
    }

    #[test]
    fn new_build_file_in_workspace_is_new_root() {
        let dir = tempfile::tempdir().unwrap();
        let projects = HashMap::new();
        let mut workspaces = BTreeSet::new();
        workspaces.insert(dir.path().to_path_buf());
        let nested = dir.path().join("svc").join(SMITHY_BUILD_JSON);
        let changes = compute_changes(
            &[event(&nested, FileChangeType::CREATED)],
            &projects,
            &workspaces,
        );
        assert_eq!(changes.new_project_roots, vec![dir.path().join("svc")]);
    }

    #[test]
    fn batch_order_does_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        let (root, projects) = loaded_project(dir.path());
        let a = dir.path().join("model/x.smithy");
        let b = dir.path().join("model/y.smithy");
        let forward = compute_changes(
            &[
                event(&a, FileChangeType::CREATED),
                event(&b, FileChangeType::DELETED),
            ],
            &projects,
            &BTreeSet::new(),
        );
        let reverse = compute_changes(
            &[
                event(&b, FileChangeType::DELETED),
                event(&a, FileChangeType::CREATED),
            ],
            &projects,
            &BTreeSet::new(),
        );
        assert_eq!(
            forward.by_project.get(&root),
            reverse.by_project.get(&root)
        );
    }

    #[test]
    fn scan_finds_nested_roots() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a").join(SMITHY_BUILD_JSON), "{}");
        write(&dir.path().join("b/nested").join(SMITHY_BUILD_JSON), "{}");
        write(&dir.path().join("c/readme.md"), "not a root");
        let roots = scan_project_roots(dir.path());
        assert_eq!(
            roots,
            vec![dir.path().join("a"), dir.path().join("b/nested")]
        );
    }

    #[test]
    fn watch_patterns_cover_sources_and_builds() {
        let dir = tempfile::tempdir().unwrap();
        let (_, projects) = loaded_project(dir.path());
        let patterns = smithy_watch_patterns(projects.values());
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].ends_with("model/**/*.{smithy,json}"));
        assert_eq!(
            build_watch_pattern(),
            "**/{smithy-build.json,.smithy-project.json}"
        );
    }
}
