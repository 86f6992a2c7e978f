//! The set of open projects and managed documents, and the routing of URIs
//! to the project files that own them. All mutation happens behind the
//! endpoint's single lock; read-only handlers take snapshots.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tower_lsp_server::ls_types::{FileEvent, Uri};

use crate::project::{Project, ProjectFile, ProjectKind};
use crate::tasks::FileTasks;
use crate::uri::{path_to_uri, uri_to_path};
use crate::workspace;

#[derive(Default)]
pub struct ServerState {
    /// Projects keyed by root: the directory path for Normal/Empty
    /// projects, the file URI for Detached ones.
    pub projects: HashMap<String, Project>,
    pub workspace_paths: BTreeSet<PathBuf>,
    /// Documents the editor has open; their in-memory content is
    /// authoritative until closed.
    pub managed_uris: HashSet<Uri>,
    pub tasks: FileTasks,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_managed(&self, uri: &Uri) -> bool {
        self.managed_uris.contains(uri)
    }

    /// Route a URI to the project and file that own it. Normal projects
    /// win over Detached ones so routing is stable regardless of insertion
    /// order.
    pub fn find_project_and_file(&self, uri: &Uri) -> Option<(&Project, &ProjectFile)> {
        let path = uri_to_path(uri).unwrap_or_else(|| PathBuf::from(uri.as_str()));
        self.find_by_path(&path)
    }

    fn find_by_path(&self, path: &Path) -> Option<(&Project, &ProjectFile)> {
        let mut detached = None;
        for project in self.projects.values() {
            if let Some(file) = project.get_file(path) {
                if project.kind() == ProjectKind::Detached {
                    detached = Some((project, file));
                } else {
                    return Some((project, file));
                }
            }
        }
        detached
    }

    pub fn find_project_mut(&mut self, uri: &Uri) -> Option<&mut Project> {
        let path = uri_to_path(uri).unwrap_or_else(|| PathBuf::from(uri.as_str()));
        let mut detached_key = None;
        let mut normal_key = None;
        for (key, project) in &self.projects {
            if project.contains_path(&path) {
                if project.kind() == ProjectKind::Detached {
                    detached_key = Some(key.clone());
                } else {
                    normal_key = Some(key.clone());
                    break;
                }
            }
        }
        let key = normal_key.or(detached_key)?;
        self.projects.get_mut(&key)
    }

    /// Mark a URI managed. If a project already owns the file, its
    /// in-memory document adopts the editor's text; otherwise a Detached
    /// project is created around it.
    pub fn open(&mut self, uri: &Uri, text: &str) {
        self.managed_uris.insert(uri.clone());
        if let Some(project) = self.find_project_mut(uri) {
            let path = uri_to_path(uri).unwrap_or_else(|| PathBuf::from(uri.as_str()));
            if let Some(file) = project.get_file_mut(&path) {
                file.document_mut().apply_edit(None, text);
                file.reparse();
            }
            return;
        }
        self.projects.insert(
            uri.as_str().to_string(),
            Project::load_detached(uri, text),
        );
    }

    /// Unmark a URI. A Detached project dies with its file; its tasks are
    /// cancelled.
    pub fn close(&mut self, uri: &Uri) {
        self.managed_uris.remove(uri);
        let is_detached = self
            .projects
            .get(uri.as_str())
            .is_some_and(|p| p.kind() == ProjectKind::Detached);
        if is_detached {
            self.tasks.cancel(uri);
            self.projects.remove(uri.as_str());
        }
    }

    /// (Re)load the project at `root`, preserving managed buffers and
    /// resolving Detached projects in both directions: files the new
    /// project covers stop being detached, managed files the reload
    /// dropped become detached with their last-seen text.
    pub fn try_init_project(&mut self, root: &Path) {
        self.tasks.cancel_all();
        let root_key = root.display().to_string();

        // Snapshot managed texts from whichever project currently owns
        // each document.
        let mut buffered: HashMap<PathBuf, String> = HashMap::new();
        for uri in &self.managed_uris {
            let path = uri_to_path(uri).unwrap_or_else(|| PathBuf::from(uri.as_str()));
            if let Some((_, file)) = self.find_by_path(&path) {
                buffered.insert(path, file.document().borrow_text().to_string());
            }
        }

        let old_paths: BTreeSet<PathBuf> = self
            .projects
            .get(&root_key)
            .map(|p| p.all_smithy_file_paths())
            .unwrap_or_default();

        let mut project = Project::load(root);

        // A root that no longer yields anything does not clobber a project
        // that previously loaded there; a fresh Empty project only appears
        // where none existed.
        if project.kind() == ProjectKind::Empty && self.projects.contains_key(&root_key) {
            return;
        }

        let mut rebuffered = false;
        for (path, text) in &buffered {
            if let Some(file) = project.get_file_mut(path) {
                file.document_mut().apply_edit(None, text);
                file.reparse();
                rebuffered = true;
            }
        }
        if rebuffered {
            project.update_and_validate_model();
        }

        // Detached projects fully covered by the new project dissolve.
        let covered: Vec<String> = self
            .projects
            .iter()
            .filter(|(_, p)| p.kind() == ProjectKind::Detached)
            .filter(|(_, p)| p.file_paths().all(|path| project.contains_path(path)))
            .map(|(key, _)| key.clone())
            .collect();
        for key in covered {
            self.projects.remove(&key);
        }

        let new_paths = project.all_smithy_file_paths();
        self.projects.insert(root_key, project);

        for path in old_paths.difference(&new_paths) {
            let Some(uri) = path_to_uri(path) else {
                continue;
            };
            if !self.managed_uris.contains(&uri) {
                continue;
            }
            let text = buffered.get(path).cloned().unwrap_or_default();
            self.projects.insert(
                uri.as_str().to_string(),
                Project::load_detached(&uri, &text),
            );
        }
    }

    /// Route a batch of watched-file events: per-project file updates,
    /// full reloads for build-file changes, and fresh roots.
    pub fn apply_file_events(&mut self, events: &[FileEvent]) {
        let changes =
            workspace::compute_changes(events, &self.projects, &self.workspace_paths);

        for (root, change) in &changes.by_project {
            if change.needs_reload() {
                let root_dir = self.projects.get(root).map(|p| p.dir().to_path_buf());
                if let Some(root_dir) = root_dir {
                    self.try_init_project(&root_dir);
                }
                continue;
            }

            let created: Vec<PathBuf> = change.created_smithy_files.iter().cloned().collect();
            let deleted: Vec<PathBuf> = change.deleted_smithy_files.iter().cloned().collect();

            // Files deleted on disk but still open in the editor live on as
            // Detached projects holding the buffered text.
            let mut detached_seeds: Vec<(Uri, String)> = Vec::new();
            if let Some(project) = self.projects.get(root) {
                for path in &deleted {
                    let Some(uri) = path_to_uri(path) else {
                        continue;
                    };
                    if self.managed_uris.contains(&uri) {
                        if let Some(file) = project.get_file(path) {
                            detached_seeds
                                .push((uri, file.document().borrow_text().to_string()));
                        }
                    }
                }
            }

            // Created files that were open as Detached projects fold into
            // this project, keeping the editor's buffered text.
            let mut adopted: Vec<(PathBuf, String)> = Vec::new();
            for path in &created {
                let Some(uri) = path_to_uri(path) else {
                    continue;
                };
                let detached = self
                    .projects
                    .get(uri.as_str())
                    .filter(|p| p.kind() == ProjectKind::Detached)
                    .and_then(|p| p.get_file(path))
                    .map(|f| f.document().borrow_text().to_string());
                if let Some(text) = detached {
                    adopted.push((path.clone(), text));
                    self.projects.remove(uri.as_str());
                }
            }

            if let Some(project) = self.projects.get_mut(root) {
                project.update_files(&created, &deleted);
                for (path, text) in &adopted {
                    if let Some(file) = project.get_file_mut(path) {
                        file.document_mut().apply_edit(None, text);
                        file.reparse();
                    }
                }
                project.update_and_validate_model();
            }
            for (uri, text) in detached_seeds {
                self.projects.insert(
                    uri.as_str().to_string(),
                    Project::load_detached(&uri, &text),
                );
            }
        }

        for root in &changes.new_project_roots {
            self.try_init_project(root);
        }
    }

    /// Scan a workspace folder for project roots and init each.
    pub fn load_workspace(&mut self, folder: &Path) {
        self.workspace_paths.insert(folder.to_path_buf());
        for root in workspace::scan_project_roots(folder) {
            self.try_init_project(&root);
        }
    }

    /// Drop a workspace folder and the projects rooted under it. Managed
    /// files from dropped projects become Detached.
    pub fn remove_workspace(&mut self, folder: &Path) {
        self.workspace_paths.remove(folder);
        let removed: Vec<String> = self
            .projects
            .iter()
            .filter(|(_, p)| p.kind() != ProjectKind::Detached && p.dir().starts_with(folder))
            .map(|(key, _)| key.clone())
            .collect();
        for key in removed {
            let Some(project) = self.projects.remove(&key) else {
                continue;
            };
            for path in project.all_smithy_file_paths() {
                let Some(uri) = path_to_uri(&path) else {
                    continue;
                };
                if !self.managed_uris.contains(&uri) {
                    continue;
                }
                if let Some(file) = project.get_file(&path) {
                    let text = file.document().borrow_text().to_string();
                    self.projects.insert(
                        uri.as_str().to_string(),
                        Project::load_detached(&uri, &text),
                    );
                }
            }
        }
    }
}
