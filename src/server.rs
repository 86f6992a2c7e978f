//! The LSP endpoint: translates requests and notifications into calls on
//! [`ServerState`] and the feature handlers, and publishes diagnostics.
//!
//! All state mutation happens behind one lock with no await points inside;
//! heavy work (model assembly) runs in `spawn_blocking` under a per-URI
//! cancellable task, with revision guards so a superseded task never
//! publishes stale diagnostics.

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::request::{GotoDeclarationParams, GotoDeclarationResponse};
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{Client, ClientSocket, LanguageServer, LspService, Server};

use crate::handlers::formatting::{Formatter, PassthroughFormatter, format_edits};
use crate::handlers::{self, FileSnapshot};
use crate::jar::{self, JarUri};
use crate::model::{Severity, ValidationEvent, selector};
use crate::project::{BuildFileKind, ProjectFile, ProjectKind};
use crate::state::ServerState;
use crate::uri::{uri_to_path, uri_to_source_key, source_key_to_uri};
use crate::workspace;

const SOURCE_NAME: &str = "smithy-language-server";
const WATCH_BUILD_ID: &str = "WatchSmithyBuildFiles";
const WATCH_SMITHY_ID: &str = "WatchSmithyFiles";

/// Typed initialization options (§ initializationOptions). Unknown keys are
/// logged and ignored.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub minimum_severity: Severity,
    pub only_reload_on_save: bool,
    pub log_to_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            minimum_severity: Severity::Warning,
            only_reload_on_save: false,
            log_to_file: false,
        }
    }
}

impl ServerConfig {
    /// Parse the dynamically-typed options object. Returns the config plus
    /// warnings about anything unrecognized.
    pub fn from_options(options: Option<&serde_json::Value>) -> (Self, Vec<String>) {
        let mut config = ServerConfig::default();
        let mut warnings = Vec::new();
        let Some(serde_json::Value::Object(map)) = options else {
            if options.is_some() {
                warnings.push("initializationOptions is not an object".to_string());
            }
            return (config, warnings);
        };

        for (key, value) in map {
            match key.as_str() {
                "diagnostics.minimumSeverity" => match value.as_str().and_then(Severity::parse) {
                    Some(severity) => config.minimum_severity = severity,
                    None => warnings.push(format!(
                        "invalid diagnostics.minimumSeverity: {value}"
                    )),
                },
                "diagnostics" => {
                    if let Some(severity) = value
                        .get("minimumSeverity")
                        .and_then(|v| v.as_str())
                        .and_then(Severity::parse)
                    {
                        config.minimum_severity = severity;
                    }
                }
                "onlyReloadOnSave" => {
                    config.only_reload_on_save = value.as_bool().unwrap_or(false);
                }
                "logToFile" => {
                    config.log_to_file = value.as_str() == Some("enabled");
                }
                other => warnings.push(format!("unknown initialization option: {other}")),
            }
        }
        (config, warnings)
    }
}

pub struct Backend {
    client: Client,
    state: Arc<Mutex<ServerState>>,
    config: Arc<RwLock<ServerConfig>>,
    formatter: Arc<dyn Formatter>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish()
    }
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(ServerState::new())),
            config: Arc::new(RwLock::new(ServerConfig::default())),
            formatter: Arc::new(PassthroughFormatter),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_config(&self) -> ServerConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot an IDL file and its project model for a read-only handler.
    fn snapshot(&self, uri: &Uri) -> Option<FileSnapshot> {
        let state = self.lock_state();
        let (project, file) = state.find_project_and_file(uri)?;
        let idl = file.as_idl()?;
        Some(FileSnapshot::of(idl, project.model()))
    }

    /// Schedule the per-URI lifecycle task: update the model (optionally
    /// with validation), then publish diagnostics. Replaces and cancels any
    /// task already in flight for this URI.
    fn schedule_update_and_publish(&self, uri: Uri, validate: bool) {
        let mut state = self.lock_state();
        let Some(revision) = state
            .find_project_and_file(&uri)
            .map(|(_, file)| file.document().revision())
        else {
            return;
        };
        let state_arc = Arc::clone(&self.state);
        let config = Arc::clone(&self.config);
        let client = self.client.clone();
        let task_uri = uri.clone();
        state.tasks.put(&uri, move |token| {
            update_and_publish(state_arc, config, client, task_uri, revision, validate, token)
        });
    }

    /// Recompute and publish diagnostics for every managed document, using
    /// the models as they currently stand.
    async fn republish_managed(&self) {
        let batches: Vec<(Uri, Vec<Diagnostic>)> = {
            let state = self.lock_state();
            let config = self.read_config();
            state
                .managed_uris
                .iter()
                .map(|uri| {
                    let diagnostics =
                        compute_diagnostics(&state, &config, uri).unwrap_or_default();
                    (uri.clone(), diagnostics)
                })
                .collect()
        };
        for (uri, diagnostics) in batches {
            self.client.publish_diagnostics(uri, diagnostics, None).await;
        }
    }

    /// Drop and re-create the two named watcher registrations. The server
    /// re-registers wholesale on any project change rather than diffing.
    /// Runs in the background: registration round-trips with the client
    /// must not stall the notification that triggered them.
    fn register_watchers(&self) {
        let smithy_patterns = {
            let state = self.lock_state();
            workspace::smithy_watch_patterns(state.projects.values())
        };
        let client = self.client.clone();

        tokio::spawn(async move {
            let _ = client
                .unregister_capability(vec![
                    Unregistration {
                        id: WATCH_BUILD_ID.to_string(),
                        method: "workspace/didChangeWatchedFiles".to_string(),
                    },
                    Unregistration {
                        id: WATCH_SMITHY_ID.to_string(),
                        method: "workspace/didChangeWatchedFiles".to_string(),
                    },
                ])
                .await;

            let build_watchers = vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(workspace::build_watch_pattern()),
                kind: None,
            }];
            let smithy_watchers: Vec<FileSystemWatcher> = smithy_patterns
                .into_iter()
                .map(|pattern| FileSystemWatcher {
                    glob_pattern: GlobPattern::String(pattern),
                    kind: None,
                })
                .collect();

            let mut registrations = vec![Registration {
                id: WATCH_BUILD_ID.to_string(),
                method: "workspace/didChangeWatchedFiles".to_string(),
                register_options: serde_json::to_value(
                    DidChangeWatchedFilesRegistrationOptions {
                        watchers: build_watchers,
                    },
                )
                .ok(),
            }];
            if !smithy_watchers.is_empty() {
                registrations.push(Registration {
                    id: WATCH_SMITHY_ID.to_string(),
                    method: "workspace/didChangeWatchedFiles".to_string(),
                    register_options: serde_json::to_value(
                        DidChangeWatchedFilesRegistrationOptions {
                            watchers: smithy_watchers,
                        },
                    )
                    .ok(),
                });
            }

            if let Err(e) = client.register_capability(registrations).await {
                client
                    .log_message(
                        MessageType::WARNING,
                        format!("failed to register file watchers: {e}"),
                    )
                    .await;
            }
        });
    }

    /// Unknown URIs never fail a request: log and let the handler return
    /// its empty result.
    async fn log_unknown_uri(&self, uri: &Uri) {
        self.client
            .log_message(
                MessageType::ERROR,
                format!("no project tracks {}", uri.as_str()),
            )
            .await;
    }

    async fn log_project_errors(&self) {
        let errors: Vec<String> = {
            let state = self.lock_state();
            state
                .projects
                .values()
                .flat_map(|p| {
                    p.config
                        .load_errors
                        .iter()
                        .chain(&p.load_errors)
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect()
        };
        for error in errors {
            self.client.log_message(MessageType::ERROR, error).await;
        }
    }

    // --- smithy/* protocol extensions ---

    /// `smithy/jarFileContents`: read a `smithyjar:` URI's text on demand.
    pub async fn jar_file_contents(&self, params: TextDocumentIdentifier) -> Result<String> {
        match JarUri::parse(params.uri.as_str()).and_then(|j| j.read()) {
            Ok(text) => Ok(text),
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("jarFileContents: {e}"))
                    .await;
                Ok(String::new())
            }
        }
    }

    /// `smithy/selectorCommand`: locations of shapes matching a selector
    /// expression, across every loaded project.
    pub async fn selector_command(&self, params: SelectorParams) -> Result<Vec<Location>> {
        let parsed = match selector::parse(&params.expression) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("invalid selector `{}`: {e}", params.expression),
                    )
                    .await;
                return Ok(Vec::new());
            }
        };

        let state = self.lock_state();
        let mut roots: Vec<&String> = state.projects.keys().collect();
        roots.sort();
        let mut locations = Vec::new();
        for root in roots {
            let Some(project) = state.projects.get(root) else {
                continue;
            };
            let model = project.model();
            for shape in selector::select(&model, &parsed) {
                let Some(source) = &shape.source else {
                    continue;
                };
                if let Some(uri) = source_key_to_uri(&source.file) {
                    locations.push(Location {
                        uri,
                        range: source.range,
                    });
                }
            }
        }
        Ok(locations)
    }

    /// `smithy/serverStatus`: a diagnostic snapshot of open projects.
    pub async fn server_status(&self) -> Result<ServerStatus> {
        let state = self.lock_state();
        let mut roots: Vec<&String> = state.projects.keys().collect();
        roots.sort();
        let open_projects = roots
            .into_iter()
            .filter_map(|root| state.projects.get(root))
            .map(|project| {
                let mut files: Vec<String> = project
                    .file_paths()
                    .map(|p| p.display().to_string())
                    .collect();
                files.sort();
                OpenProject {
                    root: project.root().to_string(),
                    files,
                    is_detached: project.kind() == ProjectKind::Detached,
                }
            })
            .collect();
        Ok(ServerStatus { open_projects })
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectorParams {
    pub expression: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub open_projects: Vec<OpenProject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenProject {
    pub root: String,
    pub files: Vec<String>,
    pub is_detached: bool,
}

/// The lifecycle task body: reassemble the owning project's model from the
/// in-memory texts, then publish this URI's diagnostics. Revision guards
/// before assembly and before publish drop superseded work; a fired token
/// drops the results silently.
async fn update_and_publish(
    state: Arc<Mutex<ServerState>>,
    config: Arc<RwLock<ServerConfig>>,
    client: Client,
    uri: Uri,
    revision: u64,
    validate: bool,
    token: CancellationToken,
) {
    // Let a burst of keystrokes settle; a newer edit cancels this task
    // during the sleep.
    tokio::time::sleep(std::time::Duration::from_millis(75)).await;
    if token.is_cancelled() {
        return;
    }

    let blocking_state = Arc::clone(&state);
    let blocking_config = Arc::clone(&config);
    let blocking_uri = uri.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut guard = blocking_state
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let current = guard
            .find_project_and_file(&blocking_uri)
            .map(|(_, file)| file.document().revision());
        if current != Some(revision) {
            return None;
        }
        {
            let project = guard.find_project_mut(&blocking_uri)?;
            if validate {
                project.update_and_validate_model();
            } else {
                project.update_model_without_validating();
            }
        }
        let config = blocking_config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        compute_diagnostics(&guard, &config, &blocking_uri)
    })
    .await;

    if token.is_cancelled() {
        return;
    }
    let Ok(Some(diagnostics)) = result else {
        return;
    };

    // The document may have advanced while assembling; the newer edit's
    // task owns publishing now.
    {
        let guard = state.lock().unwrap_or_else(|e| e.into_inner());
        let current = guard
            .find_project_and_file(&uri)
            .map(|(_, file)| file.document().revision());
        if current != Some(revision) {
            return;
        }
    }
    if token.is_cancelled() {
        return;
    }

    client.publish_diagnostics(uri, diagnostics, None).await;
}

/// Diagnostics for one URI: the file's parse errors plus the project's
/// validation events at or above the configured severity, in event order.
/// Jar files never get diagnostics.
fn compute_diagnostics(
    state: &ServerState,
    config: &ServerConfig,
    uri: &Uri,
) -> Option<Vec<Diagnostic>> {
    if jar::is_jar_uri(uri.as_str()) {
        return Some(Vec::new());
    }
    let (project, file) = state.find_project_and_file(uri)?;
    let source_key = uri_to_source_key(uri);
    let mut diagnostics = Vec::new();

    if let ProjectFile::Idl(idl) = file {
        for error in idl.parse.errors.iter() {
            diagnostics.push(Diagnostic {
                range: idl.document.span_to_range(error.span),
                severity: Some(DiagnosticSeverity::ERROR),
                source: Some(SOURCE_NAME.to_string()),
                message: format!("Syntax: {}", error.message),
                ..Diagnostic::default()
            });
        }
    }

    let model = project.model();
    for event in model.events_at_least(config.minimum_severity) {
        let Some(location) = &event.location else {
            continue;
        };
        if location.file != source_key {
            continue;
        }
        diagnostics.push(Diagnostic {
            range: refine_range(file, event),
            severity: Some(severity_to_lsp(event.severity)),
            source: Some(SOURCE_NAME.to_string()),
            code: event
                .shape
                .as_ref()
                .map(|id| NumberOrString::String(id.absolute().to_string())),
            message: format!("{}: {}", event.id, event.message),
            ..Diagnostic::default()
        });
    }
    Some(diagnostics)
}

/// Events whose location is degenerate get a better underline from the
/// DocumentShape matching the event's shape id.
fn refine_range(file: &ProjectFile, event: &ValidationEvent) -> Range {
    let Some(location) = &event.location else {
        return Range::default();
    };
    if !location.span.is_empty() {
        return location.range;
    }
    if let (ProjectFile::Idl(idl), Some(shape_id)) = (file, &event.shape) {
        let name = shape_id.member_name().unwrap_or_else(|| shape_id.name());
        if let Some(occurrence) = crate::project::find_definition(&idl.shapes, name) {
            return idl.document.span_to_range(occurrence.span);
        }
    }
    location.range
}

fn severity_to_lsp(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error | Severity::Danger => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Note => DiagnosticSeverity::INFORMATION,
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let (config, warnings) = ServerConfig::from_options(params.initialization_options.as_ref());
        crate::logging::init(config.log_to_file);
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;

        let mut folders: Vec<std::path::PathBuf> = params
            .workspace_folders
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| uri_to_path(&folder.uri))
            .collect();
        #[allow(deprecated)]
        if folders.is_empty() {
            if let Some(root) = params.root_uri.as_ref().and_then(uri_to_path) {
                folders.push(root);
            }
        }
        {
            let mut state = self.lock_state();
            for folder in &folders {
                state.load_workspace(folder);
            }
        }

        for warning in warnings {
            self.client.log_message(MessageType::WARNING, warning).await;
        }
        self.log_project_errors().await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: SOURCE_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            offset_encoding: None,
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions::default()),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                declaration_provider: Some(DeclarationCapability::Simple(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..ServerCapabilities::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.register_watchers();
    }

    async fn shutdown(&self) -> Result<()> {
        let mut tasks = {
            let mut state = self.lock_state();
            state.tasks.cancel_all();
            std::mem::take(&mut state.tasks)
        };
        tasks.wait_all().await;
        Ok(())
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        {
            let mut state = self.lock_state();
            for removed in &params.event.removed {
                if let Some(path) = uri_to_path(&removed.uri) {
                    state.remove_workspace(&path);
                }
            }
            for added in &params.event.added {
                if let Some(path) = uri_to_path(&added.uri) {
                    state.load_workspace(&path);
                }
            }
        }
        self.log_project_errors().await;
        self.register_watchers();
        self.republish_managed().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut state = self.lock_state();
            state.open(&uri, &params.text_document.text);
        }
        tracing::debug!(uri = uri.as_str(), "did_open");
        self.schedule_update_and_publish(uri, true);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut state = self.lock_state();
            let Some(project) = state.find_project_mut(&uri) else {
                return;
            };
            let path = uri_to_path(&uri)
                .unwrap_or_else(|| std::path::PathBuf::from(uri.as_str()));
            let Some(file) = project.get_file_mut(&path) else {
                return;
            };
            for change in &params.content_changes {
                file.document_mut().apply_edit(change.range, &change.text);
            }
            // The tree is recomputed before any consumer can read it.
            file.reparse();
        }
        if !self.read_config().only_reload_on_save {
            self.schedule_update_and_publish(uri, false);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let build_root = uri_to_path(&uri).and_then(|path| {
            let name = path.file_name()?.to_str()?;
            BuildFileKind::from_file_name(name)?;
            path.parent().map(Path::to_path_buf)
        });

        match build_root {
            Some(root) => {
                {
                    let mut state = self.lock_state();
                    state.try_init_project(&root);
                }
                self.log_project_errors().await;
                self.register_watchers();
                self.republish_managed().await;
            }
            None => self.schedule_update_and_publish(uri, true),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut state = self.lock_state();
            state.close(&uri);
        }
        self.client
            .publish_diagnostics(uri, Vec::new(), None)
            .await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        {
            let mut state = self.lock_state();
            state.apply_file_events(&params.changes);
        }
        self.log_project_errors().await;
        self.register_watchers();
        self.republish_managed().await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        if let Some(snapshot) = self.snapshot(&uri) {
            let items = handlers::completion::completion(&snapshot, position);
            return Ok(Some(CompletionResponse::Array(items)));
        }

        // Build files complete config keys off the node tree.
        let items = {
            let state = self.lock_state();
            state
                .find_project_and_file(&uri)
                .and_then(|(_, file)| file.as_build().map(|b| (b.document.clone(), b.clone())))
                .map(|(document, build)| {
                    handlers::completion::build_file_completion(&document, &build, position)
                })
        };
        Ok(items.map(CompletionResponse::Array))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(snapshot) = self.snapshot(&uri) else {
            self.log_unknown_uri(&uri).await;
            return Ok(None);
        };
        Ok(handlers::hover::hover(&snapshot, position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(snapshot) = self.snapshot(&uri) else {
            self.log_unknown_uri(&uri).await;
            return Ok(None);
        };
        Ok(handlers::definition::definition(&snapshot, position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn goto_declaration(
        &self,
        params: GotoDeclarationParams,
    ) -> Result<Option<GotoDeclarationResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(snapshot) = self.snapshot(&uri) else {
            self.log_unknown_uri(&uri).await;
            return Ok(None);
        };
        Ok(handlers::definition::definition(&snapshot, position)
            .map(GotoDeclarationResponse::Scalar))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let Some(snapshot) = self.snapshot(&params.text_document.uri) else {
            self.log_unknown_uri(&params.text_document.uri).await;
            return Ok(None);
        };
        Ok(Some(DocumentSymbolResponse::Nested(
            handlers::symbols::document_symbols(&snapshot),
        )))
    }

    async fn formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let document = {
            let state = self.lock_state();
            state
                .find_project_and_file(&params.text_document.uri)
                .map(|(_, file)| file.document().clone())
        };
        let Some(document) = document else {
            self.log_unknown_uri(&params.text_document.uri).await;
            return Ok(None);
        };
        Ok(Some(format_edits(&document, self.formatter.as_ref())))
    }

    async fn code_action(&self, _params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        // Code-action implementations live on the client side; the server
        // just advertises the capability.
        Ok(Some(Vec::new()))
    }
}

/// Build the LSP service with the `smithy/*` extension methods attached.
pub fn lsp_service() -> (LspService<Backend>, ClientSocket) {
    LspService::build(Backend::new)
        .custom_method("smithy/jarFileContents", Backend::jar_file_contents)
        .custom_method("smithy/selectorCommand", Backend::selector_command)
        .custom_method("smithy/serverStatus", Backend::server_status)
        .finish()
}

/// Serve over stdio.
pub async fn run_stdio() {
    let (service, socket) = lsp_service();
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}

/// Bind `localhost:<port>` and serve the first accepted connection.
pub async fn run_tcp(port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let (stream, _) = listener.accept().await?;
    let (read, write) = tokio::io::split(stream);
    let (service, socket) = lsp_service();
    Server::new(read, write, socket).serve(service).await;
    Ok(())
}
