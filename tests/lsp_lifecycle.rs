mod common;

use common::lsp_client::TestClient;

/// Capabilities advertised on initialize.
#[tokio::test]
async fn initialize_advertises_capabilities() {
    let mut client = TestClient::new();
    let result = client.initialize().await;
    let caps = &result["capabilities"];

    // 2 = Incremental text sync.
    assert_eq!(caps["textDocumentSync"], 2);
    assert!(caps["completionProvider"].is_object());
    assert_eq!(caps["hoverProvider"], true);
    assert_eq!(caps["definitionProvider"], true);
    assert_eq!(caps["declarationProvider"], true);
    assert_eq!(caps["codeActionProvider"], true);
    assert_eq!(caps["documentSymbolProvider"], true);
    assert_eq!(caps["documentFormattingProvider"], true);
    assert_eq!(
        caps["workspace"]["workspaceFolders"]["supported"],
        true
    );
    assert_eq!(result["serverInfo"]["name"], "smithy-language-server");
}

#[tokio::test]
async fn server_status_starts_empty() {
    let mut client = TestClient::new();
    client.initialize().await;
    let status = client
        .request("smithy/serverStatus", serde_json::json!(null))
        .await;
    assert_eq!(status["openProjects"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn initialize_loads_workspace_projects() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model_workspace(dir.path());

    let mut client = TestClient::new();
    client
        .initialize_with(
            serde_json::Value::Null,
            &[&common::lsp_client::file_uri(
                &dir.path().display().to_string(),
            )],
        )
        .await;

    let status = client
        .request("smithy/serverStatus", serde_json::json!(null))
        .await;
    let projects = status["openProjects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["isDetached"], false);
    // Two model files plus smithy-build.json.
    assert_eq!(projects[0]["files"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn shutdown_responds() {
    let mut client = TestClient::new();
    client.initialize().await;
    client.shutdown().await;
}

/// Formatting returns no edits from the bundled passthrough formatter.
#[tokio::test]
async fn formatting_returns_no_edits() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/fmt-test.smithy";
    client
        .did_open(uri, "$version: \"2\"\nnamespace demo\nstructure Foo {}\n")
        .await;
    let result = client
        .request(
            "textDocument/formatting",
            serde_json::json!({
                "textDocument": {"uri": uri},
                "options": {"tabSize": 4, "insertSpaces": true}
            }),
        )
        .await;
    assert_eq!(result, serde_json::json!([]));
}

/// Code actions are advertised but implemented client-side.
#[tokio::test]
async fn code_action_returns_empty() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/ca-test.smithy";
    client
        .did_open(uri, "$version: \"2\"\nnamespace demo\nstructure Foo {}\n")
        .await;
    let result = client
        .request(
            "textDocument/codeAction",
            serde_json::json!({
                "textDocument": {"uri": uri},
                "range": {
                    "start": {"line": 0, "character": 0},
                    "end": {"line": 0, "character": 0}
                },
                "context": {"diagnostics": []}
            }),
        )
        .await;
    assert_eq!(result, serde_json::json!([]));
}
