mod common;

use std::io::Write as _;

use common::lsp_client::TestClient;

/// `smithy/selectorCommand` returns matching shape locations in model
/// source order.
#[tokio::test]
async fn selector_command_finds_structures() {
    let dir = tempfile::tempdir().unwrap();
    let (a_uri, b_uri) = common::write_model_workspace(dir.path());

    let mut client = TestClient::new();
    client
        .initialize_with(
            serde_json::Value::Null,
            &[&common::lsp_client::file_uri(
                &dir.path().display().to_string(),
            )],
        )
        .await;

    let result = client
        .request(
            "smithy/selectorCommand",
            serde_json::json!({"expression": "structure"}),
        )
        .await;
    let locations = result.as_array().unwrap();
    assert_eq!(locations.len(), 2, "got: {locations:?}");
    assert_eq!(locations[0]["uri"], a_uri);
    assert_eq!(locations[1]["uri"], b_uri);
}

/// An invalid selector logs an error and returns an empty list.
#[tokio::test]
async fn selector_command_invalid_expression_is_empty() {
    let mut client = TestClient::new();
    client.initialize().await;
    let result = client
        .request(
            "smithy/selectorCommand",
            serde_json::json!({"expression": ":frobnicate(x)"}),
        )
        .await;
    assert_eq!(result, serde_json::json!([]));
}

/// `smithy/jarFileContents` reads an entry out of a jar on demand.
#[tokio::test]
async fn jar_file_contents_reads_entry() {
    let dir = tempfile::tempdir().unwrap();
    let jar_path = dir.path().join("dep.jar");
    let file = std::fs::File::create(&jar_path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("META-INF/smithy/lib.smithy", options).unwrap();
    zip.write_all(b"$version: \"2\"\nnamespace lib\nstructure Widget {}\n")
        .unwrap();
    zip.finish().unwrap();

    let mut client = TestClient::new();
    client.initialize().await;

    let jar_uri = format!(
        "smithyjar:{}!/META-INF/smithy/lib.smithy",
        jar_path.display()
    );
    let result = client
        .request(
            "smithy/jarFileContents",
            serde_json::json!({"uri": jar_uri}),
        )
        .await;
    assert!(
        result.as_str().unwrap().contains("structure Widget"),
        "got: {result}"
    );
}

/// `smithy/serverStatus` reports projects with their files and kinds.
#[tokio::test]
async fn server_status_reports_projects() {
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

    // One normal project from the workspace, one detached orphan.
    client
        .did_open(
            "file:///tmp/status-orphan.smithy",
            "$version: \"2\"\nnamespace demo\nstructure Lone {}\n",
        )
        .await;
    client
        .recv_diagnostics_for("file:///tmp/status-orphan.smithy")
        .await;

    let status = client
        .request("smithy/serverStatus", serde_json::json!(null))
        .await;
    let projects = status["openProjects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert!(projects.iter().any(|p| p["isDetached"] == false));
    assert!(
        projects
            .iter()
            .any(|p| p["isDetached"] == true
                && p["root"] == "file:///tmp/status-orphan.smithy")
    );
}

/// Watched-file events route created files into the project and refresh
/// diagnostics for open documents.
#[tokio::test]
async fn watched_file_creation_extends_model() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model_workspace(dir.path());
    let c_path = dir.path().join("model/c.smithy");
    let c_uri = common::lsp_client::file_uri(&c_path.display().to_string());

    let mut client = TestClient::new();
    client
        .initialize_with(
            serde_json::Value::Null,
            &[&common::lsp_client::file_uri(
                &dir.path().display().to_string(),
            )],
        )
        .await;

    // A file referencing a shape that doesn't exist yet. Created after
    // init, so it opens detached first.
    let d_path = dir.path().join("model/d.smithy");
    let d_uri = common::lsp_client::file_uri(&d_path.display().to_string());
    common::write(
        &d_path,
        "$version: \"2\"\nnamespace demo\nstructure D { c: C }\n",
    );
    client
        .did_open(&d_uri, "$version: \"2\"\nnamespace demo\nstructure D { c: C }\n")
        .await;
    let opened = client.recv_diagnostics_for(&d_uri).await;
    assert_eq!(
        opened["params"]["diagnostics"].as_array().unwrap().len(),
        1,
        "C is not defined yet"
    );

    // Its creation event folds it into the workspace project.
    client
        .send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "workspace/didChangeWatchedFiles",
            "params": {"changes": [{"uri": d_uri, "type": 1}]}
        }))
        .await;
    let before = client.recv_diagnostics_for(&d_uri).await;
    assert_eq!(
        before["params"]["diagnostics"].as_array().unwrap().len(),
        1,
        "C is still undefined"
    );

    // Create c.smithy on disk and notify.
    common::write(&c_path, "$version: \"2\"\nnamespace demo\nstructure C {}\n");
    client
        .send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "workspace/didChangeWatchedFiles",
            "params": {"changes": [{"uri": c_uri, "type": 1}]}
        }))
        .await;

    let after = client.recv_diagnostics_for(&d_uri).await;
    assert_eq!(
        after["params"]["diagnostics"].as_array().unwrap().len(),
        0,
        "C resolves once its file joins the project"
    );
}
