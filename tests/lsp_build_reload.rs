mod common;

use common::lsp_client::TestClient;

/// Saving a changed smithy-build.json reloads the project. A previously
/// opened file that the new config drops becomes a detached project, and
/// its diagnostics are recomputed against just its own content.
#[tokio::test]
async fn build_file_save_detaches_dropped_files() {
    let dir = tempfile::tempdir().unwrap();
    let (a_uri, _b_uri) = common::write_model_workspace(dir.path());
    let build_path = dir.path().join("smithy-build.json");
    let build_uri = common::lsp_client::file_uri(&build_path.display().to_string());

    let mut client = TestClient::new();
    client
        .initialize_with(
            serde_json::Value::Null,
            &[&common::lsp_client::file_uri(
                &dir.path().display().to_string(),
            )],
        )
        .await;

    client.did_open(&a_uri, common::FOO_SMITHY).await;
    let opened = client.recv_diagnostics_for(&a_uri).await;
    assert_eq!(opened["params"]["diagnostics"].as_array().unwrap().len(), 0);

    // Drop model/ from sources on disk, then save the build file.
    common::write(&build_path, r#"{"version": "1.0", "sources": []}"#);
    client.did_save(&build_uri).await;

    // The reload republishes a.smithy's diagnostics, recomputed against
    // its own content only.
    let republished = client.recv_diagnostics_for(&a_uri).await;
    assert_eq!(
        republished["params"]["diagnostics"].as_array().unwrap().len(),
        0
    );

    let status = client
        .request("smithy/serverStatus", serde_json::json!(null))
        .await;
    let projects = status["openProjects"].as_array().unwrap();
    let detached: Vec<_> = projects
        .iter()
        .filter(|p| p["isDetached"] == true)
        .collect();
    assert_eq!(detached.len(), 1, "got: {projects:?}");
    assert_eq!(detached[0]["root"], a_uri);
}

/// A dropped file whose content depends on the rest of the project gains
/// diagnostics once it stands alone.
#[tokio::test]
async fn detached_file_revalidates_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (_a_uri, b_uri) = common::write_model_workspace(dir.path());
    let build_path = dir.path().join("smithy-build.json");
    let build_uri = common::lsp_client::file_uri(&build_path.display().to_string());

    let mut client = TestClient::new();
    client
        .initialize_with(
            serde_json::Value::Null,
            &[&common::lsp_client::file_uri(
                &dir.path().display().to_string(),
            )],
        )
        .await;

    // b.smithy references Foo from a.smithy; fine while in the project.
    client.did_open(&b_uri, common::BAR_SMITHY).await;
    let opened = client.recv_diagnostics_for(&b_uri).await;
    assert_eq!(opened["params"]["diagnostics"].as_array().unwrap().len(), 0);

    common::write(&build_path, r#"{"version": "1.0", "sources": []}"#);
    client.did_save(&build_uri).await;

    // Standing alone, the `Foo` reference no longer resolves.
    let republished = client.recv_diagnostics_for(&b_uri).await;
    let diagnostics = republished["params"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1, "got: {diagnostics:?}");
    assert!(
        diagnostics[0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Model: ")
    );
}
