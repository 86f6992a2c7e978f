mod common;

use common::lsp_client::TestClient;

const BODY: &str = "$version: \"2\"\nnamespace demo\nstructure Foo {\n    bar: String\n}\nstructure Other { f: Foo }\n";

async fn open_detached(client: &mut TestClient, uri: &str, body: &str) {
    client.did_open(uri, body).await;
    client.recv_diagnostics_for(uri).await;
}

#[tokio::test]
async fn hover_renders_shape() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/hover.smithy";
    open_detached(&mut client, uri, BODY).await;

    // Hover the `Foo` reference on line 5: `structure Other { f: Foo }`.
    let result = client.hover(uri, 5, 22).await;
    let value = result["contents"]["value"].as_str().unwrap();
    assert!(value.contains("```smithy"), "got: {value}");
    assert!(value.contains("structure Foo"));
    assert!(value.contains("bar: String"));
}

#[tokio::test]
async fn hover_on_nothing_is_null() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/hover-null.smithy";
    open_detached(&mut client, uri, BODY).await;
    let result = client.hover(uri, 2, 9).await;
    assert!(result.is_null());
}

#[tokio::test]
async fn completion_in_member_target_position() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/completion.smithy";
    let body = "$version: \"2\"\nnamespace demo\nstructure Widget {}\nstructure Foo {\n    bar: Wid\n}\n";
    open_detached(&mut client, uri, body).await;

    // Cursor at the end of the partial target `Wid` on line 4.
    let result = client.completion(uri, 4, 12).await;
    let items = result.as_array().unwrap();
    let labels: Vec<&str> = items
        .iter()
        .map(|i| i["label"].as_str().unwrap())
        .collect();
    assert!(labels.contains(&"Widget"), "got: {labels:?}");
}

#[tokio::test]
async fn completion_offers_keywords_at_top_level() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/completion-kw.smithy";
    let body = "$version: \"2\"\nnamespace demo\nstru\n";
    open_detached(&mut client, uri, body).await;

    let result = client.completion(uri, 2, 4).await;
    let items = result.as_array().unwrap();
    assert!(
        items
            .iter()
            .any(|i| i["label"] == "structure" && i["kind"] == 14),
        "got: {items:?}"
    );
}

#[tokio::test]
async fn build_file_key_completion() {
    let dir = tempfile::tempdir().unwrap();
    common::write_model_workspace(dir.path());
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

    // Inside the "version" key of {"version": "1.0", ...}.
    let result = client.completion(&build_uri, 0, 3).await;
    let items = result.as_array().unwrap();
    let labels: Vec<&str> = items
        .iter()
        .map(|i| i["label"].as_str().unwrap())
        .collect();
    assert!(labels.contains(&"sources"), "got: {labels:?}");
    assert!(labels.contains(&"maven"), "got: {labels:?}");
}

#[tokio::test]
async fn document_symbols_nest_members() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/symbols.smithy";
    open_detached(&mut client, uri, BODY).await;

    let result = client.document_symbol(uri).await;
    let symbols = result.as_array().unwrap();
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0]["name"], "Foo");
    let children = symbols[0]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["name"], "bar");
    assert_eq!(children[0]["detail"], "String");
    assert_eq!(symbols[1]["name"], "Other");
}

/// Symbols still work when the model is broken: they come off the parse
/// tree.
#[tokio::test]
async fn document_symbols_survive_unresolved_model() {
    let mut client = TestClient::new();
    client.initialize().await;
    let uri = "file:///tmp/symbols-broken.smithy";
    open_detached(
        &mut client,
        uri,
        "$version: \"2\"\nnamespace demo\nstructure Foo { bar: Missing }\n",
    )
    .await;

    let result = client.document_symbol(uri).await;
    let symbols = result.as_array().unwrap();
    assert_eq!(symbols[0]["name"], "Foo");
}
