#![allow(dead_code)]

pub mod lsp_client;

use std::path::Path;

/// Write a file, creating parent directories.
pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub const FOO_SMITHY: &str = "$version: \"2\"\nnamespace demo\nstructure Foo {}\n";
pub const BAR_SMITHY: &str = "$version: \"2\"\nnamespace demo\nstructure Bar { foo: Foo }\n";

/// A two-file workspace: `model/a.smithy` defines `Foo`, `model/b.smithy`
/// references it. Returns the `file://` URIs of (a, b).
pub fn write_model_workspace(dir: &Path) -> (String, String) {
    write(
        &dir.join("smithy-build.json"),
        r#"{"version": "1.0", "sources": ["model/"]}"#,
    );
    let a = dir.join("model/a.smithy");
    let b = dir.join("model/b.smithy");
    write(&a, FOO_SMITHY);
    write(&b, BAR_SMITHY);
    (
        lsp_client::file_uri(&a.display().to_string()),
        lsp_client::file_uri(&b.display().to_string()),
    )
}
