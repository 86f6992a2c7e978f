#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tower_lsp_server::Server;

use smithy_ls::server::lsp_service;

/// In-process LSP test client backed by `tokio::io::duplex`.
///
/// The server runs in a background task on the same tokio runtime, with the
/// `smithy/*` extension methods attached.
pub struct TestClient {
    write: tokio::io::DuplexStream,
    read: BufReader<tokio::io::DuplexStream>,
    _server: tokio::task::JoinHandle<()>,
    next_id: AtomicI64,
}

impl TestClient {
    pub fn new() -> Self {
        // Two duplex pairs: (client→server) and (server→client).
        let (client_write, server_read) = tokio::io::duplex(65536);
        let (server_write, client_read) = tokio::io::duplex(65536);

        let (service, socket) = lsp_service();
        let server_handle = tokio::spawn(async move {
            Server::new(server_read, server_write, socket)
                .serve(service)
                .await;
        });

        Self {
            write: client_write,
            read: BufReader::new(client_read),
            _server: server_handle,
            next_id: AtomicI64::new(1),
        }
    }

    /// Send a raw JSON-RPC message (request or notification) with LSP framing.
    pub async fn send(&mut self, msg: serde_json::Value) {
        let json = serde_json::to_string(&msg).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", json.len());
        self.write.write_all(header.as_bytes()).await.unwrap();
        self.write.write_all(json.as_bytes()).await.unwrap();
        self.write.flush().await.unwrap();
    }

    /// Receive the next LSP-framed JSON-RPC message. Server-to-client
    /// requests (e.g. `client/registerCapability`) are answered with a null
    /// result and skipped.
    pub async fn recv(&mut self) -> serde_json::Value {
        loop {
            let msg = self.recv_raw().await;
            if msg.get("id").is_some() && msg.get("method").is_some() {
                self.send(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": msg["id"],
                    "result": null
                }))
                .await;
                continue;
            }
            return msg;
        }
    }

    async fn recv_raw(&mut self) -> serde_json::Value {
        let mut content_length: usize = 0;
        loop {
            let mut line = String::new();
            self.read.read_line(&mut line).await.unwrap();
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            if let Some(len_str) = line.strip_prefix("Content-Length: ") {
                content_length = len_str.trim().parse().unwrap();
            }
        }
        let mut body = vec![0u8; content_length];
        self.read.read_exact(&mut body).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Receive messages, discarding everything except the first with the
    /// given `method` field.
    pub async fn recv_notification(&mut self, method: &str) -> serde_json::Value {
        loop {
            let msg = self.recv().await;
            if msg["method"].as_str() == Some(method) {
                return msg;
            }
        }
    }

    /// Receive until a `publishDiagnostics` notification for `uri` arrives.
    pub async fn recv_diagnostics_for(&mut self, uri: &str) -> serde_json::Value {
        loop {
            let msg = self.recv_notification("textDocument/publishDiagnostics").await;
            if msg["params"]["uri"].as_str() == Some(uri) {
                return msg;
            }
        }
    }

    /// Like `recv`, but gives up after `wait`. Used to assert that no
    /// further message of a kind arrives.
    pub async fn try_recv_notification(
        &mut self,
        method: &str,
        wait: Duration,
    ) -> Option<serde_json::Value> {
        tokio::time::timeout(wait, self.recv_notification(method))
            .await
            .ok()
    }

    /// Send a request and wait for its response, skipping notifications and
    /// server-to-client requests.
    pub async fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }))
        .await;

        let response = loop {
            let msg = self.recv().await;
            if msg.get("id") == Some(&serde_json::json!(id)) && msg.get("method").is_none() {
                break msg;
            }
        };
        response["result"].clone()
    }

    /// Send `initialize` + `initialized`; returns the `InitializeResult`.
    pub async fn initialize(&mut self) -> serde_json::Value {
        self.initialize_with(serde_json::Value::Null, &[]).await
    }

    /// `initialize` with initializationOptions and workspace folders.
    pub async fn initialize_with(
        &mut self,
        initialization_options: serde_json::Value,
        workspace_folders: &[&str],
    ) -> serde_json::Value {
        let folders: Vec<serde_json::Value> = workspace_folders
            .iter()
            .map(|uri| serde_json::json!({"uri": uri, "name": "ws"}))
            .collect();
        let result = self
            .request(
                "initialize",
                serde_json::json!({
                    "capabilities": {},
                    "processId": null,
                    "rootUri": null,
                    "initializationOptions": initialization_options,
                    "workspaceFolders": folders
                }),
            )
            .await;

        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "initialized",
            "params": {}
        }))
        .await;

        result
    }

    pub async fn did_open(&mut self, uri: &str, text: &str) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": {
                "textDocument": {
                    "uri": uri,
                    "languageId": "smithy",
                    "version": 1,
                    "text": text
                }
            }
        }))
        .await;
    }

    /// Full-content replacement.
    pub async fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didChange",
            "params": {
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": [{"text": text}]
            }
        }))
        .await;
    }

    /// Incremental range edit.
    pub async fn did_change_range(
        &mut self,
        uri: &str,
        version: i32,
        start: (u32, u32),
        end: (u32, u32),
        text: &str,
    ) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didChange",
            "params": {
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": [{
                    "range": {
                        "start": {"line": start.0, "character": start.1},
                        "end": {"line": end.0, "character": end.1}
                    },
                    "text": text
                }]
            }
        }))
        .await;
    }

    pub async fn did_save(&mut self, uri: &str) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didSave",
            "params": {
                "textDocument": {"uri": uri}
            }
        }))
        .await;
    }

    pub async fn did_close(&mut self, uri: &str) {
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didClose",
            "params": {
                "textDocument": {"uri": uri}
            }
        }))
        .await;
    }

    pub async fn definition(&mut self, uri: &str, line: u32, character: u32) -> serde_json::Value {
        self.request(
            "textDocument/definition",
            serde_json::json!({
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }),
        )
        .await
    }

    pub async fn hover(&mut self, uri: &str, line: u32, character: u32) -> serde_json::Value {
        self.request(
            "textDocument/hover",
            serde_json::json!({
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }),
        )
        .await
    }

    pub async fn completion(&mut self, uri: &str, line: u32, character: u32) -> serde_json::Value {
        self.request(
            "textDocument/completion",
            serde_json::json!({
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }),
        )
        .await
    }

    pub async fn document_symbol(&mut self, uri: &str) -> serde_json::Value {
        self.request(
            "textDocument/documentSymbol",
            serde_json::json!({"textDocument": {"uri": uri}}),
        )
        .await
    }

    pub async fn shutdown(&mut self) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "shutdown",
            "params": null
        }))
        .await;
        let _ = self.recv().await;
    }
}

/// Convenience: build a `file://` URI from an absolute path string.
pub fn file_uri(path: &str) -> String {
    format!("file://{path}")
}
