//! A language server for the Smithy IDL: project discovery from build
//! config, incrementally-updated documents and parse trees, a validated
//! semantic model kept in sync with edits, and the LSP feature handlers
//! on top.

pub mod document;
pub mod handlers;
pub mod jar;
pub mod logging;
pub mod model;
pub mod project;
pub mod server;
pub mod state;
pub mod syntax;
pub mod tasks;
pub mod uri;
pub mod workspace;
