//! Feature handlers. Each consumes an immutable [`FileSnapshot`] taken
//! under the endpoint's lock and computes its result without touching
//! shared state; a missing model or unknown position yields the empty
//! result, never an error.

pub mod completion;
pub mod definition;
pub mod formatting;
pub mod hover;
pub mod symbols;

use std::sync::Arc;

use crate::document::Document;
use crate::model::{Shape, ShapeId, ValidatedModel};
use crate::project::{DocumentShape, IdlFile};
use crate::syntax::IdlParse;

/// An immutable view of one IDL file plus its project's model.
#[derive(Clone)]
pub struct FileSnapshot {
    pub document: Document,
    pub parse: Arc<IdlParse>,
    pub shapes: Arc<Vec<DocumentShape>>,
    pub model: Arc<ValidatedModel>,
}

impl FileSnapshot {
    pub fn of(file: &IdlFile, model: Arc<ValidatedModel>) -> Self {
        Self {
            document: file.document.clone(),
            parse: Arc::clone(&file.parse),
            shapes: Arc::clone(&file.shapes),
            model,
        }
    }

    /// Resolve a shape-name occurrence to its model shape, following the
    /// file's namespace and `use` imports.
    pub fn resolve_shape(&self, occurrence: &DocumentShape) -> Option<&Shape> {
        let preamble = &self.parse.preamble;
        let id = self
            .model
            .resolve_name(
                &occurrence.text,
                preamble.namespace.as_ref().map(|n| n.text.as_str()),
                &preamble.uses,
            )
            .ok()?;
        self.model.shape(&id)
    }

    /// The id a definition occurrence defines, from the file's namespace.
    pub fn defined_id(&self, occurrence: &DocumentShape) -> Option<ShapeId> {
        let namespace = self.parse.preamble.namespace.as_ref()?;
        Some(ShapeId::new(&namespace.text, &occurrence.text))
    }
}
