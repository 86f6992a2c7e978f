//! Go-to-definition (and declaration, which is the same lookup).

use tower_lsp_server::ls_types::{Location, Position};

use crate::project::{DocumentShapeKind, document_shape_at};
use crate::uri::source_key_to_uri;

use super::FileSnapshot;

/// Resolve the shape-name token at `position` to the location where the
/// shape is defined. Prelude shapes have no source and yield `None`.
pub fn definition(snapshot: &FileSnapshot, position: Position) -> Option<Location> {
    let offset = snapshot.document.position_to_offset(position);
    let occurrence = document_shape_at(&snapshot.shapes, offset)?;

    let shape = match occurrence.kind {
        // Member names and elided members resolve through the member's own
        // id; definition on a definition points at itself.
        DocumentShapeKind::DefinedShape | DocumentShapeKind::Inline => {
            let id = snapshot.defined_id(occurrence)?;
            snapshot
                .model
                .shape(&id)
                .or_else(|| snapshot.resolve_shape(occurrence))?
        }
        _ => snapshot.resolve_shape(occurrence)?,
    };

    let source = shape.source.as_ref()?;
    let uri = source_key_to_uri(&source.file)?;
    Some(Location {
        uri,
        range: source.range,
    })
}
