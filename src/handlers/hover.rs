//! Hover: render the shape under the cursor as reconstructed IDL.

use tower_lsp_server::ls_types::{
    Hover, HoverContents, MarkupContent, MarkupKind, Position,
};

use crate::model::{Shape, ShapeId, ValidatedModel};
use crate::project::document_shape_at;
use crate::syntax::ShapeType;

use super::FileSnapshot;

pub fn hover(snapshot: &FileSnapshot, position: Position) -> Option<Hover> {
    let offset = snapshot.document.position_to_offset(position);
    let occurrence = document_shape_at(&snapshot.shapes, offset)?;
    let shape = snapshot.resolve_shape(occurrence)?;

    // Hovering a member shows its containing shape with the member in
    // context.
    let rendered = if shape.id.is_member() {
        let root = shape.id.root();
        let container = snapshot.model.shape(&root)?;
        render_shape(&snapshot.model, container)
    } else {
        render_shape(&snapshot.model, shape)
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```smithy\nnamespace {}\n\n{rendered}```", shape.id.namespace()),
        }),
        range: Some(snapshot.document.span_to_range(occurrence.span)),
    })
}

/// Reconstruct a shape's IDL definition from the model.
pub fn render_shape(model: &ValidatedModel, shape: &Shape) -> String {
    let mut out = String::new();
    for applied in &shape.traits {
        out.push('@');
        out.push_str(&display_name(&shape.id, &applied.id));
        if !applied.value.is_null() {
            out.push('(');
            out.push_str(&render_trait_value(&applied.value));
            out.push(')');
        }
        out.push('\n');
    }
    out.push_str(shape.shape_type.keyword());
    out.push(' ');
    out.push_str(shape.id.name());
    if shape.shape_type.is_simple() || shape.members.is_empty() {
        out.push('\n');
        return out;
    }
    out.push_str(" {\n");
    for member_id in &shape.members {
        let Some(member) = model.shape(member_id) else {
            continue;
        };
        let Some(name) = member_id.member_name() else {
            continue;
        };
        match &member.target {
            Some(target) if !is_enum_container(shape.shape_type) => {
                out.push_str(&format!(
                    "    {name}: {}\n",
                    display_name(&shape.id, target)
                ));
            }
            _ => out.push_str(&format!("    {name}\n")),
        }
    }
    out.push_str("}\n");
    out
}

fn is_enum_container(shape_type: ShapeType) -> bool {
    matches!(shape_type, ShapeType::Enum | ShapeType::IntEnum)
}

/// Short name when the target is in the same namespace or the prelude,
/// absolute otherwise.
fn display_name(context: &ShapeId, target: &ShapeId) -> String {
    if target.is_prelude() || target.namespace() == context.namespace() {
        target.name().to_string()
    } else {
        target.absolute().to_string()
    }
}

fn render_trait_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
