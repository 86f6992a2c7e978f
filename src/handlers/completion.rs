//! Completion for IDL files (shape targets, traits, keywords) and for
//! build files (config keys).

use tower_lsp_server::ls_types::{
    CompletionItem, CompletionItemKind, Position,
};

use crate::document::Document;
use crate::model::{Shape, ShapeId, ValidatedModel};
use crate::project::BuildFile;
use crate::project::config::BuildFileKind;
use crate::syntax::{MemberForm, ShapeType, Statement, StatementView};

use super::FileSnapshot;

const SHAPE_KEYWORDS: &[&str] = &[
    "structure", "union", "list", "map", "service", "resource", "operation", "enum", "intEnum",
    "string", "integer", "boolean", "blob", "byte", "short", "long", "float", "double",
    "bigInteger", "bigDecimal", "timestamp", "document",
];

const STATEMENT_KEYWORDS: &[&str] = &["use", "metadata", "apply", "namespace"];

/// What kind of identifiers fit at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionContext {
    MemberTarget,
    TraitId,
    MixinId,
    UseTarget,
    Keywords,
}

pub fn completion(snapshot: &FileSnapshot, position: Position) -> Vec<CompletionItem> {
    let offset = snapshot.document.position_to_offset(position);
    let prefix = snapshot
        .document
        .copy_document_id(position)
        .map(|id| id.text)
        .unwrap_or_default();

    let context = completion_context(snapshot, offset);
    let mut items = match context {
        CompletionContext::Keywords => SHAPE_KEYWORDS
            .iter()
            .chain(STATEMENT_KEYWORDS)
            .map(|kw| CompletionItem {
                label: (*kw).to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                ..CompletionItem::default()
            })
            .collect(),
        CompletionContext::MemberTarget => shape_items(snapshot, |_| true),
        CompletionContext::TraitId => {
            let marker = ShapeId::prelude("trait");
            shape_items(snapshot, |shape| shape.has_trait(&marker))
        }
        CompletionContext::MixinId => {
            let marker = ShapeId::prelude("mixin");
            shape_items(snapshot, |shape| shape.has_trait(&marker))
        }
        CompletionContext::UseTarget => all_absolute_items(&snapshot.model),
    };

    if !prefix.is_empty() {
        let lowered = prefix.to_lowercase();
        items.retain(|item| item.label.to_lowercase().starts_with(&lowered));
    }
    items
}

fn completion_context(snapshot: &FileSnapshot, offset: usize) -> CompletionContext {
    let Some(view) = StatementView::at(&snapshot.parse, offset) else {
        return CompletionContext::Keywords;
    };
    match view.statement() {
        Statement::TraitApplication(t) if t.id.span.contains(offset) || t.span.contains(offset) => {
            CompletionContext::TraitId
        }
        Statement::Use(_) => CompletionContext::UseTarget,
        Statement::Mixins(_) => CompletionContext::MixinId,
        Statement::MemberDef(def) => {
            let in_target = def
                .target
                .as_ref()
                .is_some_and(|target| target.span.contains(offset));
            if in_target || (def.form == MemberForm::Explicit && def.target.is_none()) {
                CompletionContext::MemberTarget
            } else if offset > def.name.span.end {
                CompletionContext::MemberTarget
            } else {
                CompletionContext::Keywords
            }
        }
        Statement::ForResource(_) => CompletionContext::MemberTarget,
        Statement::NodeMemberDef(def) if offset > def.key.span.end => {
            CompletionContext::MemberTarget
        }
        _ => CompletionContext::Keywords,
    }
}

/// Shapes visible from this file: the current namespace, `use` imports,
/// and the prelude.
fn shape_items(
    snapshot: &FileSnapshot,
    filter: impl Fn(&Shape) -> bool,
) -> Vec<CompletionItem> {
    let preamble = &snapshot.parse.preamble;
    let mut items = Vec::new();

    if let Some(namespace) = &preamble.namespace {
        for shape in snapshot.model.shapes_in_namespace(&namespace.text) {
            if filter(shape) {
                items.push(shape_item(shape, shape.id.name()));
            }
        }
    }
    for use_id in &preamble.uses {
        if let Some(id) = ShapeId::parse(&use_id.text) {
            if let Some(shape) = snapshot.model.shape(&id) {
                if filter(shape) {
                    items.push(shape_item(shape, id.name()));
                }
            }
        }
    }
    for shape in snapshot.model.shapes_in_namespace(crate::model::PRELUDE_NAMESPACE) {
        if filter(shape) {
            items.push(shape_item(shape, shape.id.name()));
        }
    }
    items
}

fn all_absolute_items(model: &ValidatedModel) -> Vec<CompletionItem> {
    model
        .shapes()
        .filter(|shape| !shape.id.is_member())
        .map(|shape| shape_item(shape, shape.id.absolute()))
        .collect()
}

fn shape_item(shape: &Shape, label: &str) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(completion_kind(shape.shape_type)),
        detail: Some(shape.id.absolute().to_string()),
        ..CompletionItem::default()
    }
}

fn completion_kind(shape_type: ShapeType) -> CompletionItemKind {
    match shape_type {
        ShapeType::Structure | ShapeType::Union => CompletionItemKind::STRUCT,
        ShapeType::Service | ShapeType::Resource => CompletionItemKind::MODULE,
        ShapeType::Operation => CompletionItemKind::FUNCTION,
        ShapeType::Enum | ShapeType::IntEnum => CompletionItemKind::ENUM,
        ShapeType::Member => CompletionItemKind::FIELD,
        _ => CompletionItemKind::CLASS,
    }
}

const SMITHY_BUILD_KEYS: &[&str] = &[
    "version",
    "sources",
    "imports",
    "outputDirectory",
    "maven",
    "projections",
    "plugins",
];
const SMITHY_PROJECT_KEYS: &[&str] =
    &["sources", "imports", "dependencies", "outputDirectory"];
const MAVEN_KEYS: &[&str] = &["dependencies", "repositories"];
const DEPENDENCY_KEYS: &[&str] = &["name", "path"];

/// Key completion for build files, driven by the node-tree path under the
/// cursor. Keys are offered when the cursor sits on a key token (the
/// containing object's known keys) or in an empty object; values get
/// nothing.
pub fn build_file_completion(
    document: &Document,
    file: &BuildFile,
    position: Position,
) -> Vec<CompletionItem> {
    let offset = document.position_to_offset(position);
    let (mut path, _) = file.node.path_at(offset);
    if file.node.key_at(offset).is_some() {
        path.pop();
    } else if !path.is_empty() {
        return Vec::new();
    }

    let path_parts: Vec<&str> = path.iter().map(String::as_str).collect();
    let keys: &[&str] = match (file.kind, path_parts.as_slice()) {
        (BuildFileKind::SmithyBuild, []) => SMITHY_BUILD_KEYS,
        (BuildFileKind::SmithyProject, []) => SMITHY_PROJECT_KEYS,
        (BuildFileKind::SmithyBuild, ["maven"]) => MAVEN_KEYS,
        (BuildFileKind::SmithyProject, ["dependencies"]) => DEPENDENCY_KEYS,
        _ => &[],
    };

    keys.iter()
        .map(|key| CompletionItem {
            label: (*key).to_string(),
            kind: Some(CompletionItemKind::PROPERTY),
            ..CompletionItem::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assembler, AssemblyMode, SourceFile};
    use crate::project::IdlFile;
    use std::sync::Arc;

    fn snapshot(text: &str) -> FileSnapshot {
        let model = Assembler::assemble(
            AssemblyMode::Validate,
            &[SourceFile::new("/m/a.smithy", text)],
        );
        FileSnapshot::of(&IdlFile::new(text), Arc::new(model))
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn member_target_offers_local_and_prelude_shapes() {
        let src = "$version: \"2\"\nnamespace demo\nstructure Other {}\nstructure Foo {\n    bar: Str\n}\n";
        let snap = snapshot(src);
        let offset = src.find("Str\n").unwrap() + 2;
        let items = completion(&snap, snap.document.offset_to_position(offset));
        let labels = labels(&items);
        // Prefix "Str" filters to String (prelude); Other doesn't match.
        assert!(labels.contains(&"String"));
        assert!(!labels.contains(&"Other"));
    }

    #[test]
    fn trait_position_offers_trait_shapes_only() {
        let src = "$version: \"2\"\nnamespace demo\n@req\nstructure Foo {}\n";
        let snap = snapshot(src);
        let offset = src.find("req").unwrap() + 3;
        let items = completion(&snap, snap.document.offset_to_position(offset));
        let labels = labels(&items);
        assert!(labels.contains(&"required"));
        assert!(!labels.contains(&"String"));
    }

    #[test]
    fn top_level_offers_keywords() {
        let src = "$version: \"2\"\nnamespace demo\nstr\n";
        let snap = snapshot(src);
        let offset = src.find("str\n").unwrap() + 3;
        let items = completion(&snap, snap.document.offset_to_position(offset));
        let labels = labels(&items);
        assert!(labels.contains(&"structure"));
        assert!(labels.contains(&"string"));
        assert!(!labels.contains(&"use"));
    }

    #[test]
    fn build_file_top_level_keys() {
        let text = r#"{"": ""}"#;
        let file = BuildFile::new(BuildFileKind::SmithyBuild, text);
        let document = Document::new(text);
        let items = build_file_completion(&document, &file, Position::new(0, 1));
        // Offset 1 is inside the empty key: path resolves at top level.
        assert!(!items.is_empty());
        assert!(items.iter().any(|i| i.label == "sources"));
    }

    #[test]
    fn build_file_maven_keys() {
        let text = r#"{"maven": {"": ""}}"#;
        let file = BuildFile::new(BuildFileKind::SmithyBuild, text);
        let document = Document::new(text);
        let offset = text.find(r#"{"": """#).unwrap() + 2;
        let items =
            build_file_completion(&document, &file, document.offset_to_position(offset));
        assert!(items.iter().any(|i| i.label == "dependencies"));
        assert!(items.iter().any(|i| i.label == "repositories"));
    }
}
