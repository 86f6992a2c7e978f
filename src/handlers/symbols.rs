//! Document symbols: one entry per defined shape, members nested beneath,
//! driven by the parse tree so it works even with a broken model.

use std::collections::HashMap;

use tower_lsp_server::ls_types::{DocumentSymbol, SymbolKind};

use crate::document::Span;
use crate::syntax::{MemberForm, ShapeType, Statement};

use super::FileSnapshot;

pub fn document_symbols(snapshot: &FileSnapshot) -> Vec<DocumentSymbol> {
    let parse = &snapshot.parse;
    let mut symbols: HashMap<usize, DocumentSymbol> = HashMap::new();
    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for (index, statement) in parse.statements.iter().enumerate() {
        let symbol = match statement {
            Statement::ShapeDef(def) => {
                let full = def
                    .body_span
                    .map(|body| def.span.cover(body))
                    .unwrap_or(def.span);
                Some(new_symbol(
                    snapshot,
                    &def.name.text,
                    Some(def.shape_type.keyword().to_string()),
                    symbol_kind(def.shape_type),
                    full,
                    def.name.span,
                ))
            }
            Statement::MemberDef(def) => {
                let full = def
                    .body_span
                    .map(|body| def.span.cover(body))
                    .unwrap_or(def.span);
                let kind = if def.form == MemberForm::Bare {
                    SymbolKind::ENUM_MEMBER
                } else {
                    SymbolKind::FIELD
                };
                Some(new_symbol(
                    snapshot,
                    &def.name.text,
                    def.target.as_ref().map(|t| t.text.clone()),
                    kind,
                    full,
                    def.name.span,
                ))
            }
            _ => None,
        };

        let Some(symbol) = symbol else {
            continue;
        };
        symbols.insert(index, symbol);

        // Attach to the nearest enclosing statement that produced a symbol
        // (inline members nest their body's members one level deeper).
        let mut parent = parse.parents[index];
        while let Some(p) = parent {
            if symbols.contains_key(&p) {
                break;
            }
            parent = parse.parents[p];
        }
        match parent {
            Some(p) => children_of.entry(p).or_default().push(index),
            None => roots.push(index),
        }
    }

    // Parents precede children in statement order, so a reverse pass builds
    // every subtree before its parent needs it.
    for index in (0..parse.statements.len()).rev() {
        if let Some(kids) = children_of.remove(&index) {
            let children: Vec<DocumentSymbol> = kids
                .into_iter()
                .filter_map(|k| symbols.remove(&k))
                .collect();
            if let Some(symbol) = symbols.get_mut(&index) {
                if !children.is_empty() {
                    symbol.children = Some(children);
                }
            }
        }
    }

    roots
        .into_iter()
        .filter_map(|index| symbols.remove(&index))
        .collect()
}

#[allow(deprecated)]
fn new_symbol(
    snapshot: &FileSnapshot,
    name: &str,
    detail: Option<String>,
    kind: SymbolKind,
    full: Span,
    selection: Span,
) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        tags: None,
        deprecated: None,
        range: snapshot.document.span_to_range(full),
        selection_range: snapshot.document.span_to_range(selection),
        children: None,
    }
}

fn symbol_kind(shape_type: ShapeType) -> SymbolKind {
    match shape_type {
        ShapeType::Structure => SymbolKind::STRUCT,
        ShapeType::Union | ShapeType::Enum | ShapeType::IntEnum => SymbolKind::ENUM,
        ShapeType::Service | ShapeType::Resource => SymbolKind::MODULE,
        ShapeType::Operation => SymbolKind::FUNCTION,
        ShapeType::String => SymbolKind::STRING,
        ShapeType::Boolean => SymbolKind::BOOLEAN,
        ShapeType::Byte
        | ShapeType::Short
        | ShapeType::Integer
        | ShapeType::Long
        | ShapeType::Float
        | ShapeType::Double
        | ShapeType::BigInteger
        | ShapeType::BigDecimal => SymbolKind::NUMBER,
        _ => SymbolKind::CLASS,
    }
}
