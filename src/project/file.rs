//! Tracked files: IDL files with their parse results and build files with
//! their node trees, plus the DocumentShape index bridging text positions
//! to shape identities.

use std::sync::Arc;

use crate::document::{Document, Span};
use crate::syntax::{
    IdlParse, MemberForm, Node, Statement, parse_idl, parse_json,
};

use super::config::BuildFileKind;

/// How a shape-name token occurs in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShapeKind {
    DefinedShape,
    DefinedMember,
    Elided,
    Targeted,
    Inline,
}

/// One shape-name or member-name token occurrence with its span and the
/// index of the statement it came from. This is the bridge from raw text
/// positions to shape identities when the model is stale or absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentShape {
    pub kind: DocumentShapeKind,
    pub span: Span,
    pub text: String,
    pub statement: usize,
}

impl DocumentShape {
    pub fn is_definition(&self) -> bool {
        matches!(
            self.kind,
            DocumentShapeKind::DefinedShape | DocumentShapeKind::DefinedMember
        )
    }
}

/// Extract every DocumentShape from a parse, in source order.
pub fn extract_document_shapes(parse: &IdlParse) -> Vec<DocumentShape> {
    let mut shapes = Vec::new();
    for (index, statement) in parse.statements.iter().enumerate() {
        let mut push = |kind: DocumentShapeKind, span: Span, text: &str| {
            shapes.push(DocumentShape {
                kind,
                span,
                text: text.to_string(),
                statement: index,
            });
        };
        match statement {
            Statement::ShapeDef(def) => {
                push(DocumentShapeKind::DefinedShape, def.name.span, &def.name.text);
            }
            Statement::MemberDef(def) => {
                let kind = match def.form {
                    MemberForm::Elided => DocumentShapeKind::Elided,
                    MemberForm::Inline => DocumentShapeKind::Inline,
                    _ => DocumentShapeKind::DefinedMember,
                };
                push(kind, def.name.span, &def.name.text);
                if let Some(target) = &def.target {
                    push(DocumentShapeKind::Targeted, target.span, &target.text);
                }
            }
            Statement::TraitApplication(t) => {
                push(DocumentShapeKind::Targeted, t.id.span, &t.id.text);
                if let Some(target) = &t.apply_target {
                    push(DocumentShapeKind::Targeted, target.span, &target.text);
                }
                for reference in &t.refs {
                    push(DocumentShapeKind::Targeted, reference.span, &reference.text);
                }
            }
            Statement::Use(u) => {
                push(DocumentShapeKind::Targeted, u.id.span, &u.id.text);
            }
            Statement::Mixins(m) => {
                for id in &m.ids {
                    push(DocumentShapeKind::Targeted, id.span, &id.text);
                }
            }
            Statement::ForResource(f) => {
                push(DocumentShapeKind::Targeted, f.id.span, &f.id.text);
            }
            Statement::NodeMemberDef(def) => {
                for reference in &def.refs {
                    push(DocumentShapeKind::Targeted, reference.span, &reference.text);
                }
            }
            Statement::Control(_) | Statement::Metadata(_) | Statement::Err(_) => {}
        }
    }
    shapes
}

/// The DocumentShape containing `offset`, if any.
pub fn document_shape_at(shapes: &[DocumentShape], offset: usize) -> Option<&DocumentShape> {
    shapes.iter().find(|shape| shape.span.contains(offset))
}

/// Find a definition occurrence by name, preferring shapes over members.
pub fn find_definition<'a>(
    shapes: &'a [DocumentShape],
    name: &str,
) -> Option<&'a DocumentShape> {
    shapes
        .iter()
        .find(|s| s.kind == DocumentShapeKind::DefinedShape && s.text == name)
        .or_else(|| {
            shapes
                .iter()
                .find(|s| s.is_definition() && s.text == name)
        })
}

/// An IDL file: the document, its parse, and the DocumentShape index.
/// Parse results are immutable snapshots behind `Arc` so read-only handlers
/// can hold them while the document keeps changing.
#[derive(Debug, Clone)]
pub struct IdlFile {
    pub document: Document,
    pub parse: Arc<IdlParse>,
    pub shapes: Arc<Vec<DocumentShape>>,
}

impl IdlFile {
    pub fn new(text: impl Into<String>) -> Self {
        let document = Document::new(text);
        let parse = Arc::new(parse_idl(document.borrow_text()));
        let shapes = Arc::new(extract_document_shapes(&parse));
        Self {
            document,
            parse,
            shapes,
        }
    }

    /// Recompute the parse and shape index from the current text. Called
    /// after every edit, before any consumer reads the tree.
    pub fn reparse(&mut self) {
        self.parse = Arc::new(parse_idl(self.document.borrow_text()));
        self.shapes = Arc::new(extract_document_shapes(&self.parse));
    }
}

/// A build file: the document, its kind, and the parsed node tree.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub document: Document,
    pub kind: BuildFileKind,
    pub node: Arc<Node>,
}

impl BuildFile {
    pub fn new(kind: BuildFileKind, text: impl Into<String>) -> Self {
        let document = Document::new(text);
        let node = Arc::new(parse_json(document.borrow_text()));
        Self {
            document,
            kind,
            node,
        }
    }

    pub fn reparse(&mut self) {
        self.node = Arc::new(parse_json(self.document.borrow_text()));
    }
}

/// A file tracked by a project.
#[derive(Debug, Clone)]
pub enum ProjectFile {
    Idl(IdlFile),
    Build(BuildFile),
}

impl ProjectFile {
    pub fn document(&self) -> &Document {
        match self {
            ProjectFile::Idl(f) => &f.document,
            ProjectFile::Build(f) => &f.document,
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        match self {
            ProjectFile::Idl(f) => &mut f.document,
            ProjectFile::Build(f) => &mut f.document,
        }
    }

    pub fn reparse(&mut self) {
        match self {
            ProjectFile::Idl(f) => f.reparse(),
            ProjectFile::Build(f) => f.reparse(),
        }
    }

    pub fn as_idl(&self) -> Option<&IdlFile> {
        match self {
            ProjectFile::Idl(f) => Some(f),
            ProjectFile::Build(_) => None,
        }
    }

    pub fn as_build(&self) -> Option<&BuildFile> {
        match self {
            ProjectFile::Build(f) => Some(f),
            ProjectFile::Idl(_) => None,
        }
    }
}
