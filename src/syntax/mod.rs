//! Error-tolerant parsing for the Smithy IDL and for JSON build files.
//!
//! The IDL parser produces a flat, ordered list of [`Statement`]s covering
//! the file: a shape's body members are statements of their own, linked to
//! the defining statement through parent indices. Malformed input becomes
//! `Err` statements with spans; parsing never aborts.

pub mod lexer;
pub mod node;
mod parser;

pub use node::{Node, parse_json};

use crate::document::Span;

/// An identifier (or shape-id) token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Shape categories recognized by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Structure,
    Union,
    List,
    Map,
    Set,
    Service,
    Resource,
    Operation,
    Enum,
    IntEnum,
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    Member,
}

impl ShapeType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "structure" => Self::Structure,
            "union" => Self::Union,
            "list" => Self::List,
            "map" => Self::Map,
            "set" => Self::Set,
            "service" => Self::Service,
            "resource" => Self::Resource,
            "operation" => Self::Operation,
            "enum" => Self::Enum,
            "intEnum" => Self::IntEnum,
            "blob" => Self::Blob,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "bigInteger" => Self::BigInteger,
            "bigDecimal" => Self::BigDecimal,
            "timestamp" => Self::Timestamp,
            "document" => Self::Document,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Union => "union",
            Self::List => "list",
            Self::Map => "map",
            Self::Set => "set",
            Self::Service => "service",
            Self::Resource => "resource",
            Self::Operation => "operation",
            Self::Enum => "enum",
            Self::IntEnum => "intEnum",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::BigInteger => "bigInteger",
            Self::BigDecimal => "bigDecimal",
            Self::Timestamp => "timestamp",
            Self::Document => "document",
            Self::Member => "member",
        }
    }

    /// Simple shapes have no member block.
    pub fn is_simple(self) -> bool {
        !matches!(
            self,
            Self::Structure
                | Self::Union
                | Self::List
                | Self::Map
                | Self::Set
                | Self::Service
                | Self::Resource
                | Self::Operation
                | Self::Enum
                | Self::IntEnum
                | Self::Member
        )
    }

    /// Shapes whose body entries are node values rather than member targets.
    pub fn has_node_members(self) -> bool {
        matches!(self, Self::Service | Self::Resource)
    }
}

/// How a member definition names its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberForm {
    /// `name: Target`
    Explicit,
    /// `$name` — target comes from a mixin or resource.
    Elided,
    /// `name := { ... }` — defines an inline shape.
    Inline,
    /// `NAME` or `NAME = value` — enum member.
    Bare,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub span: Span,
    pub key: Ident,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub span: Span,
    pub key: Ident,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseStatement {
    pub span: Span,
    pub id: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDef {
    pub span: Span,
    pub shape_type: ShapeType,
    pub keyword_span: Span,
    pub name: Ident,
    /// Span of the `{ ... }` block, when present.
    pub body_span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mixins {
    pub span: Span,
    pub ids: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForResource {
    pub span: Span,
    pub id: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDef {
    pub span: Span,
    pub form: MemberForm,
    pub name: Ident,
    pub target: Option<Ident>,
    /// Default value (`= node`) for members and enum values.
    pub value: Option<Node>,
    /// Body span of an inline (`:=`) definition.
    pub body_span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMemberDef {
    pub span: Span,
    pub key: Ident,
    pub value: Node,
    /// Identifier references found inside the value.
    pub refs: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitApplication {
    pub span: Span,
    pub id: Ident,
    /// The (possibly empty) trait value.
    pub value: Option<Node>,
    /// Identifier references found inside the value.
    pub refs: Vec<Ident>,
    /// Target of an `apply <id> @trait` statement.
    pub apply_target: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrStatement {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Control(Control),
    Metadata(Metadata),
    Use(UseStatement),
    ShapeDef(ShapeDef),
    Mixins(Mixins),
    ForResource(ForResource),
    MemberDef(MemberDef),
    NodeMemberDef(NodeMemberDef),
    TraitApplication(TraitApplication),
    Err(ErrStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Control(s) => s.span,
            Statement::Metadata(s) => s.span,
            Statement::Use(s) => s.span,
            Statement::ShapeDef(s) => s.span,
            Statement::Mixins(s) => s.span,
            Statement::ForResource(s) => s.span,
            Statement::MemberDef(s) => s.span,
            Statement::NodeMemberDef(s) => s.span,
            Statement::TraitApplication(s) => s.span,
            Statement::Err(s) => s.span,
        }
    }
}

/// Preamble summary: `$version`, `namespace`, and `use` imports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preamble {
    pub version: Option<(String, Span)>,
    pub namespace: Option<Ident>,
    pub uses: Vec<Ident>,
}

/// A parse error with a span.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

/// The result of parsing one IDL document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdlParse {
    pub statements: Vec<Statement>,
    /// For each statement, the index of its enclosing statement (the shape
    /// or inline member definition whose body contains it).
    pub parents: Vec<Option<usize>>,
    pub preamble: Preamble,
    pub errors: Vec<ParseError>,
}

impl IdlParse {
    /// Index of the most specific statement containing `offset`.
    pub fn statement_index_at(&self, offset: usize) -> Option<usize> {
        // Later statements are more deeply nested when spans overlap
        // (a shape header precedes its members), so take the last hit.
        let mut found = None;
        for (i, statement) in self.statements.iter().enumerate() {
            let span = statement.span();
            if span.start > offset {
                break;
            }
            if span.contains(offset) {
                found = Some(i);
            }
        }
        if found.is_some() {
            return found;
        }
        // Offsets in trivia inside a shape body still belong to that shape.
        self.enclosing_body(offset)
    }

    fn enclosing_body(&self, offset: usize) -> Option<usize> {
        let mut found = None;
        for (i, statement) in self.statements.iter().enumerate() {
            let body = match statement {
                Statement::ShapeDef(s) => s.body_span,
                Statement::MemberDef(s) => s.body_span,
                _ => None,
            };
            if let Some(body) = body {
                if body.contains(offset) {
                    found = Some(i);
                }
            }
        }
        found
    }

    /// Index of the last statement that starts at or before `offset`.
    pub fn statement_index_before(&self, offset: usize) -> Option<usize> {
        let mut found = None;
        for (i, statement) in self.statements.iter().enumerate() {
            if statement.span().start <= offset {
                found = Some(i);
            } else {
                break;
            }
        }
        found
    }
}

/// A read-only view of the statement containing an offset plus its
/// ancestor chain, for completion and reference lookups.
#[derive(Debug, Clone, Copy)]
pub struct StatementView<'a> {
    parse: &'a IdlParse,
    pub index: usize,
}

impl<'a> StatementView<'a> {
    pub fn at(parse: &'a IdlParse, offset: usize) -> Option<Self> {
        parse
            .statement_index_at(offset)
            .map(|index| Self { parse, index })
    }

    pub fn statement(&self) -> &'a Statement {
        &self.parse.statements[self.index]
    }

    pub fn parent(&self) -> Option<StatementView<'a>> {
        self.parse.parents[self.index].map(|index| Self {
            parse: self.parse,
            index,
        })
    }

    /// The enclosing statements, innermost first.
    pub fn ancestors(&self) -> Vec<&'a Statement> {
        let mut out = Vec::new();
        let mut current = *self;
        while let Some(parent) = current.parent() {
            out.push(parent.statement());
            current = parent;
        }
        out
    }

    /// The nearest enclosing shape definition, if any.
    pub fn containing_shape(&self) -> Option<&'a ShapeDef> {
        let mut current = *self;
        loop {
            if let Statement::ShapeDef(def) = current.statement() {
                return Some(def);
            }
            current = current.parent()?;
        }
    }
}

/// Parse a Smithy IDL document.
pub fn parse_idl(source: &str) -> IdlParse {
    parser::parse(source)
}
