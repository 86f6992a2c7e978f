//! The semantic model: shapes keyed by id plus validation events.
//!
//! Shapes reference each other by [`ShapeId`] only; traversals use explicit
//! worklists and id-keyed lookups. A model is immutable once assembled — a
//! newer assembly replaces the whole value.

mod assembler;
pub mod selector;

pub use assembler::{Assembler, AssemblyMode, SourceFile};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tower_lsp_server::ls_types::Range;

use crate::document::Span;
use crate::syntax::{Ident, ShapeType};

/// The smithy.api prelude namespace.
pub const PRELUDE_NAMESPACE: &str = "smithy.api";

/// An interned `namespace#Name[$member]` identifier. Cheap to clone and
/// shared freely by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(Arc<str>);

impl ShapeId {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(Arc::from(format!("{namespace}#{name}")))
    }

    /// Parse an absolute id. Returns `None` without a `#`.
    pub fn parse(text: &str) -> Option<Self> {
        text.contains('#').then(|| Self(Arc::from(text)))
    }

    pub fn prelude(name: &str) -> Self {
        Self::new(PRELUDE_NAMESPACE, name)
    }

    pub fn with_member(&self, member: &str) -> Self {
        Self(Arc::from(format!("{}${member}", self.root_str())))
    }

    pub fn absolute(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once('#').map(|(ns, _)| ns).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        let rest = self.0.split_once('#').map(|(_, r)| r).unwrap_or(&self.0);
        rest.split_once('$').map(|(n, _)| n).unwrap_or(rest)
    }

    pub fn member_name(&self) -> Option<&str> {
        self.0.split_once('$').map(|(_, m)| m)
    }

    pub fn is_member(&self) -> bool {
        self.0.contains('$')
    }

    fn root_str(&self) -> &str {
        self.0.split_once('$').map(|(r, _)| r).unwrap_or(&self.0)
    }

    /// The containing shape's id (self, for non-members).
    pub fn root(&self) -> ShapeId {
        match self.0.split_once('$') {
            Some((root, _)) => Self(Arc::from(root)),
            None => self.clone(),
        }
    }

    pub fn is_prelude(&self) -> bool {
        self.namespace() == PRELUDE_NAMESPACE
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Where a shape or event came from: a file (or jar entry) plus the byte
/// span and its LSP range in that file's text at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    pub span: Span,
    pub range: Range,
}

/// Validation event severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Danger,
    Error,
}

impl Severity {
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "NOTE" => Self::Note,
            "WARNING" => Self::Warning,
            "DANGER" => Self::Danger,
            "ERROR" => Self::Error,
            _ => return None,
        })
    }
}

/// A structured event produced by assembly or validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationEvent {
    pub severity: Severity,
    pub id: String,
    pub message: String,
    pub shape: Option<ShapeId>,
    pub location: Option<SourceLocation>,
}

/// A trait applied to a shape, with its resolved id and JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTrait {
    pub id: ShapeId,
    pub value: serde_json::Value,
}

/// A shape in the model. Members are shapes of their own (type `Member`)
/// with a `target`; the containing shape lists their ids in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub shape_type: ShapeType,
    /// For members: the target shape id.
    pub target: Option<ShapeId>,
    pub members: Vec<ShapeId>,
    pub mixins: Vec<ShapeId>,
    /// For resources: identifier name → target.
    pub identifiers: Vec<(String, ShapeId)>,
    pub traits: Vec<AppliedTrait>,
    /// Absent for prelude shapes.
    pub source: Option<SourceLocation>,
}

impl Shape {
    pub fn new(id: ShapeId, shape_type: ShapeType) -> Self {
        Self {
            id,
            shape_type,
            target: None,
            members: Vec::new(),
            mixins: Vec::new(),
            identifiers: Vec::new(),
            traits: Vec::new(),
            source: None,
        }
    }

    pub fn has_trait(&self, id: &ShapeId) -> bool {
        self.traits.iter().any(|t| &t.id == id)
    }

    pub fn find_trait(&self, id: &ShapeId) -> Option<&AppliedTrait> {
        self.traits.iter().find(|t| &t.id == id)
    }
}

/// The output of the assembler: shapes plus events, possibly broken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedModel {
    shapes: HashMap<ShapeId, Shape>,
    /// Shape ids in model source order (prelude first, then files in input
    /// order).
    order: Vec<ShapeId>,
    pub events: Vec<ValidationEvent>,
    /// Set when assembly could not run at all (e.g. broken config).
    pub broken: bool,
}

impl ValidatedModel {
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// All shapes in model source order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Non-member shapes defined in project files (prelude excluded).
    pub fn source_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes()
            .filter(|s| s.source.is_some() && !s.id.is_member())
    }

    /// Root shapes in a namespace, in source order.
    pub fn shapes_in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Shape> {
        self.shapes()
            .filter(move |s| s.id.namespace() == namespace && !s.id.is_member())
    }

    pub fn insert(&mut self, shape: Shape) {
        if !self.shapes.contains_key(&shape.id) {
            self.order.push(shape.id.clone());
        }
        self.shapes.insert(shape.id.clone(), shape);
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    /// Resolve a possibly-relative shape name the way the IDL does: absolute
    /// ids as written, then `use` imports, then the current namespace, then
    /// the prelude. Returns the resolved id, or the best candidate id as the
    /// error value for reporting.
    pub fn resolve_name(
        &self,
        name: &str,
        namespace: Option<&str>,
        uses: &[Ident],
    ) -> Result<ShapeId, ShapeId> {
        resolve_name(&self.shapes, name, namespace, uses)
    }

    /// Events at or above `minimum`, in their original order.
    pub fn events_at_least(&self, minimum: Severity) -> impl Iterator<Item = &ValidationEvent> {
        self.events.iter().filter(move |e| e.severity >= minimum)
    }
}

pub(crate) fn resolve_name(
    shapes: &HashMap<ShapeId, Shape>,
    name: &str,
    namespace: Option<&str>,
    uses: &[Ident],
) -> Result<ShapeId, ShapeId> {
    // Split off a `$member` suffix so resolution works on the root and the
    // member is re-attached afterwards.
    let (root_name, member) = match name.split_once('$') {
        Some((root, member)) if !name.contains('#') => (root, Some(member)),
        _ => (name, None),
    };

    let attach = |id: ShapeId| match member {
        Some(m) => id.with_member(m),
        None => id,
    };

    if let Some(id) = ShapeId::parse(name) {
        return if shapes.contains_key(&id) {
            Ok(id)
        } else {
            Err(id)
        };
    }

    for use_id in uses {
        if let Some((_, imported)) = use_id.text.split_once('#') {
            if imported == root_name {
                if let Some(id) = ShapeId::parse(&use_id.text) {
                    let id = attach(id);
                    return if shapes.contains_key(&id) { Ok(id) } else { Err(id) };
                }
            }
        }
    }

    if let Some(ns) = namespace {
        let id = attach(ShapeId::new(ns, root_name));
        if shapes.contains_key(&id) {
            return Ok(id);
        }
        let prelude = attach(ShapeId::prelude(root_name));
        if shapes.contains_key(&prelude) {
            return Ok(prelude);
        }
        return Err(id);
    }

    let prelude = attach(ShapeId::prelude(root_name));
    if shapes.contains_key(&prelude) {
        Ok(prelude)
    } else {
        Err(prelude)
    }
}
