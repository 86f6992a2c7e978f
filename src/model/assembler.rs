//! Builds a [`ValidatedModel`] from a set of model files.
//!
//! Assembly has two modes: `Resolve` parses and links every shape reference
//! (the per-keystroke path), `Validate` additionally runs the validator set.
//! Both are total: problems become events, never failures.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use rayon::prelude::*;

use crate::document::{Document, Span};
use crate::syntax::{
    Ident, IdlParse, MemberForm, Node, ShapeType, Statement, parse_idl, parse_json,
};

use super::{
    AppliedTrait, Severity, Shape, ShapeId, SourceLocation, ValidatedModel, ValidationEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode {
    /// Parse and resolve references only.
    Resolve,
    /// Resolve plus the validator set.
    Validate,
}

/// One input to the assembler: a display path (file path or jar entry URI)
/// plus its text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub text: Arc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

pub struct Assembler;

impl Assembler {
    pub fn assemble(mode: AssemblyMode, files: &[SourceFile]) -> ValidatedModel {
        let parses: Vec<FileParse> = files
            .par_iter()
            .map(|file| {
                if file.path.ends_with(".json") {
                    FileParse::JsonAst(parse_json(&file.text))
                } else {
                    FileParse::Idl(parse_idl(&file.text))
                }
            })
            .collect();

        let mut builder = Builder::new();
        for (index, (file, parse)) in files.iter().zip(&parses).enumerate() {
            match parse {
                FileParse::Idl(parse) => builder.collect_idl(index, file, parse),
                FileParse::JsonAst(node) => builder.collect_json_ast(index, file, node),
            }
        }
        builder.resolve();
        if mode == AssemblyMode::Validate {
            builder.validate();
        }
        builder.model
    }
}

enum FileParse {
    Idl(IdlParse),
    JsonAst(Node),
}

/// A reference waiting for resolution, with everything needed to report it.
struct PendingRef {
    owner: Option<ShapeId>,
    name: String,
    span: Span,
    file: usize,
    kind: RefKind,
}

enum RefKind {
    MemberTarget,
    Mixin,
    Trait { value: serde_json::Value },
    Identifier { name: String },
    ForResource,
    Plain,
}

struct PendingApply {
    target: Ident,
    trait_name: Ident,
    value: serde_json::Value,
    file: usize,
}

struct ElidedMember {
    member_id: ShapeId,
    name: String,
    container: ShapeId,
    span: Span,
    file: usize,
}

struct FileContext {
    path: String,
    namespace: Option<String>,
    uses: Vec<Ident>,
    /// For span→range conversion in source locations.
    document: Document,
}

struct PendingTrait {
    name: Ident,
    value: serde_json::Value,
}

struct Builder {
    model: ValidatedModel,
    contexts: Vec<FileContext>,
    refs: Vec<PendingRef>,
    applies: Vec<PendingApply>,
    elided: Vec<ElidedMember>,
    /// Shape a ForResource clause binds, per defining shape.
    bound_resources: HashMap<ShapeId, ShapeId>,
}

impl Builder {
    fn new() -> Self {
        let mut model = ValidatedModel::default();
        for shape in prelude_shapes() {
            model.insert(shape.clone());
        }
        Self {
            model,
            contexts: Vec::new(),
            refs: Vec::new(),
            applies: Vec::new(),
            elided: Vec::new(),
            bound_resources: HashMap::new(),
        }
    }

    fn event(
        &mut self,
        severity: Severity,
        id: &str,
        message: String,
        shape: Option<ShapeId>,
        location: Option<SourceLocation>,
    ) {
        self.model.events.push(ValidationEvent {
            severity,
            id: id.to_string(),
            message,
            shape,
            location,
        });
    }

    fn location(&self, file: usize, span: Span) -> SourceLocation {
        let ctx = &self.contexts[file];
        SourceLocation {
            file: ctx.path.clone(),
            span,
            range: ctx.document.span_to_range(span),
        }
    }

    fn collect_idl(&mut self, file: usize, source: &SourceFile, parse: &IdlParse) {
        self.contexts.push(FileContext {
            path: source.path.clone(),
            namespace: parse.preamble.namespace.as_ref().map(|n| n.text.clone()),
            uses: parse.preamble.uses.clone(),
            document: Document::new(source.text.as_ref()),
        });
        let namespace = match &parse.preamble.namespace {
            Some(ns) => ns.text.clone(),
            None => {
                // A file of nothing but preamble or errors is fine without a
                // namespace; shapes are not.
                if parse
                    .statements
                    .iter()
                    .any(|s| matches!(s, Statement::ShapeDef(_)))
                {
                    let span = parse
                        .statements
                        .iter()
                        .find_map(|s| match s {
                            Statement::ShapeDef(def) => Some(def.name.span),
                            _ => None,
                        })
                        .unwrap_or_default();
                    let location = self.location(file, span);
                    self.event(
                        Severity::Error,
                        "Model",
                        "No namespace defined before shape definitions".to_string(),
                        None,
                        Some(location),
                    );
                }
                return;
            }
        };

        // Shape (or inline-member implicit shape) each statement's members
        // attach to, keyed by statement index.
        let mut owners: HashMap<usize, ShapeId> = HashMap::new();
        // Trait applications waiting for the next definition in their scope.
        let mut pending: HashMap<Option<usize>, Vec<PendingTrait>> = HashMap::new();

        for (index, statement) in parse.statements.iter().enumerate() {
            let parent = parse.parents[index];
            match statement {
                Statement::TraitApplication(t) => {
                    let value = t
                        .value
                        .as_ref()
                        .map(Node::to_json)
                        .unwrap_or(serde_json::Value::Null);
                    match &t.apply_target {
                        Some(target) => self.applies.push(PendingApply {
                            target: target.clone(),
                            trait_name: t.id.clone(),
                            value,
                            file,
                        }),
                        None => {
                            // Traits written between `:=` and an inline body
                            // belong to the implicit shape, not the next
                            // nested member.
                            let inline_owner = parent.and_then(|p| {
                                match &parse.statements[p] {
                                    Statement::MemberDef(md)
                                        if md.form == MemberForm::Inline
                                            && md.body_span
                                                .is_none_or(|b| t.span.start < b.start) =>
                                    {
                                        owners.get(&p).cloned()
                                    }
                                    _ => None,
                                }
                            });
                            match inline_owner {
                                Some(owner) => self.refs.push(PendingRef {
                                    owner: Some(owner),
                                    name: t.id.text.clone(),
                                    span: t.id.span,
                                    file,
                                    kind: RefKind::Trait { value },
                                }),
                                None => pending.entry(parent).or_default().push(PendingTrait {
                                    name: t.id.clone(),
                                    value,
                                }),
                            }
                        }
                    }
                }
                Statement::ShapeDef(def) => {
                    let id = ShapeId::new(&namespace, &def.name.text);
                    if self.model.contains(&id) && !id.is_prelude() {
                        let location = self.location(file, def.name.span);
                        self.event(
                            Severity::Error,
                            "Model",
                            format!("Conflicting shape definition: `{id}`"),
                            Some(id.clone()),
                            Some(location),
                        );
                        continue;
                    }
                    let mut shape = Shape::new(id.clone(), def.shape_type);
                    shape.source = Some(self.location(file, def.name.span));
                    self.model.insert(shape);
                    owners.insert(index, id.clone());
                    self.take_pending_traits(&mut pending, parent, &id, file);
                }
                Statement::Mixins(m) => {
                    let Some(owner) = parent.and_then(|p| owners.get(&p)).cloned() else {
                        continue;
                    };
                    for id in &m.ids {
                        self.refs.push(PendingRef {
                            owner: Some(owner.clone()),
                            name: id.text.clone(),
                            span: id.span,
                            file,
                            kind: RefKind::Mixin,
                        });
                    }
                }
                Statement::ForResource(f) => {
                    let Some(owner) = parent.and_then(|p| owners.get(&p)).cloned() else {
                        continue;
                    };
                    self.refs.push(PendingRef {
                        owner: Some(owner),
                        name: f.id.text.clone(),
                        span: f.id.span,
                        file,
                        kind: RefKind::ForResource,
                    });
                }
                Statement::MemberDef(def) => {
                    let Some(container) = parent.and_then(|p| owners.get(&p)).cloned() else {
                        continue;
                    };
                    let member_id = container.with_member(&def.name.text);
                    if self.model.contains(&member_id) {
                        let location = self.location(file, def.name.span);
                        self.event(
                            Severity::Error,
                            "Model",
                            format!("Conflicting member definition: `{member_id}`"),
                            Some(member_id.clone()),
                            Some(location),
                        );
                        continue;
                    }

                    let mut member = Shape::new(member_id.clone(), ShapeType::Member);
                    member.source = Some(self.location(file, def.name.span));

                    match def.form {
                        MemberForm::Explicit => {
                            if let Some(target) = &def.target {
                                self.refs.push(PendingRef {
                                    owner: Some(member_id.clone()),
                                    name: target.text.clone(),
                                    span: target.span,
                                    file,
                                    kind: RefKind::MemberTarget,
                                });
                            }
                            if let Some(value) = &def.value {
                                member.traits.push(AppliedTrait {
                                    id: ShapeId::prelude("default"),
                                    value: value.to_json(),
                                });
                            }
                        }
                        MemberForm::Elided => {
                            self.elided.push(ElidedMember {
                                member_id: member_id.clone(),
                                name: def.name.text.clone(),
                                container: container.clone(),
                                span: def.span,
                                file,
                            });
                        }
                        MemberForm::Bare => {
                            member.target = Some(ShapeId::prelude("Unit"));
                            if let Some(value) = &def.value {
                                member.traits.push(AppliedTrait {
                                    id: ShapeId::prelude("enumValue"),
                                    value: value.to_json(),
                                });
                            }
                        }
                        MemberForm::Inline => {
                            let implicit_id = ShapeId::new(
                                &namespace,
                                &format!(
                                    "{}{}",
                                    container.name(),
                                    capitalize(&def.name.text)
                                ),
                            );
                            let mut implicit =
                                Shape::new(implicit_id.clone(), ShapeType::Structure);
                            implicit.source = Some(self.location(file, def.name.span));
                            implicit.traits.push(AppliedTrait {
                                id: ShapeId::prelude(if def.name.text == "output" {
                                    "output"
                                } else {
                                    "input"
                                }),
                                value: serde_json::Value::Null,
                            });
                            self.model.insert(implicit);
                            member.target = Some(implicit_id.clone());
                            // Nested members, mixins, and traits written after
                            // `:=` attach to the implicit shape.
                            owners.insert(index, implicit_id);
                        }
                    }

                    self.take_pending_traits(&mut pending, parent, &member_id, file);
                    self.model.insert(member);
                    if let Some(shape) = self.model.get_mut(&container) {
                        shape.members.push(member_id);
                    }
                }
                Statement::NodeMemberDef(def) => {
                    let Some(container) = parent.and_then(|p| owners.get(&p)).cloned() else {
                        continue;
                    };
                    let container_type =
                        self.model.shape(&container).map(|s| s.shape_type);
                    if container_type == Some(ShapeType::Resource) && def.key.text == "identifiers"
                    {
                        if let Node::Obj { kvps, .. } = &def.value {
                            for kvp in kvps {
                                if let Node::Kvp { key, value, .. } = kvp {
                                    if let Node::Str { value: target, span } = value.as_ref() {
                                        self.refs.push(PendingRef {
                                            owner: Some(container.clone()),
                                            name: target.clone(),
                                            span: *span,
                                            file,
                                            kind: RefKind::Identifier { name: key.clone() },
                                        });
                                    }
                                }
                            }
                        }
                        continue;
                    }
                    for reference in &def.refs {
                        self.refs.push(PendingRef {
                            owner: Some(container.clone()),
                            name: reference.text.clone(),
                            span: reference.span,
                            file,
                            kind: RefKind::Plain,
                        });
                    }
                }
                Statement::Use(u) => {
                    self.refs.push(PendingRef {
                        owner: None,
                        name: u.id.text.clone(),
                        span: u.id.span,
                        file,
                        kind: RefKind::Plain,
                    });
                }
                Statement::Control(_) | Statement::Metadata(_) | Statement::Err(_) => {}
            }
        }

        // Trait applications with no following definition.
        let mut dangling: Vec<PendingTrait> =
            pending.into_values().flatten().collect();
        dangling.sort_by_key(|t| t.name.span.start);
        for t in dangling {
            let location = self.location(file, t.name.span);
            self.event(
                Severity::Error,
                "Model",
                format!("Trait `{}` is not applied to a shape", t.name.text),
                None,
                Some(location),
            );
        }
    }

    fn take_pending_traits(
        &mut self,
        pending: &mut HashMap<Option<usize>, Vec<PendingTrait>>,
        scope: Option<usize>,
        owner: &ShapeId,
        file: usize,
    ) {
        for t in pending.remove(&scope).unwrap_or_default() {
            self.refs.push(PendingRef {
                owner: Some(owner.clone()),
                name: t.name.text.clone(),
                span: t.name.span,
                file,
                kind: RefKind::Trait { value: t.value },
            });
        }
    }

    /// Collect shapes from a Smithy JSON AST document.
    fn collect_json_ast(&mut self, file: usize, source: &SourceFile, node: &Node) {
        self.contexts.push(FileContext {
            path: source.path.clone(),
            namespace: None,
            uses: Vec::new(),
            document: Document::new(source.text.as_ref()),
        });
        let Some(Node::Obj { kvps, .. }) = node.get("shapes") else {
            return;
        };
        for kvp in kvps {
            let Node::Kvp {
                key,
                key_span,
                value,
                ..
            } = kvp
            else {
                continue;
            };
            let Some(id) = ShapeId::parse(key) else {
                let location = self.location(file, *key_span);
                self.event(
                    Severity::Error,
                    "Model",
                    format!("Invalid shape id: `{key}`"),
                    None,
                    Some(location),
                );
                continue;
            };
            let shape_type = value
                .get("type")
                .and_then(Node::as_str)
                .and_then(ShapeType::from_keyword)
                .unwrap_or(ShapeType::Structure);
            let mut shape = Shape::new(id.clone(), shape_type);
            shape.source = Some(self.location(file, *key_span));

            if let Some(Node::Obj { kvps: members, .. }) = value.get("members") {
                for member_kvp in members {
                    let Node::Kvp {
                        key: member_name,
                        key_span: member_span,
                        value: member_value,
                        ..
                    } = member_kvp
                    else {
                        continue;
                    };
                    let member_id = id.with_member(member_name);
                    let mut member = Shape::new(member_id.clone(), ShapeType::Member);
                    member.source = Some(self.location(file, *member_span));
                    if let Some(target) = member_value.get("target").and_then(Node::as_str) {
                        self.refs.push(PendingRef {
                            owner: Some(member_id.clone()),
                            name: target.to_string(),
                            span: member_value
                                .get("target")
                                .map(|n| n.span())
                                .unwrap_or(*member_span),
                            file,
                            kind: RefKind::MemberTarget,
                        });
                    }
                    shape.members.push(member_id);
                    self.model.insert(member);
                }
            }

            if let Some(Node::Obj { kvps: traits, .. }) = value.get("traits") {
                for trait_kvp in traits {
                    if let Node::Kvp {
                        key: trait_id,
                        key_span: trait_span,
                        value: trait_value,
                        ..
                    } = trait_kvp
                    {
                        self.refs.push(PendingRef {
                            owner: Some(id.clone()),
                            name: trait_id.clone(),
                            span: *trait_span,
                            file,
                            kind: RefKind::Trait {
                                value: trait_value.to_json(),
                            },
                        });
                    }
                }
            }

            self.model.insert(shape);
        }
    }

    fn resolve(&mut self) {
        let refs = std::mem::take(&mut self.refs);
        for pending in refs {
            let ctx = &self.contexts[pending.file];
            let resolved = self.model.resolve_name(
                &pending.name,
                ctx.namespace.as_deref(),
                &ctx.uses,
            );
            match resolved {
                Ok(target) => self.apply_ref(pending, target),
                Err(candidate) => {
                    let location = self.location(pending.file, pending.span);
                    // Keep the written name as the member target so hovers
                    // and symbols still have something to show.
                    if let RefKind::MemberTarget = pending.kind {
                        if let Some(owner) =
                            pending.owner.as_ref().and_then(|o| self.model.get_mut(o))
                        {
                            owner.target = Some(candidate.clone());
                        }
                    }
                    self.event(
                        Severity::Error,
                        "Model",
                        format!("Unresolved shape: `{candidate}`"),
                        pending.owner.clone(),
                        Some(location),
                    );
                }
            }
        }

        let applies = std::mem::take(&mut self.applies);
        for apply in applies {
            let ctx = &self.contexts[apply.file];
            let target = self.model.resolve_name(
                &apply.target.text,
                ctx.namespace.as_deref(),
                &ctx.uses,
            );
            let trait_id = self.model.resolve_name(
                &apply.trait_name.text,
                ctx.namespace.as_deref(),
                &ctx.uses,
            );
            match (target, trait_id) {
                (Ok(target), Ok(trait_id)) => {
                    if let Some(shape) = self.model.get_mut(&target) {
                        shape.traits.push(AppliedTrait {
                            id: trait_id,
                            value: apply.value,
                        });
                    }
                }
                (Err(candidate), _) => {
                    let location = self.location(apply.file, apply.target.span);
                    self.event(
                        Severity::Error,
                        "Model",
                        format!("Unresolved shape: `{candidate}`"),
                        None,
                        Some(location),
                    );
                }
                (_, Err(candidate)) => {
                    let location = self.location(apply.file, apply.trait_name.span);
                    self.event(
                        Severity::Error,
                        "Model",
                        format!("Unresolved shape: `{candidate}`"),
                        None,
                        Some(location),
                    );
                }
            }
        }

        self.resolve_elided();
    }

    fn apply_ref(&mut self, pending: PendingRef, target: ShapeId) {
        let Some(owner_id) = pending.owner else {
            return;
        };
        match pending.kind {
            RefKind::MemberTarget => {
                if let Some(owner) = self.model.get_mut(&owner_id) {
                    owner.target = Some(target);
                }
            }
            RefKind::Mixin => {
                if let Some(owner) = self.model.get_mut(&owner_id) {
                    owner.mixins.push(target);
                }
            }
            RefKind::Trait { value } => {
                if let Some(owner) = self.model.get_mut(&owner_id) {
                    owner.traits.push(AppliedTrait { id: target, value });
                }
            }
            RefKind::Identifier { name } => {
                if let Some(owner) = self.model.get_mut(&owner_id) {
                    owner.identifiers.push((name, target));
                }
            }
            RefKind::ForResource => {
                self.bound_resources.insert(owner_id, target);
            }
            RefKind::Plain => {}
        }
    }

    /// Resolve `$name` members from mixins, then from the bound resource's
    /// identifiers.
    fn resolve_elided(&mut self) {
        let elided = std::mem::take(&mut self.elided);
        for member in elided {
            let target = self.elided_target(&member);
            match target {
                Some(target) => {
                    if let Some(shape) = self.model.get_mut(&member.member_id) {
                        shape.target = Some(target);
                    }
                }
                None => {
                    let location = self.location(member.file, member.span);
                    self.event(
                        Severity::Error,
                        "Model",
                        format!(
                            "Elided member `{}` not found in a mixin or bound resource",
                            member.name
                        ),
                        Some(member.member_id),
                        Some(location),
                    );
                }
            }
        }
    }

    fn elided_target(&self, member: &ElidedMember) -> Option<ShapeId> {
        let container = self.model.shape(&member.container)?;
        for mixin in &container.mixins {
            let mixin_member = mixin.with_member(&member.name);
            if let Some(target) = self.model.shape(&mixin_member).and_then(|m| m.target.clone())
            {
                return Some(target);
            }
        }
        let resource = self.bound_resources.get(&member.container)?;
        let resource_shape = self.model.shape(resource)?;
        resource_shape
            .identifiers
            .iter()
            .find(|(name, _)| name == &member.name)
            .map(|(_, target)| target.clone())
    }

    /// The validator set run in `Validate` mode only.
    fn validate(&mut self) {
        let mut events = Vec::new();
        let documentation = ShapeId::prelude("documentation");
        let deprecated = ShapeId::prelude("deprecated");

        for shape in self.model.shapes() {
            // Operation input/output must target structures.
            if shape.shape_type == ShapeType::Operation {
                for member_id in &shape.members {
                    let Some(member) = self.model.shape(member_id) else {
                        continue;
                    };
                    let Some(target) = member.target.as_ref().and_then(|t| self.model.shape(t))
                    else {
                        continue;
                    };
                    if target.shape_type != ShapeType::Structure {
                        events.push(ValidationEvent {
                            severity: Severity::Error,
                            id: "OperationInputOutput".to_string(),
                            message: format!(
                                "Operation member `{member_id}` must target a structure, found {}",
                                target.shape_type.keyword()
                            ),
                            shape: Some(member_id.clone()),
                            location: member.source.clone(),
                        });
                    }
                }
            }

            // Documentation trait values must be strings.
            if let Some(applied) = shape.find_trait(&documentation) {
                if !applied.value.is_string() {
                    events.push(ValidationEvent {
                        severity: Severity::Error,
                        id: "TraitValue".to_string(),
                        message: format!(
                            "Value for `smithy.api#documentation` on `{}` must be a string",
                            shape.id
                        ),
                        shape: Some(shape.id.clone()),
                        location: shape.source.clone(),
                    });
                }
            }

            // Referencing a deprecated shape is flagged at the member.
            if shape.shape_type == ShapeType::Member {
                if let Some(target) = shape.target.as_ref().and_then(|t| self.model.shape(t)) {
                    if target.has_trait(&deprecated) && !target.id.is_prelude() {
                        events.push(ValidationEvent {
                            severity: Severity::Danger,
                            id: "DeprecatedShape".to_string(),
                            message: format!(
                                "Member `{}` targets deprecated shape `{}`",
                                shape.id, target.id
                            ),
                            shape: Some(shape.id.clone()),
                            location: shape.source.clone(),
                        });
                    }
                }
            }
        }
        self.model.events.extend(events);
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const PRELUDE_SIMPLE_SHAPES: &[(&str, ShapeType)] = &[
    ("String", ShapeType::String),
    ("Blob", ShapeType::Blob),
    ("Boolean", ShapeType::Boolean),
    ("Byte", ShapeType::Byte),
    ("Short", ShapeType::Short),
    ("Integer", ShapeType::Integer),
    ("Long", ShapeType::Long),
    ("Float", ShapeType::Float),
    ("Double", ShapeType::Double),
    ("BigInteger", ShapeType::BigInteger),
    ("BigDecimal", ShapeType::BigDecimal),
    ("Timestamp", ShapeType::Timestamp),
    ("Document", ShapeType::Document),
    ("PrimitiveBoolean", ShapeType::Boolean),
    ("PrimitiveByte", ShapeType::Byte),
    ("PrimitiveShort", ShapeType::Short),
    ("PrimitiveInteger", ShapeType::Integer),
    ("PrimitiveLong", ShapeType::Long),
    ("PrimitiveFloat", ShapeType::Float),
    ("PrimitiveDouble", ShapeType::Double),
];

const PRELUDE_TRAITS: &[&str] = &[
    "addedDefault",
    "auth",
    "authDefinition",
    "clientOptional",
    "cors",
    "default",
    "deprecated",
    "documentation",
    "endpoint",
    "enumValue",
    "error",
    "examples",
    "externalDocumentation",
    "hostLabel",
    "http",
    "httpChecksumRequired",
    "httpError",
    "httpHeader",
    "httpLabel",
    "httpPayload",
    "httpPrefixHeaders",
    "httpQuery",
    "httpQueryParams",
    "idempotencyToken",
    "idempotent",
    "input",
    "internal",
    "jsonName",
    "length",
    "mediaType",
    "mixin",
    "noReplace",
    "nestedProperties",
    "notProperty",
    "optionalAuth",
    "output",
    "paginated",
    "pattern",
    "private",
    "property",
    "protocolDefinition",
    "range",
    "readonly",
    "recommended",
    "references",
    "required",
    "requiresLength",
    "resourceIdentifier",
    "retryable",
    "sensitive",
    "since",
    "sparse",
    "streaming",
    "suppress",
    "tags",
    "timestampFormat",
    "title",
    "trait",
    "uniqueItems",
    "unitType",
    "unstable",
    "xmlAttribute",
    "xmlFlattened",
    "xmlName",
    "xmlNamespace",
];

/// The bundled smithy.api prelude: simple shapes, `Unit`, and trait shapes.
fn prelude_shapes() -> &'static [Shape] {
    static PRELUDE: OnceLock<Vec<Shape>> = OnceLock::new();
    PRELUDE.get_or_init(|| {
        let mut shapes = Vec::new();
        for (name, shape_type) in PRELUDE_SIMPLE_SHAPES {
            shapes.push(Shape::new(ShapeId::prelude(name), *shape_type));
        }
        let mut unit = Shape::new(ShapeId::prelude("Unit"), ShapeType::Structure);
        unit.traits.push(AppliedTrait {
            id: ShapeId::prelude("unitType"),
            value: serde_json::Value::Null,
        });
        shapes.push(unit);
        let marker = ShapeId::prelude("trait");
        for name in PRELUDE_TRAITS {
            let mut shape = Shape::new(ShapeId::prelude(name), ShapeType::Structure);
            if shape.id != marker {
                shape.traits.push(AppliedTrait {
                    id: marker.clone(),
                    value: serde_json::Value::Null,
                });
            }
            shapes.push(shape);
        }
        shapes
    })
}

/// True when a model file path should be fed to the assembler.
pub fn is_model_file(path: &str) -> bool {
    path.ends_with(".smithy") || path.ends_with(".json")
}
