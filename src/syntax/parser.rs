use super::lexer::{Lexer, Token, TokenKind, string_value};
use super::{
    Control, ErrStatement, ForResource, Ident, IdlParse, MemberDef, MemberForm, Metadata, Mixins,
    Node, ParseError, Preamble, ShapeDef, ShapeType, Statement, TraitApplication, UseStatement,
};
use crate::document::Span;

pub fn parse(source: &str) -> IdlParse {
    let tokens: Vec<Token> = Lexer::tokens(source)
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::DocComment))
        .collect();
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        statements: Vec::new(),
        parents: Vec::new(),
        preamble: Preamble::default(),
        errors: Vec::new(),
    };
    parser.parse_file();
    IdlParse {
        statements: parser.statements,
        parents: parser.parents,
        preamble: parser.preamble,
        errors: parser.errors,
    }
}

/// Statement container: decides how body entries parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Members,
    NodeMembers,
    EnumMembers,
}

impl Container {
    fn for_shape(shape_type: ShapeType) -> Self {
        if shape_type.has_node_members() {
            Container::NodeMembers
        } else if matches!(shape_type, ShapeType::Enum | ShapeType::IntEnum) {
            Container::EnumMembers
        } else {
            Container::Members
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    statements: Vec<Statement>,
    parents: Vec<Option<usize>>,
    preamble: Preamble,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token {
        self.tokens
            .get(self.pos)
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.source.len(), self.source.len()))
    }

    fn peek_ahead(&self, n: usize) -> Token {
        self.tokens
            .get(self.pos + n)
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.source.len(), self.source.len()))
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        (self.peek().kind == kind).then(|| self.advance())
    }

    fn text(&self, token: Token) -> &'a str {
        token.text(self.source)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Ident && self.text(token) == keyword
    }

    fn push(&mut self, statement: Statement, parent: Option<usize>) -> usize {
        self.statements.push(statement);
        self.parents.push(parent);
        self.statements.len() - 1
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError {
            span,
            message: message.into(),
        });
    }

    fn parse_file(&mut self) {
        while !self.at_eof() {
            self.parse_top_level();
        }
    }

    fn parse_top_level(&mut self) {
        let token = self.peek();
        match token.kind {
            TokenKind::Dollar => self.parse_control(),
            TokenKind::At => {
                self.parse_trait_application(None, None);
            }
            TokenKind::Ident => {
                let word = self.text(token);
                match word {
                    "namespace" => self.parse_namespace(),
                    "metadata" => self.parse_metadata(),
                    "use" => self.parse_use(),
                    "apply" => self.parse_apply(),
                    _ => {
                        if let Some(shape_type) = ShapeType::from_keyword(word) {
                            self.parse_shape_def(shape_type);
                        } else {
                            self.unexpected_statement("expected a statement keyword");
                        }
                    }
                }
            }
            _ => self.unexpected_statement("expected a statement"),
        }
    }

    /// `$key: node-value`
    fn parse_control(&mut self) {
        let dollar = self.advance();
        let Some(key_token) = self.eat(TokenKind::Ident) else {
            self.err_statement(dollar.span, "expected a control statement key", None);
            return;
        };
        let key = Ident::new(self.text(key_token), key_token.span);
        if self.eat(TokenKind::Colon).is_none() {
            self.error(key.span, "expected ':' after control statement key");
        }
        let mut refs = Vec::new();
        let value = self.parse_node(&mut refs);
        let span = dollar.span.cover(value.span());
        if key.text == "version" {
            if let Node::Str {
                value: version,
                span,
            } = &value
            {
                self.preamble.version = Some((version.clone(), *span));
            }
        }
        self.push(Statement::Control(Control { span, key, value }), None);
    }

    /// `namespace com.example` — recorded on the preamble.
    fn parse_namespace(&mut self) {
        let keyword = self.advance();
        match self.parse_shape_id() {
            Some(id) => self.preamble.namespace = Some(id),
            None => self.error(keyword.span, "expected a namespace after 'namespace'"),
        }
    }

    /// `metadata key = node-value`
    fn parse_metadata(&mut self) {
        let keyword = self.advance();
        let key = match self.peek().kind {
            TokenKind::Ident => {
                let token = self.advance();
                Ident::new(self.text(token), token.span)
            }
            TokenKind::Str => {
                let token = self.advance();
                Ident::new(string_value(self.text(token)), token.span)
            }
            _ => {
                self.err_statement(keyword.span, "expected a metadata key", None);
                return;
            }
        };
        if self.eat(TokenKind::Equals).is_none() {
            self.error(key.span, "expected '=' after metadata key");
        }
        let mut refs = Vec::new();
        let value = self.parse_node(&mut refs);
        let span = keyword.span.cover(value.span());
        self.push(Statement::Metadata(Metadata { span, key, value }), None);
    }

    /// `use com.example#Shape`
    fn parse_use(&mut self) {
        let keyword = self.advance();
        let Some(id) = self.parse_shape_id() else {
            self.err_statement(keyword.span, "expected a shape id after 'use'", None);
            return;
        };
        if !id.text.contains('#') {
            self.error(id.span, "use statements require an absolute shape id");
        }
        let span = keyword.span.cover(id.span);
        self.preamble.uses.push(id.clone());
        self.push(Statement::Use(UseStatement { span, id }), None);
    }

    /// `apply Target @trait` or `apply Target { @t1 @t2 }`
    fn parse_apply(&mut self) {
        let keyword = self.advance();
        let Some(target) = self.parse_shape_id() else {
            self.err_statement(keyword.span, "expected a shape id after 'apply'", None);
            return;
        };
        if self.eat(TokenKind::LBrace).is_some() {
            while !self.at_eof() && self.peek().kind != TokenKind::RBrace {
                if self.peek().kind == TokenKind::At {
                    self.parse_trait_application(None, Some(target.clone()));
                } else {
                    let token = self.advance();
                    self.error(token.span, "expected a trait application");
                }
            }
            self.eat(TokenKind::RBrace);
        } else if self.peek().kind == TokenKind::At {
            self.parse_trait_application(None, Some(target));
        } else {
            self.err_statement(keyword.span.cover(target.span), "expected '@' after apply target", None);
        }
    }

    /// `@trait.id` with an optional parenthesized value.
    fn parse_trait_application(&mut self, parent: Option<usize>, apply_target: Option<Ident>) {
        let at = self.advance();
        let Some(id) = self.parse_shape_id() else {
            self.err_statement(at.span, "expected a trait id after '@'", parent);
            return;
        };
        let mut refs = Vec::new();
        let mut end = id.span.end;
        let value = if self.eat(TokenKind::LParen).is_some() {
            let value = if self.peek().kind == TokenKind::RParen {
                Node::Kvps {
                    span: Span::empty(self.peek().span.start),
                    kvps: Vec::new(),
                }
            } else if self.looks_like_kvps() {
                self.parse_kvps(TokenKind::RParen, &mut refs)
            } else {
                self.parse_node(&mut refs)
            };
            match self.eat(TokenKind::RParen) {
                Some(close) => end = close.span.end,
                None => {
                    end = value.span().end;
                    self.error(Span::empty(end), "expected ')' to close trait value");
                }
            }
            Some(value)
        } else {
            None
        };
        let span = Span::new(at.span.start, end);
        self.push(
            Statement::TraitApplication(TraitApplication {
                span,
                id,
                value,
                refs,
                apply_target,
            }),
            parent,
        );
    }

    fn looks_like_kvps(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident | TokenKind::Str)
            && self.peek_ahead(1).kind == TokenKind::Colon
    }

    /// `shape-keyword Name [for Resource] [with [Mixins]] [{ body }]`
    fn parse_shape_def(&mut self, shape_type: ShapeType) {
        let keyword = self.advance();
        let Some(name_token) = self.eat(TokenKind::Ident) else {
            self.err_statement(keyword.span, "expected a shape name", None);
            return;
        };
        let name = Ident::new(self.text(name_token), name_token.span);
        let span = keyword.span.cover(name.span);
        let shape_index = self.push(
            Statement::ShapeDef(ShapeDef {
                span,
                shape_type,
                keyword_span: keyword.span,
                name,
                body_span: None,
            }),
            None,
        );

        self.parse_for_and_with(shape_index);

        if let Some(body_span) = self.parse_body(shape_index, Container::for_shape(shape_type)) {
            if let Statement::ShapeDef(def) = &mut self.statements[shape_index] {
                def.body_span = Some(body_span);
            }
        } else if !shape_type.is_simple() && shape_type != ShapeType::Member {
            self.error(span, "expected '{' to open the shape body");
        }
    }

    fn parse_for_and_with(&mut self, parent_index: usize) {
        loop {
            if self.peek_keyword("for") {
                let keyword = self.advance();
                match self.parse_shape_id() {
                    Some(id) => {
                        let span = keyword.span.cover(id.span);
                        self.push(
                            Statement::ForResource(ForResource { span, id }),
                            Some(parent_index),
                        );
                    }
                    None => self.error(keyword.span, "expected a resource id after 'for'"),
                }
            } else if self.peek_keyword("with") {
                let keyword = self.advance();
                let mut ids = Vec::new();
                let mut end = keyword.span.end;
                if self.eat(TokenKind::LBracket).is_some() {
                    while let Some(id) = self.parse_shape_id() {
                        end = id.span.end;
                        ids.push(id);
                        if self.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    match self.eat(TokenKind::RBracket) {
                        Some(close) => end = close.span.end,
                        None => self.error(Span::empty(end), "expected ']' to close mixin list"),
                    }
                } else {
                    self.error(keyword.span, "expected '[' after 'with'");
                }
                let span = Span::new(keyword.span.start, end);
                self.push(Statement::Mixins(Mixins { span, ids }), Some(parent_index));
            } else {
                return;
            }
        }
    }

    /// Parse a `{ ... }` body, returning its span.
    fn parse_body(&mut self, parent_index: usize, container: Container) -> Option<Span> {
        let open = self.eat(TokenKind::LBrace)?;
        while !self.at_eof() && self.peek().kind != TokenKind::RBrace {
            self.parse_body_item(parent_index, container);
        }
        let end = match self.eat(TokenKind::RBrace) {
            Some(close) => close.span.end,
            None => {
                self.error(Span::empty(self.peek().span.start), "expected '}' to close the body");
                self.peek().span.start
            }
        };
        Some(Span::new(open.span.start, end))
    }

    fn parse_body_item(&mut self, parent_index: usize, container: Container) {
        let token = self.peek();
        match token.kind {
            TokenKind::At => self.parse_trait_application(Some(parent_index), None),
            TokenKind::Dollar => self.parse_elided_member(parent_index),
            TokenKind::Comma => {
                self.advance();
            }
            TokenKind::Ident => self.parse_member(parent_index, container),
            _ => {
                let token = self.advance();
                self.push(
                    Statement::Err(ErrStatement {
                        span: token.span,
                        message: "expected a member definition".to_string(),
                    }),
                    Some(parent_index),
                );
            }
        }
    }

    /// `$name` — target elided to a mixin or resource member.
    fn parse_elided_member(&mut self, parent_index: usize) {
        let dollar = self.advance();
        let Some(name_token) = self.eat(TokenKind::Ident) else {
            self.err_statement(dollar.span, "expected a member name after '$'", Some(parent_index));
            return;
        };
        let name = Ident::new(self.text(name_token), name_token.span);
        let span = dollar.span.cover(name.span);
        self.push(
            Statement::MemberDef(MemberDef {
                span,
                form: MemberForm::Elided,
                name,
                target: None,
                value: None,
                body_span: None,
            }),
            Some(parent_index),
        );
    }

    fn parse_member(&mut self, parent_index: usize, container: Container) {
        let name_token = self.advance();
        let name = Ident::new(self.text(name_token), name_token.span);

        match self.peek().kind {
            TokenKind::Colon => {
                self.advance();
                if container == Container::NodeMembers
                    || !matches!(self.peek().kind, TokenKind::Ident)
                {
                    self.parse_node_member(parent_index, name);
                } else {
                    self.parse_explicit_member(parent_index, name);
                }
            }
            TokenKind::Walrus => {
                self.advance();
                self.parse_inline_member(parent_index, name);
            }
            TokenKind::Equals if container == Container::EnumMembers => {
                self.advance();
                let mut refs = Vec::new();
                let value = self.parse_node(&mut refs);
                let span = name.span.cover(value.span());
                self.push(
                    Statement::MemberDef(MemberDef {
                        span,
                        form: MemberForm::Bare,
                        name,
                        target: None,
                        value: Some(value),
                        body_span: None,
                    }),
                    Some(parent_index),
                );
            }
            _ if container == Container::EnumMembers => {
                let span = name.span;
                self.push(
                    Statement::MemberDef(MemberDef {
                        span,
                        form: MemberForm::Bare,
                        name,
                        target: None,
                        value: None,
                        body_span: None,
                    }),
                    Some(parent_index),
                );
            }
            _ => {
                self.err_statement(name.span, "expected ':' after member name", Some(parent_index));
            }
        }
    }

    /// `name: Target [= default]`
    fn parse_explicit_member(&mut self, parent_index: usize, name: Ident) {
        // `bar:` immediately followed by the next member definition: keep
        // the dangling member rather than stealing the neighbor's name.
        if self.peek().kind == TokenKind::Ident
            && matches!(
                self.peek_ahead(1).kind,
                TokenKind::Colon | TokenKind::Walrus
            )
        {
            self.error(name.span, "expected a member target");
            self.push(
                Statement::MemberDef(MemberDef {
                    span: name.span,
                    form: MemberForm::Explicit,
                    name,
                    target: None,
                    value: None,
                    body_span: None,
                }),
                Some(parent_index),
            );
            return;
        }
        let Some(target) = self.parse_shape_id() else {
            self.err_statement(name.span, "expected a member target", Some(parent_index));
            return;
        };
        let mut span = name.span.cover(target.span);
        let value = if self.eat(TokenKind::Equals).is_some() {
            let mut refs = Vec::new();
            let value = self.parse_node(&mut refs);
            span = span.cover(value.span());
            Some(value)
        } else {
            None
        };
        self.push(
            Statement::MemberDef(MemberDef {
                span,
                form: MemberForm::Explicit,
                name,
                target: Some(target),
                value,
                body_span: None,
            }),
            Some(parent_index),
        );
    }

    /// `key: node-value` inside services and resources, and member-like
    /// positions whose value is a node (`errors: [A, B]`).
    fn parse_node_member(&mut self, parent_index: usize, key: Ident) {
        let mut refs = Vec::new();
        let value = self.parse_node(&mut refs);
        let span = key.span.cover(value.span());
        self.push(
            Statement::NodeMemberDef(super::NodeMemberDef {
                span,
                key,
                value,
                refs,
            }),
            Some(parent_index),
        );
    }

    /// `name := [@traits] [for R] [with [M]] { body }`
    fn parse_inline_member(&mut self, parent_index: usize, name: Ident) {
        let span = name.span;
        let member_index = self.push(
            Statement::MemberDef(MemberDef {
                span,
                form: MemberForm::Inline,
                name,
                target: None,
                value: None,
                body_span: None,
            }),
            Some(parent_index),
        );
        while self.peek().kind == TokenKind::At {
            self.parse_trait_application(Some(member_index), None);
        }
        self.parse_for_and_with(member_index);
        match self.parse_body(member_index, Container::Members) {
            Some(body_span) => {
                if let Statement::MemberDef(def) = &mut self.statements[member_index] {
                    def.body_span = Some(body_span);
                    def.span = def.span.cover(Span::empty(body_span.start));
                }
            }
            None => self.error(span, "expected '{' after ':='"),
        }
    }

    /// Parse a shape id: `ns.part#Name$member` or any prefix of that form.
    /// Component tokens must be adjacent (no gaps).
    fn parse_shape_id(&mut self) -> Option<Ident> {
        let first = self.eat(TokenKind::Ident)?;
        let start = first.span.start;
        let mut end = first.span.end;
        // Dotted namespace parts.
        while self.peek().kind == TokenKind::Dot
            && self.peek().span.start == end
            && self.peek_ahead(1).kind == TokenKind::Ident
        {
            self.advance();
            end = self.advance().span.end;
        }
        // `#Name`
        if self.peek().kind == TokenKind::Pound
            && self.peek().span.start == end
            && self.peek_ahead(1).kind == TokenKind::Ident
        {
            self.advance();
            end = self.advance().span.end;
        }
        // `$member`
        if self.peek().kind == TokenKind::Dollar
            && self.peek().span.start == end
            && self.peek_ahead(1).kind == TokenKind::Ident
        {
            self.advance();
            end = self.advance().span.end;
        }
        let span = Span::new(start, end);
        Some(Ident::new(&self.source[start..end], span))
    }

    /// Parse an IDL node value. Bare identifiers are shape references:
    /// they become `Str` nodes and are recorded in `refs`.
    fn parse_node(&mut self, refs: &mut Vec<Ident>) -> Node {
        let token = self.peek();
        match token.kind {
            TokenKind::LBrace => {
                let open = self.advance();
                let kvps = self.parse_kvp_list(TokenKind::RBrace, refs);
                let end = match self.eat(TokenKind::RBrace) {
                    Some(close) => close.span.end,
                    None => {
                        self.error(Span::empty(self.peek().span.start), "expected '}'");
                        self.peek().span.start
                    }
                };
                Node::Obj {
                    span: Span::new(open.span.start, end),
                    kvps,
                }
            }
            TokenKind::LBracket => {
                let open = self.advance();
                let mut elements = Vec::new();
                while !self.at_eof()
                    && !matches!(
                        self.peek().kind,
                        TokenKind::RBracket | TokenKind::RBrace | TokenKind::RParen
                    )
                {
                    if self.eat(TokenKind::Comma).is_some() {
                        continue;
                    }
                    elements.push(self.parse_node(refs));
                }
                let end = match self.eat(TokenKind::RBracket) {
                    Some(close) => close.span.end,
                    None => {
                        self.error(Span::empty(self.peek().span.start), "expected ']'");
                        self.peek().span.start
                    }
                };
                Node::Arr {
                    span: Span::new(open.span.start, end),
                    elements,
                }
            }
            TokenKind::Str | TokenKind::TextBlock => {
                let token = self.advance();
                Node::Str {
                    span: token.span,
                    value: string_value(self.text(token)),
                }
            }
            TokenKind::Number => {
                let token = self.advance();
                match self.text(token).parse::<f64>() {
                    Ok(value) => Node::Num {
                        span: token.span,
                        value,
                    },
                    Err(_) => Node::Err {
                        span: token.span,
                        message: "invalid number".to_string(),
                    },
                }
            }
            TokenKind::Ident => match self.text(token) {
                "true" => {
                    self.advance();
                    Node::Bool {
                        span: token.span,
                        value: true,
                    }
                }
                "false" => {
                    self.advance();
                    Node::Bool {
                        span: token.span,
                        value: false,
                    }
                }
                "null" => {
                    self.advance();
                    Node::Null { span: token.span }
                }
                _ => match self.parse_shape_id() {
                    Some(id) => {
                        refs.push(id.clone());
                        Node::Str {
                            span: id.span,
                            value: id.text,
                        }
                    }
                    None => {
                        let token = self.advance();
                        Node::Err {
                            span: token.span,
                            message: "expected a node value".to_string(),
                        }
                    }
                },
            },
            // Closers are never consumed here: the missing value becomes an
            // empty Err node and the enclosing construct handles the close.
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen | TokenKind::Eof => {
                let span = Span::empty(token.span.start);
                self.error(span, "expected a node value");
                Node::Err {
                    span,
                    message: "expected a node value".to_string(),
                }
            }
            _ => {
                let token = self.advance();
                self.error(token.span, "expected a node value");
                Node::Err {
                    span: token.span,
                    message: "expected a node value".to_string(),
                }
            }
        }
    }

    /// A bare `key: value, key: value` sequence (trait arguments).
    fn parse_kvps(&mut self, terminator: TokenKind, refs: &mut Vec<Ident>) -> Node {
        let start = self.peek().span.start;
        let kvps = self.parse_kvp_list(terminator, refs);
        let end = kvps.last().map(|k| k.span().end).unwrap_or(start);
        Node::Kvps {
            span: Span::new(start, end),
            kvps,
        }
    }

    fn parse_kvp_list(&mut self, terminator: TokenKind, refs: &mut Vec<Ident>) -> Vec<Node> {
        let mut kvps = Vec::new();
        while !self.at_eof() && self.peek().kind != terminator {
            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            let key_token = self.peek();
            let key = match key_token.kind {
                TokenKind::Ident => {
                    self.advance();
                    self.text(key_token).to_string()
                }
                TokenKind::Str => {
                    self.advance();
                    string_value(self.text(key_token))
                }
                _ => {
                    let token = self.advance();
                    kvps.push(Node::Err {
                        span: token.span,
                        message: "expected a key".to_string(),
                    });
                    continue;
                }
            };
            if self.eat(TokenKind::Colon).is_none() {
                kvps.push(Node::Err {
                    span: key_token.span,
                    message: "expected ':' after key".to_string(),
                });
                continue;
            }
            let value = self.parse_node(refs);
            kvps.push(Node::Kvp {
                span: key_token.span.cover(value.span()),
                key,
                key_span: key_token.span,
                value: Box::new(value),
            });
        }
        kvps
    }

    /// Emit an `Err` statement and resynchronize to the next plausible
    /// statement start.
    fn unexpected_statement(&mut self, message: &str) {
        let start = self.advance().span;
        self.err_statement(start, message, None);
    }

    fn err_statement(&mut self, start: Span, message: &str, parent: Option<usize>) {
        let mut span = start;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof | TokenKind::At | TokenKind::Dollar | TokenKind::RBrace => break,
                TokenKind::Ident => {
                    let word = self.text(token);
                    if ShapeType::from_keyword(word).is_some()
                        || matches!(word, "namespace" | "metadata" | "use" | "apply")
                    {
                        break;
                    }
                    // Inside a body an identifier plausibly starts a member.
                    if parent.is_some() {
                        break;
                    }
                    span = span.cover(token.span);
                    self.advance();
                }
                _ => {
                    span = span.cover(token.span);
                    self.advance();
                }
            }
        }
        self.error(span, message);
        self.push(
            Statement::Err(ErrStatement {
                span,
                message: message.to_string(),
            }),
            parent,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::{MemberForm, ShapeType, Statement, StatementView, parse_idl};

    const BASIC: &str = "$version: \"2\"\nnamespace com.demo\n\nuse smithy.api#sensitive\n\nstructure Foo {\n    bar: String\n}\n";

    #[test]
    fn parses_preamble() {
        let parse = parse_idl(BASIC);
        assert_eq!(parse.preamble.version.as_ref().unwrap().0, "2");
        assert_eq!(parse.preamble.namespace.as_ref().unwrap().text, "com.demo");
        assert_eq!(parse.preamble.uses.len(), 1);
        assert_eq!(parse.preamble.uses[0].text, "smithy.api#sensitive");
        assert!(parse.errors.is_empty());
    }

    #[test]
    fn parses_structure_with_member() {
        let parse = parse_idl(BASIC);
        let shape = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::ShapeDef(def) => Some(def),
                _ => None,
            })
            .unwrap();
        assert_eq!(shape.shape_type, ShapeType::Structure);
        assert_eq!(shape.name.text, "Foo");
        assert!(shape.body_span.is_some());

        let member = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::MemberDef(def) => Some(def),
                _ => None,
            })
            .unwrap();
        assert_eq!(member.name.text, "bar");
        assert_eq!(member.form, MemberForm::Explicit);
        assert_eq!(member.target.as_ref().unwrap().text, "String");
    }

    #[test]
    fn member_parent_is_shape() {
        let parse = parse_idl(BASIC);
        let member_index = parse
            .statements
            .iter()
            .position(|s| matches!(s, Statement::MemberDef(_)))
            .unwrap();
        let parent_index = parse.parents[member_index].unwrap();
        assert!(matches!(
            parse.statements[parent_index],
            Statement::ShapeDef(_)
        ));
    }

    #[test]
    fn trait_application_records_id_and_value() {
        let src = "@length(min: 1, max: 10)\nstring Name\n";
        let parse = parse_idl(src);
        let t = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::TraitApplication(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(t.id.text, "length");
        let value = t.value.as_ref().unwrap();
        assert!(value.get("min").is_some());
        assert!(value.get("max").is_some());
    }

    #[test]
    fn trait_with_empty_parens() {
        let parse = parse_idl("@deprecated()\nstring Name\n");
        let t = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::TraitApplication(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert!(t.value.is_some());
    }

    #[test]
    fn elided_and_mixin_members() {
        let src = "structure Foo for Res with [Base] {\n    $id\n    name: String\n}\n";
        let parse = parse_idl(src);
        let elided = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::MemberDef(def) if def.form == MemberForm::Elided => Some(def),
                _ => None,
            })
            .unwrap();
        assert_eq!(elided.name.text, "id");
        let mixins = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::Mixins(m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(mixins.ids[0].text, "Base");
        let for_resource = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::ForResource(f) => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(for_resource.id.text, "Res");
        assert!(parse.errors.is_empty());
    }

    #[test]
    fn service_body_is_node_members() {
        let src = "service Weather {\n    version: \"2006-03-01\"\n    operations: [GetForecast]\n}\n";
        let parse = parse_idl(src);
        let node_members: Vec<_> = parse
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::NodeMemberDef(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(node_members.len(), 2);
        assert_eq!(node_members[1].refs.len(), 1);
        assert_eq!(node_members[1].refs[0].text, "GetForecast");
    }

    #[test]
    fn operation_with_inline_io() {
        let src = "operation GetUser {\n    input := {\n        id: String\n    }\n    errors: [NotFound]\n}\n";
        let parse = parse_idl(src);
        let inline = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::MemberDef(def) if def.form == MemberForm::Inline => Some(def),
                _ => None,
            })
            .unwrap();
        assert_eq!(inline.name.text, "input");
        assert!(inline.body_span.is_some());

        // The inline body's member is parented to the inline member def.
        let id_index = parse
            .statements
            .iter()
            .position(|s| matches!(s, Statement::MemberDef(d) if d.name.text == "id"))
            .unwrap();
        let parent = parse.parents[id_index].unwrap();
        assert!(matches!(
            &parse.statements[parent],
            Statement::MemberDef(d) if d.name.text == "input"
        ));

        let errors = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::NodeMemberDef(n) if n.key.text == "errors" => Some(n),
                _ => None,
            })
            .unwrap();
        assert_eq!(errors.refs[0].text, "NotFound");
    }

    #[test]
    fn enum_members_parse_bare_and_valued() {
        let src = "enum Suit {\n    CLUB\n    DIAMOND = \"diamond\"\n}\n";
        let parse = parse_idl(src);
        let members: Vec<_> = parse
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::MemberDef(def) => Some(def),
                _ => None,
            })
            .collect();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].form, MemberForm::Bare);
        assert!(members[1].value.is_some());
    }

    #[test]
    fn apply_statement() {
        let parse = parse_idl("apply Foo @deprecated\n");
        let t = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::TraitApplication(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(t.apply_target.as_ref().unwrap().text, "Foo");
        assert_eq!(t.id.text, "deprecated");
    }

    #[test]
    fn metadata_statement() {
        let parse = parse_idl("metadata validators = [{name: \"x\"}]\n");
        let m = parse
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::Metadata(m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(m.key.text, "validators");
    }

    #[test]
    fn garbage_produces_err_statement_and_recovers() {
        let src = "%%%\nstructure Foo {}\n";
        let parse = parse_idl(src);
        assert!(!parse.errors.is_empty());
        assert!(
            parse
                .statements
                .iter()
                .any(|s| matches!(s, Statement::Err(_)))
        );
        assert!(
            parse
                .statements
                .iter()
                .any(|s| matches!(s, Statement::ShapeDef(d) if d.name.text == "Foo"))
        );
    }

    #[test]
    fn missing_member_target_recovers() {
        let src = "structure Foo {\n    bar:\n    baz: String\n}\n";
        let parse = parse_idl(src);
        assert!(!parse.errors.is_empty());
        assert!(
            parse
                .statements
                .iter()
                .any(|s| matches!(s, Statement::MemberDef(d) if d.name.text == "baz"))
        );
    }

    #[test]
    fn statement_ranges_do_not_overlap() {
        let src = "$version: \"2\"\nnamespace demo\nstructure Foo {\n    bar: String\n    baz: Integer\n}\n@deprecated\nstring Old\n";
        let parse = parse_idl(src);
        let mut spans: Vec<_> = parse.statements.iter().map(|s| s.span()).collect();
        spans.sort_by_key(|s| s.start);
        for pair in spans.windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "overlapping statements: {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn statement_view_walks_ancestors() {
        let src = "operation GetUser {\n    input := {\n        id: String\n    }\n}\n";
        let parse = parse_idl(src);
        let offset = src.find("id:").unwrap() + 1;
        let view = StatementView::at(&parse, offset).unwrap();
        assert!(matches!(view.statement(), Statement::MemberDef(d) if d.name.text == "id"));
        let shape = view.containing_shape().unwrap();
        assert_eq!(shape.name.text, "GetUser");
        assert_eq!(view.ancestors().len(), 2);
    }

    #[test]
    fn offset_in_body_trivia_maps_to_shape() {
        let src = "structure Foo {\n\n}\n";
        let parse = parse_idl(src);
        let offset = src.find('\n').unwrap() + 1;
        let view = StatementView::at(&parse, offset).unwrap();
        assert!(matches!(view.statement(), Statement::ShapeDef(_)));
    }

    #[test]
    fn reparse_is_deterministic() {
        let a = parse_idl(BASIC);
        let b = parse_idl(BASIC);
        assert_eq!(a, b);
    }
}
