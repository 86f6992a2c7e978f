use crate::document::Span;

/// A parsed node value. Used for JSON build files and for trait/metadata
/// values inside IDL files. Parsing is error-tolerant: malformed input
/// becomes `Err` nodes with spans, never a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A braced object `{ ... }`.
    Obj { span: Span, kvps: Vec<Node> },
    /// A bare key-value sequence (trait arguments without braces).
    Kvps { span: Span, kvps: Vec<Node> },
    /// A single key-value pair. `key_span` covers the key token.
    Kvp {
        span: Span,
        key: String,
        key_span: Span,
        value: Box<Node>,
    },
    Arr { span: Span, elements: Vec<Node> },
    Str { span: Span, value: String },
    Num { span: Span, value: f64 },
    Bool { span: Span, value: bool },
    Null { span: Span },
    Err { span: Span, message: String },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Obj { span, .. }
            | Node::Kvps { span, .. }
            | Node::Kvp { span, .. }
            | Node::Arr { span, .. }
            | Node::Str { span, .. }
            | Node::Num { span, .. }
            | Node::Bool { span, .. }
            | Node::Null { span }
            | Node::Err { span, .. } => *span,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Look up a key in an `Obj` or `Kvps` node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        let kvps = match self {
            Node::Obj { kvps, .. } | Node::Kvps { kvps, .. } => kvps,
            _ => return None,
        };
        kvps.iter().find_map(|kvp| match kvp {
            Node::Kvp { key: k, value, .. } if k == key => Some(value.as_ref()),
            _ => None,
        })
    }

    /// Convert to a plain JSON value for typed deserialization. `Err` nodes
    /// become `Null` so a partially-broken file still yields usable config.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Node::Obj { kvps, .. } | Node::Kvps { kvps, .. } => {
                let mut map = serde_json::Map::new();
                for kvp in kvps {
                    if let Node::Kvp { key, value, .. } = kvp {
                        map.insert(key.clone(), value.to_json());
                    }
                }
                Value::Object(map)
            }
            Node::Kvp { value, .. } => value.to_json(),
            Node::Arr { elements, .. } => {
                Value::Array(elements.iter().map(Node::to_json).collect())
            }
            Node::Str { value, .. } => Value::String(value.clone()),
            Node::Num { value, .. } => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::Bool { value, .. } => Value::Bool(*value),
            Node::Null { .. } | Node::Err { .. } => Value::Null,
        }
    }

    /// Walk to the deepest node containing `offset`, collecting the object
    /// key path along the way. Used by build-file completion.
    pub fn path_at(&self, offset: usize) -> (Vec<String>, &Node) {
        let mut path = Vec::new();
        let mut current = self;
        'descend: loop {
            match current {
                Node::Obj { kvps, .. } | Node::Kvps { kvps, .. } => {
                    for kvp in kvps {
                        if let Node::Kvp {
                            span, key, value, ..
                        } = kvp
                        {
                            if span.contains(offset) {
                                path.push(key.clone());
                                current = value;
                                continue 'descend;
                            }
                        }
                    }
                    return (path, current);
                }
                Node::Arr { elements, .. } => {
                    for element in elements {
                        if element.span().contains(offset) {
                            current = element;
                            continue 'descend;
                        }
                    }
                    return (path, current);
                }
                _ => return (path, current),
            }
        }
    }

    /// The key of the deepest `Kvp` whose key token contains `offset`.
    pub fn key_at(&self, offset: usize) -> Option<&str> {
        match self {
            Node::Obj { kvps, .. } | Node::Kvps { kvps, .. } => kvps.iter().find_map(|kvp| {
                let Node::Kvp {
                    key,
                    key_span,
                    value,
                    span,
                } = kvp
                else {
                    return None;
                };
                if key_span.contains(offset) {
                    return Some(key.as_str());
                }
                span.contains(offset)
                    .then(|| value.key_at(offset))
                    .flatten()
            }),
            Node::Arr { elements, .. } => elements
                .iter()
                .filter(|e| e.span().contains(offset))
                .find_map(|e| e.key_at(offset)),
            _ => None,
        }
    }

    /// Collect the spans and messages of every `Err` node in the tree.
    pub fn errors(&self) -> Vec<(Span, String)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Err { span, message } => out.push((*span, message.clone())),
                Node::Obj { kvps, .. } | Node::Kvps { kvps, .. } => stack.extend(kvps.iter()),
                Node::Kvp { value, .. } => stack.push(value),
                Node::Arr { elements, .. } => stack.extend(elements.iter()),
                _ => {}
            }
        }
        out
    }
}

/// Parse a JSON document (a build file) into a node tree. Tolerates
/// missing commas, trailing commas, and unterminated constructs; malformed
/// regions become `Err` nodes.
pub fn parse_json(source: &str) -> Node {
    let mut parser = JsonParser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    parser.skip_ws();
    if parser.pos >= parser.bytes.len() {
        return Node::Err {
            span: Span::empty(0),
            message: "file contains no value".to_string(),
        };
    }
    parser.parse_value()
}

struct JsonParser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl JsonParser<'_> {
    fn skip_ws(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_value(&mut self) -> Node {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string(),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b't') | Some(b'f') | Some(b'n') => self.parse_keyword(),
            Some(_) => {
                self.pos += 1;
                Node::Err {
                    span: Span::new(start, self.pos),
                    message: "unexpected character".to_string(),
                }
            }
            None => Node::Err {
                span: Span::empty(start),
                message: "unexpected end of file".to_string(),
            },
        }
    }

    fn parse_object(&mut self) -> Node {
        let start = self.pos;
        self.pos += 1; // {
        let mut kvps = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'"') => kvps.push(self.parse_kvp()),
                Some(_) => {
                    let err_start = self.pos;
                    self.pos += 1;
                    kvps.push(Node::Err {
                        span: Span::new(err_start, self.pos),
                        message: "expected a property name".to_string(),
                    });
                }
                None => {
                    kvps.push(Node::Err {
                        span: Span::empty(self.pos),
                        message: "unclosed object".to_string(),
                    });
                    break;
                }
            }
        }
        Node::Obj {
            span: Span::new(start, self.pos),
            kvps,
        }
    }

    fn parse_kvp(&mut self) -> Node {
        let start = self.pos;
        let key_node = self.parse_string();
        let (key, key_span) = match &key_node {
            Node::Str { value, span } => (value.clone(), *span),
            other => (String::new(), other.span()),
        };
        self.skip_ws();
        let value = if self.peek() == Some(b':') {
            self.pos += 1;
            self.parse_value()
        } else {
            Node::Err {
                span: Span::empty(self.pos),
                message: "expected ':'".to_string(),
            }
        };
        Node::Kvp {
            span: Span::new(start, value.span().end.max(self.pos)),
            key,
            key_span,
            value: Box::new(value),
        }
    }

    fn parse_array(&mut self) -> Node {
        let start = self.pos;
        self.pos += 1; // [
        let mut elements = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(b',') => {
                    self.pos += 1;
                }
                Some(_) => elements.push(self.parse_value()),
                None => {
                    elements.push(Node::Err {
                        span: Span::empty(self.pos),
                        message: "unclosed array".to_string(),
                    });
                    break;
                }
            }
        }
        Node::Arr {
            span: Span::new(start, self.pos),
            elements,
        }
    }

    fn parse_string(&mut self) -> Node {
        let start = self.pos;
        self.pos += 1; // opening quote
        let content_start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let value = unescape_json(&self.source[content_start..self.pos]);
                    self.pos += 1;
                    return Node::Str {
                        span: Span::new(start, self.pos),
                        value,
                    };
                }
                Some(b'\\') => {
                    self.pos = (self.pos + 2).min(self.bytes.len());
                }
                Some(b'\n') | None => {
                    return Node::Err {
                        span: Span::new(start, self.pos),
                        message: "unterminated string".to_string(),
                    };
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_number(&mut self) -> Node {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            self.pos += 1;
        }
        let span = Span::new(start, self.pos);
        match self.source[start..self.pos].parse::<f64>() {
            Ok(value) => Node::Num { span, value },
            Err(_) => Node::Err {
                span,
                message: "invalid number".to_string(),
            },
        }
    }

    fn parse_keyword(&mut self) -> Node {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let span = Span::new(start, self.pos);
        match &self.source[start..self.pos] {
            "true" => Node::Bool { span, value: true },
            "false" => Node::Bool { span, value: false },
            "null" => Node::Null { span },
            other => Node::Err {
                span,
                message: format!("unexpected keyword '{other}'"),
            },
        }
    }
}

fn unescape_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
