use crate::document::Span;

/// Token kinds produced by the IDL tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    TextBlock,
    Number,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Walrus,
    Equals,
    At,
    Dollar,
    Dot,
    Pound,
    Comment,
    DocComment,
    Whitespace,
    Err,
    Eof,
}

impl TokenKind {
    /// Trivia is skipped by the parser but still occupies source spans.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// A forward tokenizer over a byte-position cursor.
///
/// Never fails: unrecognized input becomes an `Err` token and lexing
/// continues at the next character. Restartable at any byte offset so
/// statements can be re-lexed independently.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn at(source: &'a str, offset: usize) -> Self {
        Self {
            source,
            pos: offset.min(source.len()),
        }
    }

    /// Lex the whole source, excluding whitespace but keeping comments and
    /// doc comments (the parser attaches doc comments to statements).
    pub fn tokens(source: &'a str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                tokens.push(token);
                return tokens;
            }
            if token.kind != TokenKind::Whitespace {
                tokens.push(token);
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.source[self.pos..].chars().next() {
            self.pos += ch.len_utf8();
        }
    }

    pub fn next_token(&mut self) -> Token {
        let start = self.pos;
        let Some(b) = self.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                    self.pos += 1;
                }
                Token::new(TokenKind::Whitespace, start, self.pos)
            }
            b'/' if self.peek_at(1) == Some(b'/') => self.lex_comment(start),
            b'"' => self.lex_string(start),
            b'-' | b'0'..=b'9' => self.lex_number(start),
            b'{' => self.punct(TokenKind::LBrace, start),
            b'}' => self.punct(TokenKind::RBrace, start),
            b'[' => self.punct(TokenKind::LBracket, start),
            b']' => self.punct(TokenKind::RBracket, start),
            b'(' => self.punct(TokenKind::LParen, start),
            b')' => self.punct(TokenKind::RParen, start),
            b'<' => self.punct(TokenKind::LAngle, start),
            b'>' => self.punct(TokenKind::RAngle, start),
            b',' => self.punct(TokenKind::Comma, start),
            b':' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                Token::new(TokenKind::Walrus, start, self.pos)
            }
            b':' => self.punct(TokenKind::Colon, start),
            b'=' => self.punct(TokenKind::Equals, start),
            b'@' => self.punct(TokenKind::At, start),
            b'$' => self.punct(TokenKind::Dollar, start),
            b'.' => self.punct(TokenKind::Dot, start),
            b'#' => self.punct(TokenKind::Pound, start),
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
                {
                    self.pos += 1;
                }
                Token::new(TokenKind::Ident, start, self.pos)
            }
            _ => {
                self.bump();
                Token::new(TokenKind::Err, start, self.pos)
            }
        }
    }

    fn punct(&mut self, kind: TokenKind, start: usize) -> Token {
        self.pos += 1;
        Token::new(kind, start, self.pos)
    }

    fn lex_comment(&mut self, start: usize) -> Token {
        let kind = if self.peek_at(2) == Some(b'/') {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        while self.peek().is_some_and(|b| b != b'\n') {
            self.bump();
        }
        Token::new(kind, start, self.pos)
    }

    fn lex_string(&mut self, start: usize) -> Token {
        // Text block: """ ... """
        if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') {
            self.pos += 3;
            loop {
                match self.peek() {
                    None => return Token::new(TokenKind::Err, start, self.pos),
                    Some(b'"')
                        if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') =>
                    {
                        self.pos += 3;
                        return Token::new(TokenKind::TextBlock, start, self.pos);
                    }
                    Some(b'\\') => {
                        self.bump();
                        self.bump();
                    }
                    _ => self.bump(),
                }
            }
        }

        self.pos += 1;
        loop {
            match self.peek() {
                // Unterminated string: stop at end of line so one bad quote
                // doesn't swallow the rest of the file.
                None | Some(b'\n') => return Token::new(TokenKind::Err, start, self.pos),
                Some(b'"') => {
                    self.pos += 1;
                    return Token::new(TokenKind::Str, start, self.pos);
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                _ => self.bump(),
            }
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        if self.peek() == Some(b'-') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Token::new(TokenKind::Err, start, self.pos);
            }
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }
        Token::new(TokenKind::Number, start, self.pos)
    }
}

/// Unescape a quoted string token's text (without surrounding quotes for
/// plain strings, without the `"""` fences for text blocks).
pub fn string_value(token_text: &str) -> String {
    let inner = if let Some(stripped) = token_text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
    {
        // Text blocks begin after the first newline.
        stripped.split_once('\n').map(|(_, rest)| rest).unwrap_or("")
    } else {
        token_text
            .strip_prefix('"')
            .map(|t| t.strip_suffix('"').unwrap_or(t))
            .unwrap_or(token_text)
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
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
