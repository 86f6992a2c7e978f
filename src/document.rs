use tower_lsp_server::ls_types::{Position, Range};

/// A byte span into a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Containment check used for position→node lookups. An offset sitting
    /// exactly on `end` counts as inside, so a cursor at the end of an
    /// identifier still hits it.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn cover(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// An identifier-like token extracted from a document at a position.
///
/// Covers the full `namespace#Shape$member` form; the `#` and `$` split
/// points are exposed so callers can tell which part the cursor touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentId {
    pub text: String,
    pub span: Span,
}

impl DocumentId {
    pub fn namespace(&self) -> Option<&str> {
        self.text.split_once('#').map(|(ns, _)| ns)
    }

    pub fn shape_name(&self) -> &str {
        let rest = self
            .text
            .split_once('#')
            .map(|(_, r)| r)
            .unwrap_or(&self.text);
        rest.split_once('$').map(|(name, _)| name).unwrap_or(rest)
    }

    pub fn member(&self) -> Option<&str> {
        self.text.split_once('$').map(|(_, m)| m)
    }

    pub fn is_absolute(&self) -> bool {
        self.text.contains('#')
    }
}

/// An in-memory text buffer with a line-start index.
///
/// Positions at the LSP boundary are 0-based (line, UTF-16 code unit);
/// everything internal is a byte offset. The line index is rebuilt on every
/// edit so it is always consistent with the text.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
    revision: u64,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            text,
            line_starts,
            revision: 0,
        }
    }

    pub fn borrow_text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Monotonic edit counter, bumped once per applied edit. Used by
    /// asynchronous tasks to detect that their snapshot went stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an edit. `range == None` replaces the whole content. Invalid
    /// ranges clamp to document bounds.
    pub fn apply_edit(&mut self, range: Option<Range>, text: &str) {
        match range {
            None => {
                self.text.clear();
                self.text.push_str(text);
            }
            Some(range) => {
                let start = self.position_to_offset(range.start);
                let end = self.position_to_offset(range.end).max(start);
                self.text.replace_range(start..end, text);
            }
        }
        self.line_starts = compute_line_starts(&self.text);
        self.revision += 1;
    }

    /// Convert an LSP position to a byte offset, clamping to document
    /// bounds. A position past the last line maps to the document length.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.text.len();
        };
        let line_end = self.line_end(line);
        let line_text = &self.text[line_start..line_end];
        line_start + utf8_offset_from_utf16(line_text, position.character as usize)
    }

    /// Convert a byte offset (clamped to the text length) back to an LSP
    /// position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = clamp_to_char_boundary(&self.text, offset);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    pub fn span_to_range(&self, span: Span) -> Range {
        Range::new(
            self.offset_to_position(span.start),
            self.offset_to_position(span.end),
        )
    }

    pub fn range_to_span(&self, range: Range) -> Span {
        let start = self.position_to_offset(range.start);
        let end = self.position_to_offset(range.end).max(start);
        Span::new(start, end)
    }

    pub fn copy_range(&self, range: Range) -> String {
        let span = self.range_to_span(range);
        self.copy_span(span)
    }

    pub fn copy_span(&self, span: Span) -> String {
        let start = clamp_to_char_boundary(&self.text, span.start);
        let end = clamp_to_char_boundary(&self.text, span.end.max(start));
        self.text[start..end].to_string()
    }

    /// The range covering the entire document.
    pub fn full_range(&self) -> Range {
        Range::new(Position::new(0, 0), self.offset_to_position(self.text.len()))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .map(|next| {
                // Exclude the newline (and a preceding \r) from the line text.
                let mut end = next - 1;
                if end > 0 && self.text.as_bytes().get(end - 1) == Some(&b'\r') {
                    end -= 1;
                }
                end
            })
            .unwrap_or(self.text.len())
    }

    /// Extract the maximal identifier-like token surrounding `position`.
    /// Identifier characters are letters, digits, `_`, `.`, `#`, and `$`.
    pub fn copy_document_id(&self, position: Position) -> Option<DocumentId> {
        let offset = self.position_to_offset(position);
        let bytes = self.text.as_bytes();

        let is_id_byte =
            |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'#' | b'$');

        // Allow the cursor to sit just past the last character of the token.
        let mut anchor = offset;
        if anchor >= bytes.len() || !is_id_byte(bytes[anchor]) {
            if anchor == 0 || !is_id_byte(bytes[anchor - 1]) {
                return None;
            }
            anchor -= 1;
        }

        let mut start = anchor;
        while start > 0 && is_id_byte(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = anchor + 1;
        while end < bytes.len() && is_id_byte(bytes[end]) {
            end += 1;
        }

        let span = Span::new(start, end);
        Some(DocumentId {
            text: self.text[start..end].to_string(),
            span,
        })
    }
}

/// Precompute byte offsets where each line starts.
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convert a UTF-16 code-unit offset within a line to a byte offset.
/// Offsets past the end of the line clamp to the line length.
fn utf8_offset_from_utf16(line: &str, utf16_offset: usize) -> usize {
    if line.is_ascii() {
        return utf16_offset.min(line.len());
    }
    let mut units = 0;
    for (pos, ch) in line.char_indices() {
        if units >= utf16_offset {
            return pos;
        }
        units += ch.len_utf16();
    }
    line.len()
}
