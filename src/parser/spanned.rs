use unicode_segmentation::UnicodeSegmentation;

/// Location of a token in the source.
///
/// `start`/`end` are byte offsets, `line`/`column` are 1-based and count
/// grapheme clusters, which is what a student sees in the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(item: T, span: Span) -> Self {
        Self { item, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            item: f(self.item),
            span: self.span,
        }
    }
}

pub struct SpanSnippet {
    pub line: usize,
    pub column: usize,
    /// display columns before the span starts
    pub offset: usize,
    /// display columns covered by the span, at least 1
    pub width: usize,
    pub source_line: String,
}

pub fn retrieve_span_snippet(source: &str, span: Span) -> Option<SpanSnippet> {
    let source_line = source.lines().nth(span.line.checked_sub(1)?)?;
    let line_start = source_line.as_ptr() as usize - source.as_ptr() as usize;
    let line_end = line_start + source_line.len();

    if span.start < line_start || span.start > line_end {
        return None;
    }

    let col_start = span.start - line_start;
    let col_end = span.end.min(line_end).max(span.start) - line_start;
    let offset = display_width(&source_line[..col_start]);
    let width = display_width(&source_line[col_start..col_end]).max(1);

    Some(SpanSnippet {
        line: span.line,
        column: span.column,
        offset,
        width,
        source_line: source_line.to_string(),
    })
}

// Emoji render two cells wide in every terminal we care about.
pub(crate) fn display_width(text: &str) -> usize {
    text.graphemes(true)
        .map(|g| match g {
            "\u{FEFF}" => 0,
            g if g.is_ascii() => 1,
            _ => 2,
        })
        .sum()
}
