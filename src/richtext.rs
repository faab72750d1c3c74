//! Utilities for working with styled paragraph markup.
//!
//! Paragraphs travel from the formatter to the renderer as a small inline markup: `<b>...</b>`
//! marks bold text, `<i>...</i>` italic text, and `&amp;`, `&lt;` and `&gt;` stand for the
//! characters they name. The types in this module turn that markup into [`Span`]s, which map onto
//! the [`StyledString`] values consumed by [`genpdf`][genpdf] elements.
//!
//! [genpdf]: https://docs.rs/genpdf/

use std::fmt;

use genpdf::style::{Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the italic flag and returns the updated span.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// Converts a sequence of [`Span`] values into styled strings.
pub fn spans_to_styled_strings<'a, I>(spans: I) -> Vec<StyledString>
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(StyledString::from).collect()
}

/// Parse errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the original input string where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the parsing error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
}

impl StyleState {
    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
}

impl Marker {
    fn opening_token(self) -> &'static str {
        match self {
            Marker::Bold => "<b>",
            Marker::Italic => "<i>",
        }
    }

    fn closing_token(self) -> &'static str {
        match self {
            Marker::Bold => "</b>",
            Marker::Italic => "</i>",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
        }
    }

    fn apply(self, mut state: StyleState) -> StyleState {
        match self {
            Marker::Bold => state.bold = true,
            Marker::Italic => state.italic = true,
        }
        state
    }
}

const MARKERS: [Marker; 2] = [Marker::Bold, Marker::Italic];

const ENTITIES: [(&str, char); 3] = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>')];

/// Parses paragraph markup into a list of [`Span`]s.
///
/// Adjacent text with the same style is merged into one span. Tags nest, so
/// `<b>bo<i>ld</i></b>` yields a bold span followed by a bold italic one. Unknown tags, unknown
/// entities, stray closing tags and unterminated spans are rejected with a [`ParseError`] that
/// carries the byte position of the problem.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    let (spans, idx) = parse_inner(input, 0, StyleState::default(), None)?;
    debug_assert_eq!(idx, input.len());
    Ok(merge_adjacent(spans))
}

fn parse_inner(
    input: &str,
    mut index: usize,
    state: StyleState,
    closing_marker: Option<Marker>,
) -> Result<(Vec<Span>, usize), ParseError> {
    let mut spans = Vec::new();
    let mut buffer = String::new();

    'outer: while index < input.len() {
        let rest = &input[index..];

        if let Some(marker) = closing_marker {
            if rest.starts_with(marker.closing_token()) {
                flush_buffer(&mut buffer, &mut spans, state);
                index += marker.closing_token().len();
                return Ok((spans, index));
            }
        }

        if rest.starts_with('<') {
            for marker in MARKERS {
                if rest.starts_with(marker.opening_token()) {
                    flush_buffer(&mut buffer, &mut spans, state);
                    index += marker.opening_token().len();
                    let (nested, new_index) =
                        parse_inner(input, index, marker.apply(state), Some(marker))?;
                    spans.extend(nested);
                    index = new_index;
                    continue 'outer;
                }
            }

            if rest.starts_with("</") {
                return Err(ParseError::new(
                    index,
                    "unexpected closing tag without matching opening tag",
                ));
            }

            return Err(ParseError::new(
                index,
                "unsupported tag; expected `<b>` or `<i>`",
            ));
        }

        if rest.starts_with('&') {
            let Some((entity, ch)) = ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity))
            else {
                return Err(ParseError::new(
                    index,
                    "unknown entity; expected `&amp;`, `&lt;` or `&gt;`",
                ));
            };
            buffer.push(*ch);
            index += entity.len();
            continue;
        }

        if rest.starts_with('>') {
            return Err(ParseError::new(index, "unexpected `>` outside of a tag"));
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        buffer.push(ch);
        index += ch.len_utf8();
    }

    if let Some(marker) = closing_marker {
        Err(ParseError::new(
            index,
            format!("unterminated {}", marker.description()),
        ))
    } else {
        flush_buffer(&mut buffer, &mut spans, state);
        Ok((spans, index))
    }
}

fn flush_buffer(buffer: &mut String, spans: &mut Vec<Span>, state: StyleState) {
    if buffer.is_empty() {
        return;
    }
    spans.push(state.to_span(std::mem::take(buffer)));
}

fn merge_adjacent(spans: Vec<Span>) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.bold == span.bold && last.italic == span.italic => {
                last.text.push_str(&span.text);
            }
            _ => merged.push(span),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_style_reflects_flags() {
        let span = Span::new("Hello").with_bold(true).with_italic(true);
        let styled = span.to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
    }

    #[test]
    fn parse_plain_text() {
        let spans = parse_markup("Hello world").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("Hello world")]);
    }

    #[test]
    fn parse_bionic_markup() {
        let spans = parse_markup(" <b>Bio</b>nic <b>read</b>ing.").expect("parse succeeds");
        assert_eq!(
            spans,
            vec![
                Span::new(" "),
                Span::new("Bio").with_bold(true),
                Span::new("nic "),
                Span::new("read").with_bold(true),
                Span::new("ing."),
            ]
        );
    }

    #[test]
    fn parse_nested_styles() {
        let spans = parse_markup("a <b>very <i>cool</i></b>!").expect("parse succeeds");
        assert_eq!(
            spans,
            vec![
                Span::new("a "),
                Span::new("very ").with_bold(true),
                Span::new("cool").with_bold(true).with_italic(true),
                Span::new("!"),
            ]
        );
    }

    #[test]
    fn parse_entities() {
        let spans = parse_markup("<b>R</b> &amp; D &lt;3 &gt;").expect("parse succeeds");
        assert_eq!(spans[1].text(), " & D <3 >");
    }

    #[test]
    fn adjacent_spans_with_equal_style_merge() {
        let spans = parse_markup("<b>a</b><b>b</b>").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("ab").with_bold(true)]);
    }

    #[test]
    fn error_on_unterminated_bold() {
        let err = parse_markup("<b>oops").unwrap_err();
        assert!(err.message().contains("unterminated bold"));
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn error_on_stray_closing_tag() {
        let err = parse_markup("text</b>").unwrap_err();
        assert_eq!(err.index(), 4);
    }

    #[test]
    fn error_on_mismatched_tags() {
        assert!(parse_markup("<b><i>x</b></i>").is_err());
    }

    #[test]
    fn error_on_unknown_tag_and_entity() {
        let tag = parse_markup("<u>x</u>").unwrap_err();
        assert!(tag.message().contains("unsupported tag"));
        let entity = parse_markup("&nbsp;").unwrap_err();
        assert!(entity.message().contains("unknown entity"));
    }
}
