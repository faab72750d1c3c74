//! Element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` paragraphs have no notion of a first-line indent, so [`IndentedParagraph`] prefixes
//! the first line with no-break spaces measured against the active font at render time.

use genpdf::elements::Paragraph;
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, RenderResult};

const MM_PER_INCH: f64 = 25.4;
const NO_BREAK_SPACE: char = '\u{a0}';

/// Converts a length in millimetres into the `genpdf` unit type.
pub fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Converts a `genpdf` length back into millimetres.
pub fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a length in inches into the `genpdf` unit type.
pub fn inches(value: f64) -> Mm {
    mm_from_f64(value * MM_PER_INCH)
}

/// A flowing paragraph whose first line starts after a fixed indent.
pub struct IndentedParagraph {
    strings: Vec<StyledString>,
    indent: Mm,
    paragraph: Option<Paragraph>,
}

impl IndentedParagraph {
    /// Creates a paragraph from styled strings with the given first-line indent.
    pub fn new(strings: Vec<StyledString>, indent: Mm) -> Self {
        Self {
            strings,
            indent,
            paragraph: None,
        }
    }
}

fn indent_prefix(context: &genpdf::Context, style: Style, indent: Mm) -> Option<StyledString> {
    let mut unit = StyledString::new(NO_BREAK_SPACE.to_string(), Style::new());
    unit.style = style.and(unit.style);
    let unit_width = mm_to_f64(unit.width(&context.font_cache));
    let wanted = mm_to_f64(indent);
    if unit_width <= f64::EPSILON || wanted <= f64::EPSILON {
        return None;
    }

    let count = (wanted / unit_width).ceil() as usize;
    Some(StyledString::new(
        NO_BREAK_SPACE.to_string().repeat(count),
        Style::new(),
    ))
}

fn build_paragraph(
    strings: Vec<StyledString>,
    prefix: Option<StyledString>,
) -> Paragraph {
    let mut paragraph = Paragraph::default();
    if let Some(prefix) = prefix {
        paragraph.push(prefix);
    }
    for string in strings {
        paragraph.push(string);
    }
    paragraph
}

impl Element for IndentedParagraph {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let indent = self.indent;
        let strings = &mut self.strings;
        let paragraph = self.paragraph.get_or_insert_with(|| {
            build_paragraph(
                std::mem::take(strings),
                indent_prefix(context, style, indent),
            )
        });
        paragraph.render(context, area, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inches_convert_to_millimetres() {
        assert!((mm_to_f64(inches(1.0)) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(inches(0.5)) - 12.7).abs() < 1e-9);
    }

    #[test]
    fn millimetres_round_trip() {
        assert!((mm_to_f64(mm_from_f64(38.1)) - 38.1).abs() < 1e-9);
    }

    #[test]
    fn keeps_indent_until_rendered() {
        let element = IndentedParagraph::new(
            vec![StyledString::new("text".to_string(), Style::new())],
            inches(0.5),
        );
        assert!((mm_to_f64(element.indent) - 12.7).abs() < 1e-9);
        assert!(element.paragraph.is_none());
    }
}
