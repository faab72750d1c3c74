//! Document construction helpers for the bionic_reader crate.
//!
//! [`BookStyle`] captures the page and paragraph layout of the output book, and
//! [`GenpdfRenderer`] lays the formatted paragraphs out with `genpdf`.

use std::fs;
use std::path::Path;

use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::StyledString;
use genpdf::{Element, Margins, Mm, PaperSize, SimplePageDecorator, Size};
use log::{debug, info};

use crate::elements::{inches, IndentedParagraph};
use crate::error::{BionicError, Result};
use crate::fonts::{self, FontPaths};
use crate::pipeline::OutputDocument;
use crate::richtext::{parse_markup, spans_to_styled_strings, ParseError, Span};

/// Writes an [`OutputDocument`] to a single file.
pub trait BookRenderer {
    /// Lays out every paragraph of `document` in order and writes the result to `path`.
    fn render(&mut self, document: &OutputDocument, path: &Path) -> Result<()>;
}

/// Page and paragraph layout of the output book.
#[derive(Clone, Copy, Debug)]
pub struct BookStyle {
    /// Paper size of every page.
    pub paper_size: Size,
    /// Page margins.
    pub margins: Margins,
    /// Body font size in points.
    pub font_size: u8,
    /// Line spacing as a multiple of the font size.
    pub line_spacing: f64,
    /// Indent of the first line of every paragraph.
    pub first_line_indent: Mm,
    /// Vertical space inserted before every paragraph.
    pub space_before: Mm,
}

impl Default for BookStyle {
    /// Letter paper, 1in/1.5in margins, 13pt on 26pt leading, 0.5in indent and paragraph gap.
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter.into(),
            margins: Margins::trbl(inches(1.0), inches(1.5), inches(1.0), inches(1.5)),
            font_size: 13,
            line_spacing: 2.0,
            first_line_indent: inches(0.5),
            space_before: inches(0.5),
        }
    }
}

/// Converts one paragraph of markup into styled strings.
///
/// The formatter puts a space in front of every word, so the leading space of the paragraph is
/// dropped here.
pub fn paragraph_strings(markup: &str) -> std::result::Result<Vec<StyledString>, ParseError> {
    let mut spans = parse_markup(markup)?;
    if let Some(first) = spans.first_mut() {
        let trimmed = first.text().trim_start();
        if trimmed.len() != first.text().len() {
            *first = Span::new(trimmed)
                .with_bold(first.is_bold())
                .with_italic(first.is_italic());
        }
    }
    spans.retain(|span| !span.text().is_empty());
    Ok(spans_to_styled_strings(&spans))
}

/// Renders bionic paragraphs to PDF with `genpdf`.
pub struct GenpdfRenderer {
    font_family: FontFamily<FontData>,
    style: BookStyle,
}

impl GenpdfRenderer {
    /// Creates a renderer from an already loaded font family.
    pub fn new(font_family: FontFamily<FontData>, style: BookStyle) -> Self {
        Self { font_family, style }
    }

    /// Loads the four font faces and creates a renderer.
    pub fn from_font_paths(paths: &FontPaths, style: BookStyle) -> Result<Self> {
        let family = fonts::load_font_family(paths)?;
        info!(
            "Registered font family {} from {}",
            fonts::FONT_FAMILY_NAME,
            paths.regular.display()
        );
        Ok(Self::new(family, style))
    }

    fn build_document(&self, document: &OutputDocument, title: &str) -> Result<genpdf::Document> {
        let mut pdf = genpdf::Document::new(self.font_family.clone());
        pdf.set_title(title);
        pdf.set_paper_size(self.style.paper_size);
        pdf.set_font_size(self.style.font_size);
        pdf.set_line_spacing(self.style.line_spacing);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(self.style.margins);
        pdf.set_page_decorator(decorator);

        for (index, markup) in document.paragraphs().iter().enumerate() {
            let strings = paragraph_strings(markup).map_err(|source| BionicError::Markup {
                paragraph: index,
                source,
            })?;
            let paragraph = IndentedParagraph::new(strings, self.style.first_line_indent)
                .padded(Margins::trbl(self.style.space_before, 0, 0, 0));
            pdf.push(paragraph);
        }

        Ok(pdf)
    }

    /// Renders `document` into an in-memory PDF.
    pub fn render_bytes(&self, document: &OutputDocument, title: &str) -> Result<Vec<u8>> {
        let pdf = self.build_document(document, title)?;
        let mut bytes = Vec::new();
        pdf.render(&mut bytes).map_err(|source| BionicError::Render {
            path: title.into(),
            source,
        })?;
        Ok(bytes)
    }
}

impl BookRenderer for GenpdfRenderer {
    fn render(&mut self, document: &OutputDocument, path: &Path) -> Result<()> {
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = self.render_bytes(document, &title)?;
        debug!("Writing {} bytes to {}", bytes.len(), path.display());
        fs::write(path, &bytes).map_err(|err| BionicError::Render {
            path: path.to_path_buf(),
            source: genpdf::error::Error::new(
                format!("Failed to write {}", path.display()),
                err,
            ),
        })
    }
}
