//! Page text extraction built on top of `lopdf`.
//!
//! [`PageSource`] is the only thing the pipeline knows about the input document. The
//! [`LopdfExtractor`] implementation replays each page's content stream, tracking the text matrix,
//! the current transformation matrix and the glyph widths of the selected font. Every shown string
//! is placed in user space, and the gap between the end of one string and the start of the next
//! decides what separates them: a baseline shift beyond the vertical tolerance starts a new line,
//! a horizontal gap beyond the horizontal tolerance inserts a space.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use log::debug;

use crate::error::{BionicError, Result};

/// Slack added to both tolerances to absorb floating point noise from matrix products.
const GEOMETRY_EPSILON: f64 = 1e-6;

/// Tolerances controlling how closely adjacent characters and lines are merged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractOptions {
    /// Horizontal gap, in user space units, above which a space is inserted.
    pub x_tolerance: f64,
    /// Baseline shift, in user space units, above which a new line starts.
    pub y_tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 0.5,
            y_tolerance: 0.0,
        }
    }
}

/// A document that yields one text blob per page.
pub trait PageSource {
    /// Identifies the document in progress reports and errors.
    fn identifier(&self) -> String;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extracts the text of the page at `index` (zero based).
    fn page_text(&self, index: usize, options: &ExtractOptions) -> Result<String>;
}

/// [`PageSource`] backed by a `lopdf` document.
pub struct LopdfExtractor {
    path: PathBuf,
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl LopdfExtractor {
    /// Opens the PDF at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::load(path).map_err(|source| BionicError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_document(path, document))
    }

    /// Wraps an already loaded document. `path` is only used to identify it.
    pub fn from_document(path: impl Into<PathBuf>, document: Document) -> Self {
        let page_ids = document.get_pages().into_values().collect();
        Self {
            path: path.into(),
            document,
            page_ids,
        }
    }

    fn extraction_error(&self, page: usize, detail: impl Into<String>) -> BionicError {
        BionicError::Extraction {
            path: self.path.clone(),
            page,
            detail: detail.into(),
        }
    }
}

impl PageSource for LopdfExtractor {
    fn identifier(&self) -> String {
        self.path.display().to_string()
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, index: usize, options: &ExtractOptions) -> Result<String> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| self.extraction_error(index, "page does not exist"))?;

        let data = self
            .document
            .get_page_content(page_id)
            .map_err(|err| self.extraction_error(index, err.to_string()))?;
        let content =
            Content::decode(&data).map_err(|err| self.extraction_error(index, err.to_string()))?;

        let fonts = self
            .document
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, PageFont::from_dictionary(&self.document, font)))
            .collect::<BTreeMap<Vec<u8>, PageFont<'_>>>();

        let mut cursor = TextCursor::new(*options, fonts);
        for operation in &content.operations {
            cursor.apply(&operation.operator, &operation.operands);
        }

        let text = cursor.finish();
        debug!("Page {} yielded {} characters", index, text.chars().count());
        Ok(text)
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values = operands
            .iter()
            .take(6)
            .map(number)
            .collect::<Option<Vec<f64>>>()?;
        match values[..] {
            [a, b, c, d, e, f] => Some(Self { a, b, c, d, e, f }),
            _ => None,
        }
    }

    /// Applies `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn origin(&self) -> (f64, f64) {
        (self.e, self.f)
    }
}

/// Glyph widths of a font, in thousandths of text space.
#[derive(Clone, Debug, PartialEq)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f64>,
    default_width: f64,
    two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::uniform(500.0)
    }
}

impl FontMetrics {
    fn uniform(width: f64) -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            default_width: width,
            two_byte: false,
        }
    }

    fn from_dictionary(document: &Document, font: &Dictionary) -> Self {
        let subtype = name_of(document, font, b"Subtype").unwrap_or_default();
        if subtype == b"Type0" {
            let default_width = font
                .get(b"DW")
                .ok()
                .and_then(|object| number(resolve(document, object)))
                .unwrap_or(1000.0);
            return Self {
                two_byte: true,
                ..Self::uniform(default_width)
            };
        }

        let base_font = name_of(document, font, b"BaseFont").unwrap_or_default();
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|object| resolve(document, object).as_dict().ok())
            .and_then(|descriptor| descriptor.get(b"MissingWidth").ok())
            .and_then(|object| number(resolve(document, object)));
        let default_width = missing_width.unwrap_or_else(|| {
            if base_font.windows(7).any(|window| window == b"Courier") {
                600.0
            } else {
                500.0
            }
        });

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|object| number(resolve(document, object)))
            .map_or(0, |value| value.max(0.0) as u32);
        let widths = match font.get(b"Widths").map(|object| resolve(document, object)) {
            Ok(Object::Array(items)) => items
                .iter()
                .map(|item| number(resolve(document, item)).unwrap_or(default_width))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            first_char,
            widths,
            default_width,
            two_byte: false,
        }
    }

    fn width(&self, code: u32) -> f64 {
        code.checked_sub(self.first_char)
            .and_then(|offset| self.widths.get(offset as usize))
            .copied()
            .unwrap_or(self.default_width)
    }
}

/// What the cursor needs to know about one font resource of a page.
#[derive(Clone, Debug, Default)]
struct PageFont<'a> {
    encoding: Option<&'a str>,
    metrics: FontMetrics,
}

impl<'a> PageFont<'a> {
    fn from_dictionary(document: &Document, font: &'a Dictionary) -> Self {
        Self {
            encoding: Some(font.get_font_encoding()),
            metrics: FontMetrics::from_dictionary(document, font),
        }
    }
}

/// Graphics and text state saved by `q` and restored by `Q`.
#[derive(Clone, Debug)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Separator {
    #[default]
    None,
    Word,
    Line,
}

/// Replays text operators and rebuilds the page text.
struct TextCursor<'a> {
    options: ExtractOptions,
    fonts: BTreeMap<Vec<u8>, PageFont<'a>>,
    fallback_font: PageFont<'a>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    last_end: Option<(f64, f64)>,
    text: String,
}

impl<'a> TextCursor<'a> {
    fn new(options: ExtractOptions, fonts: BTreeMap<Vec<u8>, PageFont<'a>>) -> Self {
        Self {
            options,
            fonts,
            fallback_font: PageFont::default(),
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            last_end: None,
            text: String::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.saved.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.state.ctm = matrix.then(&self.state.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.font = Some(name.clone());
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    self.state.font_size = size;
                }
            }
            "Tc" => set_from(operands, 0, &mut self.state.char_spacing),
            "Tw" => set_from(operands, 0, &mut self.state.word_spacing),
            "TL" => set_from(operands, 0, &mut self.state.leading),
            "Tz" => {
                if let Some(scale) = operands.first().and_then(number) {
                    self.state.horizontal_scale = scale / 100.0;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                if operator == "TD" {
                    self.state.leading = -ty;
                }
                self.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.text_matrix = matrix;
                    self.line_matrix = matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line();
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(bytes);
                }
            }
            "\"" => {
                set_from(operands, 0, &mut self.state.word_spacing);
                set_from(operands, 1, &mut self.state.char_spacing);
                self.next_line();
                if let Some(bytes) = operands.get(2).and_then(string_bytes) {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        if let Some(bytes) = string_bytes(item) {
                            self.show(bytes);
                        } else if let Some(adjustment) = number(item) {
                            self.adjust(adjustment);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    /// `TJ` adjustments are in thousandths of text space; negative values move right.
    fn adjust(&mut self, adjustment: f64) {
        let tx = -adjustment / 1000.0 * self.state.font_size * self.state.horizontal_scale;
        self.advance(tx);
    }

    fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    fn current_font(&self) -> &PageFont<'a> {
        self.state
            .font
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .unwrap_or(&self.fallback_font)
    }

    /// Horizontal displacement of `bytes` in text space.
    fn string_width(&self, bytes: &[u8]) -> f64 {
        let metrics = &self.current_font().metrics;
        let state = &self.state;
        let code_len = if metrics.two_byte { 2 } else { 1 };

        bytes
            .chunks(code_len)
            .map(|code| {
                let value = code.iter().fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
                let word_spacing = if code_len == 1 && value == 32 {
                    state.word_spacing
                } else {
                    0.0
                };
                (metrics.width(value) / 1000.0 * state.font_size
                    + state.char_spacing
                    + word_spacing)
                    * state.horizontal_scale
            })
            .sum()
    }

    fn user_position(&self) -> (f64, f64) {
        self.text_matrix.then(&self.state.ctm).origin()
    }

    fn show(&mut self, bytes: &[u8]) {
        let decoded = Document::decode_text(self.current_font().encoding, bytes);
        let start = self.user_position();
        let width = self.string_width(bytes);
        self.advance(width);

        if decoded.is_empty() {
            return;
        }

        match self.separator_before(start) {
            Separator::Line if !self.text.is_empty() && !self.text.ends_with('\n') => {
                self.text.push('\n');
            }
            Separator::Word
                if !self.text.ends_with(char::is_whitespace)
                    && !decoded.starts_with(char::is_whitespace) =>
            {
                self.text.push(' ');
            }
            _ => {}
        }

        self.text.push_str(&decoded);
        self.last_end = Some(self.user_position());
    }

    fn separator_before(&self, start: (f64, f64)) -> Separator {
        let Some((end_x, end_y)) = self.last_end else {
            return Separator::None;
        };
        if (start.1 - end_y).abs() > self.options.y_tolerance + GEOMETRY_EPSILON {
            Separator::Line
        } else if start.0 - end_x > self.options.x_tolerance + GEOMETRY_EPSILON {
            Separator::Word
        } else {
            Separator::None
        }
    }

    fn finish(self) -> String {
        self.text
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn set_from(operands: &[Object], index: usize, target: &mut f64) {
    if let Some(value) = operands.get(index).and_then(number) {
        *target = value;
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

fn name_of<'a>(document: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key).ok().map(|object| resolve(document, object)) {
        Some(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}
