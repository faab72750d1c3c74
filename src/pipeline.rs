//! Extraction and bionic transformation of a whole document.
//!
//! A run reads every page of the source first, then formats the page texts one by one and hands
//! the complete paragraph sequence to a [`BookRenderer`]. Paragraph `i` of the output always
//! corresponds to page `i` of the source.

use std::env;
use std::path::{Path, PathBuf};

use log::info;

use crate::bionic::{BionicFormatter, Tokenizer, WordTokenizer};
use crate::builder::{BookRenderer, BookStyle, GenpdfRenderer};
use crate::config::BionicConfig;
use crate::error::{BionicError, Result};
use crate::extract::{ExtractOptions, LopdfExtractor, PageSource};
use crate::fonts::FontPaths;
use crate::naming::ExportNaming;
use crate::progress::ProgressReporter;
use crate::workdir::WorkingDirGuard;

/// Ordered paragraphs of the output book, one per source page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputDocument {
    paragraphs: Vec<String>,
}

impl OutputDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a paragraph of markup.
    pub fn push(&mut self, paragraph: impl Into<String>) {
        self.paragraphs.push(paragraph.into());
    }

    /// Returns the paragraphs in order.
    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Returns the number of paragraphs.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Returns whether the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// Reads the text of every page of `source`, in page order.
///
/// Progress is reported before each page. The first page that fails aborts the extraction.
pub fn extract(
    source: &dyn PageSource,
    options: &ExtractOptions,
    reporter: &mut dyn ProgressReporter,
) -> Result<Vec<String>> {
    let total = source.page_count();
    let identifier = source.identifier();
    reporter.on_start(total, &identifier);

    let mut pages = Vec::with_capacity(total);
    for index in 0..total {
        reporter.on_page(index, total, &identifier);
        pages.push(source.page_text(index, options)?);
    }
    reporter.on_finish();
    Ok(pages)
}

/// Formats every page text into one paragraph, preserving order.
pub fn transform<T: Tokenizer>(
    page_texts: &[String],
    formatter: &BionicFormatter<T>,
) -> OutputDocument {
    let mut document = OutputDocument::new();
    for page in page_texts {
        document.push(formatter.format_page(page));
    }
    document
}

/// A complete bionic reading run over one source document.
pub struct BionicPipeline<T = WordTokenizer> {
    formatter: BionicFormatter<T>,
    options: ExtractOptions,
}

impl BionicPipeline<WordTokenizer> {
    /// Creates a pipeline with the default tokenizer and extraction tolerances.
    pub fn new(min_fixation_length: usize) -> Self {
        Self::with_formatter(BionicFormatter::new(min_fixation_length))
    }
}

impl<T: Tokenizer> BionicPipeline<T> {
    /// Creates a pipeline around an existing formatter.
    pub fn with_formatter(formatter: BionicFormatter<T>) -> Self {
        Self {
            formatter,
            options: ExtractOptions::default(),
        }
    }

    /// Overrides the extraction tolerances and returns the updated pipeline.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the extraction stage.
    pub fn extract(
        &self,
        source: &dyn PageSource,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Vec<String>> {
        extract(source, &self.options, reporter)
    }

    /// Runs the transform stage.
    pub fn transform(&self, page_texts: &[String]) -> OutputDocument {
        transform(page_texts, &self.formatter)
    }

    /// Runs the render stage: the whole paragraph sequence goes to `renderer` at once.
    pub fn render(
        &self,
        document: &OutputDocument,
        renderer: &mut dyn BookRenderer,
        output: &Path,
    ) -> Result<()> {
        renderer.render(document, output)?;
        info!(
            "Wrote {} paragraphs to {}",
            document.len(),
            output.display()
        );
        Ok(())
    }

    /// Extracts `source`, transforms its pages, and renders the result to `output`.
    pub fn convert(
        &self,
        source: &dyn PageSource,
        renderer: &mut dyn BookRenderer,
        reporter: &mut dyn ProgressReporter,
        output: &Path,
    ) -> Result<OutputDocument> {
        let pages = self.extract(source, reporter)?;
        let document = self.transform(&pages);
        self.render(&document, renderer, output)?;
        Ok(document)
    }

    /// Runs the whole program for `config`.
    ///
    /// Fonts are loaded before any page is read. Extraction, transformation and rendering happen
    /// inside the dated export directory, which stops being the working directory when this
    /// function returns. Returns the absolute path of the written book.
    pub fn run(
        &self,
        config: &BionicConfig,
        naming: &ExportNaming,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let mut renderer =
            GenpdfRenderer::from_font_paths(&FontPaths::from_config(config), BookStyle::default())?;
        self.run_with(config, naming, &mut renderer, reporter)
    }

    /// Runs the program for `config` with an already constructed renderer.
    pub fn run_with(
        &self,
        config: &BionicConfig,
        naming: &ExportNaming,
        renderer: &mut dyn BookRenderer,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let target = absolute(&config.target)?;
        let export_dir = naming.directory(&config.export_dir);

        let guard = WorkingDirGuard::enter(&export_dir)?;
        let source = LopdfExtractor::open(&target)?;
        let file_name = naming.file_name();
        self.convert(&source, renderer, reporter, Path::new(&file_name))?;
        let written = guard.current().join(&file_name);
        drop(guard);

        Ok(written)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    env::current_dir()
        .map(|dir| dir.join(path))
        .map_err(|source| BionicError::WorkingDir {
            path: path.to_path_buf(),
            source,
        })
}
