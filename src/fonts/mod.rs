//! Font loading utilities for the bionic_reader crate.
//!
//! The output document is typeset with a single family whose four faces come from the paths in
//! [`BionicConfig`]. All faces are loaded up front so that a missing file stops the run before any
//! page is read.

use std::path::{Path, PathBuf};

use genpdf::fonts::{FontData, FontFamily};
use log::debug;

use crate::config::BionicConfig;
use crate::error::{BionicError, Result};

/// Name under which the configured family is registered.
pub const FONT_FAMILY_NAME: &str = "AtkinsonHyperlegible";

/// Paths of the four faces making up a font family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontPaths {
    /// Regular face.
    pub regular: PathBuf,
    /// Bold face.
    pub bold: PathBuf,
    /// Italic face.
    pub italic: PathBuf,
    /// Bold italic face.
    pub bold_italic: PathBuf,
}

impl FontPaths {
    /// Collects the font paths of a config.
    pub fn from_config(config: &BionicConfig) -> Self {
        Self {
            regular: config.font_regular.clone(),
            bold: config.font_bold.clone(),
            italic: config.font_italic.clone(),
            bold_italic: config.font_bolditalic.clone(),
        }
    }

    /// Uses the conventional `<family>-<Style>.ttf` file names inside `directory`.
    pub fn in_directory(directory: impl AsRef<Path>, family: &str) -> Self {
        let directory = directory.as_ref();
        Self {
            regular: directory.join(format!("{family}-Regular.ttf")),
            bold: directory.join(format!("{family}-Bold.ttf")),
            italic: directory.join(format!("{family}-Italic.ttf")),
            bold_italic: directory.join(format!("{family}-BoldItalic.ttf")),
        }
    }

    /// Returns the paths that do not point at a file.
    pub fn missing(&self) -> Vec<&Path> {
        self.faces()
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Indicates whether all four faces exist on disk.
    pub fn all_present(&self) -> bool {
        self.missing().is_empty()
    }

    fn faces(&self) -> [(&'static str, &Path); 4] {
        [
            ("regular", self.regular.as_path()),
            ("bold", self.bold.as_path()),
            ("italic", self.italic.as_path()),
            ("bold italic", self.bold_italic.as_path()),
        ]
    }
}

fn load_face(style: &'static str, path: &Path) -> Result<FontData> {
    debug!("Loading {} font from {}", style, path.display());
    FontData::load(path, None).map_err(|source| BionicError::Font {
        style,
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the four faces into a `genpdf` font family.
pub fn load_font_family(paths: &FontPaths) -> Result<FontFamily<FontData>> {
    Ok(FontFamily {
        regular: load_face("regular", &paths.regular)?,
        bold: load_face("bold", &paths.bold)?,
        italic: load_face("italic", &paths.italic)?,
        bold_italic: load_face("bold italic", &paths.bold_italic)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_names_are_derived_from_the_family() {
        let paths = FontPaths::in_directory("/fonts", "Roboto");
        assert_eq!(paths.regular, PathBuf::from("/fonts/Roboto-Regular.ttf"));
        assert_eq!(paths.bold_italic, PathBuf::from("/fonts/Roboto-BoldItalic.ttf"));
    }

    #[test]
    fn missing_faces_are_reported() {
        let paths = FontPaths::in_directory("/__bionic_reader_missing_fonts__", FONT_FAMILY_NAME);
        assert_eq!(paths.missing().len(), 4);
        assert!(!paths.all_present());
    }

    #[test]
    fn loading_a_missing_face_fails_with_its_style() {
        let paths = FontPaths::in_directory("/__bionic_reader_missing_fonts__", FONT_FAMILY_NAME);
        match load_font_family(&paths) {
            Err(BionicError::Font { style, path, .. }) => {
                assert_eq!(style, "regular");
                assert_eq!(path, paths.regular);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("missing fonts must not load"),
        }
    }
}
