//! Run configuration loaded from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BionicError, Result};

/// Path of the config file read when no other path is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Overall configuration of a run.
///
/// The JSON object must carry exactly these seven string fields; a missing or
/// an extra field fails the load.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(deny_unknown_fields)]
pub struct BionicConfig {
    /// Source PDF to re-typeset.
    pub target: PathBuf,
    /// Base name of the export directory; the run date is prefixed to it.
    pub export_dir: String,
    /// Regular font file.
    pub font_regular: PathBuf,
    /// Bold font file.
    pub font_bold: PathBuf,
    /// Italic font file.
    pub font_italic: PathBuf,
    /// Bold italic font file.
    pub font_bolditalic: PathBuf,
    /// Directory receiving the run log.
    pub log_dir: PathBuf,
}

impl BionicConfig {
    /// Parses a config from a JSON string. `origin` is only used in error messages.
    pub fn from_json(json: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| BionicError::ConfigFormat {
            path: origin.into(),
            source,
        })
    }
}

/// Reads the config file at `path`.
pub fn read_config(path: impl AsRef<Path>) -> Result<BionicConfig> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| BionicError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    BionicConfig::from_json(&json, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"{
        "target": "books/study.pdf",
        "export_dir": "bionic",
        "font_regular": "fonts/AtkinsonHyperlegible-Regular.ttf",
        "font_bold": "fonts/AtkinsonHyperlegible-Bold.ttf",
        "font_italic": "fonts/AtkinsonHyperlegible-Italic.ttf",
        "font_bolditalic": "fonts/AtkinsonHyperlegible-BoldItalic.ttf",
        "log_dir": "logs"
    }"#;

    #[test]
    fn complete_config_loads() {
        let config = BionicConfig::from_json(COMPLETE, "config.json").expect("config loads");
        assert_eq!(config.target, PathBuf::from("books/study.pdf"));
        assert_eq!(config.export_dir, "bionic");
        assert_eq!(
            config.font_bolditalic,
            PathBuf::from("fonts/AtkinsonHyperlegible-BoldItalic.ttf")
        );
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn missing_log_dir_is_rejected() {
        let json = r#"{
            "target": "books/study.pdf",
            "export_dir": "bionic",
            "font_regular": "Regular.ttf",
            "font_bold": "Bold.ttf",
            "font_italic": "Italic.ttf",
            "font_bolditalic": "BoldItalic.ttf"
        }"#;
        let err = BionicConfig::from_json(json, "config.json").unwrap_err();
        assert!(matches!(err, BionicError::ConfigFormat { .. }));
        assert!(err.to_string().contains("missing field `log_dir`"));
    }

    #[test]
    fn extra_field_is_rejected() {
        let json = COMPLETE.replace(
            r#""log_dir": "logs""#,
            r#""log_dir": "logs", "theme": "dark""#,
        );
        let err = BionicConfig::from_json(&json, "config.json").unwrap_err();
        assert!(err.to_string().contains("unknown field `theme`"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = BionicConfig::from_json("{ \"target\": ", "config.json").unwrap_err();
        assert!(matches!(err, BionicError::ConfigFormat { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_config("/__bionic_reader_missing__/config.json").unwrap_err();
        assert!(matches!(err, BionicError::ConfigIo { .. }));
    }
}
