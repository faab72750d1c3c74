//! Core entry point for the bionic_reader crate.
//!
//! The crate re-typesets the text of a PDF so that the leading part of every sufficiently long
//! word is set in bold. [`pipeline::BionicPipeline`] ties the stages together: [`extract`] reads
//! page texts, [`bionic`] formats them, and [`builder`] renders the result with `genpdf`.

pub mod bionic;
pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod extract;
pub mod fixation;
pub mod fonts;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod richtext;
pub mod workdir;

pub use bionic::{BionicFormatter, Tokenizer, WordTokenizer, DEFAULT_MIN_FIXATION_LENGTH};
pub use config::{read_config, BionicConfig};
pub use error::{BionicError, Result};
pub use pipeline::{BionicPipeline, OutputDocument};
