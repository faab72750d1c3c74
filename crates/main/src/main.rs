use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use bionic_reader::config::DEFAULT_CONFIG_PATH;
use bionic_reader::naming::ExportNaming;
use bionic_reader::{logging, read_config, BionicPipeline, DEFAULT_MIN_FIXATION_LENGTH};
use clap::Parser;
use log::info;

mod progress;

use progress::BarReporter;

/// Re-typesets a PDF for bionic reading.
///
/// The source document, the export directory, the four font faces and the log directory are
/// read from a JSON config file. The book is written to `{YYMMDD}_{export_dir}`.
#[derive(Parser)]
#[command(author, version, about = "Re-typesets a PDF for bionic reading")]
struct Cli {
    /// Config file describing the run.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Smallest fixation length that is emphasized.
    #[arg(long, default_value_t = DEFAULT_MIN_FIXATION_LENGTH)]
    min_fixation_length: usize,
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let config = read_config(&cli.config)?;
    logging::init(&config.log_dir)?;

    let pipeline = BionicPipeline::new(cli.min_fixation_length);
    let written = pipeline.run(&config, &ExportNaming::now()?, &mut BarReporter::new())?;

    info!("Wrote {}", written.display());
    info!(
        "Bionic transcription finished in {} seconds.",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
