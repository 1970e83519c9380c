use crate::prelude::*;
use clap::Parser;

mod error;
mod export;
mod ocr;
mod parse;
mod prelude;
mod scan;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Convert photographed logbook pages into ForeFlight-compatible flight records"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "LOGSCAN_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Scan logbook page images with the OCR service and parse entries
    Scan(scan::ScanOptions),

    /// Parse entries from OCR output already on disk
    Parse(parse::ParseOptions),

    /// Validate reviewed entries and write a ForeFlight CSV
    Export(export::ExportOptions),

    /// Print a sample ForeFlight CSV
    Sample,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Scan(options) => scan::run(options, app.global).await,
        SubCommands::Parse(options) => parse::run(options, app.global),
        SubCommands::Export(options) => export::run(options, app.global),
        SubCommands::Sample => export::run_sample(),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
