use std::path::PathBuf;

use crate::prelude::*;
use clap::Parser;

mod back_cover;
mod cover;
mod documents;
mod dump;
mod error;
mod for_diva;
mod front_matter;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Layout checks for KTH degree project PDFs"
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
    #[clap(short, long, env = "COVERSCAN_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// Analysis configuration file (TOML)
    #[clap(long, env = "COVERSCAN_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Find the back cover page
    BackCover(crate::back_cover::Options),

    /// Find the "For DIVA" page
    ForDiva(crate::for_diva::Options),

    /// Check the front cover
    Cover(crate::cover::Options),

    /// Combine the front matter of every PDF in a directory
    FrontMatter(crate::front_matter::Options),

    /// Print the element hierarchy of a PDF
    Dump(crate::dump::Options),
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if app.global.verbose {
        for module in ["coverscan", "coverscan_core", "coverscan_pdf"] {
            logger.filter_module(module, log::LevelFilter::Debug);
        }
    }
    logger.init();
    color_eyre::install()?;

    match app.command {
        SubCommands::BackCover(options) => crate::back_cover::run(options, app.global),
        SubCommands::ForDiva(options) => crate::for_diva::run(options, app.global),
        SubCommands::Cover(options) => crate::cover::run(options, app.global),
        SubCommands::FrontMatter(options) => crate::front_matter::run(options, app.global),
        SubCommands::Dump(options) => crate::dump::run(options, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
