//! Command implementations for the sensor trend viewer CLI.
//!
//! Provides subcommands that render a window of readings, export its flagged
//! rows, summarize the dataset, or run an interactive session.

use clap::Subcommand;
use config::{DashboardConfig, SourceArgs, ViewArgs};
use sensor_source::cache::DatasetCache;
use std::path::PathBuf;

pub mod config;
pub mod render;
pub mod session;
pub mod stats;

#[derive(Subcommand)]
pub enum Command {
    /// Run one render pass and print it as JSON
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the flagged rows of the window to CSV (highlighting is implied)
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Output path; defaults to the configured export file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print mean and standard deviation of the scaled columns
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Interactive session reading one command per line from stdin
    Session {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Directory exported files are written to
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render {
            source,
            view,
            output,
        } => {
            let config = DashboardConfig::resolve(&source, Some(&view))?;
            render::run_render(&config, &view.nav, output.as_deref())
        }
        Command::Export {
            source,
            view,
            output,
        } => {
            let config = DashboardConfig::resolve(&source, Some(&view))?;
            render::run_export(&config, &view.nav, output.as_deref())
        }
        Command::Stats { source } => {
            let config = DashboardConfig::resolve(&source, None)?;
            stats::run_stats(&config)
        }
        Command::Session {
            source,
            view,
            export_dir,
        } => {
            let config = DashboardConfig::resolve(&source, Some(&view))?;
            let sources = config.data_sources()?;
            let cache = DatasetCache::new();
            let (state, _) = render::render_pass(config.initial_state()?, &view.nav, &cache, &sources)?;
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            session::run_session(stdin.lock(), &mut stdout, state, &cache, &sources, &export_dir)?;
            Ok(())
        }
    }
}
