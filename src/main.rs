//! Pagelink - turn a selection into a linked note from the command line
//!
//! A thin host over the `pagelink` library: a vault directory stands in for
//! the editor's store and the note file for its text surface.

mod app;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::PagelinkApp;
use pagelink::SettingsStore;

#[derive(Debug, Parser)]
#[command(name = "pagelink", version, about = "Turn selected text into linked notes, and undo it")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a note from the text between two columns and link to it
    Create {
        #[arg(long)]
        vault: PathBuf,
        /// Note being edited, relative to the vault
        #[arg(long)]
        note: String,
        /// Zero-based line
        #[arg(long)]
        line: usize,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Delete the note linked under a position and unlink it
    Delete {
        #[arg(long)]
        vault: PathBuf,
        #[arg(long)]
        note: String,
        #[arg(long)]
        line: usize,
        #[arg(long)]
        ch: usize,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Set one option, e.g. `linkType wiki`
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::WARN
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(level)
        .init();

    let mut settings = match cli.config {
        Some(path) => SettingsStore::load(path)?,
        None => SettingsStore::load_default()?,
    };

    match cli.command {
        Command::Create {
            vault,
            note,
            line,
            from,
            to,
        } => {
            let app = PagelinkApp::new(vault, settings);
            let created = app.create(&note, line, from, to).await?;
            println!("{}", created.link);
        }
        Command::Delete {
            vault,
            note,
            line,
            ch,
        } => {
            let app = PagelinkApp::new(vault, settings);
            app.delete(&note, line, ch).await?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(settings.settings())?);
            }
            ConfigAction::Set { key, value } => {
                settings.set_option(&key, &value)?;
                tracing::info!("Updated {} in {}", key, settings.path().display());
            }
        },
    }

    Ok(())
}
