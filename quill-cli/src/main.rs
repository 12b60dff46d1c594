//! # quill CLI
//!
//! Build-step commands for the quill content pipeline: index generation,
//! front matter normalization and local inspection of listings and pages.

mod commands;
mod context;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "quill.yml", env = "QUILL_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the corpus and write the content index artifact
    Index {
        /// Write the artifact here instead of the configured path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check (or fix) that every document carries a normalized date
    Normalize {
        /// Rewrite files instead of only reporting
        #[arg(long)]
        fix: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List documents, newest first
    List {
        /// List daily entries instead of posts
        #[arg(long)]
        daily: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render a single document by slug
    Render {
        /// Document slug
        slug: String,

        /// Locale used for link prefixes (defaults to the site's default locale)
        #[arg(long)]
        lang: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = RenderFormat::Html)]
        format: RenderFormat,
    },

    /// Verify corpus health and emit diagnostics
    Verify {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum RenderFormat {
    Html,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Index { output } => commands::write_content_index(&cli.config, output.as_deref()),
        Commands::Normalize { fix, json } => commands::normalize_metadata(&cli.config, fix, json),
        Commands::List { daily, json } => commands::list_posts(&cli.config, daily, json),
        Commands::Render { slug, lang, format } => {
            commands::render_document(&cli.config, &slug, lang.as_deref(), format)
        }
        Commands::Verify { json } => commands::verify_corpus(&cli.config, json),
    }
}
