mod error;
mod model;
mod normalize;
mod parser;
mod render;
mod settings;
mod site;
mod store;

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use settings::Settings;

#[derive(Parser)]
#[command(name = "team_cms", about = "Team directory extractor and static page generator")]
struct Cli {
    /// Configuration file (default: ./cms.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract members from the markup source into JSON records
    Extract {
        /// Markup source (overrides `source` from the config)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Rewrite `||`-delimited descriptions in the markup source as paragraphs
    Paragraphs {
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Collapse line breaks in every stored record
    Normalize,
    /// Generate member pages and the team page from stored records
    Build,
    /// Extract + build in one pipeline
    Run {
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Extract { source } => {
            if let Some(source) = source {
                settings.source = source;
            }
            extract(&settings)
        }
        Commands::Paragraphs { source } => {
            let source = source.unwrap_or_else(|| settings.source.clone());
            rewrite_paragraphs(&source)
        }
        Commands::Normalize => {
            let stats = store::normalize_records(&settings.content_dir).with_context(|| {
                format!("Failed to normalize records in {:?}", settings.content_dir)
            })?;
            println!(
                "Normalized {} records ({} changed, {} errors).",
                stats.total, stats.changed, stats.failed
            );
            Ok(())
        }
        Commands::Build => build(&settings),
        Commands::Run { source } => {
            if let Some(source) = source {
                settings.source = source;
            }
            let t_extract = Instant::now();
            extract(&settings)?;
            println!("Extracted in {:.1}s", t_extract.elapsed().as_secs_f64());
            build(&settings)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read markup source {:?}", path))
}

fn extract(settings: &Settings) -> anyhow::Result<()> {
    let markup = read_source(&settings.source)?;
    let directory = parser::process_document(&markup).context("Failed to normalize records")?;
    if directory.members.is_empty() {
        println!("No members found in {:?}.", settings.source);
        return Ok(());
    }
    info!(members = directory.members.len(), "extracted");

    let stats = store::save_directory(&settings.content_dir, &directory)
        .with_context(|| format!("Failed to write records to {:?}", settings.content_dir))?;
    println!(
        "Saved {} records ({} errors, {} stale removed) to {:?}.",
        stats.saved, stats.failed, stats.removed, settings.content_dir
    );
    Ok(())
}

fn rewrite_paragraphs(source: &Path) -> anyhow::Result<()> {
    let markup = read_source(source)?;
    match parser::paragraphs::rewrite_descriptions(&markup) {
        Cow::Borrowed(_) => println!("No descriptions to rewrite in {:?}.", source),
        Cow::Owned(rewritten) if rewritten == markup => {
            println!("Descriptions in {:?} already use paragraphs.", source)
        }
        Cow::Owned(rewritten) => {
            fs::write(source, rewritten)
                .with_context(|| format!("Failed to write {:?}", source))?;
            println!("Rewrote descriptions in {:?}.", source);
        }
    }
    Ok(())
}

fn build(settings: &Settings) -> anyhow::Result<()> {
    let report = site::build(settings)
        .with_context(|| format!("Site build into {:?} failed", settings.output_dir))?;
    println!(
        "Generated {} pages for {} members ({} errors), team page lists {}, removed {} stale files.",
        report.pages, report.members, report.failed, report.listed, report.removed
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
