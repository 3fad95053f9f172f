//! litdoc: literate-programming documentation from annotated source files.
//!
//! Comments become prose, the code that follows them sits alongside, and
//! every page gets a sidebar of all documented files:
//!
//! - `litdoc src` documents every supported file under `src` into `docs/`
//! - `litdoc --outline --directive GENERATE -r src src` numbers `// cb` and
//!   `#region` blocks into an outline, for files that opt in on their first line
//!
//! Prose may link to other pages with `LINK\Name` or `LINK\Name#anchor` and
//! embed images with `IMG\name`; both are resolved once all pages exist.

mod error;
mod language;
mod link;
mod markup;
mod model;
mod nav;
mod outline;
mod pipeline;
mod render;
mod segment;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "litdoc",
    about = "Generate side-by-side HTML documentation from commented source files"
)]
struct Cli {
    /// Input files, directories (searched recursively) or glob patterns.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory
    #[arg(short = 'o', long, default_value = "docs")]
    output: PathBuf,

    /// Source root; output paths mirror input paths relative to it
    #[arg(short = 'r', long, default_value = ".")]
    root: PathBuf,

    /// Number structural blocks and add an outline to each page
    #[arg(long)]
    outline: bool,

    /// Only document files whose first line is a comment starting with this
    /// text (e.g. GENERATE). The line itself is not documented.
    #[arg(long)]
    directive: Option<String>,

    /// Output format: html (default), json
    #[arg(short = 'f', long, default_value = "html")]
    format: String,

    /// Image folder copied to <output>/Images for IMG\ references
    #[arg(long)]
    images: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let languages =
        language::LanguageRegistry::builtin().context("failed to build language profiles")?;

    let options = pipeline::PipelineOptions {
        inputs: cli.inputs,
        root: cli.root,
        output: cli.output,
        outline: cli.outline,
        directive: cli.directive,
        format: cli.format,
        images: cli.images,
    };

    let written = pipeline::run(&options, &languages)?;
    info!(
        "documented {} files into {}",
        written.len(),
        options.output.display()
    );
    Ok(())
}

/// Log to stderr without timestamps. `RUST_LOG` overrides the `-v` level.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(level)
        .parse_default_env()
        .init();
}
