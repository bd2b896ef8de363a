//! dotfig CLI - accessible Graphviz figures for markdown.
//!
//! Provides commands for:
//! - `render`: Replace Graphviz code blocks in a markdown document with SVG figures
//! - `annotate`: Add accessibility metadata to an already rendered SVG
//! - `engines`: List the layout engines recognized as code block tags

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AnnotateArgs, EnginesArgs, RenderArgs};
use output::Output;

/// dotfig - Accessible Graphviz figures for markdown.
#[derive(Parser)]
#[command(name = "dotfig", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render Graphviz code blocks in a markdown document.
    Render(RenderArgs),
    /// Annotate a rendered SVG with its DOT source comments.
    Annotate(AnnotateArgs),
    /// List recognized layout engines.
    Engines(EnginesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Annotate(args) => args.execute(),
        Commands::Engines(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
