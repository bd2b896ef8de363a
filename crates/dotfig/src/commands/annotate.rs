//! `dotfig annotate` command implementation.

use std::path::PathBuf;

use clap::Args;
use dotfig_a11y::{AnnotateOptions, annotate};

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the annotate command.
#[derive(Args)]
pub(crate) struct AnnotateArgs {
    /// Rendered SVG file (`-` reads stdin).
    svg: PathBuf,

    /// DOT source the SVG was rendered from.
    #[arg(short, long)]
    source: PathBuf,

    /// Print the caption taken from the first comment to stderr.
    #[arg(long)]
    caption: bool,

    /// Do not add a <desc> element with the DOT source.
    #[arg(long)]
    no_aria_description: bool,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl AnnotateArgs {
    /// Execute the annotate command.
    ///
    /// # Errors
    ///
    /// Returns an error if either input cannot be read or the SVG has no root
    /// element.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let svg = read_input(&self.svg)?;
        let source = std::fs::read_to_string(&self.source)?;

        let options = AnnotateOptions {
            use_first_comment_as_caption: self.caption,
            generate_aria_description: !self.no_aria_description,
        };
        let annotated = annotate(&svg, &source, options)?;

        write_output(self.output.as_deref(), &annotated.markup)?;

        if self.caption {
            match &annotated.caption {
                Some(caption) => output.info(caption),
                None => output.warning("No starting comments found; no caption"),
            }
        }
        Ok(())
    }
}
