//! `dotfig engines` command implementation.

use clap::Args;
use dotfig_diagrams::LayoutEngine;

use super::write_output;
use crate::error::CliError;

/// Arguments for the engines command.
#[derive(Args)]
pub(crate) struct EnginesArgs {}

impl EnginesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        write_output(None, &engine_list())?;
        Ok(())
    }
}

/// One code block tag per line.
fn engine_list() -> String {
    LayoutEngine::ALL
        .iter()
        .map(|engine| format!("{engine}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_list() {
        assert_eq!(
            engine_list(),
            "circo\ndot\nfdp\nneato\nosage\npatchwork\ntwopi\n"
        );
    }
}
