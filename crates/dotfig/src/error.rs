//! CLI error types.

use dotfig_a11y::StructuralMatchError;
use dotfig_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Structure(#[from] StructuralMatchError),

    #[error("{failed} of {total} diagrams failed to render")]
    DiagramsFailed { failed: usize, total: usize },

    #[error("{0}")]
    Validation(String),
}
