//! Block-level pipeline errors.

use dotfig_a11y::StructuralMatchError;

use crate::optimize::OptimizeError;
use crate::render::RenderError;

/// A single diagram's chain failed.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {kind}")]
pub struct DiagramError {
    /// Zero-based index of the block in its document.
    pub index: usize,
    pub kind: DiagramErrorKind,
}

impl DiagramError {
    pub(crate) fn new(index: usize, kind: impl Into<DiagramErrorKind>) -> Self {
        Self {
            index,
            kind: kind.into(),
        }
    }
}

/// Which step of the chain failed.
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("optimize failed: {0}")]
    Optimize(#[from] OptimizeError),
    #[error("accessibility injection failed: {0}")]
    Structure(#[from] StructuralMatchError),
}
