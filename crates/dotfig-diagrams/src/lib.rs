//! Accessible Graphviz diagrams for markdown documents.
//!
//! This crate replaces Graphviz code blocks (` ```dot `, ` ```neato `, …) with
//! rendered, optimized and annotated SVG:
//! - [`MarkdownDocument`] finds graph blocks and splices results back
//! - [`DiagramPipeline`] runs render → optimize → annotate per block, concurrently or sequentially
//! - [`Renderer`] and [`Optimizer`] are the external collaborators, with
//!   [`CommandRenderer`], [`KrokiRenderer`] and [`SvgOptimizer`] as implementations
//! - [`ErrorReporter`] receives one message per failed block
//!
//! # Architecture
//!
//! - [`layout`]: Layout engines recognized as fence tags
//! - [`options`]: `PluginOptions` and override merging
//! - [`render`]: Graphviz rendering backends
//! - [`optimize`]: SVG optimizer
//! - [`pipeline`]: Per-block chain and document pass
//! - [`markdown`]: Markdown discovery and replacement
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dotfig_diagrams::{CommandRenderer, DiagramPipeline, process_markdown};
//!
//! let pipeline = DiagramPipeline::new(Arc::new(CommandRenderer::default()));
//! let processed = process_markdown("```dot\ndigraph { A -> B }\n```\n", &pipeline);
//! ```

mod consts;
mod error;
pub mod layout;
pub mod markdown;
pub mod optimize;
pub mod options;
pub mod pipeline;
pub mod render;
mod report;
#[cfg(test)]
mod testing;

pub use consts::{DEFAULT_DOT_PATH, DEFAULT_TIMEOUT, REPORT_PREFIX};
pub use error::{DiagramError, DiagramErrorKind};
pub use layout::{LayoutEngine, OutputFormat};
pub use markdown::{MarkdownDocument, ProcessedMarkdown, process_markdown, to_html};
pub use optimize::{OptimizeError, Optimizer, SvgOptimizer};
pub use options::{PluginOptions, PluginOverrides};
pub use pipeline::{
    DiagramPipeline, ExecutionDiscipline, GraphBlock, PipelineOutcome, Replacement, wrap_markup,
};
pub use render::{CommandRenderer, KrokiRenderer, RenderError, Renderer};
pub use report::{CollectingReporter, ErrorReporter, TracingReporter};
