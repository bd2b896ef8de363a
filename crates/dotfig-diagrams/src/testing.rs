//! In-memory collaborators for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::layout::{LayoutEngine, OutputFormat};
use crate::optimize::{OptimizeError, Optimizer};
use crate::render::{RenderError, Renderer};

/// Renders any source to a small SVG naming the layout; sources containing
/// `syntax error` fail like Graphviz would.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pub(crate) calls: AtomicUsize,
}

impl Renderer for FakeRenderer {
    fn render(
        &self,
        source: &str,
        format: OutputFormat,
        layout: LayoutEngine,
    ) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if source.contains("syntax error") {
            return Err(RenderError::Process {
                status: "exit status: 1".to_owned(),
                stderr: "Error: <stdin>: syntax error in line 1".to_owned(),
            });
        }
        Ok(format!(
            "<?xml version=\"1.0\"?>\n<svg width=\"10\" data-format=\"{}\"><g class=\"{layout}\"><title>G</title></g></svg>\n",
            format.as_str()
        ))
    }
}

/// Renders markup without a root element.
pub(crate) struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&self, _: &str, _: OutputFormat, _: LayoutEngine) -> Result<String, RenderError> {
        Ok("<html></html>".to_owned())
    }
}

/// Counts calls and strips the XML prolog.
#[derive(Debug, Default)]
pub(crate) struct CountingOptimizer {
    pub(crate) calls: AtomicUsize,
}

impl Optimizer for CountingOptimizer {
    fn optimize(
        &self,
        markup: &str,
        overrides: &BTreeMap<String, bool>,
    ) -> Result<String, OptimizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(name) = overrides.keys().find(|name| name.as_str() == "fail") {
            return Err(OptimizeError::UnknownPlugin(name.clone()));
        }
        let start = markup.find("<svg").ok_or(OptimizeError::Malformed)?;
        Ok(markup[start..].trim().to_owned())
    }
}
