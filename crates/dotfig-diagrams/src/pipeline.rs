//! Render → optimize → annotate chain for graph blocks.
//!
//! This module provides [`DiagramPipeline`], which turns each [`GraphBlock`]
//! into replacement markup. Every block is an independent chain; a failing
//! chain is reported once and leaves its block unreplaced.

use std::ops::Range;
use std::sync::Arc;

use dotfig_a11y::{annotate, escape_html_attribute, escape_html_text};
use rayon::prelude::*;

use crate::consts::REPORT_PREFIX;
use crate::error::DiagramError;
use crate::layout::{LayoutEngine, OutputFormat};
use crate::optimize::{Optimizer, SvgOptimizer};
use crate::options::PluginOptions;
use crate::render::Renderer;
use crate::report::{ErrorReporter, TracingReporter};

/// A graph code block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphBlock {
    /// Zero-based index of this block among the document's graph blocks.
    pub index: usize,
    /// DOT source inside the fence.
    pub source: String,
    /// Layout engine named by the fence tag.
    pub layout: LayoutEngine,
    /// Byte range of the whole block in the host document.
    pub location: Range<usize>,
}

/// How blocks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionDiscipline {
    /// All chains run on the rayon pool; the pass ends once every chain settles.
    #[default]
    Concurrent,
    /// One chain at a time, in document order.
    Sequential,
}

/// Final markup for one successfully processed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub index: usize,
    pub location: Range<usize>,
    pub markup: String,
}

/// Result of a whole document pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Successful blocks, in document order.
    pub replacements: Vec<Replacement>,
    /// Indices of blocks whose chain failed.
    pub failed: Vec<usize>,
}

/// Drives rendering, optimization and annotation for graph blocks.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use dotfig_diagrams::{CommandRenderer, DiagramPipeline, ExecutionDiscipline};
///
/// let pipeline = DiagramPipeline::new(Arc::new(CommandRenderer::default()))
///     .discipline(ExecutionDiscipline::Sequential);
/// let outcome = pipeline.run(&blocks);
/// ```
pub struct DiagramPipeline {
    renderer: Arc<dyn Renderer>,
    optimizer: Arc<dyn Optimizer>,
    reporter: Arc<dyn ErrorReporter>,
    options: PluginOptions,
    discipline: ExecutionDiscipline,
}

impl DiagramPipeline {
    /// Create a pipeline with default options, [`SvgOptimizer`] and [`TracingReporter`].
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            optimizer: Arc::new(SvgOptimizer),
            reporter: Arc::new(TracingReporter),
            options: PluginOptions::default(),
            discipline: ExecutionDiscipline::default(),
        }
    }

    /// Set the optimizer used when [`PluginOptions::optimize`] is enabled.
    #[must_use]
    pub fn optimizer(mut self, optimizer: Arc<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Set the collaborator that receives failure messages.
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn options(mut self, options: PluginOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn discipline(mut self, discipline: ExecutionDiscipline) -> Self {
        self.discipline = discipline;
        self
    }

    /// Run one block's full chain and return its wrapped markup.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError`] naming the step that failed.
    pub fn process_block(&self, block: &GraphBlock) -> Result<String, DiagramError> {
        tracing::debug!(index = block.index, layout = %block.layout, "Rendering diagram");

        let rendered = self
            .renderer
            .render(&block.source, OutputFormat::Svg, block.layout)
            .map_err(|e| DiagramError::new(block.index, e))?;

        let optimized = if self.options.optimize {
            self.optimizer
                .optimize(&rendered, &self.options.optimizer_plugins)
                .map_err(|e| DiagramError::new(block.index, e))?
        } else {
            rendered
        };

        let annotated = annotate(
            &optimized,
            &block.source,
            self.options.annotate_options(),
        )
        .map_err(|e| DiagramError::new(block.index, e))?;

        Ok(wrap_markup(
            &annotated.markup,
            annotated.caption.as_deref(),
            &self.options,
        ))
    }

    /// Process every block and collect the outcome.
    ///
    /// Returns only after all chains have settled. Failures are reported as
    /// they happen and never stop sibling chains.
    pub fn run(&self, blocks: &[GraphBlock]) -> PipelineOutcome {
        let results: Vec<Result<Replacement, usize>> = match self.discipline {
            ExecutionDiscipline::Concurrent => {
                blocks.par_iter().map(|block| self.run_chain(block)).collect()
            }
            ExecutionDiscipline::Sequential => {
                blocks.iter().map(|block| self.run_chain(block)).collect()
            }
        };

        let mut outcome = PipelineOutcome::default();
        for result in results {
            match result {
                Ok(replacement) => outcome.replacements.push(replacement),
                Err(index) => outcome.failed.push(index),
            }
        }

        tracing::info!(
            rendered = outcome.replacements.len(),
            failed = outcome.failed.len(),
            "Diagram pass completed"
        );
        outcome
    }

    /// Run a chain, reporting its failure exactly once.
    fn run_chain(&self, block: &GraphBlock) -> Result<Replacement, usize> {
        match self.process_block(block) {
            Ok(markup) => Ok(Replacement {
                index: block.index,
                location: block.location.clone(),
                markup,
            }),
            Err(e) => {
                self.reporter.error(&format!("{REPORT_PREFIX}{e}"));
                Err(block.index)
            }
        }
    }
}

/// Wrap annotated SVG in the configured container.
///
/// With captions enabled the container sits in a `<figure>` followed by a
/// `<figcaption>` (empty when there is no caption).
#[must_use]
pub fn wrap_markup(svg: &str, caption: Option<&str>, options: &PluginOptions) -> String {
    let tag = &options.wrapper_tag;
    let wrapper_class = escape_html_attribute(&options.wrapper_class, false);
    let wrapped = format!(r#"<{tag} class="{wrapper_class}">{svg}</{tag}>"#);

    if !options.first_comment_is_caption {
        return wrapped;
    }

    let figure_class = escape_html_attribute(&options.figure_class, false);
    let figcaption_class = escape_html_attribute(&options.figcaption_class, false);
    let caption = caption.map(escape_html_text).unwrap_or_default();
    format!(
        r#"<figure class="{figure_class}">{wrapped}<figcaption class="{figcaption_class}">{caption}</figcaption></figure>"#
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::report::CollectingReporter;
    use crate::testing::{BrokenRenderer, CountingOptimizer, FakeRenderer};
    use pretty_assertions::assert_eq;

    fn block(index: usize, source: &str) -> GraphBlock {
        GraphBlock {
            index,
            source: source.to_owned(),
            layout: LayoutEngine::Dot,
            location: index * 10..index * 10 + 5,
        }
    }

    fn pipeline(renderer: Arc<dyn Renderer>, reporter: &Arc<CollectingReporter>) -> DiagramPipeline {
        let reporter: Arc<dyn ErrorReporter> = Arc::clone(reporter) as Arc<dyn ErrorReporter>;
        DiagramPipeline::new(renderer)
            .optimizer(Arc::new(CountingOptimizer::default()))
            .reporter(reporter)
    }

    #[test]
    fn test_process_block_with_caption() {
        let reporter = Arc::new(CollectingReporter::new());
        let pipeline = pipeline(Arc::new(FakeRenderer::default()), &reporter);

        let markup = pipeline
            .process_block(&block(0, "# Two nodes\ndigraph { A -> B }"))
            .unwrap();

        assert_eq!(
            markup,
            concat!(
                r#"<figure class="remark-graphviz-figure"><div class="remark-graphviz-graph">"#,
                r#"<svg role="img" aria-label="Two nodes" width="10" data-format="svg">"#,
                "<title>Two nodes</title><desc>digraph { A -&gt; B }</desc>",
                r#"<g class="dot"><title>G</title></g></svg></div>"#,
                r#"<figcaption class="remark-graphviz-figcaption">Two nodes</figcaption></figure>"#,
            )
        );
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_process_block_caption_disabled() {
        let reporter = Arc::new(CollectingReporter::new());
        let options = PluginOptions {
            first_comment_is_caption: false,
            wrapper_tag: "section".to_owned(),
            wrapper_class: "graph".to_owned(),
            ..PluginOptions::default()
        };
        let pipeline = pipeline(Arc::new(FakeRenderer::default()), &reporter).options(options);

        let markup = pipeline
            .process_block(&block(0, "# Two nodes\ndigraph { A -> B }"))
            .unwrap();

        assert!(markup.starts_with(r#"<section class="graph"><svg role="img""#));
        assert!(markup.ends_with("</svg></section>"));
        assert!(!markup.contains("figure"));
    }

    #[test]
    fn test_process_block_skips_optimizer_when_disabled() {
        let reporter = Arc::new(CollectingReporter::new());
        let optimizer = Arc::new(CountingOptimizer::default());
        let options = PluginOptions {
            optimize: false,
            ..PluginOptions::default()
        };
        let pipeline = DiagramPipeline::new(Arc::new(FakeRenderer::default()))
            .optimizer(Arc::clone(&optimizer) as Arc<dyn Optimizer>)
            .reporter(reporter)
            .options(options);

        let markup = pipeline.process_block(&block(0, "digraph {}")).unwrap();

        assert_eq!(optimizer.calls.load(Ordering::SeqCst), 0);
        // Prolog outside the root element is dropped by the injector
        assert!(!markup.contains("<?xml"));
    }

    #[test]
    fn test_process_block_passes_plugin_overrides() {
        let reporter = Arc::new(CollectingReporter::new());
        let options = PluginOptions {
            optimizer_plugins: BTreeMap::from([("fail".to_owned(), true)]),
            ..PluginOptions::default()
        };
        let pipeline = pipeline(Arc::new(FakeRenderer::default()), &reporter).options(options);

        let err = pipeline.process_block(&block(3, "digraph {}")).unwrap_err();

        assert_eq!(err.index, 3);
        assert!(err.to_string().starts_with("diagram 3: optimize failed:"));
    }

    #[test]
    fn test_process_block_structural_error() {
        let reporter = Arc::new(CollectingReporter::new());
        let pipeline = pipeline(Arc::new(BrokenRenderer), &reporter).options(PluginOptions {
            optimize: false,
            ..PluginOptions::default()
        });

        let err = pipeline.process_block(&block(0, "digraph {}")).unwrap_err();

        assert!(
            err.to_string()
                .starts_with("diagram 0: accessibility injection failed:")
        );
    }

    #[test]
    fn test_run_isolates_failures() {
        for discipline in [ExecutionDiscipline::Concurrent, ExecutionDiscipline::Sequential] {
            let reporter = Arc::new(CollectingReporter::new());
            let renderer = Arc::new(FakeRenderer::default());
            let pipeline = pipeline(Arc::clone(&renderer) as Arc<dyn Renderer>, &reporter)
                .discipline(discipline);
            let blocks = [
                block(0, "# First\ndigraph { A }"),
                block(1, "digraph { syntax error"),
                block(2, "# Third\ngraph { C }"),
            ];

            let outcome = pipeline.run(&blocks);

            let indices: Vec<_> = outcome.replacements.iter().map(|r| r.index).collect();
            assert_eq!(indices, vec![0, 2], "{discipline:?}");
            assert_eq!(outcome.failed, vec![1]);
            assert_eq!(outcome.replacements[1].location, 20..25);
            assert!(outcome.replacements[1].markup.contains("<title>Third</title>"));
            assert_eq!(renderer.calls.load(Ordering::SeqCst), 3);

            let messages = reporter.messages();
            assert_eq!(messages.len(), 1);
            assert_eq!(
                messages[0],
                "[dotfig]: GraphViz compilation failed: diagram 1: render failed: \
                 Graphviz exited with exit status: 1: Error: <stdin>: syntax error in line 1"
            );
        }
    }

    #[test]
    fn test_run_disciplines_produce_same_output() {
        let blocks: Vec<_> = (0..8)
            .map(|i| block(i, &format!("# Graph {i}\ndigraph {{ N{i} }}")))
            .collect();
        let reporter = Arc::new(CollectingReporter::new());

        let concurrent = pipeline(Arc::new(FakeRenderer::default()), &reporter).run(&blocks);
        let sequential = pipeline(Arc::new(FakeRenderer::default()), &reporter)
            .discipline(ExecutionDiscipline::Sequential)
            .run(&blocks);

        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.replacements.len(), 8);
    }

    #[test]
    fn test_run_empty() {
        let reporter = Arc::new(CollectingReporter::new());
        let outcome = pipeline(Arc::new(FakeRenderer::default()), &reporter).run(&[]);
        assert_eq!(outcome, PipelineOutcome::default());
    }

    #[test]
    fn test_wrap_markup_empty_caption() {
        let markup = wrap_markup("<svg></svg>", None, &PluginOptions::default());

        assert_eq!(
            markup,
            concat!(
                r#"<figure class="remark-graphviz-figure"><div class="remark-graphviz-graph"><svg></svg></div>"#,
                r#"<figcaption class="remark-graphviz-figcaption"></figcaption></figure>"#,
            )
        );
    }

    #[test]
    fn test_wrap_markup_escapes_caption() {
        let markup = wrap_markup("<svg></svg>", Some("A < B"), &PluginOptions::default());
        assert!(markup.contains(">A &lt; B</figcaption>"));
    }
}
