//! `dotfig render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use dotfig_config::{CliSettings, Config, GraphvizConfig, RendererBackend, RendererConfig};
use dotfig_diagrams::{
    CollectingReporter, CommandRenderer, DiagramPipeline, ErrorReporter, ExecutionDiscipline,
    KrokiRenderer, PluginOptions, PluginOverrides, Renderer, process_markdown, to_html,
};

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Rendering backend selectable from the command line.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum BackendArg {
    /// Local Graphviz executable.
    Command,
    /// Kroki HTTP service.
    Kroki,
}

impl From<BackendArg> for RendererBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Command => Self::Command,
            BackendArg::Kroki => Self::Kroki,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to process (`-` reads stdin).
    input: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit HTML instead of markdown.
    #[arg(long)]
    html: bool,

    /// Path to configuration file (default: auto-discover dotfig.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip SVG optimization.
    #[arg(long)]
    no_optimize: bool,

    /// Do not use the first comment as a caption.
    #[arg(long)]
    no_caption: bool,

    /// Do not add a <desc> element with the DOT source.
    #[arg(long)]
    no_aria_description: bool,

    /// Element wrapping each SVG (overrides config).
    #[arg(long)]
    wrapper_tag: Option<String>,

    /// Class of the wrapping element (overrides config).
    #[arg(long)]
    wrapper_class: Option<String>,

    /// Render diagrams one at a time.
    #[arg(long)]
    sequential: bool,

    /// Rendering backend (overrides config).
    #[arg(long, value_enum)]
    renderer: Option<BackendArg>,

    /// Kroki server URL (overrides config).
    #[arg(long, env = "DOTFIG_KROKI_URL")]
    kroki_url: Option<String>,

    /// Graphviz executable (overrides config).
    #[arg(long, env = "DOTFIG_DOT_PATH")]
    dot_path: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or I/O fails, or if any diagram
    /// failed. The document is written before a diagram failure is returned.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = read_input(&self.input)?;

        let reporter = Arc::new(CollectingReporter::new());
        let discipline = if config.concurrent() {
            ExecutionDiscipline::Concurrent
        } else {
            ExecutionDiscipline::Sequential
        };
        let pipeline = DiagramPipeline::new(create_renderer(&config.renderer_resolved)?)
            .reporter(Arc::clone(&reporter) as Arc<dyn ErrorReporter>)
            .options(plugin_options(&config.graphviz))
            .discipline(discipline);

        let processed = process_markdown(&markdown, &pipeline);
        let document = if self.html {
            to_html(&processed.markdown)
        } else {
            processed.markdown
        };
        write_output(self.output.as_deref(), &document)?;

        for message in reporter.messages() {
            output.error(&message);
        }

        let total = processed.rendered + processed.failed.len();
        if !processed.failed.is_empty() {
            return Err(CliError::DiagramsFailed {
                failed: processed.failed.len(),
                total,
            });
        }

        if let Some(path) = &self.output {
            output.success(&format!(
                "Rendered {total} diagrams to {}",
                path.display()
            ));
        } else if total == 0 {
            tracing::info!("No Graphviz code blocks found");
        }
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            optimize: self.no_optimize.then_some(false),
            wrapper_tag: self.wrapper_tag.clone(),
            wrapper_class: self.wrapper_class.clone(),
            first_comment_is_caption: self.no_caption.then_some(false),
            generate_aria_description: self.no_aria_description.then_some(false),
            concurrent: self.sequential.then_some(false),
            backend: self.renderer.map(RendererBackend::from),
            dot_path: self.dot_path.clone(),
            kroki_url: self.kroki_url.clone(),
        }
    }
}

/// Merge the `[graphviz]` section over the built-in defaults.
fn plugin_options(graphviz: &GraphvizConfig) -> PluginOptions {
    let GraphvizConfig {
        optimize,
        wrapper_tag,
        wrapper_class,
        figure_class,
        figcaption_class,
        first_comment_is_caption,
        generate_aria_description,
        concurrent: _,
        optimizer_plugins,
    } = graphviz.clone();

    PluginOptions::default().merge(PluginOverrides {
        optimize,
        wrapper_tag,
        wrapper_class,
        figure_class,
        figcaption_class,
        first_comment_is_caption,
        generate_aria_description,
        optimizer_plugins,
    })
}

fn create_renderer(config: &RendererConfig) -> Result<Arc<dyn Renderer>, CliError> {
    match config.backend {
        RendererBackend::Command => Ok(Arc::new(CommandRenderer::new(config.dot_path.clone()))),
        RendererBackend::Kroki => {
            let url = config.kroki_url.clone().ok_or_else(|| {
                CliError::Validation("kroki backend requires a kroki_url".to_owned())
            })?;
            Ok(Arc::new(KrokiRenderer::new(url).timeout(config.timeout)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plugin_options_defaults() {
        assert_eq!(
            plugin_options(&GraphvizConfig::default()),
            PluginOptions::default()
        );
    }

    #[test]
    fn test_plugin_options_keeps_unset_defaults() {
        let graphviz = GraphvizConfig {
            wrapper_tag: Some("section".to_owned()),
            optimizer_plugins: Some(BTreeMap::from([("removeTitle".to_owned(), false)])),
            ..GraphvizConfig::default()
        };

        let options = plugin_options(&graphviz);

        assert_eq!(options.wrapper_tag, "section");
        assert_eq!(options.wrapper_class, PluginOptions::default().wrapper_class);
        assert!(options.optimize);
        assert_eq!(
            options.optimizer_plugins,
            BTreeMap::from([("removeTitle".to_owned(), false)])
        );
    }

    #[test]
    fn test_create_kroki_renderer_without_url() {
        let config = RendererConfig {
            backend: RendererBackend::Kroki,
            ..RendererConfig::default()
        };

        assert!(matches!(
            create_renderer(&config),
            Err(CliError::Validation(_))
        ));
    }
}
