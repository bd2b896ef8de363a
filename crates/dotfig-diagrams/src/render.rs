//! Graphviz rendering backends.
//!
//! The pipeline only depends on the [`Renderer`] trait. Two backends exist:
//! - [`CommandRenderer`]: runs a local Graphviz executable
//! - [`KrokiRenderer`]: posts the source to a Kroki server over HTTP

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_DOT_PATH, DEFAULT_TIMEOUT};
use crate::layout::{LayoutEngine, OutputFormat};

/// Turns DOT source into rendered markup.
///
/// Implementations must be shareable across threads: the concurrent pipeline
/// calls `render` from the rayon pool.
pub trait Renderer: Send + Sync {
    /// Render `source` with the given layout engine.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the source is not valid DOT or the backend
    /// is unreachable.
    fn render(
        &self,
        source: &str,
        format: OutputFormat,
        layout: LayoutEngine,
    ) -> Result<String, RenderError>;
}

/// Rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Graphviz exited with {status}: {stderr}")]
    Process { status: String, stderr: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("invalid UTF-8 in rendered output: {0}")]
    Utf8(String),
}

/// Renders by piping the source through the Graphviz `dot` executable.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
}

impl CommandRenderer {
    /// Use the given Graphviz executable (name on `PATH` or absolute path).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DOT_PATH)
    }
}

impl Renderer for CommandRenderer {
    fn render(
        &self,
        source: &str,
        format: OutputFormat,
        layout: LayoutEngine,
    ) -> Result<String, RenderError> {
        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.as_str()))
            .arg(format!("-K{layout}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Graphviz reads all input before writing output, so writing first cannot block on stdout.
        // A write error usually means the process already exited; its stderr says why.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(source.as_bytes()));

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RenderError::Process {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        written?;

        String::from_utf8(output.stdout).map_err(|e| RenderError::Utf8(e.to_string()))
    }
}

/// Renders via a Kroki server's `graphviz` endpoint.
pub struct KrokiRenderer {
    server_url: String,
    agent: Agent,
}

impl KrokiRenderer {
    /// Create a renderer for the given Kroki server URL.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into().trim_end_matches('/').to_owned(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set HTTP timeout for Kroki requests.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }
}

/// Create HTTP agent with the specified timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl Renderer for KrokiRenderer {
    fn render(
        &self,
        source: &str,
        format: OutputFormat,
        layout: LayoutEngine,
    ) -> Result<String, RenderError> {
        let url = format!("{}/graphviz/{}", self.server_url, format.as_str());

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .header("Kroki-Diagram-Options-layout", layout.as_str())
            .send(source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Http(format!("HTTP {status}: {error_body}")));
        }

        let data = body
            .read_to_vec()
            .map_err(|e| RenderError::Http(e.to_string()))?;
        String::from_utf8(data).map_err(|e| RenderError::Utf8(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_renderer_missing_program() {
        let renderer = CommandRenderer::new("dotfig-test-no-such-graphviz-binary");

        let err = renderer
            .render("digraph {}", OutputFormat::Svg, LayoutEngine::Dot)
            .unwrap_err();

        assert!(matches!(err, RenderError::Spawn { .. }));
        assert!(
            err.to_string()
                .starts_with("failed to run dotfig-test-no-such-graphviz-binary")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_renderer_early_exit_keeps_stderr() {
        // `sh` rejects the Graphviz flags and exits without reading stdin
        let renderer = CommandRenderer::new("sh");
        let source = format!("digraph {{ {} }}", "A -> B; ".repeat(200_000));

        let err = renderer
            .render(&source, OutputFormat::Svg, LayoutEngine::Dot)
            .unwrap_err();

        match err {
            RenderError::Process { stderr, .. } => assert!(!stderr.is_empty()),
            other => panic!("expected process error, got {other:?}"),
        }
    }

    #[test]
    fn test_command_renderer_default_program() {
        let renderer = CommandRenderer::default();
        assert_eq!(renderer.program, "dot");
    }

    #[test]
    fn test_kroki_renderer_trims_trailing_slash() {
        let renderer = KrokiRenderer::new("https://kroki.io/");
        assert_eq!(renderer.server_url, "https://kroki.io");
    }

    #[test]
    fn test_kroki_renderer_unreachable() {
        let renderer =
            KrokiRenderer::new("http://127.0.0.1:1").timeout(Duration::from_millis(200));

        let err = renderer
            .render("digraph {}", OutputFormat::Svg, LayoutEngine::Dot)
            .unwrap_err();

        assert!(matches!(err, RenderError::Http(_)));
    }

    #[test]
    fn test_process_error_display() {
        let err = RenderError::Process {
            status: "exit status: 1".to_owned(),
            stderr: "Error: <stdin>: syntax error in line 1".to_owned(),
        };

        assert_eq!(
            err.to_string(),
            "Graphviz exited with exit status: 1: Error: <stdin>: syntax error in line 1"
        );
    }
}
