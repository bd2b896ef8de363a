//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default Graphviz executable for [`CommandRenderer`](crate::CommandRenderer).
pub const DEFAULT_DOT_PATH: &str = "dot";

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix identifying this pipeline in reported errors.
pub const REPORT_PREFIX: &str = "[dotfig]: GraphViz compilation failed: ";
