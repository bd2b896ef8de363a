//! Accessibility annotation for rendered Graphviz diagrams.
//!
//! This crate turns a rendered SVG plus the DOT source it came from into
//! accessible markup:
//! - Leading `#` comment lines become the diagram's title, `aria-label` and caption
//! - The graph body becomes a `<desc>` element for assistive technology
//! - `role="img"` marks the root element as a single image
//!
//! # Architecture
//!
//! - [`escape`]: HTML text and attribute escaping
//! - [`comments`]: Splitting DOT source into starting comments and body
//! - [`inject`]: Single-pass rewrite of the root `<svg>` element
//!
//! # Example
//!
//! ```
//! use dotfig_a11y::{AnnotateOptions, annotate};
//!
//! let source = "# Two nodes\ndigraph { A -> B; }";
//! let svg = r#"<svg width="10"><g/></svg>"#;
//!
//! let result = annotate(svg, source, AnnotateOptions::default()).unwrap();
//! assert!(result.markup.starts_with(r#"<svg role="img" aria-label="Two nodes""#));
//! assert_eq!(result.caption.as_deref(), Some("Two nodes"));
//! ```

pub mod comments;
pub mod escape;
pub mod inject;

pub use comments::{Extraction, extract_starting_comments};
pub use escape::{escape_html_attribute, escape_html_text};
pub use inject::{AnnotateOptions, Annotated, FALLBACK_TITLE, StructuralMatchError, annotate};
