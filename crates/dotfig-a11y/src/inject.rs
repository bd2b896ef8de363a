//! Accessibility metadata injection for rendered SVG.
//!
//! The rendered markup is not parsed as a document. A single non-greedy match
//! locates the root `<svg …>` opening tag and the content up to the first
//! `</svg>`; everything outside that span (XML prolog, doctype) is dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::comments::extract_starting_comments;
use crate::escape::{escape_html_attribute, escape_html_text};

/// Title used when the source has no starting comments.
pub const FALLBACK_TITLE: &str = "SVG diagram of graph generated from DOT notation";

/// Root element: attribute list up to the first `>`, then content up to the
/// first `</svg>`.
static SVG_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<svg(?P<attributes>.*?)>(?P<body>.*?)</svg>").unwrap()
});

/// Which optional outputs to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Return the starting comments as a caption.
    pub use_first_comment_as_caption: bool,
    /// Emit a `<desc>` element containing the graph body.
    pub generate_aria_description: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            use_first_comment_as_caption: true,
            generate_aria_description: true,
        }
    }
}

/// Annotated SVG markup with its optional caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated {
    /// `<svg>` element with `role`, `aria-label`, `<title>` and optional `<desc>`.
    pub markup: String,
    /// Unescaped starting comments, when captions are enabled and comments exist.
    pub caption: Option<String>,
}

/// The rendered markup has no `<svg …>…</svg>` element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no <svg> root element found in {length} bytes of rendered markup")]
pub struct StructuralMatchError {
    /// Length of the markup that failed to match.
    pub length: usize,
}

/// Inject accessibility metadata derived from `source` into `svg`.
///
/// The injected `role` and `aria-label` attributes come before the renderer's
/// own attributes, so they win over any duplicates. `<title>` is always the
/// first child, followed by `<desc>` when enabled.
///
/// # Errors
///
/// Returns [`StructuralMatchError`] if `svg` has no root `<svg>` element with a
/// closing tag.
pub fn annotate(
    svg: &str,
    source: &str,
    options: AnnotateOptions,
) -> Result<Annotated, StructuralMatchError> {
    let extraction = extract_starting_comments(source);
    let comments = extraction.starting_comments.as_str();
    let has_comments = !comments.is_empty();

    let title = if has_comments {
        escape_html_text(comments)
    } else {
        FALLBACK_TITLE.to_owned()
    };
    let aria_label = if has_comments {
        escape_html_attribute(comments, true)
    } else {
        format!(
            "{FALLBACK_TITLE}: {}",
            escape_html_attribute(extraction.body, true)
        )
    };

    let caps = SVG_PARTS_RE
        .captures(svg)
        .ok_or(StructuralMatchError { length: svg.len() })?;
    let attributes = caps.name("attributes").map_or("", |m| m.as_str());
    let body = caps.name("body").map_or("", |m| m.as_str());

    let mut markup = String::with_capacity(svg.len() + title.len() * 2 + extraction.body.len());
    markup.push_str(r#"<svg role="img" aria-label=""#);
    markup.push_str(&aria_label);
    markup.push('"');
    markup.push_str(attributes);
    markup.push('>');
    markup.push_str("<title>");
    markup.push_str(&title);
    markup.push_str("</title>");
    if options.generate_aria_description {
        markup.push_str("<desc>");
        markup.push_str(&escape_html_text(extraction.body));
        markup.push_str("</desc>");
    }
    markup.push_str(body);
    markup.push_str("</svg>");

    let caption = (options.use_first_comment_as_caption && has_comments)
        .then(|| extraction.starting_comments.clone());

    Ok(Annotated { markup, caption })
}
