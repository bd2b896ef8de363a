//! SVG optimization.
//!
//! [`SvgOptimizer`] is a textual optimizer for Graphviz output. It applies a
//! fixed set of named plugins, each a targeted regex rewrite, and minifies
//! whitespace between tags. Plugin names and defaults follow the SVGOMG
//! defaults for the plugins that matter for Graphviz output.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Shrinks rendered markup.
pub trait Optimizer: Send + Sync {
    /// Optimize `markup`, with `overrides` enabling or disabling plugins by name.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError`] if the markup is not SVG or an override names
    /// an unknown plugin.
    fn optimize(
        &self,
        markup: &str,
        overrides: &BTreeMap<String, bool>,
    ) -> Result<String, OptimizeError>;
}

/// Optimization error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    #[error("unknown optimizer plugin '{0}'")]
    UnknownPlugin(String),
    #[error("markup has no <svg> element")]
    Malformed,
}

/// Plugins in application order with their default state.
const DEFAULT_PLUGINS: [(&str, bool); 9] = [
    ("removeXMLProcInst", true),
    ("removeDoctype", true),
    ("removeComments", true),
    ("removeMetadata", true),
    ("removeTitle", true),
    ("removeDesc", true),
    ("removeEmptyText", true),
    ("cleanupAttrs", true),
    ("removeDimensions", false),
];

static XML_PROC_INST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\?xml.*?\?>").unwrap());

static DOCTYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!DOCTYPE[^>]*>").unwrap());

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static METADATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<metadata\b[^>]*?(?:/>|>.*?</metadata>)").unwrap());

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title\b[^>]*?(?:/>|>.*?</title>)").unwrap());

static DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<desc\b[^>]*?(?:/>|>.*?</desc>)").unwrap());

/// `<text …/>` or `<text …></text>` with only whitespace inside.
static EMPTY_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<text\b[^>]*?(?:/>|>\s*</text>)").unwrap());

/// Double-quoted attribute values containing whitespace worth collapsing.
static ATTR_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"="([^"]*)""#).unwrap());

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static ROOT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").unwrap());

static DIMENSION_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s(?:width|height)="[^"]*""#).unwrap());

static INTER_TAG_WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").unwrap());

/// Element start tags (not comments, doctypes or processing instructions).
static START_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[a-zA-Z][^>]*>").unwrap());

/// Regex-based optimizer for Graphviz SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgOptimizer;

impl SvgOptimizer {
    /// Resolve which plugins run, applying overrides over the defaults.
    fn enabled_plugins(
        overrides: &BTreeMap<String, bool>,
    ) -> Result<BTreeMap<&'static str, bool>, OptimizeError> {
        let mut plugins: BTreeMap<&'static str, bool> = DEFAULT_PLUGINS.into_iter().collect();
        for (name, enabled) in overrides {
            let Some(state) = plugins.get_mut(name.as_str()) else {
                return Err(OptimizeError::UnknownPlugin(name.clone()));
            };
            *state = *enabled;
        }
        Ok(plugins)
    }

    fn apply_plugin(name: &str, svg: &str) -> String {
        match name {
            "removeXMLProcInst" => XML_PROC_INST_RE.replace_all(svg, "").into_owned(),
            "removeDoctype" => DOCTYPE_RE.replace_all(svg, "").into_owned(),
            "removeComments" => COMMENT_RE.replace_all(svg, "").into_owned(),
            "removeMetadata" => METADATA_RE.replace_all(svg, "").into_owned(),
            "removeTitle" => TITLE_RE.replace_all(svg, "").into_owned(),
            "removeDesc" => DESC_RE.replace_all(svg, "").into_owned(),
            "removeEmptyText" => EMPTY_TEXT_RE.replace_all(svg, "").into_owned(),
            "cleanupAttrs" => cleanup_attrs(svg),
            "removeDimensions" => remove_dimensions(svg),
            _ => svg.to_owned(),
        }
    }
}

impl Optimizer for SvgOptimizer {
    fn optimize(
        &self,
        markup: &str,
        overrides: &BTreeMap<String, bool>,
    ) -> Result<String, OptimizeError> {
        if !markup.contains("<svg") {
            return Err(OptimizeError::Malformed);
        }

        let plugins = Self::enabled_plugins(overrides)?;

        let mut svg = markup.to_owned();
        for (name, _) in DEFAULT_PLUGINS {
            if plugins.get(name).copied().unwrap_or(false) {
                svg = Self::apply_plugin(name, &svg);
            }
        }

        let normalized = START_TAG_RE.replace_all(svg.trim(), |caps: &Captures| {
            normalize_tag_whitespace(&caps[0])
        });
        let minified = INTER_TAG_WHITESPACE_RE.replace_all(&normalized, "><");
        Ok(minified.into_owned())
    }
}

/// Collapse line breaks and repeated spaces inside attribute values.
fn cleanup_attrs(svg: &str) -> String {
    ATTR_VALUE_RE
        .replace_all(svg, |caps: &Captures| {
            let collapsed = WHITESPACE_RUN_RE.replace_all(caps[1].trim(), " ");
            format!(r#"="{collapsed}""#)
        })
        .into_owned()
}

/// Separate attributes with single spaces, leaving quoted values untouched.
fn normalize_tag_whitespace(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in tag.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && c != '>' && c != '/' {
            out.push(' ');
        }
        pending_space = false;
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

/// Drop `width`/`height` from the root element when it has a `viewBox`.
fn remove_dimensions(svg: &str) -> String {
    ROOT_TAG_RE
        .replace(svg, |caps: &Captures| {
            let tag = &caps[0];
            if tag.contains("viewBox=") {
                DIMENSION_ATTR_RE.replace_all(tag, "").into_owned()
            } else {
                tag.to_owned()
            }
        })
        .into_owned()
}
