//! Pipeline options and override merging.
//!
//! Options are built from defaults with caller overrides layered on top. An
//! override that is `None` never replaces a default.

use std::collections::BTreeMap;

use dotfig_a11y::AnnotateOptions;

/// Resolved pipeline options (immutable once merged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Run the optimizer after rendering.
    pub optimize: bool,
    /// Element wrapping the annotated SVG.
    pub wrapper_tag: String,
    /// Class attribute of the wrapper element.
    pub wrapper_class: String,
    /// Class attribute of the outer `<figure>` when captions are enabled.
    pub figure_class: String,
    /// Class attribute of the `<figcaption>` element.
    pub figcaption_class: String,
    /// Use starting comments as a visible caption.
    pub first_comment_is_caption: bool,
    /// Emit `<desc>` with the graph body.
    pub generate_aria_description: bool,
    /// Per-plugin overrides passed to the optimizer.
    pub optimizer_plugins: BTreeMap<String, bool>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            wrapper_tag: "div".to_owned(),
            wrapper_class: "remark-graphviz-graph".to_owned(),
            figure_class: "remark-graphviz-figure".to_owned(),
            figcaption_class: "remark-graphviz-figcaption".to_owned(),
            first_comment_is_caption: true,
            generate_aria_description: true,
            optimizer_plugins: BTreeMap::new(),
        }
    }
}

/// Caller-supplied overrides. Only `Some` values replace defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOverrides {
    pub optimize: Option<bool>,
    pub wrapper_tag: Option<String>,
    pub wrapper_class: Option<String>,
    pub figure_class: Option<String>,
    pub figcaption_class: Option<String>,
    pub first_comment_is_caption: Option<bool>,
    pub generate_aria_description: Option<bool>,
    pub optimizer_plugins: Option<BTreeMap<String, bool>>,
}

impl PluginOptions {
    /// Apply overrides, keeping the current value wherever an override is `None`.
    #[must_use]
    pub fn merge(mut self, overrides: PluginOverrides) -> Self {
        if let Some(optimize) = overrides.optimize {
            self.optimize = optimize;
        }
        if let Some(wrapper_tag) = overrides.wrapper_tag {
            self.wrapper_tag = wrapper_tag;
        }
        if let Some(wrapper_class) = overrides.wrapper_class {
            self.wrapper_class = wrapper_class;
        }
        if let Some(figure_class) = overrides.figure_class {
            self.figure_class = figure_class;
        }
        if let Some(figcaption_class) = overrides.figcaption_class {
            self.figcaption_class = figcaption_class;
        }
        if let Some(caption) = overrides.first_comment_is_caption {
            self.first_comment_is_caption = caption;
        }
        if let Some(description) = overrides.generate_aria_description {
            self.generate_aria_description = description;
        }
        if let Some(plugins) = overrides.optimizer_plugins {
            self.optimizer_plugins = plugins;
        }
        self
    }

    /// Options for the accessibility injector.
    #[must_use]
    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions {
            use_first_comment_as_caption: self.first_comment_is_caption,
            generate_aria_description: self.generate_aria_description,
        }
    }
}
