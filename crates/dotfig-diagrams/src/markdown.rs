//! Markdown host for the diagram pipeline.
//!
//! Finds graph code blocks with pulldown-cmark and splices replacement markup
//! back into the original source. Text outside replaced blocks is copied
//! byte for byte.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::layout::LayoutEngine;
use crate::pipeline::{DiagramPipeline, GraphBlock, Replacement};

/// A markdown source document.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownDocument<'a> {
    source: &'a str,
}

/// Markdown after the diagram pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMarkdown {
    /// Document with successful blocks replaced by HTML.
    pub markdown: String,
    /// Number of blocks replaced.
    pub rendered: usize,
    /// Indices of blocks left unreplaced because their chain failed.
    pub failed: Vec<usize>,
}

impl<'a> MarkdownDocument<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Find fenced code blocks whose language tag is a layout engine.
    #[must_use]
    pub fn discover(&self) -> Vec<GraphBlock> {
        let parser = Parser::new_ext(self.source, parser_options());
        let mut blocks = Vec::new();
        let mut current: Option<(LayoutEngine, Range<usize>, String)> = None;

        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let language = info.split_whitespace().next().unwrap_or("");
                    current = LayoutEngine::parse(language).map(|layout| (layout, range, String::new()));
                }
                Event::Text(text) => {
                    if let Some((_, _, source)) = current.as_mut() {
                        source.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((layout, location, mut source)) = current.take() {
                        if source.ends_with('\n') {
                            source.pop();
                        }
                        blocks.push(GraphBlock {
                            index: blocks.len(),
                            source,
                            layout,
                            location,
                        });
                    }
                }
                _ => {}
            }
        }

        blocks
    }

    /// Splice replacements into the source in a single pass.
    ///
    /// Replacements are applied in location order; one overlapping an earlier
    /// replacement is skipped. Each replacement must stay a single HTML block
    /// inside whatever container holds the fence:
    /// - continuation lines repeat the fence line's blockquote markers and
    ///   list indentation
    /// - a blank line would end the block, so it becomes a `&#10;` reference
    ///   at the end of the previous line
    #[must_use]
    pub fn apply(&self, replacements: &[Replacement]) -> String {
        let mut ordered: Vec<&Replacement> = replacements.iter().collect();
        ordered.sort_by_key(|r| r.location.start);

        let mut result = String::with_capacity(self.source.len());
        let mut cursor = 0;

        for replacement in ordered {
            let Range { start, end } = replacement.location;
            if start < cursor || end > self.source.len() {
                tracing::warn!(index = replacement.index, "Skipping overlapping replacement");
                continue;
            }

            let continuation = self.continuation_prefix(start);
            result.push_str(&self.source[cursor..start]);
            result.push_str(&html_block(&replacement.markup, &continuation));
            if self.source[start..end].ends_with('\n') {
                result.push('\n');
            }
            cursor = end;
        }

        result.push_str(&self.source[cursor..]);
        result
    }

    /// Prefix for lines after the first one of a block starting at `offset`.
    ///
    /// Text between the line start and the fence is container syntax. Quote
    /// markers and whitespace are kept; list markers become spaces of the same
    /// width.
    fn continuation_prefix(&self, offset: usize) -> String {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        self.source[line_start..offset]
            .chars()
            .map(|c| if c == '>' || c.is_whitespace() { c } else { ' ' })
            .collect()
    }
}

/// Discover, run and apply the pipeline over a markdown document.
#[must_use]
pub fn process_markdown(markdown: &str, pipeline: &DiagramPipeline) -> ProcessedMarkdown {
    let document = MarkdownDocument::new(markdown);
    let blocks = document.discover();
    tracing::debug!(count = blocks.len(), "Discovered graph blocks");

    let outcome = pipeline.run(&blocks);

    ProcessedMarkdown {
        markdown: document.apply(&outcome.replacements),
        rendered: outcome.replacements.len(),
        failed: outcome.failed,
    }
}

/// Render markdown (typically after [`process_markdown`]) to HTML.
#[must_use]
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Join markup lines with `continuation` so they read as one HTML block.
fn html_block(markup: &str, continuation: &str) -> String {
    let mut block = String::with_capacity(markup.len());
    for line in markup.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                block.push_str("&#10;");
            }
            continue;
        }
        if !block.is_empty() {
            block.push('\n');
            block.push_str(continuation);
        }
        block.push_str(line);
    }
    block
}
