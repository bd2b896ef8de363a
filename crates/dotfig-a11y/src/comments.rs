//! Starting comment extraction for DOT source.
//!
//! Lines before the first line that opens a graph (`graph`, `digraph` or
//! `strict` outside a `#` comment) are treated as human commentary. They are
//! used as the diagram's title and caption; the rest is the graph body.
//!
//! The scan is a keyword heuristic, not a DOT parser: a line such as
//! `// see the digraph below` also opens the body.

/// DOT source split into leading commentary and graph body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// Comment lines, trimmed, with one leading `#` removed, joined with `\n`.
    pub starting_comments: String,
    /// Source from the first structural line to the end, untouched.
    pub body: &'a str,
}

/// Split DOT source into starting comments and body.
///
/// # Examples
///
/// ```
/// use dotfig_a11y::extract_starting_comments;
///
/// let source = "# Connects A and B\ndigraph { A -> B; }";
/// let extraction = extract_starting_comments(source);
/// assert_eq!(extraction.starting_comments, "Connects A and B");
/// assert_eq!(extraction.body, "digraph { A -> B; }");
/// ```
#[must_use]
pub fn extract_starting_comments(source: &str) -> Extraction<'_> {
    let mut comment_lines = Vec::new();

    for (start, line) in lines_with_offsets(source) {
        if is_start_of_graph(line) {
            return Extraction {
                starting_comments: comment_lines.join("\n"),
                body: &source[start..],
            };
        }
        comment_lines.push(strip_comment_marker(line));
    }

    Extraction {
        starting_comments: comment_lines.join("\n"),
        body: "",
    }
}

/// Whether the line opens the graph definition.
///
/// Only text before the first `#` counts, so `# digraph` stays a comment.
fn is_start_of_graph(line: &str) -> bool {
    let code = line.find('#').map_or(line, |pos| &line[..pos]);
    // "digraph" contains "graph"
    code.contains("graph") || code.contains("strict")
}

fn strip_comment_marker(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).trim()
}

/// Iterate over lines with the byte offset at which each begins.
///
/// `\r\n`, `\n` and lone `\r` all end a line. A trailing line break yields a
/// final empty line.
fn lines_with_offsets(source: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = source.as_bytes();
    let mut start = 0;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }

        let mut pos = start;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\n' => {
                    let line = (start, &source[start..pos]);
                    start = pos + 1;
                    return Some(line);
                }
                b'\r' => {
                    let line = (start, &source[start..pos]);
                    start = if bytes.get(pos + 1) == Some(&b'\n') {
                        pos + 2
                    } else {
                        pos + 1
                    };
                    return Some(line);
                }
                _ => pos += 1,
            }
        }

        done = true;
        Some((start, &source[start..]))
    })
}
