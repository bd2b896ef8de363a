//! Escaping for text embedded in HTML.
//!
//! Two disciplines are needed: element content (`<title>`, `<desc>`) and
//! attribute values (`aria-label`). They differ in the apostrophe entity and
//! in how line breaks are treated.

/// Escape text for use as HTML element content.
///
/// Each character is replaced at most once, so entities produced here are
/// never re-escaped.
///
/// # Examples
///
/// ```
/// use dotfig_a11y::escape_html_text;
///
/// assert_eq!(escape_html_text("A -> B"), "A -&gt; B");
/// assert_eq!(escape_html_text("it's"), "it&#039;s");
/// ```
#[must_use]
pub fn escape_html_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape text for use inside a double- or single-quoted attribute value.
///
/// With `preserve_line_breaks`, every line break (`\r\n`, `\r` or `\n`) becomes
/// `&#13;` so multi-line labels survive attribute value normalization.
/// Otherwise each line break collapses to a single `\n`.
///
/// # Examples
///
/// ```
/// use dotfig_a11y::escape_html_attribute;
///
/// assert_eq!(escape_html_attribute("a\r\nb", true), "a&#13;b");
/// assert_eq!(escape_html_attribute("a\r\nb", false), "a\nb");
/// assert_eq!(escape_html_attribute("'x'", true), "&apos;x&apos;");
/// ```
#[must_use]
pub fn escape_html_attribute(s: &str, preserve_line_breaks: bool) -> String {
    let newline = if preserve_line_breaks { "&#13;" } else { "\n" };

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\r' => {
                // CRLF is one line break
                chars.next_if_eq(&'\n');
                result.push_str(newline);
            }
            '\n' => result.push_str(newline),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_text() {
        assert_eq!(escape_html_text("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html_text("a & b"), "a &amp; b");
        assert_eq!(escape_html_text(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html_text("it's"), "it&#039;s");
    }

    #[test]
    fn test_escape_html_text_does_not_double_escape() {
        assert_eq!(escape_html_text("&lt;"), "&amp;lt;");
        assert_eq!(escape_html_text("<&>"), "&lt;&amp;&gt;");
    }

    #[test]
    fn test_escape_html_text_keeps_line_breaks() {
        assert_eq!(escape_html_text("a\nb\r\nc"), "a\nb\r\nc");
    }

    #[test]
    fn test_escape_html_text_empty() {
        assert_eq!(escape_html_text(""), "");
    }

    #[test]
    fn test_escape_html_attribute_special_characters() {
        assert_eq!(
            escape_html_attribute(r#"<a href="x">Tom & Jerry's</a>"#, true),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_attribute_plain_text_unchanged() {
        let inputs = [
            "",
            "plain",
            "A simple digraph that connects two nodes",
            "unicode: ÄÖÜ → ✓",
            "tabs\tand spaces",
        ];
        for input in inputs {
            assert_eq!(escape_html_attribute(input, true), input);
            assert_eq!(escape_html_attribute(input, false), input);
        }
    }

    #[test]
    fn test_escape_html_attribute_preserves_line_breaks() {
        let escaped = escape_html_attribute("First comment\nSecond comment", true);
        assert_eq!(escaped, "First comment&#13;Second comment");
        assert_eq!(escaped.matches("&#13;").count(), 1);
        assert!(!escaped.contains('\n'));
    }

    #[test]
    fn test_escape_html_attribute_crlf_is_one_break() {
        assert_eq!(escape_html_attribute("a\r\nb", true), "a&#13;b");
        assert_eq!(escape_html_attribute("a\r\n\r\nb", true), "a&#13;&#13;b");
        assert_eq!(escape_html_attribute("a\n\rb", true), "a&#13;&#13;b");
    }

    #[test]
    fn test_escape_html_attribute_lone_cr() {
        assert_eq!(escape_html_attribute("a\rb", true), "a&#13;b");
        assert_eq!(escape_html_attribute("a\rb", false), "a\nb");
    }

    #[test]
    fn test_escape_html_attribute_collapses_line_breaks() {
        assert_eq!(escape_html_attribute("a\r\nb\nc\rd", false), "a\nb\nc\nd");
    }

    #[test]
    fn test_escape_html_attribute_trailing_cr() {
        assert_eq!(escape_html_attribute("a\r", true), "a&#13;");
    }
}
