//! Graphviz layout engines recognized as fenced code block languages.

use std::fmt;

/// Layout algorithm selected by a code fence tag such as ` ```neato `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEngine {
    Circo,
    Dot,
    Fdp,
    Neato,
    Osage,
    Patchwork,
    Twopi,
}

impl LayoutEngine {
    /// All recognized engines, in tag order.
    pub const ALL: [Self; 7] = [
        Self::Circo,
        Self::Dot,
        Self::Fdp,
        Self::Neato,
        Self::Osage,
        Self::Patchwork,
        Self::Twopi,
    ];

    /// Parse a code fence language tag.
    ///
    /// Surrounding whitespace and ASCII case are ignored. Returns `None` for
    /// any tag outside the fixed set.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "circo" => Some(Self::Circo),
            "dot" => Some(Self::Dot),
            "fdp" => Some(Self::Fdp),
            "neato" => Some(Self::Neato),
            "osage" => Some(Self::Osage),
            "patchwork" => Some(Self::Patchwork),
            "twopi" => Some(Self::Twopi),
            _ => None,
        }
    }

    /// Engine name as Graphviz expects it (`-K` flag value).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circo => "circo",
            Self::Dot => "dot",
            Self::Fdp => "fdp",
            Self::Neato => "neato",
            Self::Osage => "osage",
            Self::Patchwork => "patchwork",
            Self::Twopi => "twopi",
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Svg,
}

impl OutputFormat {
    /// Return format as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_engines() {
        let engines = [
            ("circo", LayoutEngine::Circo),
            ("dot", LayoutEngine::Dot),
            ("fdp", LayoutEngine::Fdp),
            ("neato", LayoutEngine::Neato),
            ("osage", LayoutEngine::Osage),
            ("patchwork", LayoutEngine::Patchwork),
            ("twopi", LayoutEngine::Twopi),
        ];

        for (name, expected) in engines {
            assert_eq!(LayoutEngine::parse(name), Some(expected), "Failed to parse: {name}");
            assert_eq!(expected.as_str(), name);
        }
    }

    #[test]
    fn test_parse_trims_and_folds_case() {
        assert_eq!(LayoutEngine::parse("  DOT "), Some(LayoutEngine::Dot));
        assert_eq!(LayoutEngine::parse("Neato"), Some(LayoutEngine::Neato));
        assert_eq!(LayoutEngine::parse("\tTwoPi\n"), Some(LayoutEngine::Twopi));
    }

    #[test]
    fn test_parse_unknown_tags() {
        assert_eq!(LayoutEngine::parse("graphviz"), None);
        assert_eq!(LayoutEngine::parse("sfdp"), None);
        assert_eq!(LayoutEngine::parse("rust"), None);
        assert_eq!(LayoutEngine::parse(""), None);
    }

    #[test]
    fn test_all_round_trips_through_parse() {
        for engine in LayoutEngine::ALL {
            assert_eq!(LayoutEngine::parse(&engine.to_string()), Some(engine));
        }
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::default(), OutputFormat::Svg);
        assert_eq!(OutputFormat::Svg.as_str(), "svg");
    }
}
