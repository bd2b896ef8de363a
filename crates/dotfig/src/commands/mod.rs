//! CLI command implementations.

pub(crate) mod annotate;
pub(crate) mod engines;
pub(crate) mod render;

pub(crate) use annotate::AnnotateArgs;
pub(crate) use engines::EnginesArgs;
pub(crate) use render::RenderArgs;

use std::io::{Read, Write};
use std::path::Path;

/// Read a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Write to a file, or stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, content),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()
        }
    }
}
