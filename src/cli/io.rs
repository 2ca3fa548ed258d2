//! JSON I/O for the CLI
//!
//! - Input: JSON-lines seed files, blank lines skipped
//! - Output: one JSON value per line on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Parse every non-blank line of a JSON-lines file
pub fn read_json_lines<T: DeserializeOwned>(path: &Path) -> CliResult<Vec<T>> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_json_lines(&content)
}

pub fn parse_json_lines<T: DeserializeOwned>(content: &str) -> CliResult<Vec<T>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| serde_json::from_str(line).map_err(|e| CliError::seed_error(i + 1, e)))
        .collect()
}

/// Write one JSON value per line to `out`
pub fn write_json_lines<T: Serialize>(out: &mut impl Write, items: &[T]) -> CliResult<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write a single JSON value to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_json_lines(&mut stdout, std::slice::from_ref(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let values: Vec<u32> = parse_json_lines("1\n\n  \n2\n").unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_json_lines::<u32>("1\n\nnope\n").unwrap_err();
        assert!(err.message().starts_with("line 3:"));
    }

    #[test]
    fn test_write_json_lines() {
        let mut out = Vec::new();
        write_json_lines(&mut out, &[1, 2]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n");
    }
}
