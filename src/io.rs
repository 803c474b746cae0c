//! Loading records from text files and presenting results.
//!
//! These sit outside the engine: the loader must hand over every record
//! before a run starts, and presentation owns all sorting and formatting of
//! the unordered result mapping.

use crate::kv::ResultMapping;
use anyhow::{Context, Result};
use std::fmt::{Display, Write as _};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read all non-blank lines of a text file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid UTF-8.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    read_lines_from(file).with_context(|| format!("error reading {}", path.display()))
}

/// Like [`read_lines`] for any reader.
pub fn read_lines_from<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if !line.is_empty() {
            out.push(line);
        }
    }
    Ok(out)
}

/// Entries sorted by key, borrowing from the mapping.
pub fn sorted_entries<K, O>(mapping: &ResultMapping<K, O>) -> Vec<(&K, &O)>
where
    K: Ord + Eq + Hash,
{
    let mut entries: Vec<_> = mapping.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Render a word-frequency report: one `key: value` line per key in key
/// order, then the number of distinct keys.
pub fn render_frequencies<K, O>(mapping: &ResultMapping<K, O>) -> String
where
    K: Ord + Eq + Hash + Display,
    O: Display,
{
    let mut out = String::from("Word frequencies:\n");
    for (k, v) in sorted_entries(mapping) {
        let _ = writeln!(out, "{k}: {v}");
    }
    let _ = write!(out, "\nTotal unique words: {}\n", mapping.len());
    out
}
