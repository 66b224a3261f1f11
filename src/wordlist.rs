//! Reading word lists and writing result buckets.
//!
//! Both formats are one word per line, UTF-8. Outputs are joined with
//! `\n` and carry no trailing newline, so rewriting the same bucket
//! produces a byte-identical file.

use std::fs;
use std::io;
use std::path::Path;

/// Load a word list, one word per line.
///
/// Lines are trimmed; blank lines are skipped. Order is preserved.
pub fn load_words(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Write a bucket, one word per line.
pub fn write_words(path: &Path, words: &[String]) -> io::Result<()> {
    fs::write(path, words.join("\n"))
}
