//! Command-set file loading.

use std::fs;
use std::io;
use std::path::Path;

/// Read the command list: one command per line, empty lines dropped,
/// nothing else filtered.
pub fn load(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse(&content))
}

fn parse(content: &str) -> Vec<String> {
    content
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
