use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

pub fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Cannot open {}", path.display()))
}

/// The named file, or stdin when no path was given.
pub fn open_or_stdin(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(open(path)?),
        None => Box::new(std::io::stdin().lock()),
    })
}
