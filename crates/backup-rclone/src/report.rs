//! Combined report summarizing.
//!
//! rclone's `--combined` report writes one line per file, prefixed with a
//! symbol describing the outcome; `=` marks files that were already equal.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{Error, Result};

/// Prefix marking a "files already equal" line in a combined report.
const EQUAL_PREFIX: char = '=';

/// Lazy iterator over the meaningful lines of a combined report.
///
/// Every line that does not start with the literal `=` indicates a
/// difference and is yielded verbatim, in file order. The prefix check is
/// on the raw line: no trimming, no case folding.
#[derive(Debug)]
pub struct ReportSummary {
    lines: Lines<BufReader<File>>,
}

impl ReportSummary {
    /// Open a combined report for summarizing.
    ///
    /// A missing report means the sync step did not produce its expected
    /// output, so open failures surface to the caller.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::ReportOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl Iterator for ReportSummary {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            match line {
                Ok(line) if line.starts_with(EQUAL_PREFIX) => continue,
                other => return Some(other),
            }
        }
        None
    }
}
