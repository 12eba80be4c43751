//! Timepoints file reader
//!
//! One float per line, one line per cycle, in cycle order. A malformed line
//! fails the whole channel's ingestion; skipping a line would silently shift
//! every later cycle onto the wrong timepoint.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Read timepoints from any buffered reader.
///
/// Blank lines are ignored; anything else must parse as a float.
///
/// # Errors
///
/// Returns [`Error::InvalidTimepoint`] with the 1-based line number on the
/// first unparseable line, or [`Error::Io`] on read failure.
pub fn read_timepoints<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    let mut timepoints = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed
            .parse::<f64>()
            .map_err(|_| Error::InvalidTimepoint {
                line: idx + 1,
                content: trimmed.to_owned(),
            })?;
        timepoints.push(value);
    }
    Ok(timepoints)
}

/// Read timepoints from a file on disk.
///
/// # Errors
///
/// Same failure modes as [`read_timepoints`].
pub fn load_timepoints(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    read_timepoints(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_one_value_per_line() {
        let timepoints = read_timepoints(Cursor::new("0.0\n60.0\n120.5\n")).expect("read failed");
        assert_eq!(timepoints, vec![0.0, 60.0, 120.5]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let timepoints = read_timepoints(Cursor::new("0.0\n\n60.0\n")).expect("read failed");
        assert_eq!(timepoints, vec![0.0, 60.0]);
    }

    #[test]
    fn test_malformed_line_fails_whole_read() {
        let err = read_timepoints(Cursor::new("0.0\nsixty\n120.0\n")).unwrap_err();
        match err {
            Error::InvalidTimepoint { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "sixty");
            }
            other => panic!("expected InvalidTimepoint, got {other:?}"),
        }
    }
}
