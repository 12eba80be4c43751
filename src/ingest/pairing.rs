//! Dump / timepoints file pairing
//!
//! The upload layer hands over a directory's worth of files. Naming
//! convention: an instrument dump `<channel>-<rest>.<ext>` is accompanied by
//! `<channel>-<rest>_timePoints.txt`, and the channel label is the part of
//! the dump's stem before the first `-`. A dump without its timepoints file
//! fails pairing; ingestion of a half pair is never attempted.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix that marks a timepoints file.
const TIMEPOINTS_SUFFIX: &str = "_timePoints";

/// One ingestible file pair with its derived labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Experiment label (from the upload's archive name)
    pub experiment_name: String,
    /// Channel label (dump stem up to the first `-`)
    pub channel_name: String,
    /// Path of the instrument dump
    pub dump: PathBuf,
    /// Path of the matching timepoints file
    pub timepoints: PathBuf,
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

fn is_timepoints_file(path: &Path) -> bool {
    file_stem(path).ends_with(TIMEPOINTS_SUFFIX)
}

/// Derive the channel label from a dump file name.
#[must_use]
pub fn channel_name_of(dump: &Path) -> String {
    let stem = file_stem(dump);
    stem.split('-').next().unwrap_or(stem).to_owned()
}

/// Pair every dump in `paths` with its timepoints file.
///
/// # Errors
///
/// Returns [`Error::MissingTimepointFile`] for the first dump that has no
/// `<stem>_timePoints.txt` companion in `paths`.
pub fn pair_files(experiment_name: &str, paths: &[PathBuf]) -> Result<Vec<FilePair>> {
    let mut pairs = Vec::new();
    for dump in paths.iter().filter(|p| !is_timepoints_file(p)) {
        let expected = dump.with_file_name(format!("{}{TIMEPOINTS_SUFFIX}.txt", file_stem(dump)));
        let timepoints = paths
            .iter()
            .find(|p| **p == expected)
            .ok_or_else(|| Error::MissingTimepointFile {
                dump: dump.display().to_string(),
                expected: expected.display().to_string(),
            })?;
        pairs.push(FilePair {
            experiment_name: experiment_name.to_owned(),
            channel_name: channel_name_of(dump),
            dump: dump.clone(),
            timepoints: timepoints.clone(),
        });
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_channel_name_from_stem() {
        assert_eq!(channel_name_of(Path::new("A3-run7.json")), "A3");
        assert_eq!(channel_name_of(Path::new("plain.json")), "plain");
    }

    #[test]
    fn test_pairs_dump_with_timepoints() {
        let pairs = pair_files(
            "exp24",
            &paths(&["A3-run7.json", "A3-run7_timePoints.txt"]),
        )
        .expect("pairing failed");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].experiment_name, "exp24");
        assert_eq!(pairs[0].channel_name, "A3");
        assert_eq!(pairs[0].timepoints, PathBuf::from("A3-run7_timePoints.txt"));
    }

    #[test]
    fn test_missing_timepoints_file_fails() {
        let err = pair_files("exp24", &paths(&["A3-run7.json"])).unwrap_err();
        assert!(matches!(err, Error::MissingTimepointFile { .. }));
    }

    #[test]
    fn test_multiple_pairs() {
        let pairs = pair_files(
            "exp24",
            &paths(&[
                "A3-run7.json",
                "A3-run7_timePoints.txt",
                "B1-run7.json",
                "B1-run7_timePoints.txt",
            ]),
        )
        .expect("pairing failed");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].channel_name, "B1");
    }
}
