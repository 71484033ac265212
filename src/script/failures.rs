//! The CSV log of samples that failed pre-submission checks.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};
use tracing::{info, warn};

use crate::sample::name::SampleRejection;

/// The header line of the failures log.
pub const FAILURES_HEADER: &str = "sample_name,failure_reason";

/// A failures log being written. Each rejected sample gets exactly one row.
pub struct FailuresLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl FailuresLog {
    /// Creates the log at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path)?;
        writeln!(file, "{}", FAILURES_HEADER)?;

        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        info!("Initialized failures log: {}", path.display());
        Ok(FailuresLog {
            path,
            writer,
            rows: 0,
        })
    }

    /// Records a rejected sample.
    pub fn record(&mut self, rejection: &SampleRejection) -> io::Result<()> {
        warn!("{}", rejection);
        self.writer
            .write_record([rejection.sample.as_str(), rejection.reason().as_str()])?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes the log. A log without rows is removed and `None` is returned.
    pub fn finish(mut self) -> io::Result<Option<PathBuf>> {
        self.writer.flush()?;
        drop(self.writer);

        if self.rows == 0 {
            fs::remove_file(&self.path)?;
            return Ok(None);
        }

        Ok(Some(self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::name::extract_run_info;

    #[test]
    fn test_failures_log_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");

        let mut log = FailuresLog::create(&path).unwrap();
        log.record(&extract_run_info("garbage_no_markers").unwrap_err())
            .unwrap();
        log.record(&extract_run_info("NGS001_Pan4009").unwrap_err())
            .unwrap();
        assert_eq!(log.finish().unwrap(), Some(path.clone()));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FAILURES_HEADER);
        assert!(lines[1].starts_with("\"garbage_no_markers\",\"Could not extract R number"));
        assert!(lines[1].contains("; "));
        assert!(lines[2].starts_with("\"NGS001_Pan4009\","));
    }

    #[test]
    fn test_empty_failures_log_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");

        let log = FailuresLog::create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(log.finish().unwrap(), None);
        assert!(!path.exists());
    }
}
