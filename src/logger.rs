//! Append-only value log for visualisation.
//!
//! When enabled, every value a provider returns is appended to a text file
//! that independent processes may tail:
//!
//! ```text
//! # local-normal
//! 1718035200123,0.512345
//! 1718035200124,0.397210
//! ```
//!
//! The file is opened once, each record is flushed as soon as it is written,
//! and nothing is ever rewritten, truncated or rotated. A disabled logger is
//! a no-op and creates no file.
//!
//! Readers must expect to observe a partially written last line; the
//! [`read_records`] helper skips anything that is not a complete record.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{error::Result, value::RandomValue};

/// Number of decimals written for every value, regardless of backend.
pub const VALUE_PRECISION: usize = 6;

/// A single line of the value log.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub timestamp_ms: u64,
    pub value: f64,
    /// Backend named by the most recent header line, if any.
    pub source: Option<String>,
}

/// Sink for emitted values.
#[derive(Debug, Default)]
pub struct ValueLogger {
    sink: Option<Sink>,
}

#[derive(Debug)]
struct Sink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ValueLogger {
    /// Creates a logger that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Opens `path` for appending and writes the header line for `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn open(path: impl AsRef<Path>, backend: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "# {backend}")?;
        writer.flush()?;

        debug!("logging {backend} values to {}", path.display());
        Ok(Self {
            sink: Some(Sink {
                path: path.to_owned(),
                writer,
            }),
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Path of the log file, when enabled.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    /// Appends one record and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written.
    pub fn append(&mut self, value: &RandomValue) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            writeln!(
                sink.writer,
                "{},{:.prec$}",
                value.timestamp_ms(),
                value.value(),
                prec = VALUE_PRECISION
            )?;
            sink.writer.flush()?;
        }

        Ok(())
    }

    /// Appends `value` and hands it back.
    ///
    /// Write failures are reported as warnings: the sampler still gets its
    /// value.
    pub fn record(&mut self, value: RandomValue) -> RandomValue {
        if let Err(e) = self.append(&value) {
            warn!("could not log {} value: {e}", value.source());
        }
        value
    }
}

/// Parses one complete log line.
///
/// Returns `None` for header, blank and malformed lines.
#[must_use]
pub fn parse_record(line: &str) -> Option<(u64, f64)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (timestamp, value) = line.split_once(',')?;
    let timestamp = timestamp.trim().parse().ok()?;
    let value: f64 = value.trim().parse().ok()?;
    value.is_finite().then_some((timestamp, value))
}

/// Reads every complete record from a value log.
///
/// A missing file yields no records rather than an error. A trailing line
/// without a newline is treated as still being written and skipped.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<LogRecord>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut source = None;
    let mut records = Vec::new();
    for line in contents.split_inclusive('\n') {
        if !line.ends_with('\n') {
            break;
        }

        if let Some(name) = line.trim().strip_prefix('#') {
            source = Some(name.trim().to_owned());
            continue;
        }

        if let Some((timestamp_ms, value)) = parse_record(line) {
            records.push(LogRecord {
                timestamp_ms,
                value,
                source: source.clone(),
            });
        } else {
            trace!("skipping malformed log line: {}", line.trim_end());
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logger_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = ValueLogger::disabled();
        logger
            .append(&RandomValue::with_timestamp(0.5, "local-uniform", 1))
            .unwrap();

        assert!(!logger.is_enabled());
        assert!(logger.path().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn writes_header_then_fixed_precision_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");

        let mut logger = ValueLogger::open(&path, "remote-http").unwrap();
        logger
            .append(&RandomValue::with_timestamp(0.73, "remote-http", 1000))
            .unwrap();
        logger
            .append(&RandomValue::with_timestamp(1.0, "remote-http", 1001))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "# remote-http\n1000,0.730000\n1001,1.000000\n");
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");

        let mut first = ValueLogger::open(&path, "a").unwrap();
        first
            .append(&RandomValue::with_timestamp(0.1, "a", 1))
            .unwrap();
        drop(first);
        let mut second = ValueLogger::open(&path, "b").unwrap();
        second
            .append(&RandomValue::with_timestamp(0.2, "b", 2))
            .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source.as_deref(), Some("a"));
        assert_eq!(records[1].source.as_deref(), Some("b"));
    }

    #[test]
    fn reader_skips_malformed_and_partial_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");
        fs::write(&path, "# serial-hardware\n10,0.5\ngarbage\n11,nan\n12,0.25\n13,0.1").unwrap();

        let records = read_records(&path).unwrap();
        let values: Vec<_> = records.iter().map(|r| (r.timestamp_ms, r.value)).collect();
        assert_eq!(values, vec![(10, 0.5), (12, 0.25)]);
    }

    #[test]
    fn reader_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_records(dir.path().join("absent.txt")).unwrap().is_empty());
    }

    #[test]
    fn parse_record_rejects_headers() {
        assert_eq!(parse_record("# local-uniform"), None);
        assert_eq!(parse_record("5,0.125000"), Some((5, 0.125)));
        assert_eq!(parse_record("5;0.1"), None);
    }
}
