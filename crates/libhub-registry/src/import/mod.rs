//! Batch registration from delimited text files.
//!
//! Each row holds three comma-separated fields: library name, version and
//! registrant. Fields are trimmed. Rows that cannot be registered are
//! skipped with a diagnostic and the load carries on.

use camino::Utf8Path;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use thiserror::Error;
use tracing::{info, warn};

use crate::{Hub, RegistryError};

/// Errors that abort an import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Could not open file: {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read row {line}")]
    Read {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Why a row was skipped
#[derive(Debug)]
pub enum SkipReason {
    /// The row did not have exactly three fields
    FieldCount(usize),
    /// The row could not be decoded (for example invalid UTF-8)
    Malformed(String),
    /// The hub refused the registration
    Rejected(RegistryError),
}

/// A row the import did not register
#[derive(Debug)]
pub struct SkippedRow {
    /// 1-based line number in the input
    pub line: u64,
    pub reason: SkipReason,
}

/// Outcome of an import
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Number of libraries registered
    pub registered: usize,
    /// Rows that were skipped, in input order
    pub skipped: Vec<SkippedRow>,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FieldCount(count) => write!(f, "expected 3 fields, found {}", count),
            SkipReason::Malformed(message) => write!(f, "malformed row: {}", message),
            SkipReason::Rejected(err) => f.write_str(&err.report()),
        }
    }
}

impl ImportReport {
    /// Check if every row was registered
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Register every row of `reader` into `hub`
///
/// Rows are one per line. A blank line counts as a row with no fields.
pub fn import_reader<R: Read>(hub: &mut Hub, reader: R) -> Result<ImportReport, ImportError> {
    let parser = {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All);
        builder
    };

    let mut input = BufReader::new(reader);
    let mut report = ImportReport::default();
    let mut buf = Vec::new();
    let mut line = 0;

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .map_err(|source| ImportError::Read {
                line: line + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        line += 1;

        let mut record = csv::StringRecord::new();
        if let Err(err) = parser.from_reader(buf.as_slice()).read_record(&mut record) {
            warn!(line, error = %err, "Skipping malformed row");
            report.skipped.push(SkippedRow {
                line,
                reason: SkipReason::Malformed(err.to_string()),
            });
            continue;
        }

        if record.len() != 3 {
            warn!(line, fields = record.len(), "Skipping row");
            report.skipped.push(SkippedRow {
                line,
                reason: SkipReason::FieldCount(record.len()),
            });
            continue;
        }

        match hub.register(&record[0], &record[1], &record[2]) {
            Ok(_) => report.registered += 1,
            Err(err) => {
                warn!(
                    line,
                    error = %err.report(),
                    "Was not able to register {} {} {}",
                    &record[0],
                    &record[1],
                    &record[2]
                );
                report.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Rejected(err),
                });
            },
        }
    }

    Ok(report)
}

/// Register every row of the file at `path` into `hub`
pub fn import_file(hub: &mut Hub, path: &Utf8Path) -> Result<ImportReport, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_string(),
        source,
    })?;

    let report = import_reader(hub, file)?;
    info!(
        %path,
        registered = report.registered,
        skipped = report.skipped.len(),
        "Imported libraries"
    );
    Ok(report)
}

/// Build a new hub from the file at `path`
pub fn hub_from_file(path: &Utf8Path) -> Result<(Hub, ImportReport), ImportError> {
    let mut hub = Hub::new();
    let report = import_file(&mut hub, path)?;
    Ok((hub, report))
}
