//! Streaming access to local archive files
//!
//! [`RecordSource`] and [`ArchiveOpener`] keep the pipeline independent of
//! the on-disk format; [`WarcGzOpener`] is the concrete implementation for
//! WARC files, gzipped or plain.

use crate::{Result, WarcflowError};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use warc::{BufferedBody, Record, RecordIter, WarcHeader, WarcReader};

/// One record pulled off an archive, reduced to the fields the pipeline
/// looks at
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// WARC-Type header ("response", "request", "metadata", ...)
    pub record_type: String,

    /// WARC-Target-URI header, when present
    pub target_uri: Option<String>,

    /// WARC-Date header, when present and well-formed
    pub date: Option<DateTime<Utc>>,

    pub body: Vec<u8>,
}

/// Pull-based stream of records from one archive
pub trait RecordSource {
    /// Returns the next record, `Some(Err(_))` for a malformed record, or
    /// `None` at end of archive.
    fn next_record(&mut self) -> Option<Result<RawRecord>>;
}

/// Opens a local archive file as a [`RecordSource`]
pub trait ArchiveOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn RecordSource>>;
}

/// Opener for WARC archives; a `.gz` extension selects gzip decompression
#[derive(Debug, Default)]
pub struct WarcGzOpener;

impl WarcGzOpener {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveOpener for WarcGzOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn RecordSource>> {
        let file = File::open(path).map_err(|e| WarcflowError::ArchiveRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let raw: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        Ok(Box::new(WarcRecordSource {
            records: WarcReader::new(BufReader::new(raw)).iter_records(),
            path: path.to_path_buf(),
        }))
    }
}

struct WarcRecordSource {
    records: RecordIter<BufReader<Box<dyn Read>>>,
    path: PathBuf,
}

impl RecordSource for WarcRecordSource {
    fn next_record(&mut self) -> Option<Result<RawRecord>> {
        match self.records.next()? {
            Ok(record) => Some(Ok(convert(&record))),
            Err(e) => Some(Err(WarcflowError::ArchiveRead {
                path: self.path.clone(),
                message: e.to_string(),
            })),
        }
    }
}

fn convert(record: &Record<BufferedBody>) -> RawRecord {
    let record_type = record
        .header(WarcHeader::WarcType)
        .map(|v| v.to_string())
        .unwrap_or_default();
    let target_uri = record.header(WarcHeader::TargetURI).map(|v| v.to_string());
    let date = record
        .header(WarcHeader::Date)
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|d| d.with_timezone(&Utc));

    RawRecord {
        record_type,
        target_uri,
        date,
        body: record.body().to_vec(),
    }
}
