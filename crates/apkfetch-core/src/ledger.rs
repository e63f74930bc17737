//! Append-only record of attempted packages.
//!
//! One header row, then one row per completed attempt. The ledger is read
//! once when opened so later lookups are in memory; every append goes
//! straight to disk.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use apkfetch_schema::{LEDGER_HEADER, LedgerRecord, PackageId, RecordError, join_fields};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger {path} line {line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    attempted: HashSet<PackageId>,
}

impl Ledger {
    /// Opens the ledger at `path`, creating it with a header row if absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let io_err = |source| LedgerError::Io {
            path: path.clone(),
            source,
        };

        let records = match read_records(&path).await {
            Ok(records) => records,
            Err(LedgerError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
                }
                let header = format!("{}\n", join_fields(&LEDGER_HEADER));
                tokio::fs::write(&path, header).await.map_err(io_err)?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let attempted = records.into_iter().map(|r| r.package).collect();
        Ok(Self { path, attempted })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, package: &PackageId) -> bool {
        self.attempted.contains(package)
    }

    pub fn len(&self) -> usize {
        self.attempted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted.is_empty()
    }

    /// Appends one record. Line breaks in the error text are flattened so a
    /// record is always exactly one line.
    pub async fn append(&mut self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let mut record = record.clone();
        if record.error.contains(['\n', '\r']) {
            record.error = record
                .error
                .split(['\n', '\r'])
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
        }

        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(format!("{}\n", record.to_line()).as_bytes())
            .await
            .map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        self.attempted.insert(record.package);
        Ok(())
    }

    /// Every record in the ledger at `path`, in file order.
    pub async fn read_all(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
        read_records(path).await
    }
}

async fn read_records(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            LedgerRecord::from_line(line).map_err(|source| LedgerError::Malformed {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })
        })
        .collect()
}
