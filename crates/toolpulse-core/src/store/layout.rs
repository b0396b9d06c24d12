//! On-disk naming of partition, lock and temp files
//!
//! `<data_dir>/<prefix><YYYY-MM-DD><extension>` holds one day of events.
//! The lock and temp files sit next to it with `.lock` / `.tmp` appended.

use chrono::NaiveDate;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::AnalyticsConfig;
use crate::error::StoreError;

/// Appended to a partition path to form its lock file
pub const LOCK_SUFFIX: &str = ".lock";

/// Appended to a partition path to form its in-flight temp file
pub const TEMP_SUFFIX: &str = ".tmp";

/// Appended to a partition path when an unreadable file is set aside
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// A partition file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionFile {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Result of scanning the data directory
#[derive(Debug, Default)]
pub struct DirectoryScan {
    /// Partitions sorted by date ascending
    pub partitions: Vec<PartitionFile>,
    /// Leftover temp files from interrupted writes
    pub temp_files: Vec<PathBuf>,
    /// Unreadable partitions set aside by writers, sorted by date ascending
    pub corrupt_files: Vec<PartitionFile>,
}

/// Maps dates to file paths and back
#[derive(Debug, Clone)]
pub struct PartitionLayout {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl PartitionLayout {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            dir: config.data_dir.clone(),
            prefix: config.file_prefix.clone(),
            extension: config.file_extension.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, date: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.prefix, date, self.extension))
    }

    pub fn lock_path(&self, partition: &Path) -> PathBuf {
        with_suffix(partition, LOCK_SUFFIX)
    }

    pub fn temp_path(&self, partition: &Path) -> PathBuf {
        with_suffix(partition, TEMP_SUFFIX)
    }

    pub fn corrupt_path(&self, partition: &Path) -> PathBuf {
        with_suffix(partition, CORRUPT_SUFFIX)
    }

    /// Date encoded in a partition file name, `None` for anything else
    pub fn date_from_file_name(&self, name: &str) -> Option<NaiveDate> {
        let date = name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.extension.as_str())?;
        if date.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    /// Date of a set-aside `<partition>.corrupt` file
    pub fn date_from_corrupt_name(&self, name: &str) -> Option<NaiveDate> {
        self.date_from_file_name(name.strip_suffix(CORRUPT_SUFFIX)?)
    }

    fn is_temp_file(&self, name: &str) -> bool {
        name.strip_suffix(TEMP_SUFFIX)
            .map(|partition| self.date_from_file_name(partition).is_some())
            .unwrap_or(false)
    }

    /// List partition and temp files. A missing directory is an empty scan.
    pub async fn scan(&self) -> Result<DirectoryScan, StoreError> {
        let mut scan = DirectoryScan::default();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(scan),
            Err(source) => {
                return Err(StoreError::DirectoryRead {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(StoreError::DirectoryRead {
                        path: self.dir.clone(),
                        source,
                    })
                }
            };

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if let Some(date) = self.date_from_file_name(name) {
                scan.partitions.push(partition_file(&entry, date).await);
            } else if let Some(date) = self.date_from_corrupt_name(name) {
                scan.corrupt_files.push(partition_file(&entry, date).await);
            } else if self.is_temp_file(name) {
                scan.temp_files.push(entry.path());
            }
        }

        scan.partitions.sort_by_key(|p| p.date);
        scan.corrupt_files.sort_by_key(|p| p.date);
        Ok(scan)
    }
}

async fn partition_file(entry: &tokio::fs::DirEntry, date: NaiveDate) -> PartitionFile {
    // Size is informational; a file vanishing mid-scan reports 0
    let size_bytes = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
    PartitionFile {
        date,
        path: entry.path(),
        size_bytes,
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
