//! Durable append-only file sink.
//!
//! Flushed text is appended to
//! `{storage_root}/{cache_directory}/{YYYY-MM-DD}/{cache_file_name}.txt`.
//! The date segment is computed at write time, so a new day simply lands in
//! a new directory; old directories are never touched. Each flush is one
//! open/append/close cycle with no kept-open handle.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;

/// Date format for the per-day directory segment.
const DATE_DIR_FORMAT: &str = "%Y-%m-%d";

/// Append-only persistence target for flushed log text.
#[derive(Debug)]
pub(crate) struct FileStore {
    root: PathBuf,
    directory: String,
    file_name: String,
}

impl FileStore {
    pub(crate) fn new(
        root: impl Into<PathBuf>,
        directory: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Path the next write would land in, under today's date directory.
    pub(crate) fn current_path(&self) -> PathBuf {
        self.root
            .join(&self.directory)
            .join(Local::now().format(DATE_DIR_FORMAT).to_string())
            .join(format!("{}.txt", self.file_name))
    }

    /// Append UTF-8 text to today's log file, creating the directory chain
    /// and file if absent.
    pub(crate) fn append(&self, text: &str) -> io::Result<()> {
        let path = self.current_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}
