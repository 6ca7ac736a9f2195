//! File-backed page store
//!
//! Pages map to consecutive `page_size` ranges of a single file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::CommitSync;
use crate::error::Result;

use super::PageStore;

/// Persistent page store over one file
///
/// ## Concurrency:
/// - Reads take `&self`, so the file handle sits behind a Mutex
///   (seeking mutates the shared cursor)
/// - Writes take `&mut self` and bypass the Mutex via `get_mut`
pub struct FileStore {
    /// Location of the backing file
    path: PathBuf,
    /// Backing file handle
    file: Mutex<File>,
    /// Size of every page in bytes
    page_size: usize,
    /// Allocated pages (file length / page size)
    page_count: u64,
}

impl FileStore {
    /// Open or create the file at `path`
    ///
    /// A trailing partial page is zero-padded to a full page.
    pub fn open(path: &Path, page_size: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        let page_count = len.div_ceil(page_size as u64);
        if page_count * page_size as u64 != len {
            file.set_len(page_count * page_size as u64)?;
        }

        tracing::debug!(
            "Opened page file {} ({} pages of {} bytes)",
            path.display(),
            page_count,
            page_size
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            page_size,
            page_count,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn position(&self, page: u64, in_page: usize) -> u64 {
        page * self.page_size as u64 + in_page as u64
    }
}

impl PageStore for FileStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_count(&self) -> u64 {
        self.page_count
    }

    fn read_at(&self, page: u64, in_page: usize, buf: &mut [u8]) -> Result<()> {
        let pos = self.position(page, in_page);
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, page: u64, in_page: usize, data: &[u8]) -> Result<()> {
        let pos = self.position(page, in_page);
        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(pos))?;
        file.write_all(data)?;
        Ok(())
    }

    fn append_page(&mut self) -> Result<()> {
        let new_len = (self.page_count + 1) * self.page_size as u64;
        // set_len zero-fills the extension
        self.file.get_mut().set_len(new_len)?;
        self.page_count += 1;
        Ok(())
    }

    fn flush(&mut self, sync: CommitSync) -> Result<()> {
        let file = self.file.get_mut();
        file.flush()?;
        if sync == CommitSync::Fsync {
            file.sync_all()?;
        }
        Ok(())
    }
}
