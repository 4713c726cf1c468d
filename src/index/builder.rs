//! Index Builder
//!
//! Scans a source file once, sequentially, and writes its offset pages.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LineError, Result};

use super::{IndexPage, IndexStore};

/// Outcome of a completed build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Total number of lines scanned
    pub num_lines: u64,

    /// Number of page artifacts written
    pub num_pages: u64,
}

/// Writes offset pages for a source file into an `IndexStore`
pub struct IndexBuilder<'a> {
    store: &'a IndexStore,
    lines_per_page: usize,
    /// Offsets of the page being accumulated
    pending: Vec<u64>,
    next_page: u64,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(store: &'a IndexStore, lines_per_page: usize) -> Result<Self> {
        if lines_per_page == 0 {
            return Err(LineError::Config("lines_per_page must be positive".to_string()));
        }

        Ok(Self {
            store,
            lines_per_page,
            pending: Vec::with_capacity(lines_per_page),
            next_page: 0,
        })
    }

    /// Delete stale pages, then scan `source` and write fresh ones
    ///
    /// The offset recorded for each line is the read position right before
    /// that line is read. A final line without a terminator still counts.
    pub fn build(mut self, source: &Path) -> Result<BuildSummary> {
        let removed = self.store.delete_pages()?;
        if removed > 0 {
            tracing::debug!("Removed {} stale index pages", removed);
        }

        let mut reader = BufReader::new(File::open(source)?);
        let mut line = Vec::new();
        let mut position: u64 = 0;
        let mut num_lines: u64 = 0;

        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                break;
            }

            self.pending.push(position);
            position += read as u64;
            num_lines += 1;

            if self.pending.len() == self.lines_per_page {
                self.flush_page()?;
            }
        }

        if !self.pending.is_empty() {
            self.flush_page()?;
        }

        Ok(BuildSummary {
            num_lines,
            num_pages: self.next_page,
        })
    }

    /// Write the accumulated offsets as the next page and clear the buffer
    fn flush_page(&mut self) -> Result<()> {
        let offsets = std::mem::replace(&mut self.pending, Vec::with_capacity(self.lines_per_page));
        let page = IndexPage::new(self.next_page, offsets);
        self.store.write_page(&page)?;
        self.next_page += 1;
        Ok(())
    }
}
