//! Engine Module
//!
//! The line index engine that binds one source file to its paged index.
//!
//! ## Responsibilities
//! - Build (and rebuild) the offset index
//! - Validate 1-based line numbers
//! - Page lookups through the bounded page cache
//! - Read the line text back from the source file

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::cache::PageCache;
use crate::error::{LineError, Result};
use crate::index::{BuildSummary, IndexBuilder, IndexPage, IndexStore};

/// Result of a line lookup that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The line text, without its terminator
    Found(String),

    /// Line number outside `[1, num_lines]`
    NotFound,
}

/// Index state guarded by the build gate
#[derive(Debug, Default)]
struct IndexState {
    num_lines: u64,
    indexing_completed: bool,
}

/// One source text file and its paged offset index
///
/// ## Concurrency Model
///
/// - **Lookups** hold a read guard on `state` for their whole duration, so
///   any number of workers look up lines in parallel.
/// - **Builds** hold the write guard, so a build never overlaps a lookup.
/// - The page cache has its own lock; concurrent misses on the same page
///   may both load it, the second insert replaces the first.
///
/// A lookup before the first build triggers that build itself (once, under
/// the write guard). Servers are expected to call `build_index` first.
pub struct LineFile {
    /// Source file as given by the caller
    source_path: PathBuf,

    /// Where the pages live
    store: IndexStore,

    /// Lines per page (`P`)
    lines_per_page: usize,

    /// Build gate
    state: RwLock<IndexState>,

    /// Resident pages
    cache: PageCache,
}

impl LineFile {
    /// Bind to a source file with a given page size and single-page cache
    pub fn new(source_path: impl Into<PathBuf>, lines_per_page: usize) -> Result<Self> {
        Self::with_cache(source_path, lines_per_page, 1)
    }

    /// Bind to a source file keeping up to `cached_pages` pages resident
    pub fn with_cache(
        source_path: impl Into<PathBuf>,
        lines_per_page: usize,
        cached_pages: usize,
    ) -> Result<Self> {
        if lines_per_page == 0 {
            return Err(LineError::Config("lines_per_page must be positive".to_string()));
        }
        if cached_pages == 0 {
            return Err(LineError::Config("cached_pages must be positive".to_string()));
        }

        let source_path = source_path.into();
        let store = IndexStore::for_source(&source_path)?;

        Ok(Self {
            source_path,
            store,
            lines_per_page,
            state: RwLock::new(IndexState::default()),
            cache: PageCache::new(cached_pages),
        })
    }

    /// Scan the source and write all index pages
    ///
    /// Existing pages for this source are deleted first, so a rebuild with a
    /// different page size leaves no orphans behind.
    pub fn build_index(&self) -> Result<BuildSummary> {
        let mut state = self.state.write();
        self.build_locked(&mut state)
    }

    /// Look up a line by its 1-based number given as text
    ///
    /// Returns:
    /// - `Ok(Lookup::Found(line))` for a line in range
    /// - `Ok(Lookup::NotFound)` for 0 or a number past the last line
    /// - `Err(LineError::InvalidInput)` if `line_no` is not a non-negative integer
    /// - any other `Err` for I/O or index failures
    pub fn get_line(&self, line_no: &str) -> Result<Lookup> {
        let digits = line_no.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LineError::InvalidInput(format!(
                "line number must be a non-negative integer, got {:?}",
                line_no
            )));
        }

        match digits.parse::<u64>() {
            Ok(number) => self.get_line_number(number),
            // Too large for any file
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Lookup::NotFound),
            Err(e) => Err(LineError::InvalidInput(format!(
                "line number {:?}: {}",
                line_no, e
            ))),
        }
    }

    /// Look up a line by its 1-based number
    pub fn get_line_number(&self, line_number: u64) -> Result<Lookup> {
        let state = self.indexed_state()?;

        if line_number == 0 || line_number > state.num_lines {
            return Ok(Lookup::NotFound);
        }

        let index = line_number - 1;
        let page_number = index / self.lines_per_page as u64;
        let slot = (index % self.lines_per_page as u64) as usize;

        let page = self.page(page_number)?;
        let offset = page.offset(slot).ok_or_else(|| {
            LineError::IndexCorruption(format!(
                "Page {} has {} offsets, line {} needs slot {}",
                page_number,
                page.len(),
                line_number,
                slot
            ))
        })?;

        let line = self.read_line_at(offset)?;

        drop(state);
        Ok(Lookup::Found(line))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read guard on a completed index, building it first if needed
    fn indexed_state(&self) -> Result<RwLockReadGuard<'_, IndexState>> {
        loop {
            let state = self.state.read();
            if state.indexing_completed {
                return Ok(state);
            }
            drop(state);

            let mut state = self.state.write();
            if !state.indexing_completed {
                tracing::warn!(
                    "Lookup before index build, building now: {}",
                    self.source_path.display()
                );
                self.build_locked(&mut state)?;
            }
        }
    }

    /// Build with the write guard held
    fn build_locked(&self, state: &mut IndexState) -> Result<BuildSummary> {
        tracing::info!("Building indexes: {}", self.source_path.display());

        state.indexing_completed = false;
        state.num_lines = 0;
        self.cache.clear();

        let summary = IndexBuilder::new(&self.store, self.lines_per_page)?.build(&self.source_path)?;

        state.num_lines = summary.num_lines;
        state.indexing_completed = true;

        tracing::info!(
            "Building indexes is completed: {} ({} lines, {} pages)",
            self.source_path.display(),
            summary.num_lines,
            summary.num_pages
        );

        Ok(summary)
    }

    /// Fetch a page from the cache or load it from disk
    fn page(&self, page_number: u64) -> Result<Arc<IndexPage>> {
        if let Some(page) = self.cache.get(page_number) {
            return Ok(page);
        }

        let page = Arc::new(self.store.read_page(page_number)?);
        tracing::debug!(
            "Loaded index page {} ({} offsets)",
            page_number,
            page.len()
        );
        self.cache.insert(Arc::clone(&page));

        Ok(page)
    }

    /// Reopen the source, seek to `offset` and read one line
    fn read_line_at(&self, offset: u64) -> Result<String> {
        let mut file = File::open(&self.source_path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        reader.read_until(b'\n', &mut buf)?;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the source file path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Get the index store
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Get the page size
    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    /// Total line count (0 until the first build completes)
    pub fn num_lines(&self) -> u64 {
        self.state.read().num_lines
    }

    /// Whether a build has completed
    pub fn is_indexed(&self) -> bool {
        self.state.read().indexing_completed
    }

    /// Resident page numbers, most recently used first
    pub fn cached_pages(&self) -> Vec<u64> {
        self.cache.resident_pages()
    }
}
