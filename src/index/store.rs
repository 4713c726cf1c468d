//! Index Store
//!
//! Owns the on-disk location of one source file's index pages.
//!
//! ## Responsibilities
//! - Derive the index identity from the absolute source path
//! - Write, read and enumerate page artifacts
//! - Delete every page belonging to this identity before a rebuild

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{LineError, Result};

use super::{decode_page, encode_page, IndexPage, PAGE_EXTENSION};

/// Hex SHA-256 of an absolute source path
pub fn identity_for(absolute_path: &Path) -> String {
    let path = absolute_path.to_string_lossy();
    format!("{:x}", Sha256::digest(path.as_bytes()))
}

/// Page storage for one source file
#[derive(Debug, Clone)]
pub struct IndexStore {
    /// `<source dir>/index`
    index_dir: PathBuf,

    /// Hash of the absolute source path, prefixes every page file name
    identity: String,
}

impl IndexStore {
    const INDEX_DIR: &'static str = "index";

    /// Resolve the store for a source file
    ///
    /// The source must exist: its path is canonicalized so that every way of
    /// naming the same file maps to the same identity.
    pub fn for_source(source: &Path) -> Result<Self> {
        let absolute = fs::canonicalize(source)?;
        let source_dir = absolute.parent().ok_or_else(|| {
            LineError::Config(format!("Source {} has no parent directory", absolute.display()))
        })?;

        Ok(Self {
            index_dir: source_dir.join(Self::INDEX_DIR),
            identity: identity_for(&absolute),
        })
    }

    /// Get the index identity (hex hash)
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the directory holding page artifacts
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Path of the artifact for `page_number`
    pub fn page_path(&self, page_number: u64) -> PathBuf {
        self.index_dir
            .join(format!("{}_{}.{}", self.identity, page_number, PAGE_EXTENSION))
    }

    /// Write a page, replacing any existing artifact for its number
    pub fn write_page(&self, page: &IndexPage) -> Result<PathBuf> {
        fs::create_dir_all(&self.index_dir)?;

        let path = self.page_path(page.page_number);
        let bytes = encode_page(page)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        Ok(path)
    }

    /// Read a page back from disk
    pub fn read_page(&self, page_number: u64) -> Result<IndexPage> {
        let bytes = fs::read(self.page_path(page_number))?;
        let page = decode_page(&bytes)?;

        if page.page_number != page_number {
            return Err(LineError::IndexCorruption(format!(
                "Page file {} holds page {}",
                page_number, page.page_number
            )));
        }

        Ok(page)
    }

    /// Page numbers currently on disk for this identity, ascending
    pub fn page_numbers(&self) -> Result<Vec<u64>> {
        if !self.index_dir.exists() {
            return Ok(Vec::new());
        }

        let mut numbers = Vec::new();
        for entry in fs::read_dir(&self.index_dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(number) = self.parse_page_number(&path) {
                    numbers.push(number);
                }
            }
        }
        numbers.sort_unstable();

        Ok(numbers)
    }

    /// Delete all pages for this identity, returning how many were removed
    ///
    /// Pages of other source files sharing the directory are left alone.
    pub fn delete_pages(&self) -> Result<usize> {
        let numbers = self.page_numbers()?;
        for number in &numbers {
            fs::remove_file(self.page_path(*number))?;
        }
        Ok(numbers.len())
    }

    /// "<identity>_42.idx" → Some(42)
    fn parse_page_number(&self, path: &Path) -> Option<u64> {
        if path.extension()? != PAGE_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let digits = stem.strip_prefix(self.identity.as_str())?.strip_prefix('_')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}
