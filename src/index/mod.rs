//! Index Module
//!
//! Paged, disk-resident offset index for one source text file.
//!
//! ## Responsibilities
//! - Scan the source once and record the byte offset of every line
//! - Persist offsets in pages of `P` lines, one artifact per page
//! - Load a single page back on demand
//! - Remove stale pages before a rebuild
//!
//! ## Layout
//! Page `i` holds the offsets of 0-based lines `[i*P, (i+1)*P - 1]`.
//! Artifacts live next to the source file:
//! ```text
//! <source dir>/
//!   ├── lines.txt
//!   └── index/
//!         ├── <sha256(abs path)>_0.idx
//!         ├── <sha256(abs path)>_1.idx
//!         └── ...
//! ```
//!
//! ## Page File Format
//! ```text
//! ┌──────────┬──────────┬───────────┬──────────┬──────────────────────┐
//! │Magic (4) │Version(2)│BodyLen (4)│ CRC (4)  │ Body (bincode page)  │
//! └──────────┴──────────┴───────────┴──────────┴──────────────────────┘
//! ```

mod page;
mod store;
mod builder;

use serde::{Deserialize, Serialize};

pub use page::{decode_page, encode_page};
pub use store::{identity_for, IndexStore};
pub use builder::{BuildSummary, IndexBuilder};

/// Magic bytes at the start of every page artifact
pub const MAGIC: &[u8; 4] = b"LIDX";

/// Page file format version
pub const VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + body length (4) + crc (4)
pub const HEADER_SIZE: usize = 14;

/// Page artifact file extension
pub const PAGE_EXTENSION: &str = "idx";

/// One page of line offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPage {
    /// Page number (0-based)
    pub page_number: u64,

    /// Byte offset of each line in the page, in line order
    pub offsets: Vec<u64>,
}

impl IndexPage {
    pub fn new(page_number: u64, offsets: Vec<u64>) -> Self {
        Self { page_number, offsets }
    }

    /// Number of lines covered by this page
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset of the line at `slot` within the page
    pub fn offset(&self, slot: usize) -> Option<u64> {
        self.offsets.get(slot).copied()
    }
}
