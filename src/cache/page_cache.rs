//! Page cache implementation
//!
//! MRU-ordered list of pages with a Mutex for concurrency.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::index::IndexPage;

/// Bounded cache of index pages shared by all workers
pub struct PageCache {
    /// Maximum number of resident pages (at least 1)
    capacity: usize,

    /// Front = most recently used
    pages: Mutex<VecDeque<Arc<IndexPage>>>,
}

impl PageCache {
    /// Create a cache holding at most `capacity` pages
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pages: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Look up a resident page, marking it most recently used
    pub fn get(&self, page_number: u64) -> Option<Arc<IndexPage>> {
        let mut pages = self.pages.lock();
        let pos = pages.iter().position(|p| p.page_number == page_number)?;
        let page = pages.remove(pos)?;
        pages.push_front(Arc::clone(&page));
        Some(page)
    }

    /// Insert a page, evicting the least recently used one if full
    ///
    /// A page already resident under the same number is replaced.
    pub fn insert(&self, page: Arc<IndexPage>) {
        let mut pages = self.pages.lock();
        pages.retain(|p| p.page_number != page.page_number);
        while pages.len() >= self.capacity {
            if let Some(evicted) = pages.pop_back() {
                tracing::trace!("Evicted index page {}", evicted.page_number);
            }
        }
        pages.push_front(page);
    }

    /// Drop every resident page
    pub fn clear(&self) {
        self.pages.lock().clear();
    }

    /// Number of resident pages
    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resident page numbers, most recently used first
    pub fn resident_pages(&self) -> Vec<u64> {
        self.pages.lock().iter().map(|p| p.page_number).collect()
    }
}
