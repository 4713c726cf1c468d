//! Cache Module
//!
//! In-memory copies of recently used index pages.
//!
//! ## Responsibilities
//! - Bound resident index memory to a fixed number of pages
//! - Safe to share across connection worker threads
//! - Evict the least recently used page when full
//!
//! ## Data Structure Choice
//! A short most-recently-used list behind a Mutex. Capacities are small
//! (the default is a single page) so a linear scan beats a map.

mod page_cache;

pub use page_cache::PageCache;
