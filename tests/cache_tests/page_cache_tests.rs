//! Tests for PageCache
//!
//! These tests verify:
//! - Capacity bound and least-recently-used eviction
//! - Replacement of a page with the same number
//! - Concurrent access from many threads

use std::sync::Arc;
use std::thread;

use lineserve::cache::PageCache;
use lineserve::index::IndexPage;

fn page(n: u64) -> Arc<IndexPage> {
    Arc::new(IndexPage::new(n, vec![n * 100, n * 100 + 1]))
}

#[test]
fn test_empty_cache_misses() {
    let cache = PageCache::new(1);

    assert!(cache.is_empty());
    assert!(cache.get(0).is_none());
}

#[test]
fn test_zero_capacity_is_clamped_to_one() {
    let cache = PageCache::new(0);
    cache.insert(page(1));

    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_single_page_cache_swaps_pages() {
    let cache = PageCache::new(1);

    cache.insert(page(0));
    cache.insert(page(5));

    assert_eq!(cache.resident_pages(), vec![5]);
    assert!(cache.get(0).is_none());
    assert_eq!(cache.get(5).unwrap().offsets, vec![500, 501]);
}

#[test]
fn test_lru_eviction_respects_recent_use() {
    let cache = PageCache::new(2);

    cache.insert(page(1));
    cache.insert(page(2));
    // Touch 1 so 2 becomes the eviction candidate
    assert!(cache.get(1).is_some());
    cache.insert(page(3));

    assert_eq!(cache.resident_pages(), vec![3, 1]);
    assert!(cache.get(2).is_none());
}

#[test]
fn test_insert_same_number_replaces() {
    let cache = PageCache::new(3);

    cache.insert(page(1));
    cache.insert(Arc::new(IndexPage::new(1, vec![7])));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(1).unwrap().offsets, vec![7]);
}

#[test]
fn test_clear() {
    let cache = PageCache::new(3);
    cache.insert(page(1));
    cache.insert(page(2));

    cache.clear();

    assert!(cache.is_empty());
}

#[test]
fn test_concurrent_inserts_never_exceed_capacity() {
    let cache = Arc::new(PageCache::new(4));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200u64 {
                    let n = (i + t) % 16;
                    if let Some(found) = cache.get(n) {
                        assert_eq!(found.page_number, n);
                        assert_eq!(found.offsets[0], n * 100);
                    } else {
                        cache.insert(page(n));
                    }
                    assert!(cache.len() <= 4);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 4);
}
