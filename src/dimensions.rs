//! Natural image sizes, discovered once per source and memoized.

use std::cell::RefCell;

use crate::cache::BoundedCache;
use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::model::{Dimensions, ImageSource};

#[derive(Debug)]
pub struct DimensionStore {
    cache: BoundedCache<String, Dimensions>,
}

impl DimensionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Caller-declared size first, then anything discovered earlier.
    pub fn resolve(&self, source: &ImageSource) -> Option<Dimensions> {
        source
            .declared_dimensions()
            .or_else(|| self.cache.get(&source.cache_key()).copied())
    }

    /// Stores a discovered size. A size already known for the source wins.
    pub fn record(&mut self, source: &ImageSource, dimensions: Dimensions) -> Option<Dimensions> {
        if let Some(known) = self.resolve(source) {
            return Some(known);
        }
        if !dimensions.is_drawable() {
            log::warn!("ignoring unusable size {:?} for {}", dimensions, source.cache_key());
            return None;
        }
        self.cache.set(source.cache_key(), dimensions);
        Some(dimensions)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

thread_local! {
    static STORE: RefCell<DimensionStore> = RefCell::new(DimensionStore::new(DEFAULT_CACHE_CAPACITY));
}

/// Resizes the shared store. Existing entries are dropped.
pub fn configure(capacity: usize) {
    STORE.with(|s| {
        let mut store = s.borrow_mut();
        if store.cache.capacity() != capacity.max(1) {
            *store = DimensionStore::new(capacity);
        }
    });
}

pub fn resolve(source: &ImageSource) -> Option<Dimensions> {
    STORE.with(|s| s.borrow().resolve(source))
}

pub fn record(source: &ImageSource, dimensions: Dimensions) -> Option<Dimensions> {
    STORE.with(|s| s.borrow_mut().record(source, dimensions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_size_needs_no_discovery() {
        let store = DimensionStore::new(4);
        let source = ImageSource::Remote {
            uri: "a.jpg".into(),
            width: Some(640.0),
            height: Some(480.0),
        };
        assert_eq!(store.resolve(&source), Some(Dimensions::new(640.0, 480.0)));
    }

    #[test]
    fn discovered_size_is_kept_for_the_source() {
        let mut store = DimensionStore::new(4);
        let source = ImageSource::uri("b.jpg");
        assert_eq!(store.resolve(&source), None);
        store.record(&source, Dimensions::new(100.0, 50.0));
        // a later, different report does not replace the known size
        assert_eq!(
            store.record(&source, Dimensions::new(1.0, 1.0)),
            Some(Dimensions::new(100.0, 50.0))
        );
        assert_eq!(store.resolve(&source), Some(Dimensions::new(100.0, 50.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unusable_sizes_stay_unknown() {
        let mut store = DimensionStore::new(4);
        let source = ImageSource::Asset(9);
        assert_eq!(store.record(&source, Dimensions::new(0.0, 10.0)), None);
        assert_eq!(store.resolve(&source), None);
    }

    #[test]
    fn shared_store_round_trip() {
        configure(8);
        let source = ImageSource::uri("shared.png");
        record(&source, Dimensions::new(3.0, 4.0));
        assert_eq!(resolve(&source), Some(Dimensions::new(3.0, 4.0)));
    }
}
