//! LRU memoization for classification and boundary detection.
//!
//! Entries are found by a hash of the text and confirmed against the
//! stored text itself, so a hash collision is a miss rather than
//! another document's result. Re-chunking the same document (e.g.
//! after a size adjustment) skips both regex passes.

use super::classifier::ContentType;
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TextKey {
    hash: u64,
    len: usize,
}

impl TextKey {
    fn of(text: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            len: text.len(),
        }
    }
}

/// A cached value and the exact text it was computed from
struct Entry<T> {
    text: Arc<str>,
    value: T,
}

pub struct ClassificationCache {
    types: LruCache<TextKey, Entry<ContentType>>,
    boundaries: LruCache<(TextKey, ContentType), Entry<Vec<usize>>>,
    hits: u64,
    misses: u64,
}

impl ClassificationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            types: LruCache::new(capacity),
            boundaries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached content type of `text`, or compute and store it
    pub fn content_type(&mut self, text: &str, compute: impl FnOnce() -> ContentType) -> ContentType {
        self.content_type_at(TextKey::of(text), text, compute)
    }

    /// Cached boundaries for a text/type pair, or compute and store them
    pub fn boundaries(
        &mut self,
        text: &str,
        content_type: ContentType,
        compute: impl FnOnce() -> Vec<usize>,
    ) -> Vec<usize> {
        self.boundaries_at(TextKey::of(text), text, content_type, compute)
    }

    fn content_type_at(
        &mut self,
        key: TextKey,
        text: &str,
        compute: impl FnOnce() -> ContentType,
    ) -> ContentType {
        if let Some(entry) = self.types.get(&key) {
            if &*entry.text == text {
                self.hits += 1;
                return entry.value;
            }
        }
        self.misses += 1;
        let value = compute();
        let text = self.shared_text(key, text);
        self.types.put(key, Entry { text, value });
        value
    }

    fn boundaries_at(
        &mut self,
        key: TextKey,
        text: &str,
        content_type: ContentType,
        compute: impl FnOnce() -> Vec<usize>,
    ) -> Vec<usize> {
        if let Some(entry) = self.boundaries.get(&(key, content_type)) {
            if &*entry.text == text {
                self.hits += 1;
                return entry.value.clone();
            }
        }
        self.misses += 1;
        let value = compute();
        let text = self.shared_text(key, text);
        self.boundaries.put(
            (key, content_type),
            Entry {
                text,
                value: value.clone(),
            },
        );
        value
    }

    /// Reuse the copy of `text` the type cache already holds, if any
    fn shared_text(&self, key: TextKey, text: &str) -> Arc<str> {
        match self.types.peek(&key) {
            Some(entry) if &*entry.text == text => Arc::clone(&entry.text),
            _ => Arc::from(text),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn len(&self) -> usize {
        self.types.len() + self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.boundaries.is_empty()
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.boundaries.clear();
    }
}
