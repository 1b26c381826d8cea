//! Cached views and path revalidation
//!
//! List views are cached under their request path and query string. After a
//! write, actions call [`Revalidator::revalidate_path`] so the next request
//! for that path recomputes the view. The cache holds at most `capacity`
//! views; storing one more evicts the least recently stored.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Marks the cached rendering of a path as stale
pub trait Revalidator: Send + Sync {
    fn revalidate_path(&self, path: &str) -> Result<()>;
}

/// A cached view payload
#[derive(Debug, Clone)]
pub struct CachedView {
    pub body: Value,
    pub rendered_at: DateTime<Utc>,
}

/// Views kept when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Default)]
struct Entries {
    views: HashMap<String, (u64, CachedView)>,
    next_seq: u64,
}

/// In-memory view cache keyed by `path?query`
#[derive(Clone)]
pub struct ViewCache {
    entries: Arc<RwLock<Entries>>,
    capacity: usize,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` views (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cache key for a path and its (already encoded) query string
    pub fn key(path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<CachedView>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entries.views.get(key).map(|(_, view)| view.clone()))
    }

    /// Store a view, evicting the oldest one when the cache is full
    pub fn put(&self, key: String, body: Value) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !entries.views.contains_key(&key) && entries.views.len() >= self.capacity {
            let oldest = entries
                .views
                .iter()
                .min_by_key(|(_, (seq, _))| *seq)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.views.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest cached view");
            }
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.views.insert(
            key,
            (
                seq,
                CachedView {
                    body,
                    rendered_at: Utc::now(),
                },
            ),
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.views.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Revalidator for ViewCache {
    /// Evicts the path itself, every query variant of it and every sub-path
    fn revalidate_path(&self, path: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = entries.views.len();
        entries.views.retain(|key, _| !is_under(key, path));
        tracing::debug!(path, evicted = before - entries.views.len(), "revalidated path");

        Ok(())
    }
}

fn is_under(key: &str, path: &str) -> bool {
    match key.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
        None => false,
    }
}
