//! Analysis result caching.
//!
//! Only raw findings are cached. Preferences and scoring are applied on every
//! run, so a user's vote takes effect without invalidating anything.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::AnalyzerError;
use crate::analyzer::{AnalysisRequest, Analyzer, RawFinding};
use crate::config::CacheConfig;

#[derive(Debug, Clone)]
struct CacheEntry {
    findings: Vec<RawFinding>,
    inserted_at: Instant,
}

/// Bounded map from request fingerprint to raw findings.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
    ttl: Duration,
}

impl AnalysisCache {
    /// Creates a cache. `max_entries` is raised to at least 1.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Returns live findings for `key`, evicting the entry if it expired.
    pub fn get(&self, key: &str) -> Option<Vec<RawFinding>> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;

        if entry.inserted_at.elapsed() >= self.ttl {
            debug!("Cache entry {} expired", key);
            entries.remove(key);
            return None;
        }

        Some(entry.findings.clone())
    }

    pub fn insert(&self, key: impl Into<String>, findings: Vec<RawFinding>) {
        let key = key.into();
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("Cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                findings,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// An [`Analyzer`] that remembers the findings of its inner analyzer.
///
/// Failures are never cached.
pub struct CachedAnalyzer<A> {
    inner: A,
    cache: AnalysisCache,
}

impl<A: Analyzer> CachedAnalyzer<A> {
    pub fn new(inner: A, cache: AnalysisCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: Analyzer> Analyzer for CachedAnalyzer<A> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<RawFinding>, AnalyzerError> {
        let key = request.fingerprint();

        if let Some(findings) = self.cache.get(&key) {
            debug!("Cache hit for {} ({})", request.source, request.format);
            return Ok(findings);
        }

        let findings = self.inner.analyze(request).await?;
        self.cache.insert(key, findings.clone());
        Ok(findings)
    }
}
