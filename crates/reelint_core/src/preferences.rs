//! Per-user severity overrides.
//!
//! A preference pins the effective severity of one issue key for one user.
//! The linter only reads them; votes and resets go through a
//! [`PreferenceStore`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::issue_key::IssueKey;
use crate::severity::Severity;

/// A stored override for one `(user, issue_key)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIssuePreference {
    /// Severity to apply instead of the rule-assigned one.
    pub severity: Severity,
    /// Severity the issue had when the user first voted on it.
    pub original_severity: Severity,
}

/// All overrides of a single user, keyed by issue key.
pub type PreferenceMap = HashMap<IssueKey, UserIssuePreference>;

/// Preference store errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Invalid severity: {0:?}")]
    InvalidSeverity(String),

    #[error("Invalid original severity: {0:?} (expected critical, moderate or minor)")]
    InvalidOriginalSeverity(String),

    #[error("Issue key must not be empty")]
    EmptyIssueKey,

    #[error("Issue {issue_key} is already at {severity}")]
    AtBoundary {
        issue_key: IssueKey,
        severity: Severity,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A validated write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub issue_key: IssueKey,
    pub severity: Severity,
    pub original_severity: Severity,
}

impl PreferenceUpdate {
    pub fn new(
        issue_key: impl Into<IssueKey>,
        severity: Severity,
        original_severity: Severity,
    ) -> Result<Self, PreferenceError> {
        let update = Self {
            issue_key: issue_key.into(),
            severity,
            original_severity,
        };
        update.validate()?;
        Ok(update)
    }

    /// Builds an update from untyped input, e.g. a request body or CLI args.
    pub fn from_raw(
        issue_key: &str,
        severity: &str,
        original_severity: &str,
    ) -> Result<Self, PreferenceError> {
        let severity = severity
            .parse::<Severity>()
            .map_err(|_| PreferenceError::InvalidSeverity(severity.to_string()))?;
        let original = original_severity
            .parse::<Severity>()
            .map_err(|_| PreferenceError::InvalidOriginalSeverity(original_severity.to_string()))?;
        Self::new(issue_key.trim(), severity, original)
    }

    pub fn validate(&self) -> Result<(), PreferenceError> {
        if self.issue_key.as_str().trim().is_empty() {
            return Err(PreferenceError::EmptyIssueKey);
        }
        if !self.original_severity.is_assignable() {
            return Err(PreferenceError::InvalidOriginalSeverity(
                self.original_severity.to_string(),
            ));
        }
        Ok(())
    }

    /// Merges into an existing preference; the first recorded original wins.
    fn apply(&self, existing: Option<&UserIssuePreference>) -> UserIssuePreference {
        UserIssuePreference {
            severity: self.severity,
            original_severity: existing.map_or(self.original_severity, |p| p.original_severity),
        }
    }
}

/// Persistence for user preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Returns every override of `user_id`. Unknown users get an empty map.
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceMap, PreferenceError>;

    /// Inserts or replaces an override and returns what was stored.
    ///
    /// An existing `original_severity` is kept.
    async fn upsert_preference(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> Result<UserIssuePreference, PreferenceError>;

    /// Removes an override. Returns `false` if there was none.
    async fn delete_preference(
        &self,
        user_id: &str,
        issue_key: &str,
    ) -> Result<bool, PreferenceError>;

    /// Moves the stored severity of `issue_key` one step.
    ///
    /// The read of the current severity and the write of the next one happen
    /// under the same lock, so concurrent votes on one store never collapse.
    async fn step_preference(
        &self,
        user_id: &str,
        issue_key: &IssueKey,
        baseline: Severity,
        direction: Vote,
    ) -> Result<UserIssuePreference, PreferenceError>;
}

/// Direction of a severity vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// One step toward `ignored`.
    LessSevere,
    /// One step toward `critical`.
    MoreSevere,
}

impl Vote {
    /// Computes the update one vote makes on top of `existing`.
    ///
    /// Without an existing override the issue sits at `baseline`, which
    /// becomes the recorded original.
    fn step(
        self,
        issue_key: &IssueKey,
        existing: Option<&UserIssuePreference>,
        baseline: Severity,
    ) -> Result<PreferenceUpdate, PreferenceError> {
        let current = existing.map_or(baseline, |p| p.severity);
        let next = match self {
            Vote::LessSevere => current.next(),
            Vote::MoreSevere => current.prev(),
        }
        .ok_or_else(|| PreferenceError::AtBoundary {
            issue_key: issue_key.clone(),
            severity: current,
        })?;

        debug!("Vote {:?} on {}: {} -> {}", self, issue_key, current, next);
        let original = existing.map_or(baseline, |p| p.original_severity);
        PreferenceUpdate::new(issue_key.clone(), next, original)
    }
}

/// Moves the effective severity of `issue_key` one step.
///
/// `baseline` is the severity the issue has without any override; it is
/// recorded as the original on the first vote.
pub async fn vote<S>(
    store: &S,
    user_id: &str,
    issue_key: &IssueKey,
    baseline: Severity,
    direction: Vote,
) -> Result<UserIssuePreference, PreferenceError>
where
    S: PreferenceStore + ?Sized,
{
    store
        .step_preference(user_id, issue_key, baseline, direction)
        .await
}

pub async fn vote_less_severe<S>(
    store: &S,
    user_id: &str,
    issue_key: &IssueKey,
    baseline: Severity,
) -> Result<UserIssuePreference, PreferenceError>
where
    S: PreferenceStore + ?Sized,
{
    vote(store, user_id, issue_key, baseline, Vote::LessSevere).await
}

pub async fn vote_more_severe<S>(
    store: &S,
    user_id: &str,
    issue_key: &IssueKey,
    baseline: Severity,
) -> Result<UserIssuePreference, PreferenceError>
where
    S: PreferenceStore + ?Sized,
{
    vote(store, user_id, issue_key, baseline, Vote::MoreSevere).await
}

/// Drops the override so the rule severity applies again.
pub async fn reset<S>(store: &S, user_id: &str, issue_key: &IssueKey) -> Result<bool, PreferenceError>
where
    S: PreferenceStore + ?Sized,
{
    store.delete_preference(user_id, issue_key.as_str()).await
}

/// In-process store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    users: RwLock<HashMap<String, PreferenceMap>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceMap, PreferenceError> {
        Ok(self.users.read().get(user_id).cloned().unwrap_or_default())
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> Result<UserIssuePreference, PreferenceError> {
        update.validate()?;
        let mut users = self.users.write();
        let prefs = users.entry(user_id.to_string()).or_default();
        let stored = update.apply(prefs.get(&update.issue_key));
        prefs.insert(update.issue_key, stored);
        Ok(stored)
    }

    async fn delete_preference(
        &self,
        user_id: &str,
        issue_key: &str,
    ) -> Result<bool, PreferenceError> {
        Ok(self
            .users
            .write()
            .get_mut(user_id)
            .is_some_and(|prefs| prefs.remove(issue_key).is_some()))
    }

    async fn step_preference(
        &self,
        user_id: &str,
        issue_key: &IssueKey,
        baseline: Severity,
        direction: Vote,
    ) -> Result<UserIssuePreference, PreferenceError> {
        let mut users = self.users.write();
        let existing = users.get(user_id).and_then(|prefs| prefs.get(issue_key));
        let update = direction.step(issue_key, existing, baseline)?;

        let prefs = users.entry(user_id.to_string()).or_default();
        let stored = update.apply(prefs.get(&update.issue_key));
        prefs.insert(update.issue_key, stored);
        Ok(stored)
    }
}

/// On-disk layout of [`JsonFilePreferenceStore`].
pub type PreferenceDocument = BTreeMap<String, BTreeMap<IssueKey, UserIssuePreference>>;

/// Store backed by a single JSON document:
/// `{user_id: {issue_key: {severity, original_severity}}}`.
///
/// Writes are read-modify-write under an async lock, so one instance must own
/// the file.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every user's overrides. A missing file is an empty document.
    pub async fn load(&self) -> Result<PreferenceDocument, PreferenceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}", self.path.display());
                return Ok(PreferenceDocument::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(PreferenceDocument::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            PreferenceError::Storage(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, document: &PreferenceDocument) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&self.path, json).await?;

        info!(
            "Saved preferences for {} user(s) to {}",
            document.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get_preferences(&self, user_id: &str) -> Result<PreferenceMap, PreferenceError> {
        let mut document = self.load().await?;
        Ok(document
            .remove(user_id)
            .map(|prefs| prefs.into_iter().collect())
            .unwrap_or_default())
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> Result<UserIssuePreference, PreferenceError> {
        update.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let prefs = document.entry(user_id.to_string()).or_default();
        let stored = update.apply(prefs.get(&update.issue_key));
        prefs.insert(update.issue_key, stored);

        self.save(&document).await?;
        Ok(stored)
    }

    async fn delete_preference(
        &self,
        user_id: &str,
        issue_key: &str,
    ) -> Result<bool, PreferenceError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let Some(prefs) = document.get_mut(user_id) else {
            return Ok(false);
        };
        if prefs.remove(issue_key).is_none() {
            return Ok(false);
        }
        if prefs.is_empty() {
            document.remove(user_id);
        }

        self.save(&document).await?;
        Ok(true)
    }

    async fn step_preference(
        &self,
        user_id: &str,
        issue_key: &IssueKey,
        baseline: Severity,
        direction: Vote,
    ) -> Result<UserIssuePreference, PreferenceError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let existing = document.get(user_id).and_then(|prefs| prefs.get(issue_key));
        let update = direction.step(issue_key, existing, baseline)?;

        let prefs = document.entry(user_id.to_string()).or_default();
        let stored = update.apply(prefs.get(&update.issue_key));
        prefs.insert(update.issue_key, stored);

        self.save(&document).await?;
        Ok(stored)
    }
}
