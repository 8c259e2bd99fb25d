//! # Seen store
//! Durable record of case numbers that have already been notified.
//!
//! The file is a JSON array of case numbers, oldest first. Older deployments
//! wrote a single object `{"case_number": "..."}`; that shape is still read.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

pub const DEFAULT_SEEN_CAPACITY: usize = 200;

/// Insertion-ordered set of case numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, case_number: &str) -> bool {
        self.index.contains(case_number)
    }

    /// Returns false if the case number was already present (position unchanged).
    pub fn insert(&mut self, case_number: impl Into<String>) -> bool {
        let case_number = case_number.into();
        if !self.index.insert(case_number.clone()) {
            return false;
        }
        self.order.push(case_number);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The newest `n` entries, oldest first.
    pub fn most_recent(&self, n: usize) -> &[String] {
        let start = self.order.len().saturating_sub(n);
        &self.order[start..]
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SeenSet::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Persisted {
    List(Vec<String>),
    Legacy { case_number: Option<String> },
}

/// Parse a state document. Unknown shapes are an error; callers decide how to degrade.
pub fn parse_seen(s: &str) -> Result<SeenSet> {
    let persisted: Persisted = serde_json::from_str(s).context("parse seen-case state")?;
    Ok(match persisted {
        Persisted::List(v) => v.into_iter().collect(),
        Persisted::Legacy { case_number } => case_number.into_iter().collect(),
    })
}

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    capacity: usize,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: DEFAULT_SEEN_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable state yields an empty set.
    pub async fn load(&self) -> SeenSet {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no seen-case state yet");
                return SeenSet::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "read seen-case state: {e:#}");
                return SeenSet::new();
            }
        };

        match parse_seen(&raw) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring corrupt seen-case state: {e:#}");
                SeenSet::new()
            }
        }
    }

    /// Persist the newest `capacity` entries.
    ///
    /// The document is written to a sibling temp file and renamed over the
    /// target, so a torn write never leaves a half-written array behind.
    pub async fn save(&self, set: &SeenSet) -> Result<()> {
        let kept = set.most_recent(self.capacity);
        let body = serde_json::to_vec_pretty(kept).context("serialize seen-case state")?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create state dir {}", dir.display()))?;
        }

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "seen".into());
    name.push(".tmp");
    path.with_file_name(name)
}
