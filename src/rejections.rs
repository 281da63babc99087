//! In-memory log of item rejections for the most recent aggregation cycle.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::text::truncate_chars;
use crate::transform::Rejection;

pub const TITLE_PREVIEW_CHARS: usize = 60;
pub const DEFAULT_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionRecord {
    pub title: String,
    pub source_id: String,
    /// Stable reason code (`stale`, `off-topic`, ...).
    pub reason: String,
    /// Human-readable detail, e.g. `stale: 45d`.
    pub detail: String,
}

#[derive(Debug)]
pub struct RejectionLog {
    inner: Mutex<Vec<RejectionRecord>>,
    cap: usize,
}

impl Default for RejectionLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RejectionLog {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Vec::new()),
            cap,
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<RejectionRecord>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Start a new cycle.
    pub fn reset(&self) {
        self.entries().clear();
    }

    pub fn record(&self, title: &str, source_id: &str, why: &Rejection) {
        let rec = RejectionRecord {
            title: truncate_chars(title.trim(), TITLE_PREVIEW_CHARS),
            source_id: source_id.to_string(),
            reason: why.code().to_string(),
            detail: why.to_string(),
        };
        let mut v = self.entries();
        v.push(rec);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot(&self) -> Vec<RejectionRecord> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count per reason code.
    pub fn tally(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for r in self.entries().iter() {
            *out.entry(r.reason.clone()).or_insert(0) += 1;
        }
        out
    }
}
