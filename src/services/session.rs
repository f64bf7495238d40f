//! Session Store
//!
//! Bounded, ordered log of analysis results. Source of recent-activity
//! context for prompts, of productivity analytics, and of export snapshots.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use screen_insight_core::{ActivityCategory, Clock};

use crate::models::{AnalysisResult, ResultSource, SessionRecord, SessionSnapshot, SessionSummary};

/// Keywords reported in `SessionSummary::top_keywords`.
const TOP_KEYWORDS: usize = 5;

struct SessionLog {
    records: VecDeque<SessionRecord>,
    /// Total appended over the session, including evicted records
    total_appended: u64,
}

/// Thread-safe session history with capacity `H`.
///
/// `append` is the only mutator. Readers get owned copies and never observe
/// a partially appended record.
pub struct SessionStore {
    capacity: usize,
    log: RwLock<SessionLog>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a store holding at most `capacity` records (minimum one).
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            log: RwLock::new(SessionLog {
                records: VecDeque::with_capacity(capacity),
                total_appended: 0,
            }),
            clock,
        }
    }

    /// Append a result, evicting the oldest record on overflow.
    ///
    /// Returns the sequence number assigned to the new record.
    pub fn append(&self, result: AnalysisResult) -> u64 {
        let mut log = self.log.write();
        log.total_appended += 1;
        let sequence_number = log.total_appended;

        if log.records.len() == self.capacity {
            log.records.pop_front();
        }
        log.records.push_back(SessionRecord {
            sequence_number,
            result,
        });
        sequence_number
    }

    /// The last `n` records in chronological order (oldest first).
    pub fn recent(&self, n: usize) -> Vec<SessionRecord> {
        let log = self.log.read();
        let skip = log.records.len().saturating_sub(n);
        log.records.iter().skip(skip).cloned().collect()
    }

    /// Up to `n` most recent records of one category, oldest first.
    pub fn recent_by_category(&self, category: ActivityCategory, n: usize) -> Vec<SessionRecord> {
        let log = self.log.read();
        let mut matching: Vec<SessionRecord> = log
            .records
            .iter()
            .rev()
            .filter(|record| record.result.category() == category)
            .take(n)
            .cloned()
            .collect();
        matching.reverse();
        matching
    }

    /// Point-in-time copy of everything held. Never mutates.
    pub fn export_snapshot(&self) -> SessionSnapshot {
        let log = self.log.read();
        SessionSnapshot {
            exported_at: self.clock.now(),
            capacity: self.capacity,
            total_appended: log.total_appended,
            records: log.records.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.log.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_appended(&self) -> u64 {
        self.log.read().total_appended
    }

    /// Productivity analytics over the records currently held.
    pub fn summary(&self) -> SessionSummary {
        let log = self.log.read();
        let held = log.records.len();
        if held == 0 {
            return SessionSummary {
                total_appended: log.total_appended,
                ..SessionSummary::default()
            };
        }

        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
        let mut keyword_counts: HashMap<&str, usize> = HashMap::new();
        let mut confidence_sum = 0.0;
        let mut latency_sum = 0.0;

        for record in &log.records {
            let result = &record.result;
            *by_category
                .entry(result.category().to_string())
                .or_default() += 1;
            *by_source.entry(result.source.to_string()).or_default() += 1;
            for keyword in &result.classification.matched_keywords {
                *keyword_counts.entry(keyword.as_str()).or_default() += 1;
            }
            confidence_sum += result.confidence;
            latency_sum += result.latency_ms as f64;
        }

        let mut top_keywords: Vec<(String, usize)> = keyword_counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        top_keywords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_keywords.truncate(TOP_KEYWORDS);

        let count = |source: ResultSource| by_source.get(source.as_str()).copied().unwrap_or(0);
        let held_f = held as f64;

        SessionSummary {
            total_appended: log.total_appended,
            records_held: held,
            cache_hit_rate: count(ResultSource::Cache) as f64 / held_f,
            degraded_rate: count(ResultSource::Fallback) as f64 / held_f,
            average_confidence: confidence_sum / held_f,
            average_latency_ms: latency_sum / held_f,
            top_keywords,
            by_category,
            by_source,
        }
    }
}
