//! Execution ledger.
//!
//! Bounded append-only record of planning outcomes. A ring buffer with an
//! explicit capacity replaces unbounded history: when full, the oldest
//! record falls off the front. Shared across calls; all mutation goes
//! through the internal mutex.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::Constraints;

/// One planning call outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRecord {
    /// Epoch ms at completion
    pub timestamp: i64,
    /// Tasks planned by this call
    pub task_count: usize,
    /// Wall time of the call in ms
    pub duration_ms: u64,
    /// Efficiency of the produced plan
    pub efficiency: f64,
    /// Constraints the call ran under
    pub constraints: Constraints,
    /// `userId:role`, or `anonymous`
    pub principal: String,
    /// Whether the plan came from the result cache
    pub cached: bool,
}

/// Rolling aggregates over retained records.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStats {
    /// Retained record count
    pub records: usize,
    /// Mean efficiency across retained records
    pub average_efficiency: f64,
    /// Fraction of retained calls served from cache
    pub cached_share: f64,
}

/// Bounded ring buffer of planning outcomes.
#[derive(Debug)]
pub struct ExecutionLedger {
    capacity: usize,
    records: Mutex<VecDeque<LedgerRecord>>,
}

impl ExecutionLedger {
    /// Create a ledger retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Retention capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one record, dropping the oldest when full.
    pub fn append(&self, record: LedgerRecord) {
        let mut records = self.records.lock().expect("ledger lock poisoned");
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Retained record count.
    pub fn len(&self) -> usize {
        self.records.lock().expect("ledger lock poisoned").len()
    }

    /// Whether no record is retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rolling mean efficiency across retained records; 0 when empty.
    pub fn average_efficiency(&self) -> f64 {
        let records = self.records.lock().expect("ledger lock poisoned");
        if records.is_empty() {
            return 0.0;
        }
        records.iter().map(|r| r.efficiency).sum::<f64>() / records.len() as f64
    }

    /// Aggregates over retained records.
    pub fn stats(&self) -> LedgerStats {
        let records = self.records.lock().expect("ledger lock poisoned");
        if records.is_empty() {
            return LedgerStats {
                records: 0,
                average_efficiency: 0.0,
                cached_share: 0.0,
            };
        }
        let count = records.len();
        let average_efficiency = records.iter().map(|r| r.efficiency).sum::<f64>() / count as f64;
        let cached = records.iter().filter(|r| r.cached).count();
        LedgerStats {
            records: count,
            average_efficiency,
            cached_share: cached as f64 / count as f64,
        }
    }

    /// The most recent `n` records, newest last.
    pub fn recent(&self, n: usize) -> Vec<LedgerRecord> {
        let records = self.records.lock().expect("ledger lock poisoned");
        records.iter().rev().take(n).rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(efficiency: f64, cached: bool) -> LedgerRecord {
        LedgerRecord {
            timestamp: 1_700_000_000_000,
            task_count: 3,
            duration_ms: 5,
            efficiency,
            constraints: Constraints::default(),
            principal: "anonymous".to_string(),
            cached,
        }
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = ExecutionLedger::new(8);
        assert!(ledger.is_empty());
        assert_eq!(ledger.capacity(), 8);
        assert_eq!(ledger.average_efficiency(), 0.0);
    }

    #[test]
    fn test_zero_capacity_floors_to_one() {
        let ledger = ExecutionLedger::new(0);
        assert_eq!(ledger.capacity(), 1);
        ledger.append(make_record(0.5, false));
        ledger.append(make_record(0.9, false));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_append_and_len() {
        let ledger = ExecutionLedger::new(8);
        ledger.append(make_record(0.5, false));
        ledger.append(make_record(0.7, true));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_ring_drops_oldest() {
        let ledger = ExecutionLedger::new(2);
        ledger.append(make_record(0.1, false));
        ledger.append(make_record(0.2, false));
        ledger.append(make_record(0.3, false));
        assert_eq!(ledger.len(), 2);
        let recent = ledger.recent(2);
        assert_eq!(recent[0].efficiency, 0.2);
        assert_eq!(recent[1].efficiency, 0.3);
    }

    #[test]
    fn test_average_efficiency() {
        let ledger = ExecutionLedger::new(8);
        ledger.append(make_record(0.4, false));
        ledger.append(make_record(0.8, false));
        assert!((ledger.average_efficiency() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_average_is_rolling() {
        // Capacity 2: the first record ages out of the average
        let ledger = ExecutionLedger::new(2);
        ledger.append(make_record(0.0, false));
        ledger.append(make_record(0.6, false));
        ledger.append(make_record(1.0, false));
        assert!((ledger.average_efficiency() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_stats() {
        let ledger = ExecutionLedger::new(8);
        ledger.append(make_record(0.5, true));
        ledger.append(make_record(1.0, false));
        let stats = ledger.stats();
        assert_eq!(stats.records, 2);
        assert!((stats.average_efficiency - 0.75).abs() < 1e-9);
        assert!((stats.cached_share - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty() {
        let ledger = ExecutionLedger::new(8);
        let stats = ledger.stats();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.average_efficiency, 0.0);
        assert_eq!(stats.cached_share, 0.0);
    }

    #[test]
    fn test_recent_returns_newest_last() {
        let ledger = ExecutionLedger::new(8);
        for i in 0..5 {
            ledger.append(make_record(i as f64 / 10.0, false));
        }
        let recent = ledger.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].efficiency, 0.2);
        assert_eq!(recent[2].efficiency, 0.4);
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let record = make_record(0.7, true);
        let json = serde_json::to_string(&record).unwrap();
        let restored: LedgerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }
}
