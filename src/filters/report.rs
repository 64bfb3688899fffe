use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::record::CanonicalRecord;

/// Why a spectrum was removed by the filter pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeletionReason {
    TooFewPeaks,
    AllAbovePrecursor,
    ReducedToNothing,
    DegenerateIntensity,
    OutOfMzRange,
    NotEnoughHighPeaks,
}

impl DeletionReason {
    pub const ALL: [DeletionReason; 6] = [
        Self::TooFewPeaks,
        Self::AllAbovePrecursor,
        Self::ReducedToNothing,
        Self::DegenerateIntensity,
        Self::OutOfMzRange,
        Self::NotEnoughHighPeaks,
    ];

    /// The human-readable message shown in deletion reports
    pub const fn message(&self) -> &'static str {
        match self {
            Self::TooFewPeaks => {
                "spectrum deleted because peaks list has fewer peaks than the minimum required"
            }
            Self::AllAbovePrecursor => {
                "spectrum deleted because peaks list is empty after removing peaks above precursor m/z"
            }
            Self::ReducedToNothing => {
                "spectrum deleted because peaks list is empty after reducing it to the maximum number of peaks"
            }
            Self::DegenerateIntensity => {
                "spectrum deleted because peaks list has no positive intensity to normalize"
            }
            Self::OutOfMzRange => {
                "spectrum deleted because peaks list is empty after removing peaks out of mz range"
            }
            Self::NotEnoughHighPeaks => {
                "spectrum deleted because peaks list does not contain minimum number of high peaks required"
            }
        }
    }

    const fn index(&self) -> usize {
        match self {
            Self::TooFewPeaks => 0,
            Self::AllAbovePrecursor => 1,
            Self::ReducedToNothing => 2,
            Self::DegenerateIntensity => 3,
            Self::OutOfMzRange => 4,
            Self::NotEnoughHighPeaks => 5,
        }
    }
}

impl Display for DeletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A spectrum removed by the filter pipeline, with the peak list it had when it was removed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeletionRecord {
    pub record: CanonicalRecord,
    pub reason: DeletionReason,
}

impl DeletionRecord {
    pub fn new(record: CanonicalRecord, reason: DeletionReason) -> Self {
        Self { record, reason }
    }
}

/**
An append-only collection of [`DeletionRecord`]s that many workers may push to at once.

The order of the records reflects the order workers finished in and carries no meaning.
Per-reason counts are kept alongside so they can be read without taking the lock.
*/
#[derive(Debug, Default)]
pub struct DeletionReport {
    records: Mutex<Vec<DeletionRecord>>,
    counts: [AtomicUsize; 6],
}

impl DeletionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: DeletionRecord) {
        self.counts[record.reason.index()].fetch_add(1, Ordering::Relaxed);
        self.records.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many spectra were removed for `reason`
    pub fn count(&self, reason: DeletionReason) -> usize {
        self.counts[reason.index()].load(Ordering::Relaxed)
    }

    /// A copy of the records collected so far
    pub fn snapshot(&self) -> Vec<DeletionRecord> {
        self.records.lock().clone()
    }

    /// Move every record out of `other` into this report
    pub fn merge(&self, other: DeletionReport) {
        for record in other.into_records() {
            self.push(record);
        }
    }

    pub fn into_records(self) -> Vec<DeletionRecord> {
        self.records.into_inner()
    }
}

impl Extend<DeletionRecord> for DeletionReport {
    fn extend<T: IntoIterator<Item = DeletionRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_concurrent_push() {
        let report = Arc::new(DeletionReport::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let report = Arc::clone(&report);
                thread::spawn(move || {
                    let reason = if i % 2 == 0 {
                        DeletionReason::OutOfMzRange
                    } else {
                        DeletionReason::AllAbovePrecursor
                    };
                    for _ in 0..25 {
                        report.push(DeletionRecord::new(CanonicalRecord::default(), reason));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(report.len(), 100);
        assert_eq!(report.count(DeletionReason::OutOfMzRange), 50);
        assert_eq!(report.count(DeletionReason::AllAbovePrecursor), 50);
        assert_eq!(report.count(DeletionReason::TooFewPeaks), 0);
    }

    #[test]
    fn test_messages() {
        assert!(DeletionReason::AllAbovePrecursor
            .message()
            .contains("above precursor m/z"));
        assert!(DeletionReason::OutOfMzRange
            .to_string()
            .contains("out of mz range"));
        for (i, reason) in DeletionReason::ALL.iter().enumerate() {
            assert_eq!(reason.index(), i);
        }
    }
}
