use std::mem;
use std::ops::Range;

use log::debug;
use sysinfo::System;

use crate::record::{CanonicalRecord, FieldValue, Peak, RawRecord};

/// How many times its own size one record is expected to occupy while a worker holds it
pub const WORKER_STATE_FACTOR: usize = 8;

/// Upper bound on tasks queued per worker thread within one chunk
pub const MAX_TASKS_PER_WORKER: usize = 256;

/// A cheap estimate of the heap footprint of a value, in bytes
pub trait ApproximateSize {
    fn approximate_size(&self) -> usize;
}

impl ApproximateSize for String {
    fn approximate_size(&self) -> usize {
        mem::size_of::<String>() + self.len()
    }
}

impl ApproximateSize for RawRecord {
    fn approximate_size(&self) -> usize {
        let fields: usize = self
            .fields
            .iter()
            .map(|(k, v)| k.approximate_size() + v.approximate_size())
            .sum();
        mem::size_of::<Self>() + fields + self.peaks.len() * mem::size_of::<Peak>()
    }
}

impl ApproximateSize for CanonicalRecord {
    fn approximate_size(&self) -> usize {
        let fields: usize = self
            .iter()
            .map(|(k, v)| {
                mem::size_of_val(k)
                    + mem::size_of::<FieldValue>()
                    + v.as_str().map(|s| s.len()).unwrap_or_default()
            })
            .sum();
        mem::size_of::<Self>() + fields + self.peaks.len() * mem::size_of::<Peak>()
    }
}

#[cfg(feature = "json")]
impl ApproximateSize for serde_json::Value {
    fn approximate_size(&self) -> usize {
        use serde_json::Value;
        mem::size_of::<Value>()
            + match self {
                Value::String(s) => s.len(),
                Value::Array(values) => values.iter().map(|v| v.approximate_size()).sum(),
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| k.len() + v.approximate_size())
                    .sum(),
                _ => 0,
            }
    }
}

/// The batch boundaries for one processing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPlan {
    pub chunk_size: usize,
    pub total: usize,
    pub workers: usize,
}

impl ChunkingPlan {
    /**
    Size chunks so that one chunk's worker state fits within `memory_budget` bytes
    while every one of `workers` threads gets a bounded queue of tasks.

    `record_size` is the approximate size of one representative record.
    The chunk size is always at least 1 and never larger than `total`,
    unless `total` is zero.
    */
    pub fn compute(record_size: usize, total: usize, memory_budget: u64, workers: usize) -> Self {
        let workers = workers.max(1);
        let per_record = record_size.max(1).saturating_mul(WORKER_STATE_FACTOR) as u64;
        let by_memory = usize::try_from(memory_budget / per_record).unwrap_or(usize::MAX);
        let by_cpu = workers.saturating_mul(MAX_TASKS_PER_WORKER);
        let chunk_size = by_cpu.min(by_memory).max(1).min(total.max(1));
        Self {
            chunk_size,
            total,
            workers,
        }
    }

    /// Compute a plan from the memory currently available on this machine, using at most
    /// `memory_fraction` of it
    pub fn from_system(
        record_size: usize,
        total: usize,
        memory_fraction: f64,
        workers: Option<usize>,
    ) -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let available = system.available_memory();
        let budget = (available as f64 * memory_fraction.clamp(0.0, 1.0)) as u64;
        let workers = workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let plan = Self::compute(record_size, total, budget, workers);
        debug!(
            "Planned chunks of {} for {} items of ~{record_size} bytes ({available} bytes available, {workers} workers)",
            plan.chunk_size, plan.total
        );
        plan
    }

    /// A plan with a fixed chunk size
    pub fn fixed(chunk_size: usize, total: usize, workers: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            total,
            workers: workers.max(1),
        }
    }

    pub fn num_chunks(&self) -> usize {
        self.total.div_ceil(self.chunk_size)
    }

    /// The index range covered by each chunk, in order
    pub fn chunks(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.total)
            .step_by(self.chunk_size)
            .map(|start| start..(start + self.chunk_size).min(self.total))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_memory_bound() {
        // 1 KiB records, 8 KiB of worker state each, 80 KiB budget
        let plan = ChunkingPlan::compute(1024, 1000, 80 * 1024, 4);
        assert_eq!(plan.chunk_size, 10);
        assert_eq!(plan.num_chunks(), 100);
    }

    #[test]
    fn test_cpu_bound() {
        let plan = ChunkingPlan::compute(16, 1_000_000, u64::MAX, 2);
        assert_eq!(plan.chunk_size, 2 * MAX_TASKS_PER_WORKER);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(ChunkingPlan::compute(1 << 30, 5, 0, 0).chunk_size, 1);
        assert_eq!(ChunkingPlan::compute(10, 3, u64::MAX, 8).chunk_size, 3);
        let empty = ChunkingPlan::compute(10, 0, u64::MAX, 8);
        assert_eq!(empty.chunk_size, 1);
        assert_eq!(empty.chunks().count(), 0);
    }

    #[test]
    fn test_chunks_cover_everything() {
        let plan = ChunkingPlan::fixed(4, 10, 1);
        let ranges: Vec<_> = plan.chunks().collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert_eq!(plan.num_chunks(), 3);
    }

    #[test]
    fn test_from_system_is_sane() {
        let plan = ChunkingPlan::from_system(512, 100, 0.5, None);
        assert!(plan.chunk_size >= 1 && plan.chunk_size <= 100);
        assert!(plan.workers >= 1);
    }
}
