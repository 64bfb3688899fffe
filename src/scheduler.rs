//! Memory-bounded, chunked processing of large record collections.
//!
//! A [`ChunkedScheduler`] splits its input into chunks sized by a [`ChunkingPlan`],
//! runs every item of a chunk through a worker pool, waits for the whole chunk, and only
//! then moves on to the next one. Items for which the work function returns `None` are
//! dropped, and survivors keep their input order.
use log::{debug, info};
use thiserror::Error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod chunking;
mod progress;

pub use chunking::{ApproximateSize, ChunkingPlan, MAX_TASKS_PER_WORKER, WORKER_STATE_FACTOR};
pub use progress::{LogProgress, NoProgress, ProgressEvent, ProgressObserver};

/// How many leading items are sampled to pick a representative record size
const SIZE_SAMPLE: usize = 16;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("The memory fraction must be within (0, 1], got {0}")]
    InvalidMemoryFraction(f64),
    #[cfg(feature = "parallelism")]
    #[error("Failed to build the worker pool: {0}")]
    ThreadPoolError(
        #[from]
        #[source]
        rayon::ThreadPoolBuildError,
    ),
}

/// Overrides for the automatically derived [`ChunkingPlan`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Use this chunk size instead of deriving one from available memory
    pub chunk_size: Option<usize>,
    /// The number of worker threads, defaulting to the number of logical CPUs
    pub threads: Option<usize>,
    /// The share of currently available memory one chunk may use
    pub memory_fraction: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,
            threads: None,
            memory_fraction: 0.5,
        }
    }
}

#[derive(Debug)]
pub struct ChunkedScheduler {
    config: SchedulerConfig,
    #[cfg(feature = "parallelism")]
    pool: rayon::ThreadPool,
}

impl ChunkedScheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        if !(config.memory_fraction > 0.0 && config.memory_fraction <= 1.0) {
            return Err(SchedulerError::InvalidMemoryFraction(config.memory_fraction));
        }
        #[cfg(feature = "parallelism")]
        let pool = {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(threads) = config.threads {
                builder = builder.num_threads(threads);
            }
            builder.build()?
        };
        Ok(Self {
            config,
            #[cfg(feature = "parallelism")]
            pool,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The number of threads each chunk is spread over
    #[cfg(feature = "parallelism")]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    #[cfg(not(feature = "parallelism"))]
    pub fn workers(&self) -> usize {
        1
    }

    /// Derive the plan for `items`, sizing chunks from the largest of the first few items
    pub fn plan_for<T: ApproximateSize>(&self, items: &[T]) -> ChunkingPlan {
        match self.config.chunk_size {
            Some(chunk_size) => ChunkingPlan::fixed(chunk_size, items.len(), self.workers()),
            None => {
                let record_size = items
                    .iter()
                    .take(SIZE_SAMPLE)
                    .map(|item| item.approximate_size())
                    .max()
                    .unwrap_or_default();
                ChunkingPlan::from_system(
                    record_size,
                    items.len(),
                    self.config.memory_fraction,
                    Some(self.workers()),
                )
            }
        }
    }

    /**
    Apply `f` to every item of `items`, one chunk at a time.

    Progress is reported to `observer`: the stage prefix, the item type and the total up
    front, then the cumulative count after each chunk completes. The output holds the
    `Some` results in input order.
    */
    pub fn process<T, U, F, O>(
        &self,
        items: Vec<T>,
        stage_prefix: &str,
        item_type: &str,
        observer: &O,
        f: F,
    ) -> Vec<U>
    where
        T: ApproximateSize + Send,
        U: Send,
        F: Fn(T) -> Option<U> + Send + Sync,
        O: ProgressObserver + ?Sized,
    {
        let plan = self.plan_for(&items);
        self.process_with_plan(items, plan, stage_prefix, item_type, observer, f)
    }

    /// As [`ChunkedScheduler::process`], with an explicit plan
    pub fn process_with_plan<T, U, F, O>(
        &self,
        items: Vec<T>,
        plan: ChunkingPlan,
        stage_prefix: &str,
        item_type: &str,
        observer: &O,
        f: F,
    ) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Option<U> + Send + Sync,
        O: ProgressObserver + ?Sized,
    {
        let total = items.len();
        observer.observe(ProgressEvent::StagePrefix(stage_prefix.to_string()));
        observer.observe(ProgressEvent::ItemType(item_type.to_string()));
        observer.observe(ProgressEvent::Total {
            total,
            completed: 0,
        });
        info!("{stage_prefix} {total} {item_type} in {} chunks", plan.num_chunks());

        let mut results = Vec::with_capacity(total);
        let mut completed = 0;
        let mut items = items.into_iter();
        loop {
            let chunk: Vec<T> = items.by_ref().take(plan.chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let n = chunk.len();
            debug!("Dispatching chunk of {n} {item_type} at {completed}");
            let outcomes = self.run_chunk(chunk, &f);
            results.extend(outcomes.into_iter().flatten());
            completed += n;
            observer.observe(ProgressEvent::Progress(completed));
        }
        info!(
            "{stage_prefix} kept {} of {total} {item_type}",
            results.len()
        );
        results
    }

    #[cfg(feature = "parallelism")]
    fn run_chunk<T, U, F>(&self, chunk: Vec<T>, f: &F) -> Vec<Option<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Option<U> + Send + Sync,
    {
        self.pool
            .install(|| chunk.into_par_iter().map(f).collect())
    }

    #[cfg(not(feature = "parallelism"))]
    fn run_chunk<T, U, F>(&self, chunk: Vec<T>, f: &F) -> Vec<Option<U>>
    where
        F: Fn(T) -> Option<U>,
    {
        chunk.into_iter().map(f).collect()
    }
}

#[cfg(test)]
mod test {
    use std::sync::mpsc::channel;

    use super::*;

    fn keep_odd_squares(x: String) -> Option<String> {
        let n: usize = x.parse().ok()?;
        (n % 2 == 1).then(|| (n * n).to_string())
    }

    #[test_log::test]
    fn test_chunk_boundaries_do_not_change_survivors() {
        let scheduler = ChunkedScheduler::new(SchedulerConfig {
            threads: Some(4),
            ..Default::default()
        })
        .unwrap();
        let items: Vec<String> = (0..97).map(|i| i.to_string()).collect();
        let expected: Vec<String> = items.iter().cloned().filter_map(keep_odd_squares).collect();
        for chunk_size in [1, 2, 7, 32, 97, 500] {
            let plan = ChunkingPlan::fixed(chunk_size, items.len(), scheduler.workers());
            let out = scheduler.process_with_plan(
                items.clone(),
                plan,
                "Testing:",
                "numbers",
                &NoProgress,
                keep_odd_squares,
            );
            assert_eq!(out, expected, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_progress_events() {
        let scheduler = ChunkedScheduler::new(SchedulerConfig {
            chunk_size: Some(4),
            threads: Some(2),
            ..Default::default()
        })
        .unwrap();
        let (sender, receiver) = channel();
        let items: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let out = scheduler.process(items, "Squaring:", "numbers", &sender, keep_odd_squares);
        assert_eq!(out.len(), 5);
        drop(sender);
        let events: Vec<_> = receiver.iter().collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::StagePrefix("Squaring:".into()),
                ProgressEvent::ItemType("numbers".into()),
                ProgressEvent::Total {
                    total: 10,
                    completed: 0
                },
                ProgressEvent::Progress(4),
                ProgressEvent::Progress(8),
                ProgressEvent::Progress(10),
            ]
        );
    }

    #[test]
    fn test_invalid_memory_fraction() {
        let err = ChunkedScheduler::new(SchedulerConfig {
            memory_fraction: 0.0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidMemoryFraction(_)));
    }
}
