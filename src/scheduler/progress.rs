use std::sync::mpsc::Sender;

use log::info;
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single progress notification from a processing stage
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProgressEvent {
    /// The number of items the stage will process, and how many are already done
    Total { total: usize, completed: usize },
    /// The cumulative number of items processed, sent after each chunk
    Progress(usize),
    /// A human-readable label for the stage, like `Parsing MSP spectrums:`
    StagePrefix(String),
    /// What the items are called, like `spectra`
    ItemType(String),
}

/// Anything that wants to hear about progress
pub trait ProgressObserver {
    fn observe(&self, event: ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressEvent),
{
    fn observe(&self, event: ProgressEvent) {
        (self)(event)
    }
}

impl ProgressObserver for Sender<ProgressEvent> {
    fn observe(&self, event: ProgressEvent) {
        // A hung-up receiver just means nobody is listening any more
        let _ = self.send(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn observe(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Default)]
struct LogProgressState {
    prefix: String,
    item_type: String,
    total: usize,
}

/// Writes progress to the `log` facade at `info` level
#[derive(Debug, Default)]
pub struct LogProgress {
    state: Mutex<LogProgressState>,
}

impl ProgressObserver for LogProgress {
    fn observe(&self, event: ProgressEvent) {
        let mut state = self.state.lock();
        match event {
            ProgressEvent::Total { total, completed } => {
                state.total = total;
                info!(
                    "{} {completed}/{total} {}",
                    state.prefix, state.item_type
                );
            }
            ProgressEvent::Progress(completed) => {
                let percent = if state.total > 0 {
                    completed as f64 / state.total as f64 * 100.0
                } else {
                    100.0
                };
                info!(
                    "{} {completed}/{} {} ({percent:.1}%)",
                    state.prefix, state.total, state.item_type
                );
            }
            ProgressEvent::StagePrefix(prefix) => state.prefix = prefix,
            ProgressEvent::ItemType(item_type) => state.item_type = item_type,
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::sync::mpsc::channel;

    use super::*;

    #[test]
    fn test_closure_observer() {
        let seen = RefCell::new(Vec::new());
        let observer = |event: ProgressEvent| seen.borrow_mut().push(event);
        observer.observe(ProgressEvent::Progress(3));
        observer.observe(ProgressEvent::ItemType("spectra".into()));
        assert_eq!(
            seen.into_inner(),
            vec![
                ProgressEvent::Progress(3),
                ProgressEvent::ItemType("spectra".into())
            ]
        );
    }

    #[test]
    fn test_channel_observer() {
        let (sender, receiver) = channel();
        sender.observe(ProgressEvent::Total { total: 10, completed: 0 });
        drop(sender);
        let events: Vec<_> = receiver.iter().collect();
        assert_eq!(events, vec![ProgressEvent::Total { total: 10, completed: 0 }]);
    }

    #[test_log::test]
    fn test_log_progress_tracks_labels() {
        let observer = LogProgress::default();
        observer.observe(ProgressEvent::StagePrefix("Filtering peaks:".into()));
        observer.observe(ProgressEvent::ItemType("spectra".into()));
        observer.observe(ProgressEvent::Total { total: 4, completed: 0 });
        observer.observe(ProgressEvent::Progress(2));
        let state = observer.state.lock();
        assert_eq!(state.prefix, "Filtering peaks:");
        assert_eq!(state.total, 4);
    }
}
