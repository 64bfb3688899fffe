//! The peak filter pipeline.
//!
//! A [`PeakFilterPipeline`] runs the [`FilterStage`]s enabled by a [`FilterConfig`] in
//! their fixed order. The first stage that empties a peak list ends the pipeline for that
//! spectrum, and the spectrum is moved into the shared [`DeletionReport`].
use log::debug;

use crate::record::{CanonicalKey, CanonicalRecord, PeakList};

mod config;
mod report;
pub mod stages;

pub use config::{FilterConfig, FilterConfigError};
pub use report::{DeletionReason, DeletionRecord, DeletionReport};
pub use stages::FilterStage;

#[derive(Debug, Default, Clone)]
pub struct PeakFilterPipeline {
    config: FilterConfig,
}

impl PeakFilterPipeline {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// The stages this pipeline will run, in order
    pub fn enabled_stages(&self) -> impl Iterator<Item = FilterStage> + '_ {
        FilterStage::ORDER
            .into_iter()
            .filter(|stage| stage.is_enabled(&self.config))
    }

    /**
    Run the enabled stages over a bare peak list.

    Returns the filtered peaks, or the reason the list was emptied along with the stage
    that emptied it. Nothing runs after a stage that leaves the list empty.

    Each stage is idempotent on its own. The whole run is too, except when the m/z range
    stage drops the base peak after intensities were normalized: a second run then rescales
    the remaining peaks against the new base peak.
    */
    pub fn filter_peaks(
        &self,
        mut peaks: PeakList,
        precursor_mz: Option<f64>,
    ) -> Result<PeakList, (FilterStage, DeletionReason)> {
        for stage in self.enabled_stages() {
            peaks = stage.apply(peaks, precursor_mz, &self.config);
            if peaks.is_empty() {
                return Err((stage, stage.deletion_reason()));
            }
        }
        Ok(peaks)
    }

    /// Filter one record's peaks in place. A record whose peaks are emptied is pushed to
    /// `report` and `None` is returned.
    pub fn apply(
        &self,
        mut record: CanonicalRecord,
        report: &DeletionReport,
    ) -> Option<CanonicalRecord> {
        let precursor_mz = record.precursor_mz();
        let peaks = std::mem::take(&mut record.peaks);
        match self.filter_peaks(peaks, precursor_mz) {
            Ok(peaks) => {
                record.peaks = peaks;
                record.update_peak_count();
                Some(record)
            }
            Err((stage, reason)) => {
                debug!(
                    "Deleting {} at {stage:?}: {reason}",
                    record.text(CanonicalKey::Name).unwrap_or("unnamed spectrum")
                );
                record.update_peak_count();
                report.push(DeletionRecord::new(record, reason));
                None
            }
        }
    }
}
