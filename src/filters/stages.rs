//! The individual peak list transformations. Each stage only ever removes peaks or
//! rescales intensities, so running a stage twice gives the same result as running it once.
use std::cmp::Ordering;

use crate::record::PeakList;

use super::{DeletionReason, FilterConfig};

/// The intensity the most intense peak is rescaled to
pub const INTENSITY_REFERENCE: f64 = 100.0;

/// The filter stages, in the only order they can run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
    MinimumPeaks,
    AbovePrecursor,
    ReducePeaks,
    NormalizeIntensity,
    MzRange,
    HighPeaks,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 6] = [
        Self::MinimumPeaks,
        Self::AbovePrecursor,
        Self::ReducePeaks,
        Self::NormalizeIntensity,
        Self::MzRange,
        Self::HighPeaks,
    ];

    pub fn is_enabled(&self, config: &FilterConfig) -> bool {
        match self {
            Self::MinimumPeaks => config.check_minimum_peaks,
            Self::AbovePrecursor => config.remove_peaks_above_precursor_mz,
            Self::ReducePeaks => config.reduce_peak_list,
            Self::NormalizeIntensity => config.normalize_intensity,
            Self::MzRange => config.keep_mz_in_range,
            Self::HighPeaks => config.check_minimum_high_peaks,
        }
    }

    /// The reason recorded when this stage empties a peak list
    pub fn deletion_reason(&self) -> DeletionReason {
        match self {
            Self::MinimumPeaks => DeletionReason::TooFewPeaks,
            Self::AbovePrecursor => DeletionReason::AllAbovePrecursor,
            Self::ReducePeaks => DeletionReason::ReducedToNothing,
            Self::NormalizeIntensity => DeletionReason::DegenerateIntensity,
            Self::MzRange => DeletionReason::OutOfMzRange,
            Self::HighPeaks => DeletionReason::NotEnoughHighPeaks,
        }
    }

    pub fn apply(
        &self,
        peaks: PeakList,
        precursor_mz: Option<f64>,
        config: &FilterConfig,
    ) -> PeakList {
        match self {
            Self::MinimumPeaks => minimum_peaks(peaks, config.minimum_peaks),
            Self::AbovePrecursor => match precursor_mz {
                Some(precursor_mz) => remove_above_precursor(peaks, precursor_mz),
                None => peaks,
            },
            Self::ReducePeaks => reduce_peak_list(peaks, config.max_peaks),
            Self::NormalizeIntensity => normalize_intensity(peaks),
            Self::MzRange => keep_mz_in_range(peaks, config.mz_from, config.mz_to),
            Self::HighPeaks => minimum_high_peaks(
                peaks,
                config.high_peak_intensity_percent,
                config.minimum_high_peaks,
            ),
        }
    }
}

/// Empty the list if it holds fewer than `minimum` peaks
pub fn minimum_peaks(peaks: PeakList, minimum: usize) -> PeakList {
    if peaks.len() < minimum {
        PeakList::new()
    } else {
        peaks
    }
}

pub fn remove_above_precursor(mut peaks: PeakList, precursor_mz: f64) -> PeakList {
    peaks.retain(|p| p.mz <= precursor_mz);
    peaks
}

/// Keep the `max_peaks` most intense peaks in their original order. Ties in intensity
/// go to the peak that appeared first.
pub fn reduce_peak_list(peaks: PeakList, max_peaks: usize) -> PeakList {
    if peaks.len() <= max_peaks {
        return peaks;
    }
    let mut ranked: Vec<usize> = (0..peaks.len()).collect();
    ranked.sort_by(|a, b| {
        peaks[*b]
            .intensity
            .partial_cmp(&peaks[*a].intensity)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });
    ranked.truncate(max_peaks);
    ranked.sort_unstable();
    ranked.into_iter().map(|i| peaks[i]).collect()
}

/// Rescale intensities so the most intense peak is [`INTENSITY_REFERENCE`]. A list with
/// no positive intensity cannot be rescaled and comes back empty.
pub fn normalize_intensity(mut peaks: PeakList) -> PeakList {
    let max = peaks.iter().map(|p| p.intensity).fold(0.0, f64::max);
    if max <= 0.0 || !max.is_finite() {
        return PeakList::new();
    }
    if max == INTENSITY_REFERENCE {
        return peaks;
    }
    for peak in peaks.iter_mut() {
        peak.intensity = peak.intensity / max * INTENSITY_REFERENCE;
    }
    peaks
}

/// Keep peaks with `mz_from <= mz <= mz_to`
pub fn keep_mz_in_range(mut peaks: PeakList, mz_from: f64, mz_to: f64) -> PeakList {
    peaks.retain(|p| p.mz >= mz_from && p.mz <= mz_to);
    peaks
}

/// Empty the list unless at least `minimum` peaks are more intense than
/// `intensity_percent` of the most intense peak
pub fn minimum_high_peaks(peaks: PeakList, intensity_percent: f64, minimum: usize) -> PeakList {
    let max = peaks.iter().map(|p| p.intensity).fold(0.0, f64::max);
    let threshold = max * intensity_percent / 100.0;
    let n_high = peaks.iter().filter(|p| p.intensity > threshold).count();
    if n_high < minimum {
        PeakList::new()
    } else {
        peaks
    }
}
