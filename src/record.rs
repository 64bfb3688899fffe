//! The record types that flow through the pipeline.
//!
//! A [`RawRecord`] is what a format parser pulls out of one spectrum entry, with field
//! names exactly as written in the source. A [`CanonicalRecord`] is the same spectrum
//! after normalization, keyed by [`CanonicalKey`].
use std::fmt::Display;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::patterns;

mod keys;

pub use keys::{CanonicalKey, UnknownCanonicalKey};

/// A single (m/z, intensity) pair
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
}

impl Peak {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }

    /// Build a peak only if both coordinates are finite and non-negative.
    ///
    /// Peaks that fail this check are dropped by every parser rather than coerced.
    pub fn checked(mz: f64, intensity: f64) -> Option<Self> {
        (mz.is_finite() && intensity.is_finite() && mz >= 0.0 && intensity >= 0.0)
            .then_some(Self { mz, intensity })
    }
}

impl Display for Peak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.mz, self.intensity)
    }
}

impl From<(f64, f64)> for Peak {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

pub type PeakList = Vec<Peak>;

/// A spectrum entry as found in the source text: an ordered map of field names to
/// values and the parsed peak list.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRecord {
    pub fields: IndexMap<String, String>,
    pub peaks: PeakList,
}

impl RawRecord {
    pub fn new(fields: IndexMap<String, String>, peaks: PeakList) -> Self {
        Self { fields, peaks }
    }

    /// Add a field. For a repeated name the first value is kept, unless it is an empty
    /// placeholder like `N/A` and the new value is not.
    pub fn add_field<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let value = value.into();
        match self.fields.entry(key.into()) {
            Entry::Occupied(mut entry) => {
                if patterns::is_empty_value(entry.get()) && !patterns::is_empty_value(&value) {
                    entry.insert(value);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.peaks.is_empty()
    }
}

/// The polarity a spectrum was acquired in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IonMode {
    Positive,
    Negative,
}

impl IonMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IonMode::Positive => "positive",
            IonMode::Negative => "negative",
        }
    }
}

impl Display for IonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
The outcome of normalizing one field value.

Normalization is total: every input lands in exactly one of these states.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// The value was recognized and rewritten into its canonical form
    Normalized(String),
    /// The value was cleaned up but could not be mapped onto a canonical form
    Cleaned(String),
    /// The value was one of the "empty" sentinels like `N/A` or `unknown`
    Absent,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Normalized(s) | FieldValue::Cleaned(s) => Some(s),
            FieldValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, FieldValue::Normalized(_))
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str().unwrap_or_default())
    }
}

/// A spectrum expressed in the canonical schema.
///
/// `PEAKS_LIST` is stored separately from the metadata fields as a typed
/// [`PeakList`]; it is never present in [`CanonicalRecord::fields`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanonicalRecord {
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    fields: IndexMap<CanonicalKey, FieldValue>,
    pub peaks: PeakList,
}

impl CanonicalRecord {
    pub fn new(peaks: PeakList) -> Self {
        Self {
            fields: IndexMap::new(),
            peaks,
        }
    }

    /// Set `key` to `value`, replacing any previous value. [`CanonicalKey::PeaksList`]
    /// cannot be set this way and is ignored.
    pub fn set(&mut self, key: CanonicalKey, value: FieldValue) -> Option<FieldValue> {
        if key == CanonicalKey::PeaksList {
            return None;
        }
        self.fields.insert(key, value)
    }

    /// Set `key` unless it already holds a non-absent value
    pub fn set_if_absent(&mut self, key: CanonicalKey, value: FieldValue) {
        match self.fields.get(&key) {
            Some(existing) if !existing.is_absent() => {}
            _ => {
                self.set(key, value);
            }
        }
    }

    pub fn get(&self, key: CanonicalKey) -> Option<&FieldValue> {
        self.fields.get(&key)
    }

    /// The text of `key`, if it is present and not absent
    pub fn text(&self, key: CanonicalKey) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn remove(&mut self, key: CanonicalKey) -> Option<FieldValue> {
        self.fields.shift_remove(&key)
    }

    pub fn contains_key(&self, key: CanonicalKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The precursor m/z, only when it was successfully normalized to a number
    pub fn precursor_mz(&self) -> Option<f64> {
        match self.get(CanonicalKey::PrecursorMz)? {
            FieldValue::Normalized(v) => v.parse().ok(),
            _ => None,
        }
    }

    pub fn ion_mode(&self) -> Option<IonMode> {
        match self.text(CanonicalKey::IonMode)? {
            "positive" => Some(IonMode::Positive),
            "negative" => Some(IonMode::Negative),
            _ => None,
        }
    }

    /// Keep `NUM PEAKS` in sync with the peak list
    pub fn update_peak_count(&mut self) {
        let n = self.peaks.len();
        self.set(CanonicalKey::NumPeaks, FieldValue::Normalized(n.to_string()));
    }
}
