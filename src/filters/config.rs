use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors raised when building or checking a [`FilterConfig`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterConfigError {
    #[error("Unknown filter parameter: {0}")]
    UnknownParameter(String),
    #[error("Invalid value {value} for filter parameter {key}")]
    InvalidValue { key: String, value: f64 },
    #[error("The m/z range lower bound {0} is greater than the upper bound {1}")]
    InvertedMzRange(f64, f64),
    #[error("The high peak intensity percentage {0} is outside of 0 to 100")]
    PercentOutOfRange(f64),
}

/**
Which peak filter stages run, and with what parameters.

Every field also accepts the parameter name used by the desktop application's settings
files, so an exported settings file can be loaded directly. Those files
encode switches as `1.0`/`0.0` and counts as floats, which are accepted as well.
*/
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    #[cfg_attr(
        feature = "serde",
        serde(alias = "check_minimum_peak_requiered", deserialize_with = "de::flag")
    )]
    pub check_minimum_peaks: bool,
    #[cfg_attr(
        feature = "serde",
        serde(alias = "check_minimum_peak_requiered_n_peaks", deserialize_with = "de::count")
    )]
    pub minimum_peaks: usize,

    #[cfg_attr(
        feature = "serde",
        serde(alias = "remove_peak_above_precursormz", deserialize_with = "de::flag")
    )]
    pub remove_peaks_above_precursor_mz: bool,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::flag"))]
    pub reduce_peak_list: bool,
    #[cfg_attr(
        feature = "serde",
        serde(alias = "reduce_peak_list_max_peaks", deserialize_with = "de::count")
    )]
    pub max_peaks: usize,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::flag"))]
    pub normalize_intensity: bool,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::flag"))]
    pub keep_mz_in_range: bool,
    #[cfg_attr(feature = "serde", serde(alias = "keep_mz_in_range_from_mz"))]
    pub mz_from: f64,
    #[cfg_attr(feature = "serde", serde(alias = "keep_mz_in_range_to_mz"))]
    pub mz_to: f64,

    #[cfg_attr(
        feature = "serde",
        serde(alias = "check_minimum_of_high_peaks_requiered", deserialize_with = "de::flag")
    )]
    pub check_minimum_high_peaks: bool,
    #[cfg_attr(
        feature = "serde",
        serde(alias = "check_minimum_of_high_peaks_requiered_intensity_percent")
    )]
    pub high_peak_intensity_percent: f64,
    #[cfg_attr(
        feature = "serde",
        serde(
            alias = "check_minimum_of_high_peaks_requiered_no_peaks",
            deserialize_with = "de::count"
        )
    )]
    pub minimum_high_peaks: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            check_minimum_peaks: true,
            minimum_peaks: 3,
            remove_peaks_above_precursor_mz: true,
            reduce_peak_list: true,
            max_peaks: 500,
            normalize_intensity: true,
            keep_mz_in_range: true,
            mz_from: 50.0,
            mz_to: 2000.0,
            check_minimum_high_peaks: true,
            high_peak_intensity_percent: 5.0,
            minimum_high_peaks: 2,
        }
    }
}

impl FilterConfig {
    /// The default parameters with every stage switched off
    pub fn disabled() -> Self {
        Self {
            check_minimum_peaks: false,
            remove_peaks_above_precursor_mz: false,
            reduce_peak_list: false,
            normalize_intensity: false,
            keep_mz_in_range: false,
            check_minimum_high_peaks: false,
            ..Default::default()
        }
    }

    /// Set one parameter from the flat numeric parameter dictionary used by the desktop
    /// application. Switches are on only for exactly `1.0`.
    pub fn set_parameter(&mut self, key: &str, value: f64) -> Result<(), FilterConfigError> {
        let as_count = |value: f64| -> Result<usize, FilterConfigError> {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(FilterConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                })
            }
        };
        match key {
            "check_minimum_peak_requiered" | "check_minimum_peaks" => {
                self.check_minimum_peaks = value == 1.0
            }
            "check_minimum_peak_requiered_n_peaks" | "minimum_peaks" => {
                self.minimum_peaks = as_count(value)?
            }
            "remove_peak_above_precursormz" | "remove_peaks_above_precursor_mz" => {
                self.remove_peaks_above_precursor_mz = value == 1.0
            }
            "reduce_peak_list" => self.reduce_peak_list = value == 1.0,
            "reduce_peak_list_max_peaks" | "max_peaks" => match as_count(value)? {
                0 => {
                    return Err(FilterConfigError::InvalidValue {
                        key: key.to_string(),
                        value,
                    })
                }
                n => self.max_peaks = n,
            },
            "normalize_intensity" => self.normalize_intensity = value == 1.0,
            "keep_mz_in_range" => self.keep_mz_in_range = value == 1.0,
            "keep_mz_in_range_from_mz" | "mz_from" => self.mz_from = value,
            "keep_mz_in_range_to_mz" | "mz_to" => self.mz_to = value,
            "check_minimum_of_high_peaks_requiered" | "check_minimum_high_peaks" => {
                self.check_minimum_high_peaks = value == 1.0
            }
            "check_minimum_of_high_peaks_requiered_intensity_percent"
            | "high_peak_intensity_percent" => self.high_peak_intensity_percent = value,
            "check_minimum_of_high_peaks_requiered_no_peaks" | "minimum_high_peaks" => {
                self.minimum_high_peaks = as_count(value)?
            }
            _ => return Err(FilterConfigError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    /// Build a configuration from `(key, value)` pairs of the flat parameter dictionary,
    /// starting from [`FilterConfig::disabled`]
    pub fn from_parameters<'a, I: IntoIterator<Item = (&'a str, f64)>>(
        parameters: I,
    ) -> Result<Self, FilterConfigError> {
        let mut config = Self::disabled();
        for (key, value) in parameters {
            config.set_parameter(key, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FilterConfigError> {
        if self.mz_from.is_nan() || self.mz_to.is_nan() || self.mz_from > self.mz_to {
            return Err(FilterConfigError::InvertedMzRange(self.mz_from, self.mz_to));
        }
        if !(0.0..=100.0).contains(&self.high_peak_intensity_percent) {
            return Err(FilterConfigError::PercentOutOfRange(
                self.high_peak_intensity_percent,
            ));
        }
        // Reducing to zero peaks would delete every spectrum
        if self.max_peaks == 0 {
            return Err(FilterConfigError::InvalidValue {
                key: "max_peaks".to_string(),
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Bool(bool),
        Number(f64),
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Numeric::deserialize(deserializer)? {
            Numeric::Bool(b) => Ok(b),
            Numeric::Number(v) => Ok(v == 1.0),
        }
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        match Numeric::deserialize(deserializer)? {
            Numeric::Number(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => {
                Ok(v as usize)
            }
            Numeric::Number(v) => Err(serde::de::Error::custom(format!(
                "expected a non-negative whole number, got {v}"
            ))),
            Numeric::Bool(b) => Err(serde::de::Error::custom(format!(
                "expected a number, got {b}"
            ))),
        }
    }
}
