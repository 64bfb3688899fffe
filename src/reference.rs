//! Immutable lookup tables consumed by the parsers and the [`Normalizer`](crate::Normalizer).
//!
//! These are constructed once, explicitly, and shared by reference. Loading them from
//! disk is left to the caller; the [`ReferenceData::builtin`] set covers the common
//! spellings and is what the command line tool uses.
use std::collections::HashMap;
use std::fmt::Debug;

use crate::patterns;
use crate::record::{CanonicalKey, IonMode};

mod builtin;
mod instruments;

pub use instruments::{InstrumentClassifier, InstrumentTree};

/// Normalize a field name into its lookup form
fn lookup_form(name: &str) -> String {
    patterns::clean_field_name(name).to_lowercase()
}

/**
A many-to-one mapping from field name spellings to [`CanonicalKey`].

Lookups ignore case and surrounding punctuation. Every canonical name maps to itself,
so looking up an already canonical name is a no-op.
*/
#[derive(Debug, Clone)]
pub struct KeySynonyms {
    synonyms: HashMap<String, CanonicalKey>,
}

impl Default for KeySynonyms {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySynonyms {
    /// A table that only knows the canonical names themselves
    pub fn new() -> Self {
        let synonyms = CanonicalKey::ALL
            .iter()
            .map(|k| (lookup_form(k.as_str()), *k))
            .collect();
        Self { synonyms }
    }

    pub fn insert<S: AsRef<str>>(&mut self, synonym: S, key: CanonicalKey) -> Option<CanonicalKey> {
        let form = lookup_form(synonym.as_ref());
        if form.is_empty() {
            return None;
        }
        self.synonyms.insert(form, key)
    }

    pub fn get(&self, name: &str) -> Option<CanonicalKey> {
        self.synonyms.get(&lookup_form(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, CanonicalKey)> for KeySynonyms {
    fn from_iter<T: IntoIterator<Item = (S, CanonicalKey)>>(iter: T) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<S: AsRef<str>> Extend<(S, CanonicalKey)> for KeySynonyms {
    fn extend<T: IntoIterator<Item = (S, CanonicalKey)>>(&mut self, iter: T) {
        for (synonym, key) in iter {
            self.insert(synonym, key);
        }
    }
}

/// Known adduct spellings for one ion mode, and the mass difference of each canonical adduct
#[derive(Debug, Default, Clone)]
pub struct AdductTable {
    synonyms: HashMap<String, String>,
    mass_differences: HashMap<String, f64>,
}

impl AdductTable {
    /// Register `known` as a spelling of `canonical`. Both are reduced with
    /// [`patterns::clean_adduct`] for lookup, so `[M+H]+` and `M+H` are the same spelling.
    pub fn insert(&mut self, known: &str, canonical: &str, mass_difference: Option<f64>) {
        self.synonyms
            .insert(patterns::clean_adduct(known), canonical.to_string());
        self.synonyms
            .entry(patterns::clean_adduct(canonical))
            .or_insert_with(|| canonical.to_string());
        if let Some(delta) = mass_difference {
            self.mass_differences.insert(canonical.to_string(), delta);
        }
    }

    /// Resolve an already cleaned adduct to its canonical spelling
    pub fn resolve(&self, cleaned: &str) -> Option<&str> {
        self.synonyms.get(cleaned).map(|s| s.as_str())
    }

    pub fn mass_difference(&self, canonical: &str) -> Option<f64> {
        self.mass_differences.get(canonical).copied()
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

/// Adduct tables split by ion mode
#[derive(Debug, Default, Clone)]
pub struct AdductTables {
    pub positive: AdductTable,
    pub negative: AdductTable,
}

impl AdductTables {
    pub fn table(&self, mode: IonMode) -> &AdductTable {
        match mode {
            IonMode::Positive => &self.positive,
            IonMode::Negative => &self.negative,
        }
    }

    pub fn table_mut(&mut self, mode: IonMode) -> &mut AdductTable {
        match mode {
            IonMode::Positive => &mut self.positive,
            IonMode::Negative => &mut self.negative,
        }
    }

    pub fn insert(
        &mut self,
        mode: IonMode,
        known: &str,
        canonical: &str,
        mass_difference: Option<f64>,
    ) {
        self.table_mut(mode).insert(known, canonical, mass_difference)
    }

    pub fn resolve(&self, mode: IonMode, cleaned: &str) -> Option<&str> {
        self.table(mode).resolve(cleaned)
    }

    pub fn mass_difference(&self, mode: IonMode, canonical: &str) -> Option<f64> {
        self.table(mode).mass_difference(canonical)
    }
}

/// Every lookup structure the normalizer needs, built once and shared read-only
pub struct ReferenceData {
    pub keys: KeySynonyms,
    pub adducts: AdductTables,
    pub instruments: Box<dyn InstrumentClassifier>,
}

impl Debug for ReferenceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceData")
            .field("keys", &self.keys.len())
            .field("adducts.positive", &self.adducts.positive.len())
            .field("adducts.negative", &self.adducts.negative.len())
            .finish()
    }
}

impl ReferenceData {
    pub fn new(
        keys: KeySynonyms,
        adducts: AdductTables,
        instruments: Box<dyn InstrumentClassifier>,
    ) -> Self {
        Self {
            keys,
            adducts,
            instruments,
        }
    }

    /// The built-in tables covering common MSP, MGF and MoNA spellings
    pub fn builtin() -> Self {
        Self::new(
            builtin::key_synonyms(),
            builtin::adduct_tables(),
            Box::new(builtin::instrument_tree()),
        )
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_lookup() {
        let keys = KeySynonyms::from_iter([("Precursor m/z", CanonicalKey::PrecursorMz)]);
        assert_eq!(keys.get("precursor m/z"), Some(CanonicalKey::PrecursorMz));
        assert_eq!(keys.get("  PRECURSOR M/Z: "), Some(CanonicalKey::PrecursorMz));
        assert_eq!(keys.get("PRECURSORMZ"), Some(CanonicalKey::PrecursorMz));
        assert_eq!(keys.get("NUM PEAKS"), Some(CanonicalKey::NumPeaks));
        assert_eq!(keys.get("favourite colour"), None);
    }

    #[test]
    fn test_canonical_names_are_fixed_points() {
        let reference = ReferenceData::builtin();
        for key in CanonicalKey::ALL {
            assert_eq!(reference.keys.get(key.as_str()), Some(key), "{key}");
        }
    }

    #[test]
    fn test_adduct_tables() {
        let mut tables = AdductTables::default();
        tables.insert(IonMode::Positive, "[M+H]+", "[M+H]+", Some(1.007276));
        tables.insert(IonMode::Positive, "M+H+", "[M+H]+", None);
        tables.insert(IonMode::Negative, "M-H", "[M-H]-", Some(-1.007276));

        assert_eq!(tables.resolve(IonMode::Positive, "M+H"), Some("[M+H]+"));
        assert_eq!(tables.resolve(IonMode::Negative, "M+H"), None);
        assert_eq!(tables.resolve(IonMode::Negative, "M-H"), Some("[M-H]-"));
        assert_eq!(
            tables.mass_difference(IonMode::Positive, "[M+H]+"),
            Some(1.007276)
        );
        assert_eq!(tables.mass_difference(IonMode::Negative, "[M+H]+"), None);
    }
}
