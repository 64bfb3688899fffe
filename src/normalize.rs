//! Map a [`RawRecord`] onto the canonical schema.
//!
//! Field names go through the [`KeySynonyms`](crate::reference::KeySynonyms) table and
//! unknown names are dropped. Values are then rewritten per canonical field by the
//! functions in [`values`].
use log::trace;

use crate::patterns;
use crate::record::{CanonicalKey, CanonicalRecord, FieldValue, IonMode, RawRecord};
use crate::reference::ReferenceData;

pub mod values;

/// Source field names that carry their unit in the name rather than the value
const UNIT_BEARING_KEYS: &[(&str, CanonicalKey, &str)] = &[
    ("rtinseconds", CanonicalKey::RetentionTime, "s"),
    ("rtinminutes", CanonicalKey::RetentionTime, "min"),
    ("retention time seconds", CanonicalKey::RetentionTime, "s"),
];

/// Normalizes records against a shared, read-only [`ReferenceData`]
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    reference: &'a ReferenceData,
}

impl<'a> Normalizer<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    /// Map a source field name to its canonical key, if there is one
    pub fn normalize_key(&self, name: &str) -> Option<CanonicalKey> {
        self.reference.keys.get(name)
    }

    /// Normalize one value for `key`. `ion_mode` selects the adduct table and is only
    /// consulted for [`CanonicalKey::PrecursorType`].
    pub fn normalize_value(
        &self,
        key: CanonicalKey,
        value: &str,
        ion_mode: Option<IonMode>,
    ) -> FieldValue {
        let value = patterns::strip_value_quotes(value.trim()).trim();
        if patterns::is_empty_value(value) {
            return FieldValue::Absent;
        }
        match key {
            CanonicalKey::PrecursorType => {
                values::adduct(value, ion_mode, &self.reference.adducts)
            }
            CanonicalKey::IonMode => values::ion_mode(value),
            CanonicalKey::RetentionTime => values::retention_time(value),
            CanonicalKey::MsLevel => values::ms_level(value),
            CanonicalKey::PrecursorMz | CanonicalKey::ExactMass | CanonicalKey::AverageMass => {
                values::mass(value)
            }
            CanonicalKey::Ionization => values::ionization(value),
            CanonicalKey::Inchi => values::inchi(value),
            CanonicalKey::Smiles => values::smiles(value),
            CanonicalKey::InchiKey => values::inchikey(value),
            CanonicalKey::Predicted => values::predicted(value),
            _ => FieldValue::Cleaned(value.to_string()),
        }
    }

    /// Resolve the canonical key and the value text to normalize for a raw field
    fn route_field<'v>(&self, name: &str, value: &'v str) -> Option<(CanonicalKey, std::borrow::Cow<'v, str>)> {
        let form = patterns::clean_field_name(name).to_lowercase();
        if let Some((_, key, unit)) = UNIT_BEARING_KEYS.iter().find(|(k, _, _)| *k == form) {
            return Some((*key, format!("{} {unit}", value.trim()).into()));
        }
        self.normalize_key(name).map(|key| (key, value.into()))
    }

    /// Normalize a whole record.
    ///
    /// When a canonical key is produced by more than one source field, the first value
    /// that is not absent wins.
    pub fn normalize(&self, raw: RawRecord) -> CanonicalRecord {
        let RawRecord { fields, peaks } = raw;
        let mut routed = Vec::with_capacity(fields.len());
        for (name, value) in fields.iter() {
            match self.route_field(name, value) {
                Some((CanonicalKey::PeaksList, _)) => {}
                Some(pair) => routed.push(pair),
                None => trace!("Dropping unmapped field {name}"),
            }
        }

        let mut record = CanonicalRecord::new(peaks);

        // Polarity first, the adduct tables depend on it
        for (key, value) in routed.iter().filter(|(k, _)| *k == CanonicalKey::IonMode) {
            record.set_if_absent(*key, self.normalize_value(*key, value, None));
        }
        let ion_mode = record.ion_mode();

        for (key, value) in routed.iter().filter(|(k, _)| *k != CanonicalKey::IonMode) {
            record.set_if_absent(*key, self.normalize_value(*key, value, ion_mode));
        }

        self.fill_instrument_type(&mut record);
        self.fill_predicted(&mut record);
        record.update_peak_count();
        record
    }

    fn fill_instrument_type(&self, record: &mut CanonicalRecord) {
        if record.text(CanonicalKey::InstrumentType).is_some() {
            return;
        }
        let category = record
            .text(CanonicalKey::Instrument)
            .and_then(|name| self.reference.instruments.classify(name));
        if let Some(category) = category {
            record.set(CanonicalKey::InstrumentType, FieldValue::Normalized(category));
        }
    }

    fn fill_predicted(&self, record: &mut CanonicalRecord) {
        if record.text(CanonicalKey::Predicted).is_some() {
            return;
        }
        let in_silico = record
            .iter()
            .filter(|(k, _)| k.is_descriptive())
            .filter_map(|(_, v)| v.as_str())
            .any(patterns::is_in_silico);
        if in_silico {
            record.set(
                CanonicalKey::Predicted,
                FieldValue::Normalized("true".to_string()),
            );
        }
    }
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;

    use super::*;
    use crate::record::Peak;

    fn raw(fields: &[(&str, &str)]) -> RawRecord {
        let fields: IndexMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawRecord::new(fields, vec![Peak::new(50.0, 10.0)])
    }

    #[test]
    fn test_normalize_record() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let record = normalizer.normalize(raw(&[
            ("Name", "Caffeine"),
            ("PrecursorMZ", "195,0877"),
            ("Precursor_type", "[M+H]+"),
            ("Ion_mode", "P"),
            ("InChIKey", "rywdnqxbnxvfoq-uhfffaoysa-n"),
            ("Instrument", "Orbitrap Fusion"),
            ("Retention time", "90 sec"),
            ("favourite colour", "blue"),
            ("SMILES", "N/A"),
        ]));

        assert_eq!(record.text(CanonicalKey::Name), Some("Caffeine"));
        assert_eq!(record.precursor_mz(), Some(195.0877));
        assert_eq!(record.ion_mode(), Some(IonMode::Positive));
        assert_eq!(record.text(CanonicalKey::PrecursorType), Some("[M+H]+"));
        assert_eq!(
            record.text(CanonicalKey::InchiKey),
            Some("RYWDNQXBNXVFOQ-UHFFFAOYSA-N")
        );
        assert_eq!(record.text(CanonicalKey::InstrumentType), Some("LC-ESI-ITFT"));
        assert_eq!(record.text(CanonicalKey::RetentionTime), Some("1.5"));
        assert_eq!(record.get(CanonicalKey::Smiles), Some(&FieldValue::Absent));
        assert_eq!(record.text(CanonicalKey::NumPeaks), Some("1"));
        assert!(record.iter().all(|(k, _)| *k != CanonicalKey::PeaksList));
    }

    #[test]
    fn test_comment_value_replaces_placeholder() {
        use crate::io::BlockLayout;

        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let raw = BlockLayout::MSP
            .parse_block("Name: Ethyl acetate\nSMILES: N/A\nComment: \"SMILES=CC(=O)OCC\"\n43 100\n")
            .unwrap();
        assert_eq!(raw.get("SMILES"), Some("CC(=O)OCC"));
        let record = normalizer.normalize(raw);
        assert_eq!(record.text(CanonicalKey::Smiles), Some("CC(=O)OCC"));
    }

    #[test]
    fn test_canonical_keys_are_idempotent() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        for key in CanonicalKey::ALL {
            assert_eq!(normalizer.normalize_key(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_first_present_value_wins() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let record = normalizer.normalize(raw(&[
            ("TITLE", "unknown"),
            ("NAME", "Glucose"),
            ("compound_name", "Dextrose"),
        ]));
        assert_eq!(record.text(CanonicalKey::Name), Some("Glucose"));
    }

    #[test]
    fn test_unit_bearing_keys() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let record = normalizer.normalize(raw(&[("RTINSECONDS", "120")]));
        assert_eq!(record.text(CanonicalKey::RetentionTime), Some("2"));

        let record = normalizer.normalize(raw(&[("RT", "7.5")]));
        assert_eq!(
            record.get(CanonicalKey::RetentionTime),
            Some(&FieldValue::Cleaned("7.5".to_string()))
        );
    }

    #[test]
    fn test_adduct_uses_charge_when_polarity_missing() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let record = normalizer.normalize(raw(&[("ADDUCT", "[M-H]-")]));
        assert_eq!(record.text(CanonicalKey::PrecursorType), Some("[M-H]-"));
        assert_eq!(record.ion_mode(), None);

        let record = normalizer.normalize(raw(&[("ADDUCT", "[M+Xe]+"), ("IONMODE", "positive")]));
        assert_eq!(
            record.get(CanonicalKey::PrecursorType),
            Some(&FieldValue::Cleaned("M+Xe".to_string()))
        );
    }

    #[test]
    fn test_predicted_inferred_from_text() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let record = normalizer.normalize(raw(&[("Comment", "in-silico MS/MS by CFM-ID")]));
        assert_eq!(record.text(CanonicalKey::Predicted), Some("true"));

        let record = normalizer.normalize(raw(&[("Comment", "measured"), ("predicted", "false")]));
        assert_eq!(record.text(CanonicalKey::Predicted), Some("false"));
    }
}
