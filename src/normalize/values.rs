//! Value normalizers, one per canonical field that has a canonical form.
//!
//! Each takes a value that has already been trimmed, unquoted and checked against the
//! empty sentinels, and never fails: a value that cannot be recognized comes back as
//! [`FieldValue::Cleaned`].
use crate::patterns;
use crate::record::{FieldValue, IonMode};
use crate::reference::AdductTables;

/// Strip the decoration from an adduct and resolve it against the table for the record's
/// ion mode. Without a known ion mode the adduct's own trailing charge picks the table.
pub fn adduct(value: &str, ion_mode: Option<IonMode>, tables: &AdductTables) -> FieldValue {
    let cleaned = patterns::clean_adduct(value);
    if cleaned.is_empty() {
        return FieldValue::Absent;
    }
    let mode = ion_mode.or_else(|| patterns::adduct_charge_sign(value));
    let resolved = match mode {
        Some(mode) => tables.resolve(mode, &cleaned),
        None => tables
            .resolve(IonMode::Positive, &cleaned)
            .or_else(|| tables.resolve(IonMode::Negative, &cleaned)),
    };
    match resolved {
        Some(canonical) => FieldValue::Normalized(canonical.to_string()),
        None => FieldValue::Cleaned(cleaned),
    }
}

pub fn ion_mode(value: &str) -> FieldValue {
    match patterns::ion_mode(value) {
        Some(mode) => FieldValue::Normalized(mode.as_str().to_string()),
        None => FieldValue::Absent,
    }
}

/// Convert to minutes. A number without a unit is kept as a cleaned number, since the
/// unit is unknown rather than implied.
pub fn retention_time(value: &str) -> FieldValue {
    match patterns::retention_time(value) {
        Some((time, Some(unit))) => FieldValue::Normalized(unit.to_minutes(time).to_string()),
        Some((time, None)) => FieldValue::Cleaned(time.to_string()),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn ms_level(value: &str) -> FieldValue {
    match patterns::ms_level(value) {
        Some(level) => FieldValue::Normalized(level.to_string()),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

/// Reduce a mass to its first number, so `PEPMASS=445.12 12000` becomes `445.12`
pub fn mass(value: &str) -> FieldValue {
    match patterns::first_number(value) {
        Some(mass) if mass.is_finite() => FieldValue::Normalized(mass.to_string()),
        _ => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn ionization(value: &str) -> FieldValue {
    match patterns::ionization_technique(value) {
        Some(technique) => FieldValue::Normalized(technique.to_string()),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn inchi(value: &str) -> FieldValue {
    match patterns::repair_inchi(value) {
        Some(inchi) => FieldValue::Normalized(inchi),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn smiles(value: &str) -> FieldValue {
    match patterns::repair_smiles(value) {
        Some(smiles) => FieldValue::Normalized(smiles),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn inchikey(value: &str) -> FieldValue {
    match patterns::inchikey(value) {
        Some(key) => FieldValue::Normalized(key),
        None => FieldValue::Cleaned(value.to_string()),
    }
}

pub fn predicted(value: &str) -> FieldValue {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => FieldValue::Normalized("true".to_string()),
        "false" | "no" => FieldValue::Normalized("false".to_string()),
        _ if patterns::is_in_silico(value) => FieldValue::Normalized("true".to_string()),
        _ => FieldValue::Cleaned(value.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reference::ReferenceData;

    #[test]
    fn test_adduct_tables_by_mode() {
        let reference = ReferenceData::builtin();
        let tables = &reference.adducts;
        assert_eq!(
            adduct("M+H", Some(IonMode::Positive), tables),
            FieldValue::Normalized("[M+H]+".to_string())
        );
        assert_eq!(
            adduct("(M+Na)+", None, tables),
            FieldValue::Normalized("[M+Na]+".to_string())
        );
        assert_eq!(
            adduct("M+FA-H", Some(IonMode::Negative), tables),
            FieldValue::Normalized("[M+HCOO]-".to_string())
        );
        assert_eq!(
            adduct("[M+H]+", Some(IonMode::Negative), tables),
            FieldValue::Cleaned("M+H".to_string())
        );
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(ion_mode("Positive"), FieldValue::Normalized("positive".into()));
        assert_eq!(ion_mode("both"), FieldValue::Absent);
        assert_eq!(retention_time("1500 ms"), FieldValue::Normalized("0.025".into()));
        assert_eq!(retention_time("2 mins"), FieldValue::Normalized("2".into()));
        assert_eq!(retention_time("3,5"), FieldValue::Cleaned("3.5".into()));
        assert_eq!(ms_level("MS2"), FieldValue::Normalized("2".into()));
        assert_eq!(mass("445,12 12000"), FieldValue::Normalized("445.12".into()));
        assert_eq!(mass("heavy"), FieldValue::Cleaned("heavy".into()));
        assert_eq!(ionization("LC-ACPI-QTOF"), FieldValue::Normalized("APCI".into()));
        assert_eq!(predicted("Yes"), FieldValue::Normalized("true".into()));
        assert_eq!(predicted("maybe"), FieldValue::Cleaned("maybe".into()));
    }
}
