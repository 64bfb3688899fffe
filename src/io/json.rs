//! Reading JSON spectral records, including MassBank of North America (MoNA) exports.
//!
//! A MoNA record nests its metadata in lists of `{"name", "value"}` objects and stores the
//! peak list as a single `"mz:intensity mz:intensity"` string. Other JSON exports are
//! accepted when they carry a recognizable peak list key, in which case every other field
//! passes through as text.
use std::io::prelude::*;

use log::warn;
use serde_json::{Map, Value};

use crate::patterns;
use crate::record::{Peak, PeakList, RawRecord};

use super::{RecordParser, SpectrumFileError};

/// Keys that must all be present for an object to be read as a MoNA record
pub const MONA_KEYS: [&str; 5] = ["compound", "id", "metaData", "spectrum", "filename"];

/// Keys that may hold a peak list in other JSON exports, in order of preference
pub const PEAK_LIST_KEYS: [&str; 3] = ["spectrum", "peaks_json", "peaks"];

/// Compound metadata copied from a MoNA record when it was not computed by MoNA itself
const MONA_COMPOUND_FIELDS: [&str; 4] = ["molecular formula", "smiles", "inchi", "inchikey"];

/// Spectrum metadata copied from a MoNA record
const MONA_SPECTRUM_FIELDS: [&str; 9] = [
    "instrument",
    "instrument type",
    "ms level",
    "ionization",
    "retention time",
    "ionization mode",
    "precursor type",
    "collision energy",
    "precursor m/z",
];

/// Render a JSON scalar as the text a format parser would have produced
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn embedded_peaks(text: &str) -> PeakList {
    patterns::embedded_peak_pairs(text)
        .into_iter()
        .filter_map(|(mz, intensity)| {
            let peak = Peak::checked(mz, intensity);
            if peak.is_none() {
                warn!("Dropping invalid peak ({mz}, {intensity})");
            }
            peak
        })
        .collect()
}

/// Iterate over the `{"name": ..., "value": ...}` entries of a MoNA metadata list
fn metadata_entries(list: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    list.and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.as_object())
}

/// Parses JSON objects into [`RawRecord`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct JSONRecordParser;

impl JSONRecordParser {
    pub fn new() -> Self {
        Self
    }

    pub fn is_mona(object: &Map<String, Value>) -> bool {
        MONA_KEYS.iter().all(|k| object.contains_key(*k))
    }

    /// Read a MoNA record. Missing optional parts are left out of the record.
    pub fn parse_mona(&self, object: &Map<String, Value>) -> RawRecord {
        let mut record = RawRecord::default();
        let compound = object
            .get("compound")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first());

        if let Some(name) = compound
            .and_then(|c| c.pointer("/names/0/name"))
            .and_then(value_text)
        {
            record.add_field("compound_name", name);
        }

        for entry in metadata_entries(compound.and_then(|c| c.get("metaData"))) {
            let Some(name) = entry.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            let name = name.to_lowercase();
            let computed = entry
                .get("computed")
                .and_then(|c| c.as_bool())
                .unwrap_or_default();
            if computed || !MONA_COMPOUND_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if let Some(value) = entry.get("value").and_then(value_text) {
                record.add_field(name, value);
            }
        }

        if let Some(id) = object.get("id").and_then(value_text) {
            record.add_field("spectrum_id", id);
        }

        for entry in metadata_entries(object.get("metaData")) {
            let Some(name) = entry.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            if !MONA_SPECTRUM_FIELDS.contains(&name) {
                continue;
            }
            if let Some(value) = entry.get("value").and_then(value_text) {
                record.add_field(name.to_lowercase(), value);
            }
        }

        if let Some(filename) = object.get("filename").and_then(value_text) {
            record.add_field("filename", filename);
        }

        if let Some(spectrum) = object.get("spectrum").and_then(|s| s.as_str()) {
            record.peaks = embedded_peaks(spectrum);
        }

        let predicted = object
            .get("tags")
            .and_then(|t| t.as_array())
            .map(|tags| {
                tags.iter()
                    .any(|tag| tag.get("text").and_then(|t| t.as_str()) == Some("In-Silico"))
            })
            .unwrap_or_default();
        record.add_field("predicted", if predicted { "true" } else { "false" });
        record
    }

    /// Read an object that is not a MoNA record but carries a peak list under one of
    /// [`PEAK_LIST_KEYS`]
    pub fn parse_generic(&self, object: &Map<String, Value>) -> Option<RawRecord> {
        let peak_key = PEAK_LIST_KEYS.iter().find(|k| object.contains_key(**k))?;
        let mut record = RawRecord::default();
        for (key, value) in object.iter() {
            if key.as_str() == *peak_key {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                record.peaks = embedded_peaks(&text);
            } else if let Some(text) = value_text(value) {
                record.add_field(key.as_str(), text);
            }
        }
        Some(record)
    }

    /// Parse one JSON value. Anything that is not an object, or an object matching
    /// neither known shape, yields `None`.
    pub fn parse_value(&self, value: &Value) -> Option<RawRecord> {
        let object = value.as_object()?;
        if Self::is_mona(object) {
            Some(self.parse_mona(object))
        } else {
            self.parse_generic(object)
        }
    }
}

impl RecordParser for JSONRecordParser {
    type Input = Value;

    fn parse(&self, input: &Value) -> Option<RawRecord> {
        self.parse_value(input)
    }
}

/**
Read a JSON document into a list of values to be parsed as records.

A top-level array yields its elements and a top-level object yields itself. If the
document is not a single JSON value, it is read as JSON lines, one value per line.
*/
pub fn read_json_values<R: Read>(mut reader: R) -> Result<Vec<Value>, SpectrumFileError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(value @ Value::Object(_)) => Ok(vec![value]),
        Ok(other) => {
            warn!("Top-level JSON value is neither an object nor an array: {other}");
            Ok(Vec::new())
        }
        Err(err) => {
            let mut values = Vec::new();
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => values.push(value),
                    // Not JSON lines either, report the original error
                    Err(_) => return Err(err.into()),
                }
            }
            Ok(values)
        }
    }
}

/// Read and parse every record of a JSON document
pub fn read_json_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, SpectrumFileError> {
    let parser = JSONRecordParser::new();
    Ok(read_json_values(reader)?
        .iter()
        .filter_map(|v| parser.parse_value(v))
        .collect())
}

#[cfg(test)]
mod test {
    use std::fs;

    use serde_json::json;

    use super::*;

    fn mona(tags: Value) -> Value {
        json!({
            "id": "AU101801",
            "filename": "massbank.json",
            "spectrum": "50.1:10 60.25:20.5 70:0",
            "compound": [{
                "names": [{"name": "Caffeine"}, {"name": "Guaranine"}],
                "metaData": [
                    {"name": "SMILES", "value": "CN1C=NC2=C1C(=O)N(C(=O)N2C)C", "computed": false},
                    {"name": "InChIKey", "value": "RYYVLZVUVIJVGH-UHFFFAOYSA-N", "computed": true},
                    {"name": "total exact mass", "value": 194.08, "computed": true}
                ]
            }],
            "metaData": [
                {"name": "ms level", "value": "MS2"},
                {"name": "precursor m/z", "value": 195.0877},
                {"name": "column", "value": "C18"}
            ],
            "tags": tags
        })
    }

    #[test]
    fn test_mona() {
        let record = JSONRecordParser::new().parse_value(&mona(json!([{"text": "LC-MS"}]))).unwrap();
        assert_eq!(record.get("compound_name"), Some("Caffeine"));
        assert_eq!(record.get("smiles"), Some("CN1C=NC2=C1C(=O)N(C(=O)N2C)C"));
        assert_eq!(record.get("inchikey"), None);
        assert_eq!(record.get("spectrum_id"), Some("AU101801"));
        assert_eq!(record.get("ms level"), Some("MS2"));
        assert_eq!(record.get("precursor m/z"), Some("195.0877"));
        assert_eq!(record.get("column"), None);
        assert_eq!(record.get("filename"), Some("massbank.json"));
        assert_eq!(record.get("predicted"), Some("false"));
        assert_eq!(
            record.peaks,
            vec![Peak::new(50.1, 10.0), Peak::new(60.25, 20.5), Peak::new(70.0, 0.0)]
        );
    }

    #[test]
    fn test_mona_predicted() {
        let parser = JSONRecordParser::new();
        let record = parser.parse_value(&mona(json!([]))).unwrap();
        assert_eq!(record.get("predicted"), Some("false"));
        let record = parser.parse_value(&mona(json!([{"text": "In-Silico"}]))).unwrap();
        assert_eq!(record.get("predicted"), Some("true"));
        let record = parser.parse_value(&mona(json!("not a list"))).unwrap();
        assert_eq!(record.get("predicted"), Some("false"));
    }

    #[test]
    fn test_generic() {
        let parser = JSONRecordParser::new();
        let record = parser
            .parse_value(&json!({
                "name": "Glucose",
                "precursor_mz": 203.05,
                "peaks": [[85.03, 100], [127.04, 45.5]],
                "notes": null
            }))
            .unwrap();
        assert_eq!(record.get("name"), Some("Glucose"));
        assert_eq!(record.get("precursor_mz"), Some("203.05"));
        assert_eq!(record.get("notes"), None);
        assert_eq!(record.peaks, vec![Peak::new(85.03, 100.0), Peak::new(127.04, 45.5)]);

        let record = parser
            .parse_value(&json!({"peaks_json": "[[85.03, 100]]", "id": 7}))
            .unwrap();
        assert_eq!(record.get("id"), Some("7"));
        assert_eq!(record.peaks.len(), 1);

        assert!(parser.parse_value(&json!({"name": "no peaks"})).is_none());
        assert!(parser.parse_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_read_json_values() {
        let values = read_json_values(&b"[{\"a\": 1}, {\"b\": 2}]"[..]).unwrap();
        assert_eq!(values.len(), 2);
        let values = read_json_values(&b"{\"a\": 1}\n{\"b\": 2}\n"[..]).unwrap();
        assert_eq!(values.len(), 2);
        assert!(read_json_values(&b"{\"a\": "[..]).is_err());
    }

    #[test]
    fn test_read_fixture() {
        let handle = fs::File::open("./test/data/mona.json").unwrap();
        let records = read_json_records(handle).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("predicted"), Some("false"));
        assert_eq!(records[1].get("predicted"), Some("true"));
    }
}
