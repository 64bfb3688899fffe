//! Named text recognizers shared by every parser and normalizer.
//!
//! Each recognizer is a pure function from a string to a match or no match. None of them
//! fail on malformed input: not matching is an ordinary, silent outcome.
use lazy_static::lazy_static;
use regex::Regex;

use crate::record::IonMode;

/// The numeric grammar used for peaks: optional sign, digits, an optional `.` or `,`
/// decimal separator, and an optional exponent.
const NUMBER: &str = r"-?\d+[.,]?\d*(?:[Ee][+-]?\d+)?";

lazy_static! {
    static ref PEAK_LINE: Regex =
        Regex::new(&format!(r"^\s*({NUMBER})(?:\s+|:)({NUMBER})")).unwrap();
    static ref JSON_PEAK_PAIR: Regex = Regex::new(
        r"(-?\d+\.?\d*(?:[Ee][+-]?\d+)?)(?:\s+|:|,\s?)(-?\d+[.,]?\d*(?:[Ee][+-]?\d+)?)"
    )
    .unwrap();
    static ref FIRST_NUMBER: Regex = Regex::new(NUMBER).unwrap();
    static ref COMMENT_FIELD: Regex = Regex::new(r"(?i)comment").unwrap();
    static ref SUB_FIELDS: Regex = Regex::new(
        r#"(\S+?)="([^"]*)"|"(\w+?)=([^"]*)"|"([^"]*?)=([^"]*)"|(\S+?)=(\d+(?:[.,]\d*)?)|(\S+?)=(.*?)(?:;|\n|$)"#
    )
    .unwrap();
    static ref EMPTY_VALUE: Regex = Regex::new(
        r"(?i)^(?:CCS:(?: .*)?|\$:00in-source(?: .*)?|0(?: .*)?|0\.0(?: .*)?|na(?: .*)?|n/a(?: .*)?|nan(?: .*)?|unknown(?: .*)?|unknow(?: .*)?|none(?: .*)?|\?(?: .*)?|unk(?: .*)?|x(?: .*)?)$"
    )
    .unwrap();
    static ref ADDUCT_SHAPE: Regex = Regex::new(r"(?i)m\]?[-+]").unwrap();
    static ref ADDUCT_DECORATION: Regex = Regex::new(r"\(|\)|.*\[|\][\d+\-*]*").unwrap();
    static ref ION_MODE_POSITIVE: Regex = Regex::new(r"(?i)^(?:p|\+|pos)").unwrap();
    static ref ION_MODE_NEGATIVE: Regex = Regex::new(r"(?i)^(?:n|-|neg)").unwrap();
    static ref RETENTION_TIME: Regex = Regex::new(&format!(
        r"(?i)^\s*({NUMBER})\s*\W?\s*(milliseconds|millisecond|minutes|minute|seconds|second|mins|secs|min|sec|ms|m|s)?\b"
    ))
    .unwrap();
    static ref MS_LEVEL: Regex = Regex::new(r"(?i)^\s*(?:ms)?\s*(\d)").unwrap();
    static ref IONIZATION: Regex =
        Regex::new(r"(?i)(APCI|ACPI|APPI|MALDI|ESI|FAB)|\b(EI)\b").unwrap();
    static ref INCHI_PREFIX: Regex = Regex::new(r"(?i)^(?:inchi=)?").unwrap();
    static ref INCHI_SHAPE: Regex = Regex::new(r"(?i)InChI=.*|/[0-9A-Z]*/").unwrap();
    static ref SMILES_SHAPE: Regex =
        Regex::new(r"(?i)[^J][a-z0-9@+\-\[\]()\\/%=#$]{6,}").unwrap();
    static ref SMILES_ANNOTATION: Regex = Regex::new(r"\|[\s\S]*").unwrap();
    static ref INCHIKEY: Regex =
        Regex::new(r"(?i)([A-Z]{14}-[A-Z]{10}-[NO])|([A-Z]{14})").unwrap();
    static ref IN_SILICO: Regex = Regex::new(
        r"(?i)in.silico|insilico|predicted|theoretical|Annotation.level.3"
    )
    .unwrap();
}

/// Parse a token from the numeric grammar, accepting `,` as the decimal separator
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.contains(',') {
        token.replace(',', ".").parse().ok()
    } else {
        token.parse().ok()
    }
}

/// Recognize a peak line, a leading `mz<sep>intensity` pair where the separator is
/// whitespace or `:`. Text after the pair is ignored. Both numbers must parse or the
/// line is rejected.
pub fn peak_pair(line: &str) -> Option<(f64, f64)> {
    let caps = PEAK_LINE.captures(line)?;
    let mz = parse_number(caps.get(1)?.as_str())?;
    let intensity = parse_number(caps.get(2)?.as_str())?;
    Some((mz, intensity))
}

#[inline]
pub fn is_peak_line(line: &str) -> bool {
    PEAK_LINE.is_match(line)
}

/// Extract every numeric pair from an embedded peak list string, like MoNA's
/// `"50.1:10 60.2:20"` or a serialized `[[50.1, 10], [60.2, 20]]`, regardless of the
/// separator used between the two numbers.
pub fn embedded_peak_pairs(text: &str) -> Vec<(f64, f64)> {
    JSON_PEAK_PAIR
        .captures_iter(text)
        .filter_map(|caps| {
            let mz = parse_number(caps.get(1)?.as_str())?;
            let intensity = parse_number(caps.get(2)?.as_str())?;
            Some((mz, intensity))
        })
        .collect()
}

/// The first number in `text`, if any
pub fn first_number(text: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| parse_number(m.as_str()))
}

/// Split a `key<sep>value` metadata line on the first separator. MSP lines drop a single
/// space after the separator, MGF lines drop all leading whitespace.
pub fn metadata_line(line: &str, separator: char) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(separator)?;
    let value = if separator == ':' {
        value.strip_prefix(' ').unwrap_or(value)
    } else {
        value.trim_start()
    };
    let value = value.trim_end_matches(['\r', '\n']);
    if clean_field_name(key).is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Strip leading and trailing characters that are not letters or digits
pub fn clean_field_name(name: &str) -> &str {
    name.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Strip a leading and a trailing double quote
pub fn strip_value_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

pub fn is_comment_field(name: &str) -> bool {
    COMMENT_FIELD.is_match(name)
}

/**
Decompose a comment value carrying embedded `sub=field` pairs into those pairs.

Supports `key="quoted value"`, `"key=value"`, `key=number` and `key=value;` shapes.
Returns an empty list when nothing could be decomposed.
*/
pub fn comment_sub_fields(value: &str) -> Vec<(String, String)> {
    if !value.contains('=') {
        return Vec::new();
    }
    SUB_FIELDS
        .captures_iter(value)
        .filter_map(|caps| {
            (1..caps.len()).step_by(2).find_map(|i| {
                let key = caps.get(i)?;
                let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                Some((key.as_str().to_string(), value.to_string()))
            })
        })
        .collect()
}

/// Recognize the vocabulary of "no value" sentinels, like `N/A`, `none`, `unknown`, `0` or `?`.
/// Blank text is also empty.
pub fn is_empty_value(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || EMPTY_VALUE.is_match(value)
}

/// Whether `value` looks like an adduct annotation, e.g. `[M+H]+` or `M-H`
pub fn is_adduct(value: &str) -> bool {
    ADDUCT_SHAPE.is_match(value)
}

/// Strip bracket and charge decoration from an adduct: `[M+H]+` becomes `M+H` and
/// `(M+Na)+` becomes `M+Na`. A trailing sign is removed unless it directly follows `M`
/// (the bare radical ion `M+`).
pub fn clean_adduct(value: &str) -> String {
    let value = value.trim();
    let mut cleaned = ADDUCT_DECORATION.replace_all(value, "").into_owned();
    let trailing_sign = cleaned.ends_with(['+', '-']);
    if trailing_sign {
        let before = cleaned[..cleaned.len() - 1].chars().last();
        if !matches!(before, Some('M')) {
            cleaned.pop();
        }
    }
    cleaned.trim().to_string()
}

/// The polarity implied by an adduct's trailing charge, e.g. `[M+H]+` or `[M-H]-`
pub fn adduct_charge_sign(value: &str) -> Option<IonMode> {
    let value = value.trim().trim_end_matches(|c: char| c.is_ascii_digit());
    if value.ends_with('+') {
        Some(IonMode::Positive)
    } else if value.ends_with('-') {
        Some(IonMode::Negative)
    } else {
        None
    }
}

/// Classify free-text polarity. Anything that is not clearly positive or negative is `None`.
pub fn ion_mode(value: &str) -> Option<IonMode> {
    let value = value.trim();
    if ION_MODE_POSITIVE.is_match(value) {
        Some(IonMode::Positive)
    } else if ION_MODE_NEGATIVE.is_match(value) {
        Some(IonMode::Negative)
    } else {
        None
    }
}

/// The units a retention time may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            "ms" | "millisecond" | "milliseconds" => Some(Self::Milliseconds),
            _ => None,
        }
    }

    pub fn to_minutes(&self, value: f64) -> f64 {
        match self {
            Self::Minutes => value,
            Self::Seconds => value / 60.0,
            Self::Milliseconds => value / 60_000.0,
        }
    }
}

/// Read a leading number and an optional trailing unit from a retention time
pub fn retention_time(value: &str) -> Option<(f64, Option<TimeUnit>)> {
    let caps = RETENTION_TIME.captures(value)?;
    let number = parse_number(caps.get(1)?.as_str())?;
    let unit = caps.get(2).and_then(|m| TimeUnit::from_token(m.as_str()));
    Some((number, unit))
}

/// Read an MS level from text like `MS2`, `ms 2` or `2`
pub fn ms_level(value: &str) -> Option<u8> {
    let caps = MS_LEVEL.captures(value)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Recognize an ionization technique. The common `ACPI` misspelling maps to `APCI`.
pub fn ionization_technique(value: &str) -> Option<&'static str> {
    let caps = IONIZATION.captures(value)?;
    let token = caps.get(1).or_else(|| caps.get(2))?.as_str();
    match token.to_ascii_uppercase().as_str() {
        "APCI" | "ACPI" => Some("APCI"),
        "APPI" => Some("APPI"),
        "MALDI" => Some("MALDI"),
        "ESI" => Some("ESI"),
        "FAB" => Some("FAB"),
        "EI" => Some("EI"),
        _ => None,
    }
}

/// Ensure an InChI carries its `InChI=` prefix. Values that do not look like an InChI
/// at all are rejected.
pub fn repair_inchi(value: &str) -> Option<String> {
    let value = value.trim();
    if !INCHI_SHAPE.is_match(value) {
        return None;
    }
    Some(INCHI_PREFIX.replace(value, "InChI=").into_owned())
}

/// Strip Indigo-style `|...|` annotation blocks trailing a SMILES, and check the
/// remainder looks like a SMILES at all.
pub fn repair_smiles(value: &str) -> Option<String> {
    let cleaned = SMILES_ANNOTATION.replace(value.trim(), "");
    let cleaned = cleaned.trim();
    if SMILES_SHAPE.is_match(cleaned) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

/// Extract a full or 14-character short InChIKey, upper-cased
pub fn inchikey(value: &str) -> Option<String> {
    INCHIKEY
        .find(value)
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Whether the text flags the spectrum as predicted rather than measured
pub fn is_in_silico(value: &str) -> bool {
    IN_SILICO.is_match(value)
}
