use log::warn;

/// Anything that can place an instrument name into a category, like `QTOF` or `ITFT`
pub trait InstrumentClassifier: Send + Sync {
    fn classify(&self, name: &str) -> Option<String>;
}

impl<F> InstrumentClassifier for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn classify(&self, name: &str) -> Option<String> {
        (self)(name)
    }
}

/**
A flattened instrument taxonomy: each entry pairs a lower-cased name fragment with the
category it implies. Entries are tried in insertion order and the first fragment found in
the instrument name wins, so more specific fragments should be inserted first.
*/
#[derive(Debug, Default, Clone)]
pub struct InstrumentTree {
    entries: Vec<(String, String)>,
}

impl InstrumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: AsRef<str>, C: Into<String>>(&mut self, fragment: K, category: C) {
        let fragment = fragment.as_ref().trim().to_lowercase();
        if fragment.is_empty() {
            return;
        }
        self.entries.push((fragment, category.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a tree from nested JSON objects whose leaves are arrays of instrument
    /// names. The category of a leaf is its path of object keys joined with `-`, so
    /// `{"LC": {"ESI": {"QTOF": ["maXis", "TripleTOF"]}}}` maps `maXis` to `LC-ESI-QTOF`.
    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut tree = Self::new();
        let mut path = Vec::new();
        tree.visit_json(value, &mut path);
        tree
    }

    #[cfg(feature = "json")]
    fn visit_json(&mut self, value: &serde_json::Value, path: &mut Vec<String>) {
        use serde_json::Value;
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    path.push(key.clone());
                    self.visit_json(child, path);
                    path.pop();
                }
            }
            Value::Array(names) => {
                let category = path.join("-");
                for name in names {
                    match name.as_str() {
                        Some(name) => self.insert(name, category.clone()),
                        None => warn!("Skipping non-string instrument entry {name} under {category}"),
                    }
                }
            }
            Value::String(name) => {
                let category = path.join("-");
                self.insert(name, category);
            }
            other => warn!("Skipping unexpected instrument tree node {other}"),
        }
    }
}

impl InstrumentClassifier for InstrumentTree {
    fn classify(&self, name: &str) -> Option<String> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|(fragment, _)| name.contains(fragment.as_str()))
            .map(|(_, category)| category.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_fragment_wins() {
        let mut tree = InstrumentTree::new();
        tree.insert("Q Exactive", "ITFT");
        tree.insert("exactive", "FT");
        assert_eq!(tree.classify("Thermo Q Exactive HF").as_deref(), Some("ITFT"));
        assert_eq!(tree.classify("Exactive Plus").as_deref(), Some("FT"));
        assert_eq!(tree.classify("abacus"), None);
    }

    #[test]
    fn test_closure_classifier() {
        let classifier = |name: &str| name.contains("TOF").then(|| "QTOF".to_string());
        assert_eq!(classifier.classify("maXis TOF").as_deref(), Some("QTOF"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json() {
        let value = serde_json::json!({
            "LC": {"ESI": {"QTOF": ["maXis", "TripleTOF"], "ITFT": ["Orbitrap"]}},
            "GC": {"EI": {"QQQ": "TSQ"}}
        });
        let tree = InstrumentTree::from_json(&value);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.classify("Bruker maXis II").as_deref(), Some("LC-ESI-QTOF"));
        assert_eq!(tree.classify("Orbitrap Fusion").as_deref(), Some("LC-ESI-ITFT"));
        assert_eq!(tree.classify("TSQ Quantum").as_deref(), Some("GC-EI-QQQ"));
    }
}
