use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ORGANISM: &str = "study.characteristics.organism";
pub const ASSAY_TECHNOLOGY: &str = "investigation.study assays.study assay technology type";
pub const SPACEFLIGHT_FACTOR: &str = "study.factor value.spaceflight";
pub const ACCESSION: &str = "id.accession";
pub const ASSAY_NAME: &str = "id.assay name";
/// Whole characteristics branch; selecting it pulls every tissue-bearing key.
pub const CHARACTERISTICS: &str = "study.characteristics";

/// Tissue-bearing keys in priority order.
pub const TISSUE_KEYS: [&str; 5] = [
    "study.characteristics.organism part",
    "study.characteristics.tissue",
    "study.characteristics.organ",
    "study.characteristics.cell type",
    "study.characteristics.material type",
];

/// One flat row of a `json.records` response.
///
/// Every key literal the service reads lives in this module; callers go
/// through the named accessors and get cleaned values back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn organism(&self) -> Option<String> {
        self.text(ORGANISM)
    }

    pub fn assay_technology(&self) -> Option<String> {
        self.text(ASSAY_TECHNOLOGY)
    }

    pub fn spaceflight_factor(&self) -> Option<String> {
        self.text(SPACEFLIGHT_FACTOR)
    }

    pub fn accession(&self) -> Option<String> {
        self.text(ACCESSION)
    }

    pub fn assay_name(&self) -> Option<String> {
        self.text(ASSAY_NAME)
    }

    /// First non-empty tissue-like characteristic. Some responses come back
    /// with `%20` in place of spaces inside keys, so those are tried last.
    pub fn tissue(&self) -> Option<String> {
        TISSUE_KEYS
            .iter()
            .find_map(|key| self.text(key))
            .or_else(|| {
                TISSUE_KEYS
                    .iter()
                    .find_map(|key| self.text(&key.replace(' ', "%20")))
            })
    }

    fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(clean_value)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Trim and drop the placeholder spellings OSDR uses for "no value".
pub fn clean_text(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    match s.to_ascii_lowercase().as_str() {
        "nan" | "none" | "null" => None,
        _ => Some(s.to_string()),
    }
}

fn clean_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => clean_text(s),
        Value::Number(n) => clean_text(&n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => clean_text(&other.to_string()),
    }
}
