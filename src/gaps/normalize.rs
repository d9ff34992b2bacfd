use crate::osdr::RawRecord;

use super::CoarseCondition;

pub const SPACEFLIGHT: &str = "Spaceflight";
pub const GROUND_ANALOG: &str = "Ground/Analog";
pub const PRE_FLIGHT: &str = "Pre-flight";
pub const POST_FLIGHT: &str = "Post-flight";
pub const IN_FLIGHT: &str = "In-flight";
/// Fine label for records with no spaceflight factor at all.
pub const UNKNOWN: &str = "Unknown";

/// Map a free-text spaceflight factor onto the fine condition vocabulary.
///
/// Recognized phrasings collapse to `Spaceflight`, `Ground/Analog` or one of
/// the flight phases; anything else passes through trimmed.
pub fn fine_condition(raw: Option<&str>) -> String {
    let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => v,
        None => return UNKNOWN.to_string(),
    };
    let low = value.to_lowercase();
    let has = |needle: &str| low.contains(needle);

    let label = if has("space") && has("flight") {
        SPACEFLIGHT
    } else if has("ground") || has("analog") {
        GROUND_ANALOG
    } else if has("pre") && has("flight") {
        PRE_FLIGHT
    } else if has("post") && has("flight") {
        POST_FLIGHT
    } else if (has("in") && has("flight")) || has("in-flight") {
        IN_FLIGHT
    } else {
        return value.to_string();
    };
    label.to_string()
}

impl CoarseCondition {
    /// Two-way collapse of a fine label, or `None` when the label carries no
    /// recognizable flight or ground wording.
    pub fn classify(fine: &str) -> Option<Self> {
        let low = fine.to_lowercase();
        let has = |needle: &str| low.contains(needle);

        if (has("space") && has("flight"))
            || has("pre-flight")
            || has("post-flight")
            || has("in-flight")
        {
            Some(Self::Spaceflight)
        } else if has("ground") || has("analog") || has("vivarium") || has("control") {
            Some(Self::GroundAnalog)
        } else {
            None
        }
    }

    /// Coarse condition for any fine label. Labels `classify` cannot place
    /// count as spaceflight when they mention "flight" and as ground/analog
    /// otherwise (including `Unknown`).
    pub fn resolve(fine: &str) -> Self {
        Self::classify(fine).unwrap_or_else(|| {
            if fine.to_lowercase().contains("flight") {
                Self::Spaceflight
            } else {
                Self::GroundAnalog
            }
        })
    }
}

/// One usable OSDR row after cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTuple {
    pub organism: String,
    pub tissue_raw: Option<String>,
    pub condition_fine: String,
    pub assay_type: String,
    pub dataset_id: String,
    pub assay_name: Option<String>,
    pub condition_coarse: CoarseCondition,
}

impl ObservedTuple {
    /// `None` when organism, assay technology or accession is missing; such
    /// rows are noise and contribute to nothing.
    pub fn from_record(record: &RawRecord) -> Option<Self> {
        let organism = record.organism()?;
        let assay_type = record.assay_technology()?;
        let dataset_id = record.accession()?;

        let condition_fine = fine_condition(record.spaceflight_factor().as_deref());
        let condition_coarse = CoarseCondition::resolve(&condition_fine);

        Some(Self {
            organism,
            tissue_raw: record.tissue(),
            condition_fine,
            assay_type,
            dataset_id,
            assay_name: record.assay_name(),
            condition_coarse,
        })
    }
}
