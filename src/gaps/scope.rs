use std::collections::BTreeSet;

use serde::Serialize;

use super::coverage::CoverageIndex;
use super::tissue::canonical_tissue;
use super::{CoarseCondition, GapCell};

/// Which coarse conditions a request asks about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConditionFilter {
    Only(CoarseCondition),
    #[default]
    Both,
}

impl ConditionFilter {
    /// "Spaceflight" and "Ground/Analog" pick one side; "Ambas", "any",
    /// missing or unrecognized values mean both.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("spaceflight") => Self::Only(CoarseCondition::Spaceflight),
            Some("ground/analog") => Self::Only(CoarseCondition::GroundAnalog),
            _ => Self::Both,
        }
    }

    pub fn only(self) -> Option<CoarseCondition> {
        match self {
            Self::Only(c) => Some(c),
            Self::Both => None,
        }
    }
}

/// Structured filters for one gap request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapFilters {
    pub organisms: Option<Vec<String>>,
    pub assays: Option<Vec<String>>,
    pub condition: ConditionFilter,
    pub tissues: Option<Vec<String>>,
}

/// The four dimensions of the evaluation universe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSets {
    pub organisms: BTreeSet<String>,
    /// Parent form; `None` is the unspecified tissue.
    pub tissues: BTreeSet<Option<String>>,
    pub conditions: BTreeSet<CoarseCondition>,
    pub assays: BTreeSet<String>,
}

impl ScopeSets {
    /// Explicit filters win; any dimension left open falls back to the values
    /// observed in the coarse coverage keys.
    pub fn resolve(filters: &GapFilters, index: &CoverageIndex) -> Self {
        let keys = index.coverage_coarse.keys();

        let organisms = explicit(filters.organisms.as_deref())
            .unwrap_or_else(|| keys.clone().map(|k| k.organism.clone()).collect());

        let assays = explicit(filters.assays.as_deref())
            .unwrap_or_else(|| keys.clone().map(|k| k.assay_type.clone()).collect());

        let tissues = explicit(filters.tissues.as_deref())
            .map(|raw| {
                raw.iter()
                    .filter_map(|t| canonical_tissue(t))
                    .map(Some)
                    .collect::<BTreeSet<_>>()
            })
            .filter(|set| !set.is_empty())
            .unwrap_or_else(|| {
                let mut observed: BTreeSet<Option<String>> =
                    keys.clone().map(|k| k.tissue.clone()).collect();
                observed.insert(None);
                observed
            });

        let conditions = match filters.condition {
            ConditionFilter::Only(c) => BTreeSet::from([c]),
            ConditionFilter::Both => CoarseCondition::ALL.into_iter().collect(),
        };

        Self {
            organisms,
            tissues,
            conditions,
            assays,
        }
    }

    pub fn contains(&self, cell: &GapCell) -> bool {
        self.organisms.contains(&cell.organism)
            && self.tissues.contains(&cell.tissue)
            && self.conditions.contains(&cell.condition)
            && self.assays.contains(&cell.assay_type)
    }

    pub fn universe_size(&self) -> usize {
        self.organisms.len() * self.tissues.len() * self.conditions.len() * self.assays.len()
    }
}

/// Trimmed, non-empty entries of a caller list, or `None` when nothing usable
/// was supplied.
fn explicit(values: Option<&[String]>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = values?
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!set.is_empty()).then_some(set)
}
