//! Heuristic signals that rank gaps by how actionable they are.
//!
//! Every signal is a pure function of the coverage index and lies in [0, 1].
//! The final score is a fixed weighted sum minus a redundancy penalty:
//!
//! ```text
//! score = 1.8·ground + 1.5·multi + 1.2·phase + 1.0·xspecies
//!       + 0.8·neighbor + 0.6·feasibility − 0.7·redundancy
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::osdr::OsdrLinks;

use super::coverage::{CoverageIndex, StructureKey};
use super::{CoarseCondition, GapCell};

pub const REDUNDANCY_WEIGHT: f64 = 0.7;

const GROUND_CAP: usize = 3;
const NEIGHBOR_CAP: usize = 5;
const REDUNDANCY_CAP: usize = 4;
const GROUND_EXAMPLES: usize = 3;

const MOUSE: &str = "mus musculus";
const HUMAN: &str = "homo sapiens";

/// Positive signals, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SignalKind {
    GroundBase,
    MultiOmics,
    PhaseCritical,
    SpeciesTranslation,
    NeighborDensity,
    Feasibility,
}

impl SignalKind {
    pub const ALL: [Self; 6] = [
        Self::GroundBase,
        Self::MultiOmics,
        Self::PhaseCritical,
        Self::SpeciesTranslation,
        Self::NeighborDensity,
        Self::Feasibility,
    ];

    pub fn weight(self) -> f64 {
        match self {
            Self::GroundBase => 1.8,
            Self::MultiOmics => 1.5,
            Self::PhaseCritical => 1.2,
            Self::SpeciesTranslation => 1.0,
            Self::NeighborDensity => 0.8,
            Self::Feasibility => 0.6,
        }
    }

    /// Minimum value for the signal to show up in `reasons_detail`.
    pub fn report_threshold(self) -> f64 {
        match self {
            Self::Feasibility => 0.7,
            _ => 0.6,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::GroundBase => "Strong ground base and missing in flight.",
            Self::MultiOmics => "Completes a multi-omics package.",
            Self::PhaseCritical => "Missing a critical flight phase.",
            Self::SpeciesTranslation => "Cross-species translation opportunity.",
            Self::NeighborDensity => "High surrounding activity; good logistical base.",
            Self::Feasibility => "Standard, feasible assay.",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    pub ground_base: f64,
    pub multi_omics: f64,
    pub phase_critical: f64,
    pub species_translation: f64,
    pub neighbor_density: f64,
    pub feasibility: f64,
    /// Subtracted from the score.
    pub redundancy: f64,
}

impl Signals {
    pub fn value(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::GroundBase => self.ground_base,
            SignalKind::MultiOmics => self.multi_omics,
            SignalKind::PhaseCritical => self.phase_critical,
            SignalKind::SpeciesTranslation => self.species_translation,
            SignalKind::NeighborDensity => self.neighbor_density,
            SignalKind::Feasibility => self.feasibility,
        }
    }

    pub fn contribution(&self, kind: SignalKind) -> f64 {
        kind.weight() * self.value(kind)
    }

    pub fn score(&self) -> f64 {
        SignalKind::ALL
            .iter()
            .map(|&k| self.contribution(k))
            .sum::<f64>()
            - REDUNDANCY_WEIGHT * self.redundancy
    }

    /// Largest weighted contribution; earlier kinds win ties.
    pub fn dominant(&self) -> SignalKind {
        let mut best = SignalKind::GroundBase;
        for kind in SignalKind::ALL {
            if self.contribution(kind) > self.contribution(best) {
                best = kind;
            }
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonDetail {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGap {
    #[serde(flatten)]
    pub cell: GapCell,
    pub score: f64,
    pub reason: String,
    pub reasons_detail: Vec<ReasonDetail>,
    #[serde(skip)]
    pub signals: Signals,
}

pub fn ground_base(index: &CoverageIndex, cell: &GapCell) -> f64 {
    if cell.condition != CoarseCondition::Spaceflight {
        return 0.0;
    }
    let n = index
        .combo_datasets(&cell.organism, &cell.tissue, CoarseCondition::GroundAnalog)
        .len();
    capped(n, GROUND_CAP)
}

pub fn multi_omics(index: &CoverageIndex, cell: &GapCell) -> f64 {
    let present = index.combo_assays(&cell.organism, &cell.tissue, cell.condition);
    if present.is_empty() {
        return 0.0;
    }
    let missing = cell.assay_type.to_lowercase();
    let present_has = |needle: &str| present.iter().any(|a| a.to_lowercase().contains(needle));

    if missing.starts_with("proteom") && present_has("rna") {
        1.0
    } else if missing.contains("rna") && present_has("proteom") {
        1.0
    } else {
        0.5
    }
}

pub fn phase_critical(index: &CoverageIndex, cell: &GapCell) -> f64 {
    if cell.condition != CoarseCondition::Spaceflight {
        return 0.0;
    }
    let phases: Vec<String> = index
        .phases(&cell.organism, &cell.tissue)
        .iter()
        .map(|p| p.to_lowercase())
        .collect();
    let seen = |a: &str, b: &str| phases.iter().any(|p| p.contains(a) && p.contains(b));

    let has_pre = seen("pre", "flight");
    let has_in = phases.iter().any(|p| p.contains("in-flight")) || seen("in", "flight");
    let has_post = seen("post", "flight");

    if !has_in && (has_pre || has_post) {
        1.0
    } else if has_in && (!has_pre || !has_post) {
        0.5
    } else {
        0.0
    }
}

pub fn species_translation(index: &CoverageIndex, cell: &GapCell) -> f64 {
    let others: Vec<String> = index
        .species(&cell.tissue, cell.condition, &cell.assay_type)
        .iter()
        .filter(|s| **s != cell.organism)
        .map(|s| s.to_lowercase())
        .collect();
    if others.is_empty() {
        return 0.0;
    }
    let org = cell.organism.to_lowercase();
    let other_has = |name: &str| others.iter().any(|o| o == name);

    if (org == HUMAN && other_has(MOUSE)) || (org == MOUSE && other_has(HUMAN)) {
        1.0
    } else {
        0.5
    }
}

pub fn neighbor_density(index: &CoverageIndex, cell: &GapCell) -> f64 {
    capped(index.neighborhood(&cell.tissue, cell.condition).len(), NEIGHBOR_CAP)
}

pub fn feasibility(index: &CoverageIndex, cell: &GapCell) -> f64 {
    let max = index.max_assay_count();
    if max == 0 {
        return 0.0;
    }
    index.assay_count(&cell.assay_type) as f64 / max as f64
}

/// How many gaps share this (tissue, condition, assay), turned into a
/// penalty: `min(n - 1, 4) / 4`.
pub fn redundancy(group_size: usize) -> f64 {
    if group_size <= 1 {
        return 0.0;
    }
    capped(group_size - 1, REDUNDANCY_CAP)
}

fn capped(n: usize, cap: usize) -> f64 {
    n.min(cap) as f64 / cap as f64
}

/// Two-decimal rounding for reported values; never yields `-0.0`.
pub fn round2(x: f64) -> f64 {
    let r = (x * 100.0).round() / 100.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Scores gap cells against one request's coverage index.
pub struct SignalScorer<'a> {
    index: &'a CoverageIndex,
    links: &'a OsdrLinks,
    structure_groups: BTreeMap<StructureKey, usize>,
}

impl<'a> SignalScorer<'a> {
    /// `gaps` is the full gap list; it sizes the redundancy groups.
    pub fn new(index: &'a CoverageIndex, gaps: &[GapCell], links: &'a OsdrLinks) -> Self {
        let mut structure_groups: BTreeMap<StructureKey, usize> = BTreeMap::new();
        for g in gaps {
            *structure_groups
                .entry((g.tissue.clone(), g.condition, g.assay_type.clone()))
                .or_default() += 1;
        }
        Self {
            index,
            links,
            structure_groups,
        }
    }

    pub fn signals(&self, cell: &GapCell) -> Signals {
        let group_size = self
            .structure_groups
            .get(&(cell.tissue.clone(), cell.condition, cell.assay_type.clone()))
            .copied()
            .unwrap_or(0);

        Signals {
            ground_base: ground_base(self.index, cell),
            multi_omics: multi_omics(self.index, cell),
            phase_critical: phase_critical(self.index, cell),
            species_translation: species_translation(self.index, cell),
            neighbor_density: neighbor_density(self.index, cell),
            feasibility: feasibility(self.index, cell),
            redundancy: redundancy(group_size),
        }
    }

    pub fn score(&self, cell: &GapCell) -> ScoredGap {
        let signals = self.signals(cell);
        let reasons_detail = SignalKind::ALL
            .into_iter()
            .filter(|&k| signals.value(k) >= k.report_threshold())
            .map(|k| self.explain(cell, k, signals.value(k)))
            .collect();

        ScoredGap {
            cell: cell.clone(),
            score: round2(signals.score()),
            reason: signals.dominant().headline().to_string(),
            reasons_detail,
            signals,
        }
    }

    pub fn score_all(&self, gaps: &[GapCell]) -> Vec<ScoredGap> {
        gaps.iter().map(|g| self.score(g)).collect()
    }

    fn explain(&self, cell: &GapCell, kind: SignalKind, value: f64) -> ReasonDetail {
        let org = &cell.organism;
        let tissue = cell.tissue.as_deref().unwrap_or("unspecified tissue");
        let assay = &cell.assay_type;

        let (evidence, text) = match kind {
            SignalKind::GroundBase => {
                let ground =
                    self.index
                        .combo_datasets(org, &cell.tissue, CoarseCondition::GroundAnalog);
                let examples: Vec<String> = ground
                    .iter()
                    .take(GROUND_EXAMPLES)
                    .map(|ds| self.links.dataset(ds))
                    .collect();
                (
                    Some(json!({ "ds_ground": ground.len(), "ground_examples": examples })),
                    format!(
                        "Strong ground base: {} Ground/Analog dataset(s) already exist for {org}/{tissue}.",
                        ground.len()
                    ),
                )
            }
            SignalKind::MultiOmics => {
                let present: Vec<&String> = self
                    .index
                    .combo_assays(org, &cell.tissue, cell.condition)
                    .iter()
                    .collect();
                let listed = if present.is_empty() {
                    "other layers".to_string()
                } else {
                    present.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                };
                (
                    Some(json!({ "present_layers": present, "missing_layer": assay })),
                    format!("Completes multi-omics: {listed} present; {assay} missing."),
                )
            }
            SignalKind::PhaseCritical => {
                let phases: Vec<&String> = self.index.phases(org, &cell.tissue).iter().collect();
                (
                    Some(json!({ "present_phases": phases })),
                    "Critical phase without data: In-flight is missing or incomplete relative to Pre/Post-flight."
                        .to_string(),
                )
            }
            SignalKind::SpeciesTranslation => {
                let others: Vec<&String> = self
                    .index
                    .species(&cell.tissue, cell.condition, assay)
                    .iter()
                    .filter(|s| *s != org)
                    .collect();
                let listed = others.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
                (
                    Some(json!({ "covered_species": others })),
                    format!("Translation: covered in {listed}; missing in {org}."),
                )
            }
            SignalKind::NeighborDensity => {
                let nearby = self.index.neighborhood(&cell.tissue, cell.condition).len();
                (
                    Some(json!({ "nearby_datasets": nearby })),
                    format!("High nearby activity in {tissue}/{}.", cell.condition),
                )
            }
            SignalKind::Feasibility => (
                Some(json!({
                    "assay_records": self.index.assay_count(assay),
                    "max_assay_records": self.index.max_assay_count(),
                })),
                format!("High feasibility: {assay} is common in the fetched scope."),
            ),
        };

        ReasonDetail {
            kind,
            value: round2(value),
            evidence,
            text,
        }
    }
}
