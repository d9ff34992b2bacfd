//! Coverage gap analysis over OSDR assay records.
//!
//! A request's records are normalized into observed tuples, indexed by
//! (organism, tissue, condition, assay), and compared against the full
//! Cartesian universe implied by the request's filters. Every empty cell of
//! that universe is a gap; gaps are scored with [`signals`] and the best ones
//! come back as highlights.

pub mod coverage;
pub mod enumerate;
pub mod normalize;
pub mod rank;
pub mod scope;
pub mod signals;
pub mod tissue;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::osdr::{OsdrLinks, RawRecord};

use coverage::CoverageIndex;
use enumerate::CoverageRow;
use normalize::ObservedTuple;
use scope::{GapFilters, ScopeSets};
use signals::{ScoredGap, SignalScorer};

/// Two-way collapse of the fine condition vocabulary.
///
/// Declaration order is the sort order: Ground/Analog before Spaceflight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoarseCondition {
    #[serde(rename = "Ground/Analog")]
    GroundAnalog,
    Spaceflight,
}

impl CoarseCondition {
    pub const ALL: [Self; 2] = [Self::GroundAnalog, Self::Spaceflight];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GroundAnalog => normalize::GROUND_ANALOG,
            Self::Spaceflight => normalize::SPACEFLIGHT,
        }
    }
}

impl fmt::Display for CoarseCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of the evaluation universe. Field order is the canonical sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GapCell {
    pub organism: String,
    /// Parent tissue; `None` is the unspecified tissue.
    pub tissue: Option<String>,
    pub condition: CoarseCondition,
    pub assay_type: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub min_datasets_for_covered: usize,
    pub top_n: usize,
    pub links: OsdrLinks,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_datasets_for_covered: 1,
            top_n: rank::DEFAULT_TOP_N,
            links: OsdrLinks::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapAnalysis {
    pub coverage_rows: Vec<CoverageRow>,
    pub gaps: Vec<GapCell>,
    pub highlights: Vec<ScoredGap>,
    pub gaps_total: usize,
    pub covered_total: usize,
}

/// Run the whole pipeline for one request's records.
///
/// Pure apart from logging: the same records and filters always give the same
/// analysis, in the same order.
pub fn analyze(records: &[RawRecord], filters: &GapFilters, options: &AnalysisOptions) -> GapAnalysis {
    if records.is_empty() {
        return GapAnalysis::default();
    }

    let tuples: Vec<ObservedTuple> = records.iter().filter_map(ObservedTuple::from_record).collect();
    let index = CoverageIndex::build(&tuples, filters.condition.only());
    let scope = ScopeSets::resolve(filters, &index);
    let partition = enumerate::enumerate(&scope, &index);

    tracing::debug!(
        records = records.len(),
        tuples = tuples.len(),
        universe = partition.universe_size(),
        gaps = partition.gaps.len(),
        "gap universe enumerated"
    );

    let mut coverage_rows = enumerate::coverage_rows(
        &scope,
        &index,
        options.min_datasets_for_covered,
        &options.links,
    );
    rank::sort_coverage_rows(&mut coverage_rows);

    let scorer = SignalScorer::new(&index, &partition.gaps, &options.links);
    let highlights = rank::rank_highlights(scorer.score_all(&partition.gaps), options.top_n);

    let mut gaps = partition.gaps;
    rank::sort_gaps(&mut gaps);

    GapAnalysis {
        coverage_rows,
        gaps_total: gaps.len(),
        covered_total: partition.covered.len(),
        gaps,
        highlights,
    }
}
