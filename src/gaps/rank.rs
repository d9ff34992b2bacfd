use super::enumerate::CoverageRow;
use super::signals::ScoredGap;
use super::GapCell;

pub const DEFAULT_TOP_N: usize = 20;
pub const MAX_TOP_N: usize = 100;

pub fn clamp_top_n(top_n: usize) -> usize {
    top_n.clamp(1, MAX_TOP_N)
}

/// Highest score first; equal scores fall back to the cell's
/// (organism, tissue, condition, assay) order so output is reproducible.
pub fn rank_highlights(mut scored: Vec<ScoredGap>, top_n: usize) -> Vec<ScoredGap> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.cell.cmp(&b.cell)));
    scored.truncate(clamp_top_n(top_n));
    scored
}

pub fn sort_gaps(gaps: &mut [GapCell]) {
    gaps.sort();
}

pub fn sort_coverage_rows(rows: &mut [CoverageRow]) {
    rows.sort_by(|a, b| a.cell.cmp(&b.cell));
}
