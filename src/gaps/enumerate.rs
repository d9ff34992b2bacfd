use serde::Serialize;

use crate::osdr::OsdrLinks;

use super::coverage::CoverageIndex;
use super::scope::ScopeSets;
use super::GapCell;

/// Universe cells split by whether any dataset covers them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub covered: Vec<GapCell>,
    pub gaps: Vec<GapCell>,
}

impl Partition {
    pub fn universe_size(&self) -> usize {
        self.covered.len() + self.gaps.len()
    }
}

/// Walk organisms × tissues × conditions × assays in ascending order and
/// classify every cell against the coarse coverage index.
pub fn enumerate(scope: &ScopeSets, index: &CoverageIndex) -> Partition {
    let mut partition = Partition::default();

    for organism in &scope.organisms {
        for tissue in &scope.tissues {
            for &condition in &scope.conditions {
                for assay_type in &scope.assays {
                    let cell = GapCell {
                        organism: organism.clone(),
                        tissue: tissue.clone(),
                        condition,
                        assay_type: assay_type.clone(),
                    };
                    if index.datasets(&cell).is_empty() {
                        partition.gaps.push(cell);
                    } else {
                        partition.covered.push(cell);
                    }
                }
            }
        }
    }

    partition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Covered,
    /// Some data, but fewer datasets than the requested minimum.
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    #[serde(flatten)]
    pub cell: GapCell,
    pub datasets: usize,
    pub status: CoverageStatus,
    pub example_dataset_link: Option<String>,
}

/// One row per in-scope coarse coverage key.
pub fn coverage_rows(
    scope: &ScopeSets,
    index: &CoverageIndex,
    min_datasets_for_covered: usize,
    links: &OsdrLinks,
) -> Vec<CoverageRow> {
    index
        .coverage_coarse
        .iter()
        .filter(|(cell, _)| scope.contains(cell))
        .map(|(cell, datasets)| CoverageRow {
            cell: cell.clone(),
            datasets: datasets.len(),
            status: if datasets.len() >= min_datasets_for_covered {
                CoverageStatus::Covered
            } else {
                CoverageStatus::Weak
            },
            example_dataset_link: datasets.iter().next().map(|ds| links.dataset(ds)),
        })
        .collect()
}
