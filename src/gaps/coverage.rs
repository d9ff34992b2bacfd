use std::collections::{BTreeMap, BTreeSet};

use super::normalize::ObservedTuple;
use super::tissue::canonical_tissue;
use super::{CoarseCondition, GapCell};

pub type DatasetIds = BTreeSet<String>;

static NO_DATASETS: DatasetIds = BTreeSet::new();

/// Coverage key at raw resolution: raw tissue text and fine condition label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FineKey {
    pub organism: String,
    pub tissue_raw: Option<String>,
    pub condition_fine: String,
    pub assay_type: String,
}

/// (organism, parent tissue, coarse condition)
pub type ComboKey = (String, Option<String>, CoarseCondition);
/// (parent tissue, coarse condition, assay type)
pub type StructureKey = (Option<String>, CoarseCondition, String);

/// Aggregate indices over one request's observed tuples.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    pub coverage_fine: BTreeMap<FineKey, DatasetIds>,
    pub coverage_coarse: BTreeMap<GapCell, DatasetIds>,
    /// Datasets per (organism, tissue, condition) across assay types.
    pub datasets_by_combo: BTreeMap<ComboKey, DatasetIds>,
    /// Assay types present per (organism, tissue, condition).
    pub assays_by_combo: BTreeMap<ComboKey, BTreeSet<String>>,
    /// Fine condition labels seen per (organism, tissue).
    pub phases_by_org_tissue: BTreeMap<(String, Option<String>), BTreeSet<String>>,
    /// Organisms covering each (tissue, condition, assay).
    pub species_by_structure: BTreeMap<StructureKey, BTreeSet<String>>,
    /// Datasets per (tissue, condition) across organisms and assay types.
    pub datasets_by_tissue_condition: BTreeMap<(Option<String>, CoarseCondition), DatasetIds>,
    /// Tuples per assay type over everything fetched.
    pub assay_frequency: BTreeMap<String, usize>,
}

impl CoverageIndex {
    /// Build every index in one pass.
    ///
    /// With `only` set, tuples of the other coarse condition still count
    /// toward `assay_frequency` but feed nothing else.
    pub fn build(tuples: &[ObservedTuple], only: Option<CoarseCondition>) -> Self {
        let mut index = Self::default();

        for t in tuples {
            *index.assay_frequency.entry(t.assay_type.clone()).or_default() += 1;

            if only.is_some_and(|c| c != t.condition_coarse) {
                continue;
            }

            let tissue = t.tissue_raw.as_deref().and_then(canonical_tissue);
            let cond = t.condition_coarse;
            let combo: ComboKey = (t.organism.clone(), tissue.clone(), cond);

            index
                .coverage_fine
                .entry(FineKey {
                    organism: t.organism.clone(),
                    tissue_raw: t.tissue_raw.clone(),
                    condition_fine: t.condition_fine.clone(),
                    assay_type: t.assay_type.clone(),
                })
                .or_default()
                .insert(t.dataset_id.clone());
            index
                .coverage_coarse
                .entry(GapCell {
                    organism: t.organism.clone(),
                    tissue: tissue.clone(),
                    condition: cond,
                    assay_type: t.assay_type.clone(),
                })
                .or_default()
                .insert(t.dataset_id.clone());
            index
                .datasets_by_combo
                .entry(combo.clone())
                .or_default()
                .insert(t.dataset_id.clone());
            index
                .assays_by_combo
                .entry(combo)
                .or_default()
                .insert(t.assay_type.clone());
            index
                .phases_by_org_tissue
                .entry((t.organism.clone(), tissue.clone()))
                .or_default()
                .insert(t.condition_fine.clone());
            index
                .species_by_structure
                .entry((tissue.clone(), cond, t.assay_type.clone()))
                .or_default()
                .insert(t.organism.clone());
            index
                .datasets_by_tissue_condition
                .entry((tissue, cond))
                .or_default()
                .insert(t.dataset_id.clone());
        }

        index
    }

    /// Datasets covering a coarse cell (empty for gaps).
    pub fn datasets(&self, cell: &GapCell) -> &DatasetIds {
        self.coverage_coarse.get(cell).unwrap_or(&NO_DATASETS)
    }

    pub fn combo_datasets(
        &self,
        organism: &str,
        tissue: &Option<String>,
        condition: CoarseCondition,
    ) -> &DatasetIds {
        self.datasets_by_combo
            .get(&(organism.to_string(), tissue.clone(), condition))
            .unwrap_or(&NO_DATASETS)
    }

    pub fn combo_assays(
        &self,
        organism: &str,
        tissue: &Option<String>,
        condition: CoarseCondition,
    ) -> &BTreeSet<String> {
        self.assays_by_combo
            .get(&(organism.to_string(), tissue.clone(), condition))
            .unwrap_or(&NO_DATASETS)
    }

    pub fn phases(&self, organism: &str, tissue: &Option<String>) -> &BTreeSet<String> {
        self.phases_by_org_tissue
            .get(&(organism.to_string(), tissue.clone()))
            .unwrap_or(&NO_DATASETS)
    }

    pub fn species(
        &self,
        tissue: &Option<String>,
        condition: CoarseCondition,
        assay_type: &str,
    ) -> &BTreeSet<String> {
        self.species_by_structure
            .get(&(tissue.clone(), condition, assay_type.to_string()))
            .unwrap_or(&NO_DATASETS)
    }

    pub fn neighborhood(&self, tissue: &Option<String>, condition: CoarseCondition) -> &DatasetIds {
        self.datasets_by_tissue_condition
            .get(&(tissue.clone(), condition))
            .unwrap_or(&NO_DATASETS)
    }

    pub fn assay_count(&self, assay_type: &str) -> usize {
        self.assay_frequency.get(assay_type).copied().unwrap_or(0)
    }

    pub fn max_assay_count(&self) -> usize {
        self.assay_frequency.values().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(org: &str, tissue: Option<&str>, fine: &str, assay: &str, ds: &str) -> ObservedTuple {
        ObservedTuple {
            organism: org.to_string(),
            tissue_raw: tissue.map(str::to_string),
            condition_fine: fine.to_string(),
            assay_type: assay.to_string(),
            dataset_id: ds.to_string(),
            assay_name: None,
            condition_coarse: CoarseCondition::resolve(fine),
        }
    }

    fn cell(org: &str, tissue: Option<&str>, cond: CoarseCondition, assay: &str) -> GapCell {
        GapCell {
            organism: org.to_string(),
            tissue: tissue.map(str::to_string),
            condition: cond,
            assay_type: assay.to_string(),
        }
    }

    #[test]
    fn test_dataset_sets_dedupe_accessions() {
        let mut a = tuple("Mus musculus", Some("Liver"), "Spaceflight", "RNA Sequencing", "OSD-1");
        a.assay_name = Some("assay-a".into());
        let mut b = a.clone();
        b.assay_name = Some("assay-b".into());

        let index = CoverageIndex::build(&[a, b], None);
        let c = cell("Mus musculus", Some("Liver"), CoarseCondition::Spaceflight, "RNA Sequencing");
        assert_eq!(index.datasets(&c).len(), 1);
        assert_eq!(index.assay_count("RNA Sequencing"), 2);
    }

    #[test]
    fn test_coarse_key_uses_parent_tissue() {
        let tuples = [
            tuple("Mus musculus", Some("Adrenal Glands"), "Pre-flight", "Proteomics", "OSD-1"),
            tuple("Mus musculus", Some("adrenal gland"), "Spaceflight", "Proteomics", "OSD-2"),
        ];
        let index = CoverageIndex::build(&tuples, None);

        assert_eq!(index.coverage_fine.len(), 2);
        assert_eq!(index.coverage_coarse.len(), 1);
        let c = cell("Mus musculus", Some("Adrenal Gland"), CoarseCondition::Spaceflight, "Proteomics");
        assert_eq!(index.datasets(&c).len(), 2);

        let phases = index.phases("Mus musculus", &Some("Adrenal Gland".into()));
        assert!(phases.contains("Pre-flight"));
        assert!(phases.contains("Spaceflight"));
    }

    #[test]
    fn test_each_tuple_lands_in_one_fine_and_one_coarse_key() {
        let tuples = [
            tuple("Mus musculus", Some("Liver"), "Spaceflight", "RNA Sequencing", "OSD-1"),
            tuple("Mus musculus", None, "Ground/Analog", "RNA Sequencing", "OSD-2"),
            tuple("Homo sapiens", Some("Blood"), "In-flight", "Proteomics", "OSD-3"),
        ];
        let index = CoverageIndex::build(&tuples, None);
        let fine_total: usize = index.coverage_fine.values().map(BTreeSet::len).sum();
        let coarse_total: usize = index.coverage_coarse.values().map(BTreeSet::len).sum();
        assert_eq!(fine_total, 3);
        assert_eq!(coarse_total, 3);
    }

    #[test]
    fn test_condition_restriction_keeps_frequency() {
        let tuples = [
            tuple("Mus musculus", Some("Liver"), "Spaceflight", "RNA Sequencing", "OSD-1"),
            tuple("Mus musculus", Some("Liver"), "Ground/Analog", "Proteomics", "OSD-2"),
        ];
        let index = CoverageIndex::build(&tuples, Some(CoarseCondition::Spaceflight));
        assert_eq!(index.coverage_coarse.len(), 1);
        assert_eq!(index.assay_count("Proteomics"), 1);
        assert_eq!(index.max_assay_count(), 1);
    }

    #[test]
    fn test_neighborhood_unions_organisms_and_assays() {
        let tuples = [
            tuple("Mus musculus", Some("Liver"), "Spaceflight", "RNA Sequencing", "OSD-1"),
            tuple("Rattus norvegicus", Some("Liver"), "Spaceflight", "Proteomics", "OSD-2"),
            tuple("Rattus norvegicus", Some("Liver"), "Spaceflight", "Proteomics", "OSD-2"),
            tuple("Mus musculus", Some("Liver"), "Ground/Analog", "Proteomics", "OSD-3"),
        ];
        let index = CoverageIndex::build(&tuples, None);
        let liver = Some("Liver".to_string());
        assert_eq!(index.neighborhood(&liver, CoarseCondition::Spaceflight).len(), 2);
        assert_eq!(
            index.species(&liver, CoarseCondition::Spaceflight, "Proteomics").len(),
            1
        );
        assert!(index.combo_assays("Mus musculus", &liver, CoarseCondition::Spaceflight)
            .contains("RNA Sequencing"));
    }

    #[test]
    fn test_empty_lookups() {
        let index = CoverageIndex::build(&[], None);
        assert!(index.neighborhood(&None, CoarseCondition::GroundAnalog).is_empty());
        assert_eq!(index.max_assay_count(), 0);
    }
}
