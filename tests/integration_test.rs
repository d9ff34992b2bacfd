//! Integration tests for the gap-analysis pipeline.
//!
//! These run the full normalize → index → enumerate → score → rank flow on
//! hand-built OSDR records, without an LLM or network access.

use serde_json::Value;

use gap_finder::gaps::enumerate::CoverageStatus;
use gap_finder::gaps::rank::rank_highlights;
use gap_finder::gaps::scope::{ConditionFilter, GapFilters};
use gap_finder::gaps::signals::{ScoredGap, SignalKind, Signals};
use gap_finder::gaps::tissue::canonical_tissue;
use gap_finder::gaps::{analyze, AnalysisOptions, CoarseCondition, GapAnalysis, GapCell};
use gap_finder::osdr::record::{ACCESSION, ASSAY_NAME, ASSAY_TECHNOLOGY, ORGANISM, SPACEFLIGHT_FACTOR};
use gap_finder::osdr::RawRecord;

const TISSUE: &str = "study.characteristics.organism part";

/// Helper: one OSDR json.records row.
fn record(org: &str, tissue: Option<&str>, factor: &str, assay: &str, acc: &str) -> RawRecord {
    let mut fields = vec![
        (ORGANISM, org),
        (SPACEFLIGHT_FACTOR, factor),
        (ASSAY_TECHNOLOGY, assay),
        (ACCESSION, acc),
    ];
    if let Some(t) = tissue {
        fields.push((TISSUE, t));
    }
    fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

fn cell(org: &str, tissue: Option<&str>, condition: CoarseCondition, assay: &str) -> GapCell {
    GapCell {
        organism: org.to_string(),
        tissue: tissue.map(str::to_string),
        condition,
        assay_type: assay.to_string(),
    }
}

fn run(records: &[RawRecord]) -> GapAnalysis {
    analyze(records, &GapFilters::default(), &AnalysisOptions::default())
}

#[test]
fn test_no_records_gives_empty_response() {
    let analysis = run(&[]);
    assert!(analysis.highlights.is_empty());
    assert!(analysis.gaps.is_empty());
    assert_eq!(analysis.gaps_total, 0);
}

#[test]
fn test_single_spaceflight_record() {
    let records = [record(
        "Mus musculus",
        Some("Liver"),
        "Space Flight",
        "RNA Sequencing",
        "OSD-1",
    )];
    let analysis = run(&records);

    let covered = cell("Mus musculus", Some("Liver"), CoarseCondition::Spaceflight, "RNA Sequencing");
    let ground_gap = cell("Mus musculus", Some("Liver"), CoarseCondition::GroundAnalog, "RNA Sequencing");

    assert!(!analysis.gaps.contains(&covered));
    assert!(analysis.gaps.contains(&ground_gap));
    assert_eq!(analysis.covered_total, 1);
    // {None, Liver} × {Ground/Analog, Spaceflight} minus the covered cell
    assert_eq!(analysis.gaps_total, 3);

    let scored = analysis
        .highlights
        .iter()
        .find(|h| h.cell == ground_gap)
        .expect("ground gap is highlighted");
    assert_eq!(scored.signals.ground_base, 0.0);
}

#[test]
fn test_missing_flight_proteomics_scores_ground_and_multi_omics() {
    let records = [
        record("Homo sapiens", Some("Kidney"), "Ground Control", "Proteomics", "OSD-1"),
        record("Homo sapiens", Some("Kidney"), "Space Flight", "RNA Sequencing", "OSD-2"),
    ];
    let analysis = run(&records);

    let target = cell("Homo sapiens", Some("Kidney"), CoarseCondition::Spaceflight, "Proteomics");
    let scored = analysis
        .highlights
        .iter()
        .find(|h| h.cell == target)
        .expect("flight proteomics gap is highlighted");

    assert!(scored.signals.ground_base > 0.0);
    assert_eq!(scored.signals.multi_omics, 1.0);
    assert!(scored.score > 0.0);
    assert!(scored
        .reasons_detail
        .iter()
        .any(|r| r.kind == SignalKind::MultiOmics));
}

#[test]
fn test_tissue_variants_share_one_cell() {
    assert_eq!(canonical_tissue("Adrenal Glands").as_deref(), Some("Adrenal Gland"));
    assert_eq!(canonical_tissue("adrenal gland").as_deref(), Some("Adrenal Gland"));

    let records = [
        record("Mus musculus", Some("Adrenal Glands"), "Space Flight", "Proteomics", "OSD-1"),
        record("Mus musculus", Some("adrenal gland"), "Space Flight", "Proteomics", "OSD-2"),
    ];
    let analysis = run(&records);

    assert_eq!(analysis.coverage_rows.len(), 1);
    let row = &analysis.coverage_rows[0];
    assert_eq!(row.cell.tissue.as_deref(), Some("Adrenal Gland"));
    assert_eq!(row.datasets, 2);
    assert_eq!(row.status, CoverageStatus::Covered);
}

#[test]
fn test_canonical_tissue_is_stable_across_passes() {
    for raw in ["both_sides Retina", "Kidney both-sides", "both  sides Liver", "Adrenal Glands"] {
        let once = canonical_tissue(raw);
        assert_eq!(once.as_deref().and_then(canonical_tissue), once, "unstable for {raw:?}");
    }

    let records = [
        record("Mus musculus", Some("both_sides Retina"), "Space Flight", "Proteomics", "OSD-1"),
        record("Mus musculus", Some("Retina"), "Space Flight", "Proteomics", "OSD-2"),
    ];
    let analysis = run(&records);
    assert_eq!(analysis.coverage_rows.len(), 1);
    assert_eq!(analysis.coverage_rows[0].cell.tissue.as_deref(), Some("Retina"));
    assert_eq!(analysis.coverage_rows[0].datasets, 2);
}

#[test]
fn test_top_n_keeps_highest() {
    let scored = |assay: &str, score: f64| ScoredGap {
        cell: cell("Mus musculus", None, CoarseCondition::Spaceflight, assay),
        score,
        reason: String::new(),
        reasons_detail: Vec::new(),
        signals: Signals::default(),
    };
    let ranked = rank_highlights(
        vec![scored("A", 3.0), scored("B", 5.0), scored("C", 1.0)],
        1,
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 5.0);
    assert_eq!(ranked[0].cell.assay_type, "B");
}

fn mixed_records() -> Vec<RawRecord> {
    vec![
        record("Mus musculus", Some("Liver"), "Space Flight", "RNA Sequencing", "OSD-1"),
        record("Mus musculus", Some("Liver"), "Ground Control", "RNA Sequencing", "OSD-2"),
        record("Mus musculus", Some("Liver"), "Pre-flight", "Proteomics", "OSD-3"),
        record("Homo sapiens", Some("Blood"), "In-flight", "Proteomics", "OSD-4"),
        record("Homo sapiens", None, "Vivarium", "Metabolomics", "OSD-5"),
        record("Rattus norvegicus", Some("Soleus"), "Space Flight", "RNA Sequencing", "OSD-6"),
        record("Rattus norvegicus", Some("Soleus"), "Basal", "RNA Sequencing", "OSD-7"),
    ]
}

#[test]
fn test_partition_covers_the_universe() {
    let analysis = run(&mixed_records());

    // 3 organisms × (3 parent tissues + unspecified) × 2 conditions × 3 assays
    let universe = 3 * 4 * 2 * 3;
    assert_eq!(analysis.gaps_total + analysis.covered_total, universe);
    assert_eq!(analysis.gaps.len(), analysis.gaps_total);
    assert_eq!(analysis.covered_total, analysis.coverage_rows.len());
    for row in &analysis.coverage_rows {
        assert!(!analysis.gaps.contains(&row.cell));
    }
}

#[test]
fn test_output_is_deterministic() {
    let records = mixed_records();
    let mut reversed = records.clone();
    reversed.reverse();

    let a = run(&records);
    let b = run(&reversed);
    assert_eq!(a, b);

    let mut sorted = a.gaps.clone();
    sorted.sort();
    assert_eq!(a.gaps, sorted);

    for pair in a.highlights.windows(2) {
        let (x, y) = (&pair[0], &pair[1]);
        assert!(x.score > y.score || (x.score == y.score && x.cell < y.cell));
    }
}

#[test]
fn test_signals_stay_in_unit_range() {
    let analysis = analyze(
        &mixed_records(),
        &GapFilters::default(),
        &AnalysisOptions {
            top_n: 100,
            ..AnalysisOptions::default()
        },
    );
    assert!(!analysis.highlights.is_empty());
    for h in &analysis.highlights {
        let s = &h.signals;
        for v in [
            s.ground_base,
            s.multi_omics,
            s.phase_critical,
            s.species_translation,
            s.neighbor_density,
            s.feasibility,
            s.redundancy,
        ] {
            assert!((0.0..=1.0).contains(&v), "{v} out of range for {:?}", h.cell);
        }
    }
}

#[test]
fn test_assay_names_do_not_double_count_datasets() {
    let base = record("Mus musculus", Some("Liver"), "Space Flight", "RNA Sequencing", "OSD-1");
    let named = |name: &str| {
        let mut fields: serde_json::Map<String, Value> =
            serde_json::from_value(serde_json::to_value(&base).unwrap()).unwrap();
        fields.insert(ASSAY_NAME.to_string(), Value::from(name));
        RawRecord::new(fields)
    };

    let analysis = run(&[named("assay-a"), named("assay-b")]);
    assert_eq!(analysis.coverage_rows.len(), 1);
    assert_eq!(analysis.coverage_rows[0].datasets, 1);
}

#[test]
fn test_single_condition_scope() {
    let filters = GapFilters {
        condition: ConditionFilter::Only(CoarseCondition::Spaceflight),
        ..GapFilters::default()
    };
    let analysis = analyze(&mixed_records(), &filters, &AnalysisOptions::default());

    assert!(analysis
        .gaps
        .iter()
        .all(|g| g.condition == CoarseCondition::Spaceflight));
    assert!(analysis
        .coverage_rows
        .iter()
        .all(|r| r.cell.condition == CoarseCondition::Spaceflight));
}

#[test]
fn test_explicit_scope_outside_observations() {
    let filters = GapFilters {
        organisms: Some(vec!["Danio rerio".into()]),
        assays: Some(vec!["ATAC-seq".into()]),
        condition: ConditionFilter::Both,
        tissues: Some(vec!["Hearts".into()]),
    };
    let analysis = analyze(&mixed_records(), &filters, &AnalysisOptions::default());

    assert_eq!(analysis.covered_total, 0);
    assert_eq!(analysis.gaps_total, 2);
    assert_eq!(analysis.gaps[0].tissue.as_deref(), Some("Heart"));
    assert_eq!(analysis.highlights.len(), 2);
}
