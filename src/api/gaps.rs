use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::gaps::normalize::{fine_condition, GROUND_ANALOG, SPACEFLIGHT};
use crate::gaps::rank::MAX_TOP_N;
use crate::gaps::scope::{ConditionFilter, GapFilters};
use crate::gaps::{self, AnalysisOptions, CoarseCondition, GapAnalysis};
use crate::llm::gap_filter::extract_gap_filters;
use crate::models::{CoverageParams, CoverageResponse, GapOptions, GapSearchParams, GapSearchResponse};
use crate::osdr::record::{
    ACCESSION, ASSAY_NAME, ASSAY_TECHNOLOGY, CHARACTERISTICS, ORGANISM, SPACEFLIGHT_FACTOR,
};
use crate::osdr::{fetch_records, OsdrError, QueryParams, RawRecord};
use crate::state::AppState;

const SPACEFLIGHT_PATTERN: &str = "/space.*flight|pre.*flight|post.*flight|in[- ]?flight/i";
const GROUND_PATTERN: &str = "/ground|analog|vivarium|control/i";

/// GET /gaps/search: natural-language gap search with ranked highlights.
pub async fn search_gaps(
    State(state): State<AppState>,
    Query(params): Query<GapSearchParams>,
) -> Result<Json<GapSearchResponse>, (StatusCode, String)> {
    validate_min_datasets(params.min_datasets_for_covered)?;
    if !(1..=MAX_TOP_N).contains(&params.top_n) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("top_n must be between 1 and {MAX_TOP_N}"),
        ));
    }

    let (applied_url, analysis) = run_analysis(
        &state,
        params.q.as_deref().unwrap_or_default(),
        params.min_datasets_for_covered,
        params.top_n,
    )
    .await?;

    tracing::info!(
        gaps = analysis.gaps_total,
        highlights = analysis.highlights.len(),
        "gap search done"
    );

    Ok(Json(GapSearchResponse {
        applied_url,
        highlights: analysis.highlights,
        gaps_total: analysis.gaps_total,
        gaps: analysis.gaps,
    }))
}

/// GET /gaps/coverage: the covered side of the same analysis.
pub async fn gap_coverage(
    State(state): State<AppState>,
    Query(params): Query<CoverageParams>,
) -> Result<Json<CoverageResponse>, (StatusCode, String)> {
    validate_min_datasets(params.min_datasets_for_covered)?;

    let (applied_url, analysis) = run_analysis(
        &state,
        params.q.as_deref().unwrap_or_default(),
        params.min_datasets_for_covered,
        1,
    )
    .await?;

    Ok(Json(CoverageResponse {
        applied_url,
        coverage_rows: analysis.coverage_rows,
        covered_total: analysis.covered_total,
        gaps_total: analysis.gaps_total,
    }))
}

/// GET /gaps/options: distinct observed values for the UI pickers.
pub async fn gap_options(
    State(state): State<AppState>,
) -> Result<Json<GapOptions>, (StatusCode, String)> {
    let url = options_query().url(&state.config.assays_url());
    let records = fetch_records(&state.http_client, &url, state.osdr_timeout())
        .await
        .map_err(upstream_error)?;

    Ok(Json(collect_options(&records)))
}

async fn run_analysis(
    state: &AppState,
    query: &str,
    min_datasets_for_covered: usize,
    top_n: usize,
) -> Result<(String, GapAnalysis), (StatusCode, String)> {
    let filters = extract_gap_filters(&state.http_client, &state.config.llm, query)
        .await
        .map_err(filter_error)?;
    tracing::info!(?filters, "gap filters");

    let applied_url = gap_query(&filters).url(&state.config.assays_url());
    let records = fetch_records(&state.http_client, &applied_url, state.osdr_timeout())
        .await
        .map_err(upstream_error)?;

    let options = AnalysisOptions {
        min_datasets_for_covered,
        top_n,
        links: (*state.links).clone(),
    };
    let analysis = gaps::analyze(&records, &filters, &options);
    Ok((applied_url, analysis))
}

fn validate_min_datasets(min: usize) -> Result<(), (StatusCode, String)> {
    if min < 1 {
        return Err((
            StatusCode::BAD_REQUEST,
            "min_datasets_for_covered must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn filter_error(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("Gap filter extraction failed: {e:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Could not interpret the query: {e}"),
    )
}

fn upstream_error(e: OsdrError) -> (StatusCode, String) {
    tracing::error!("OSDR query failed: {e}");
    (StatusCode::BAD_GATEWAY, e.to_string())
}

/// OSDR assay query for a set of gap filters: `|`-joined organism and assay
/// alternatives, a condition regex or presence check, then output columns.
pub fn gap_query(filters: &GapFilters) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(organisms) = filters.organisms.as_deref().filter(|o| !o.is_empty()) {
        params.filter(ORGANISM, &organisms.join("|"));
    }
    if let Some(assays) = filters.assays.as_deref().filter(|a| !a.is_empty()) {
        params.filter(ASSAY_TECHNOLOGY, &assays.join("|"));
    }
    match filters.condition {
        ConditionFilter::Only(CoarseCondition::Spaceflight) => {
            params.filter(SPACEFLIGHT_FACTOR, SPACEFLIGHT_PATTERN);
        }
        ConditionFilter::Only(CoarseCondition::GroundAnalog) => {
            params.filter(SPACEFLIGHT_FACTOR, GROUND_PATTERN);
        }
        ConditionFilter::Both => {
            params.presence(SPACEFLIGHT_FACTOR);
        }
    }

    params
        .select(ACCESSION)
        .select(ASSAY_NAME)
        .select(ASSAY_TECHNOLOGY)
        .select(ORGANISM)
        .select(SPACEFLIGHT_FACTOR)
        .select(CHARACTERISTICS);
    params
}

fn options_query() -> QueryParams {
    let mut params = QueryParams::new();
    params
        .select(ASSAY_TECHNOLOGY)
        .presence(ORGANISM)
        .presence(SPACEFLIGHT_FACTOR)
        .select(CHARACTERISTICS);
    params
}

/// Conditions come back Spaceflight, Ground/Analog, then the rest sorted.
pub fn collect_options(records: &[RawRecord]) -> GapOptions {
    let mut organisms = BTreeSet::new();
    let mut assays = BTreeSet::new();
    let mut conditions = BTreeSet::new();
    let mut tissues = BTreeSet::new();

    for record in records {
        organisms.extend(record.organism());
        assays.extend(record.assay_technology());
        tissues.extend(record.tissue());
        if let Some(raw) = record.spaceflight_factor() {
            conditions.insert(fine_condition(Some(&raw)));
        }
    }

    let mut ordered: Vec<String> = [SPACEFLIGHT, GROUND_ANALOG]
        .into_iter()
        .filter(|c| conditions.remove(*c))
        .map(str::to_string)
        .collect();
    ordered.extend(conditions);
    if ordered.is_empty() {
        ordered = vec![SPACEFLIGHT.to_string(), GROUND_ANALOG.to_string()];
    }

    GapOptions {
        organisms: organisms.into_iter().collect(),
        assays: assays.into_iter().collect(),
        conditions: ordered,
        tissues: tissues.into_iter().collect(),
    }
}
