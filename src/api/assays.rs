use std::collections::{BTreeMap, BTreeSet, HashMap};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::llm::assay_filter::{extract_assay_filters, AssayFilters};
use crate::models::{AssayCard, AssaySearchParams, AssaySearchResponse, TechnologyGroup};
use crate::osdr::record::{ACCESSION, ASSAY_NAME, ASSAY_TECHNOLOGY, ORGANISM, SPACEFLIGHT_FACTOR};
use crate::osdr::{fetch_records, OsdrLinks, QueryParams, RawRecord};
use crate::state::AppState;

const MAX_LIMIT_PER_TECH: usize = 50;
const OTHER_TECHNOLOGY: &str = "Other / Unspecified";

/// Group order in the response; anything unlisted sorts between these and
/// the catch-all group.
const TECH_PRIORITY: [&str; 6] = [
    "RNA Sequencing",
    "DNA microarray",
    "Proteomics",
    "Imaging",
    "Nanopore long read DNA Sequencing",
    "Atomic Force Microscopy",
];

/// GET /assays/search: natural-language assay finder.
pub async fn search_assays(
    State(state): State<AppState>,
    Query(params): Query<AssaySearchParams>,
) -> Result<Json<AssaySearchResponse>, (StatusCode, String)> {
    if !(1..=MAX_LIMIT_PER_TECH).contains(&params.limit_per_tech) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("limit_per_tech must be between 1 and {MAX_LIMIT_PER_TECH}"),
        ));
    }

    let query = params.q.as_deref().unwrap_or_default();
    let filters = extract_assay_filters(&state.http_client, &state.config.llm, query)
        .await
        .map_err(|e| {
            tracing::error!("Assay filter extraction failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not interpret the query: {e}"),
            )
        })?;
    tracing::info!(?filters, "assay filters");

    let applied_url = assay_query(&filters).url(&state.config.assays_url());
    let records = fetch_records(&state.http_client, &applied_url, state.osdr_timeout())
        .await
        .map_err(|e| {
            tracing::error!("OSDR query failed: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let cards = dedup_cards(&records, &state.links);
    tracing::info!(rows = records.len(), cards = cards.len(), "assay search done");

    if !params.group_by_technology {
        return Ok(Json(AssaySearchResponse::Flat {
            applied_url,
            count: cards.len(),
            cards,
        }));
    }

    Ok(Json(AssaySearchResponse::Grouped(group_by_technology(
        cards,
        params.limit_per_tech,
        params.exclude_na,
    ))))
}

pub fn assay_query(filters: &AssayFilters) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(dataset) = &filters.dataset {
        params.filter(ACCESSION, dataset);
    }
    if let Some(organism) = &filters.organism {
        params.filter(ORGANISM, &format!("/{organism}/i"));
    }
    if let Some(assay) = &filters.assay_regex {
        params.filter(ASSAY_NAME, &format!("/{assay}/i"));
    }
    if let Some(tech) = &filters.technology_regex {
        params.filter(ASSAY_TECHNOLOGY, &format!("/{tech}/i"));
    }
    if let Some(condition) = &filters.condition {
        match condition.trim().to_lowercase().as_str() {
            "spaceflight" | "flight" => {
                params.filter(SPACEFLIGHT_FACTOR, "/flight/i");
            }
            "ground" | "ground control" | "control" => {
                params.filter(SPACEFLIGHT_FACTOR, "/ground/i");
            }
            "any" | "present" => {
                params.presence(SPACEFLIGHT_FACTOR);
            }
            _ => {}
        }
    }

    params
        .select(ORGANISM)
        .select(SPACEFLIGHT_FACTOR)
        .select(ASSAY_TECHNOLOGY);
    params
}

/// Canonical technology label; unknown labels pass through trimmed.
pub fn normalize_tech_label(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        None => OTHER_TECHNOLOGY.to_string(),
        Some("RNA Sequencing (RNA-Seq)") => "RNA Sequencing".to_string(),
        Some(t) => t.to_string(),
    }
}

/// One card per (dataset, assay name), in first-seen order before sorting.
/// Conditions are unioned; other fields keep the first non-empty value.
pub fn dedup_cards(records: &[RawRecord], links: &OsdrLinks) -> Vec<AssayCard> {
    let mut cards: Vec<(AssayCard, BTreeSet<String>)> = Vec::new();
    let mut seen: HashMap<(Option<String>, Option<String>), usize> = HashMap::new();

    for record in records {
        let dataset = record.accession();
        let assay_name = record.assay_name();
        let slot = *seen
            .entry((dataset.clone(), assay_name.clone()))
            .or_insert_with(|| {
                let link = match (&dataset, &assay_name) {
                    (Some(ds), Some(an)) => Some(links.assay(ds, an)),
                    _ => None,
                };
                cards.push((
                    AssayCard {
                        dataset_link: dataset.as_deref().map(|ds| links.dataset(ds)),
                        link,
                        dataset: dataset.clone(),
                        assay_name: assay_name.clone(),
                        organism: None,
                        assay_technology: String::new(),
                        conditions: Vec::new(),
                        has_flight: false,
                        has_ground: false,
                        has_both_flight_ground: false,
                    },
                    BTreeSet::new(),
                ));
                cards.len() - 1
            });

        let (card, conditions) = &mut cards[slot];
        conditions.extend(record.spaceflight_factor());
        if card.organism.is_none() {
            card.organism = record.organism();
        }
        if card.assay_technology.is_empty() || card.assay_technology == OTHER_TECHNOLOGY {
            card.assay_technology = normalize_tech_label(record.assay_technology().as_deref());
        }
    }

    let mut cards: Vec<AssayCard> = cards
        .into_iter()
        .map(|(mut card, conditions)| {
            card.has_flight = conditions.iter().any(|c| {
                let low = c.to_lowercase();
                (low.contains("flight") && low.contains("space")) || low.starts_with("space")
            });
            card.has_ground = conditions.iter().any(|c| c.to_lowercase().contains("ground"));
            card.has_both_flight_ground = card.has_flight && card.has_ground;
            card.conditions = conditions.into_iter().collect();
            card
        })
        .collect();

    cards.sort_by(|a, b| {
        (&a.assay_technology, &a.dataset, &a.assay_name).cmp(&(
            &b.assay_technology,
            &b.dataset,
            &b.assay_name,
        ))
    });
    cards
}

/// Flight and ground together first, then flight only, then ground only.
fn comparability(card: &AssayCard) -> u8 {
    match (card.has_both_flight_ground, card.has_flight, card.has_ground) {
        (true, _, _) => 0,
        (false, true, _) => 1,
        (false, false, true) => 2,
        _ => 3,
    }
}

fn tech_rank(technology: &str) -> usize {
    if technology == OTHER_TECHNOLOGY {
        return TECH_PRIORITY.len() + 2;
    }
    TECH_PRIORITY
        .iter()
        .position(|t| *t == technology)
        .unwrap_or(TECH_PRIORITY.len())
}

/// Bucket cards by technology and keep the `limit_per_tech` most comparable
/// per bucket. `count` reports the bucket size before truncation. With
/// `exclude_na`, "Not Applicable" is hidden from the listed conditions but
/// the flags are left alone.
pub fn group_by_technology(
    cards: Vec<AssayCard>,
    limit_per_tech: usize,
    exclude_na: bool,
) -> Vec<TechnologyGroup> {
    let mut buckets: BTreeMap<String, Vec<AssayCard>> = BTreeMap::new();
    for card in cards {
        buckets.entry(card.assay_technology.clone()).or_default().push(card);
    }

    let mut groups: Vec<TechnologyGroup> = buckets
        .into_iter()
        .map(|(technology, mut items)| {
            items.sort_by(|a, b| {
                (comparability(a), &a.dataset, &a.assay_name).cmp(&(
                    comparability(b),
                    &b.dataset,
                    &b.assay_name,
                ))
            });
            let count = items.len();
            items.truncate(limit_per_tech);
            if exclude_na {
                for item in &mut items {
                    item.conditions
                        .retain(|c| !c.to_lowercase().contains("not applicable"));
                }
            }
            TechnologyGroup {
                technology,
                count,
                assays: items,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        (tech_rank(&a.technology), &a.technology).cmp(&(tech_rank(&b.technology), &b.technology))
    });
    groups
}
