use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gaps::enumerate::CoverageRow;
use crate::gaps::rank::DEFAULT_TOP_N;
use crate::gaps::signals::ScoredGap;
use crate::gaps::GapCell;

/// Query string for `/gaps/search`
#[derive(Debug, Clone, Deserialize)]
pub struct GapSearchParams {
    /// Free text; the LLM turns it into filters
    pub q: Option<String>,
    #[serde(default = "default_min_datasets")]
    pub min_datasets_for_covered: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Query string for `/gaps/coverage`
#[derive(Debug, Clone, Deserialize)]
pub struct CoverageParams {
    pub q: Option<String>,
    #[serde(default = "default_min_datasets")]
    pub min_datasets_for_covered: usize,
}

fn default_min_datasets() -> usize {
    1
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Gap search response. Field names are a stable contract for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct GapSearchResponse {
    pub applied_url: String,
    pub highlights: Vec<ScoredGap>,
    pub gaps_total: usize,
    pub gaps: Vec<GapCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageResponse {
    pub applied_url: String,
    pub coverage_rows: Vec<CoverageRow>,
    pub covered_total: usize,
    pub gaps_total: usize,
}

/// Distinct observed values for UI pickers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapOptions {
    pub organisms: Vec<String>,
    pub assays: Vec<String>,
    pub conditions: Vec<String>,
    pub tissues: Vec<String>,
}

/// Query string for `/assays/search`
#[derive(Debug, Clone, Deserialize)]
pub struct AssaySearchParams {
    pub q: Option<String>,
    #[serde(default = "default_true")]
    pub group_by_technology: bool,
    #[serde(default = "default_limit_per_tech")]
    pub limit_per_tech: usize,
    #[serde(default = "default_true")]
    pub exclude_na: bool,
}

fn default_true() -> bool {
    true
}

fn default_limit_per_tech() -> usize {
    3
}

/// One (dataset, assay) pair with every spaceflight annotation seen for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssayCard {
    pub dataset: Option<String>,
    pub assay_name: Option<String>,
    pub organism: Option<String>,
    pub assay_technology: String,
    pub conditions: Vec<String>,
    pub link: Option<String>,
    pub dataset_link: Option<String>,
    pub has_flight: bool,
    pub has_ground: bool,
    pub has_both_flight_ground: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyGroup {
    pub technology: String,
    /// Cards in the group before truncation
    pub count: usize,
    pub assays: Vec<AssayCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AssaySearchResponse {
    Grouped(Vec<TechnologyGroup>),
    Flat {
        applied_url: String,
        count: usize,
        cards: Vec<AssayCard>,
    },
}

/// Chat creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub chat_uuid: Uuid,
}

/// A user turn posted to a chat
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub message: String,
    #[serde(alias = "metodo", default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "local".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptAnswerResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_params_defaults() {
        let params: GapSearchParams = serde_json::from_str(r#"{"q": "mouse liver"}"#).unwrap();
        assert_eq!(params.min_datasets_for_covered, 1);
        assert_eq!(params.top_n, 20);
    }

    #[test]
    fn test_assay_params_defaults() {
        let params: AssaySearchParams = serde_json::from_str("{}").unwrap();
        assert!(params.q.is_none());
        assert!(params.group_by_technology);
        assert_eq!(params.limit_per_tech, 3);
        assert!(params.exclude_na);
    }

    #[test]
    fn test_message_request_accepts_metodo() {
        let req: MessageRequest =
            serde_json::from_str(r#"{"message": "hola", "metodo": "global"}"#).unwrap();
        assert_eq!(req.method, "global");

        let req: MessageRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.method, "local");
    }

    #[test]
    fn test_flat_assay_response_shape() {
        let resp = AssaySearchResponse::Flat {
            applied_url: "u".into(),
            count: 0,
            cards: vec![],
        };
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["count"], 0);
        assert!(json["cards"].as_array().unwrap().is_empty());
    }
}
