//! Client for the OSDR biodata query API (`/query/assays/`).
//!
//! The API takes an ordered list of query parameters: `field=value` filters,
//! bare `field` selectors that add a column to the output, and `=field`
//! presence checks (field annotated and not null). Responses are requested as
//! `json.records`, a flat list of objects.

pub mod record;

use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
pub use record::RawRecord;

pub const DEFAULT_FORMAT: &str = "json.records";

#[derive(Debug, Error)]
pub enum OsdrError {
    #[error("OSDR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OSDR returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OSDR response is not a json.records list")]
    NotAList,
}

#[derive(Debug, Clone, PartialEq)]
enum Param {
    Filter(String, String),
    Select(String),
    Presence(String),
}

/// Ordered OSDR query parameters. Always starts with `format=json.records`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams(Vec<Param>);

impl Default for QueryParams {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self(vec![Param::Filter(
            "format".to_string(),
            DEFAULT_FORMAT.to_string(),
        )])
    }

    /// `field=value`
    pub fn filter(&mut self, field: &str, value: &str) -> &mut Self {
        self.0.push(Param::Filter(field.to_string(), value.to_string()));
        self
    }

    /// Bare `field`: include the column in the output.
    pub fn select(&mut self, field: &str) -> &mut Self {
        self.0.push(Param::Select(field.to_string()));
        self
    }

    /// `=field`: the field must be annotated.
    pub fn presence(&mut self, field: &str) -> &mut Self {
        self.0.push(Param::Presence(field.to_string()));
        self
    }

    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|p| match p {
                Param::Filter(k, v) => format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)),
                Param::Select(k) => urlencoding::encode(k).into_owned(),
                Param::Presence(k) => format!("={}", urlencoding::encode(k)),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request URL, also echoed back to clients as `applied_url`.
    pub fn url(&self, base: &str) -> String {
        format!("{base}?{}", self.to_query_string())
    }
}

/// GET a `json.records` query and return its rows.
///
/// Anything other than a 2xx carrying a JSON list is an error; an empty list
/// is a valid answer. Non-object list items are skipped.
pub async fn fetch_records(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<RawRecord>, OsdrError> {
    tracing::debug!("Requesting OSDR: {url}");

    let resp = client.get(url).timeout(timeout).send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(OsdrError::Status { status, body });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_records(body)
}

fn parse_records(body: serde_json::Value) -> Result<Vec<RawRecord>, OsdrError> {
    match body {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(map) => Some(RawRecord::new(map)),
                _ => None,
            })
            .collect()),
        _ => Err(OsdrError::NotAList),
    }
}

/// HTML links into the OSDR browser for datasets and single assays.
#[derive(Debug, Clone)]
pub struct OsdrLinks {
    metadata_url: String,
    dataset_url: String,
}

impl Default for OsdrLinks {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl OsdrLinks {
    pub fn from_config(config: &Config) -> Self {
        Self {
            metadata_url: config.metadata_url(),
            dataset_url: config.dataset_url(),
        }
    }

    pub fn dataset(&self, accession: &str) -> String {
        format!("{}/{accession}/?format=html", self.dataset_url)
    }

    pub fn assay(&self, accession: &str, assay_name: &str) -> String {
        format!(
            "{}?id.accession={accession}&id.assay%20name={}\
             &study.characteristics&study.factor%20value&assay.parameter%20value\
             &file.data%20type&format=html",
            self.metadata_url,
            urlencoding::encode(assay_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_string_starts_with_format() {
        let params = QueryParams::new();
        assert_eq!(params.to_query_string(), "format=json.records");
    }

    #[test]
    fn test_query_string_param_kinds() {
        let mut params = QueryParams::new();
        params
            .filter(record::ORGANISM, "Mus musculus|Homo sapiens")
            .presence(record::SPACEFLIGHT_FACTOR)
            .select(record::ACCESSION);

        assert_eq!(
            params.to_query_string(),
            "format=json.records\
             &study.characteristics.organism=Mus%20musculus%7CHomo%20sapiens\
             &=study.factor%20value.spaceflight\
             &id.accession"
        );
    }

    #[test]
    fn test_url_joins_base() {
        let params = QueryParams::new();
        assert_eq!(
            params.url("https://osdr.example/query/assays/"),
            "https://osdr.example/query/assays/?format=json.records"
        );
    }

    #[test]
    fn test_parse_records_list() {
        let rows = parse_records(json!([{ "id.accession": "OSD-1" }, 3, { "id.accession": "OSD-2" }]))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].accession().as_deref(), Some("OSD-2"));
    }

    #[test]
    fn test_parse_records_empty_list_is_ok() {
        assert!(parse_records(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_records_rejects_non_list() {
        let err = parse_records(json!({ "error": "bad query" })).unwrap_err();
        assert!(matches!(err, OsdrError::NotAList));
    }

    #[test]
    fn test_links() {
        let links = OsdrLinks::default();
        assert_eq!(
            links.dataset("OSD-47"),
            "https://visualization.osdr.nasa.gov/biodata/api/v2/dataset/OSD-47/?format=html"
        );
        let assay = links.assay("OSD-47", "OSD-47 rna/seq");
        assert!(assay.starts_with(
            "https://visualization.osdr.nasa.gov/biodata/api/v2/query/metadata/?id.accession=OSD-47"
        ));
        assert!(assay.contains("id.assay%20name=OSD-47%20rna%2Fseq"));
        assert!(assay.ends_with("&format=html"));
    }

    async fn stub(status: u16, body: &'static str) -> String {
        use axum::http::StatusCode;
        use axum::routing::get;

        let code = StatusCode::from_u16(status).unwrap();
        let app = axum::Router::new().route("/", get(move || async move { (code, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_fetch_records_echoes_upstream_status() {
        let url = stub(503, "down").await;
        let err = fetch_records(&reqwest::Client::new(), &url, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(&err, OsdrError::Status { status: 503, body } if body == "down"));
        assert_eq!(err.to_string(), "OSDR returned status 503: down");
    }

    #[tokio::test]
    async fn test_fetch_records_rejects_object_body() {
        let url = stub(200, r#"{"error": "bad query"}"#).await;
        let err = fetch_records(&reqwest::Client::new(), &url, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, OsdrError::NotAList));
    }
}
