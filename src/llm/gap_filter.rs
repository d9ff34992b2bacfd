use anyhow::Result;
use serde_json::Value;

use crate::config::LlmConfig;
use crate::gaps::scope::{ConditionFilter, GapFilters};

use super::{complete, extract_json_object, CompletionParams, PromptMessage};

const GAP_FILTER_PROMPT: &str = r#"You convert one natural-language request into a minimal JSON object of
query parameters for an OSDR-based gap finder.

Reply with JSON only. No markdown, no explanation, no code fences.

Fields (all optional, null when unknown):
- "organisms": string[] | null   scientific names, e.g. ["Mus musculus","Homo sapiens"]
- "assays": string[] | null      technology labels, e.g. ["RNA Sequencing (RNA-Seq)","Proteomics"]
- "condition": "Spaceflight" | "Ground/Analog" | "Ambas" | null
- "tissues": string[] | null     tissue, organ or cell type in Title Case

Return exactly:
{"organisms": ..., "assays": ..., "condition": ..., "tissues": ...}

Organisms: mouse/mice -> "Mus musculus"; human -> "Homo sapiens";
rat -> "Rattus norvegicus"; yeast -> "Saccharomyces cerevisiae";
arabidopsis -> "Arabidopsis thaliana". Keep Latin names as given.

Condition: spaceflight, in-flight, flight, pre-flight, post-flight -> "Spaceflight";
ground, control, analog, vivarium, terrestrial -> "Ground/Analog";
both, either, any or unspecified -> "Ambas".

Assays: rna-seq -> "RNA Sequencing (RNA-Seq)"; microarray -> "DNA microarray";
atac -> "ATAC-seq"; proteomics -> "Proteomics"; metabolomics -> "Metabolomics";
imaging or microscopy -> "Imaging"; nanopore, long-read, ONT ->
"Nanopore long read DNA Sequencing". "multi-omics" without specifics -> null.

Tissues: short Title Case names, simple plurals singularized
("Adrenal Glands" -> "Adrenal Gland"). Do not expand families.

Use null for anything not asked for. Never invent keys.

Example
User: "Show me gaps for mouse and human in RNA-seq or proteomics."
{"organisms": ["Mus musculus", "Homo sapiens"], "assays": ["RNA Sequencing (RNA-Seq)", "Proteomics"], "condition": "Ambas", "tissues": null}

Example
User: "Human liver opportunities in flight."
{"organisms": ["Homo sapiens"], "assays": null, "condition": "Spaceflight", "tissues": ["Liver"]}

Example
User: "Find interesting gaps."
{"organisms": null, "assays": null, "condition": "Ambas", "tissues": null}
"#;

const GAP_FILTER_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.0,
    max_tokens: 256,
};

/// Map free text to gap filters with one LLM round trip.
pub async fn extract_gap_filters(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
) -> Result<GapFilters> {
    let system = format!("{GAP_FILTER_PROMPT}\nUser: {}\n", query.trim());
    let reply = complete(client, config, vec![PromptMessage::system(system)], GAP_FILTER_PARAMS).await?;
    parse_gap_filters(&reply)
}

pub fn parse_gap_filters(reply: &str) -> Result<GapFilters> {
    let value = extract_json_object(reply)?;

    Ok(GapFilters {
        organisms: as_list(value.get("organisms")),
        assays: as_list(value.get("assays")),
        condition: ConditionFilter::parse(value.get("condition").and_then(Value::as_str)),
        tissues: as_list(value.get("tissues")),
    })
}

/// Lists pass through, scalars become one-element lists, and null, empty
/// strings or empty lists become `None`.
fn as_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Null => return None,
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    };
    (!items.is_empty()).then_some(items)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
