use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::config::LlmConfig;

use super::{complete, extract_json_object, CompletionParams, PromptMessage};

const ASSAY_FILTER_PROMPT: &str = r#"You convert one natural-language request into a minimal JSON object of
query parameters for an OSDR assay finder.

Reply with JSON only. No markdown, no explanation, no code fences.

Fields (all optional, null when unknown):
- "organism": string | null      scientific name, e.g. "Mus musculus"
- "condition": "spaceflight" | "ground" | "any" | null
- "assay": string | null         regex fragment, e.g. "rna-sequencing|dna-microarray"
- "technology": string | null    technology label, e.g. "RNA Sequencing"
- "dataset": string | null       exact OSDR accession such as "OSD-47"

Return exactly:
{"organism": ..., "condition": ..., "assay": ..., "technology": ..., "dataset": ...}

Organisms: mouse/mice -> "Mus musculus"; human -> "Homo sapiens";
yeast -> "Saccharomyces cerevisiae"; arabidopsis -> "Arabidopsis thaliana".

Condition: spaceflight, in-flight, flight -> "spaceflight"; ground, control ->
"ground"; both, either, any -> "any". Lowercase only.

Assay fragments: rna-seq -> "rna-sequencing"; microarray -> "dna-microarray";
nanopore, long-read, ont -> "nanopore"; proteomics -> "proteomics";
imaging -> "imaging". Join several with "|". No slashes.

Technology: only when the user names a known technology ("RNA Sequencing",
"DNA microarray", "Nanopore long read DNA Sequencing", "Proteomics",
"Imaging"); otherwise null.

Ignore tissues, years, files and anything else. Never invent keys.

Example
User: "Mouse assays using RNA-seq or microarrays."
{"organism": "Mus musculus", "condition": null, "assay": "rna-sequencing|dna-microarray", "technology": null, "dataset": null}

Example
User: "Open OSD-47 RNA-seq."
{"organism": null, "condition": null, "assay": "rna-sequencing", "technology": null, "dataset": "OSD-47"}
"#;

const ASSAY_FILTER_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.0,
    max_tokens: 256,
};

/// Assay finder filters. Empty strings from the model are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssayFilters {
    pub organism: Option<String>,
    pub condition: Option<String>,
    pub assay_regex: Option<String>,
    pub technology_regex: Option<String>,
    pub dataset: Option<String>,
}

pub async fn extract_assay_filters(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
) -> Result<AssayFilters> {
    let system = format!("{ASSAY_FILTER_PROMPT}\nUser: {}\n", query.trim());
    let reply =
        complete(client, config, vec![PromptMessage::system(system)], ASSAY_FILTER_PARAMS).await?;
    parse_assay_filters(&reply)
}

pub fn parse_assay_filters(reply: &str) -> Result<AssayFilters> {
    let value = extract_json_object(reply)?;
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(AssayFilters {
        organism: field("organism"),
        condition: field("condition"),
        assay_regex: field("assay"),
        technology_regex: field("technology"),
        dataset: field("dataset"),
    })
}
