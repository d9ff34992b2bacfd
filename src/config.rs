use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// OSDR biodata API configuration
    pub osdr: OsdrConfig,
    /// Chat backend configuration
    pub chat: ChatConfig,
    /// Allowed CORS origins. Empty means any origin.
    pub frontend_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for filter extraction and plain chat
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
}

/// Where the OSDR biodata API lives and how long we wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsdrConfig {
    /// API root, e.g. "https://visualization.osdr.nasa.gov/biodata/api/v2"
    pub base_url: String,
    /// Read timeout in seconds for a single query
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// "dummy", "rag" or "llm"
    pub backend: String,
    /// Base URL of the RAG query service (only used by the "rag" backend)
    pub rag_base_url: String,
    /// Request timeout in seconds for a RAG query
    pub rag_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            llm: LlmConfig::default(),
            osdr: OsdrConfig::default(),
            chat: ChatConfig::default(),
            frontend_urls: Vec::new(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            api_key: None,
        }
    }
}

impl Default for OsdrConfig {
    fn default() -> Self {
        Self {
            base_url: "https://visualization.osdr.nasa.gov/biodata/api/v2".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: "dummy".to_string(),
            rag_base_url: "http://127.0.0.1:8010".to_string(),
            rag_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("GAP_FINDER_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")) {
            config.llm.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("OSDR_BASE_URL") {
            config.osdr.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(val) = std::env::var("OSDR_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.osdr.timeout_secs = v;
            }
        }

        if let Ok(backend) = std::env::var("CHAT_BACKEND") {
            config.chat.backend = backend;
        }
        if let Ok(url) = std::env::var("RAG_BASE_URL") {
            config.chat.rag_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(val) = std::env::var("RAG_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.chat.rag_timeout_secs = v;
            }
        }

        if let Ok(urls) = std::env::var("FRONTEND_URLS") {
            config.frontend_urls = parse_origins(&urls);
        }

        config
    }

    pub fn assays_url(&self) -> String {
        format!("{}/query/assays/", self.osdr.base_url)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/query/metadata/", self.osdr.base_url)
    }

    pub fn dataset_url(&self) -> String {
        format!("{}/dataset", self.osdr.base_url)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins(" https://a.example , ,https://b.example,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_osdr_urls_from_base() {
        let config = Config::default();
        assert_eq!(
            config.assays_url(),
            "https://visualization.osdr.nasa.gov/biodata/api/v2/query/assays/"
        );
        assert_eq!(
            config.dataset_url(),
            "https://visualization.osdr.nasa.gov/biodata/api/v2/dataset"
        );
    }
}
