use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Per-binary port variables. Each one takes precedence over the shared
/// `SERVER_PORT`, so one `.env` can drive all three services.
pub const API_PORT_VAR: &str = "API_PORT";
pub const LLM_SERVICE_PORT_VAR: &str = "LLM_SERVICE_PORT";
pub const RAG_SERVICE_PORT_VAR: &str = "RAG_SERVICE_PORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Settings shared by the three binaries. Each binary reads only the
/// sections it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub project_name: String,
    pub server: ServerConfig,
    pub services: ServicesConfig,
    pub callback: CallbackConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// When unset each binary listens on its own default port.
    pub port: Option<u16>,
}

/// Locations of the downstream collaborators used by the query API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub llm_service_url: String,
    pub rag_service_url: String,
    pub health_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    pub url: Option<String>,
    pub max_attempts: u32,
    pub base_delay_seconds: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub context_window: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub max_top_k: usize,
    pub qdrant_url: Option<String>,
    pub collection: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub load_sample_data: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_name: "Product Query Bot".to_string(),
            server: ServerConfig::default(),
            services: ServicesConfig::default(),
            callback: CallbackConfig::default(),
            llm: LlmConfig::default(),
            rag: RagConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            llm_service_url: "http://llm-service:8001".to_string(),
            rag_service_url: "http://rag-service:8003".to_string(),
            health_timeout_seconds: 10,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            url: Some("http://host.docker.internal:3001/webhook".to_string()),
            max_attempts: 3,
            base_delay_seconds: 2,
            timeout_seconds: 10,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5-0.5b".to_string(),
            max_tokens: 300,
            temperature: 0.2,
            context_window: 4096,
            timeout_seconds: 60,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_top_k: 10,
            qdrant_url: None,
            collection: "document_embeddings".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimension: 1536,
            load_sample_data: true,
        }
    }
}

impl ServerConfig {
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}

impl ServicesConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl CallbackConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AppConfig {
    /// Loads `.env`, the YAML file named by `APP_CONFIG` (if present), then
    /// applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(path, "config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `load` for one binary: `port_var` (e.g. [`API_PORT_VAR`]) wins over
    /// `SERVER_PORT`.
    pub fn load_for(port_var: &str) -> Result<Self, ConfigError> {
        let mut config = Self::load()?;
        config.apply_port_override(port_var, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = Some(parse_value("SERVER_PORT", &port)?);
        }
        if let Some(url) = lookup("LLM_SERVICE_URL") {
            self.services.llm_service_url = url;
        }
        if let Some(url) = lookup("RAG_SERVICE_URL") {
            self.services.rag_service_url = url;
        }
        if let Some(url) = lookup("CALLBACK_URL") {
            let url = url.trim();
            self.callback.url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(top_k) = lookup("TOP_K") {
            self.rag.top_k = parse_value("TOP_K", &top_k)?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            let url = url.trim();
            self.rag.qdrant_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.rag.embedding_model = model;
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn apply_port_override<F>(&mut self, port_var: &str, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(port_var) {
            self.server.port = Some(parse_value(port_var, &port)?);
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
