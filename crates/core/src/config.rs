use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Chat-completions capability used by the classifier and the responder.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Embedding capability. `dimension` is dictated by the model and the index
/// schema together; a disagreement between the two is a deployment error.
#[derive(Clone, Debug)]
pub struct EmbeddingConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
}

/// Similarity-index capability (Pinecone data plane).
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub api_key: Option<SecretString>,
    pub host: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub embedding_endpoint: Option<String>,
    pub index_api_key: Option<String>,
    pub index_host: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama-3.3-70b-versatile".to_string(),
                timeout_secs: 30,
            },
            embedding: EmbeddingConfig {
                api_key: None,
                endpoint: "http://localhost:8080/embed".to_string(),
                model: "BAAI/bge-large-en-v1.5".to_string(),
                dimension: 1024,
                timeout_secs: 60,
            },
            index: IndexConfig { api_key: None, host: String::new(), timeout_secs: 30 },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                allowed_origins: vec![
                    "http://localhost:5177".to_string(),
                    "http://localhost:5000".to_string(),
                ],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Loads configuration with the precedence defaults < file < environment
    /// < programmatic overrides, then validates the merged result.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("lumiere.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(embedding) = patch.embedding {
            if let Some(embedding_api_key_value) = embedding.api_key {
                self.embedding.api_key = Some(secret_value(embedding_api_key_value));
            }
            if let Some(endpoint) = embedding.endpoint {
                self.embedding.endpoint = endpoint;
            }
            if let Some(model) = embedding.model {
                self.embedding.model = model;
            }
            if let Some(dimension) = embedding.dimension {
                self.embedding.dimension = dimension;
            }
            if let Some(timeout_secs) = embedding.timeout_secs {
                self.embedding.timeout_secs = timeout_secs;
            }
        }

        if let Some(index) = patch.index {
            if let Some(index_api_key_value) = index.api_key {
                self.index.api_key = Some(secret_value(index_api_key_value));
            }
            if let Some(host) = index.host {
                self.index.host = host;
            }
            if let Some(timeout_secs) = index.timeout_secs {
                self.index.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(allowed_origins) = server.allowed_origins {
                self.server.allowed_origins = allowed_origins;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LUMIERE_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LUMIERE_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("LUMIERE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("LUMIERE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("LUMIERE_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LUMIERE_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LUMIERE_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = value;
        }
        if let Some(value) = read_env("LUMIERE_EMBEDDING_MODEL") {
            self.embedding.model = value;
        }
        if let Some(value) = read_env("LUMIERE_EMBEDDING_DIMENSION") {
            self.embedding.dimension = parse_usize("LUMIERE_EMBEDDING_DIMENSION", &value)?;
        }
        if let Some(value) = read_env("LUMIERE_EMBEDDING_TIMEOUT_SECS") {
            self.embedding.timeout_secs = parse_u64("LUMIERE_EMBEDDING_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LUMIERE_INDEX_API_KEY") {
            self.index.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LUMIERE_INDEX_HOST") {
            self.index.host = value;
        }
        if let Some(value) = read_env("LUMIERE_INDEX_TIMEOUT_SECS") {
            self.index.timeout_secs = parse_u64("LUMIERE_INDEX_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LUMIERE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("LUMIERE_SERVER_PORT") {
            self.server.port = parse_u16("LUMIERE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("LUMIERE_SERVER_ALLOWED_ORIGINS") {
            self.server.allowed_origins =
                value.split(',').map(|origin| origin.trim().to_string()).collect();
        }

        let log_level = read_env("LUMIERE_LOGGING_LEVEL").or_else(|| read_env("LUMIERE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LUMIERE_LOGGING_FORMAT").or_else(|| read_env("LUMIERE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(embedding_endpoint) = overrides.embedding_endpoint {
            self.embedding.endpoint = embedding_endpoint;
        }
        if let Some(index_api_key) = overrides.index_api_key {
            self.index.api_key = Some(secret_value(index_api_key));
        }
        if let Some(index_host) = overrides.index_host {
            self.index.host = index_host;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_embedding(&self.embedding)?;
        validate_index(&self.index)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("lumiere.toml"), PathBuf::from("config/lumiere.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces `${VAR}` expressions in the raw config text with environment
/// values, so secrets can live outside the file.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let Some(end) = expression.find('}') else {
            return Err(ConfigError::UnterminatedInterpolation);
        };

        let var = &expression[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    let missing =
        llm.api_key.as_ref().map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing {
        return Err(ConfigError::Validation(
            "llm.api_key is required. Create one at https://console.groq.com/keys".to_string(),
        ));
    }

    if !is_http_url(&llm.base_url) {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_embedding(embedding: &EmbeddingConfig) -> Result<(), ConfigError> {
    if !is_http_url(&embedding.endpoint) {
        return Err(ConfigError::Validation(
            "embedding.endpoint must start with http:// or https://".to_string(),
        ));
    }

    if embedding.model.trim().is_empty() {
        return Err(ConfigError::Validation("embedding.model must not be empty".to_string()));
    }

    if embedding.dimension == 0 {
        return Err(ConfigError::Validation(
            "embedding.dimension must be greater than zero (1024 for BAAI/bge-large-en-v1.5)"
                .to_string(),
        ));
    }

    if embedding.timeout_secs == 0 || embedding.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "embedding.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_index(index: &IndexConfig) -> Result<(), ConfigError> {
    let missing =
        index.api_key.as_ref().map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing {
        return Err(ConfigError::Validation(
            "index.api_key is required. Get it from the Pinecone console under API Keys"
                .to_string(),
        ));
    }

    if index.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "index.host is required (the index host URL shown in the Pinecone console)"
                .to_string(),
        ));
    }
    if !is_http_url(&index.host) {
        return Err(ConfigError::Validation(
            "index.host must start with http:// or https://".to_string(),
        ));
    }

    if index.timeout_secs == 0 || index.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "index.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    for origin in &server.allowed_origins {
        if !is_http_url(origin) {
            return Err(ConfigError::Validation(format!(
                "server.allowed_origins entry `{origin}` must start with http:// or https://"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    embedding: Option<EmbeddingPatch>,
    index: Option<IndexPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingPatch {
    api_key: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    dimension: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexPatch {
    api_key: Option<String>,
    host: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
