//! Runtime settings.
//!
//! Loaded from an optional `config.yml`, with the connection credentials
//! overridable through the conventional environment variables
//! (`NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`, `OPENAI_API_KEY`).

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,
    #[serde(default)]
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(default = "default_neo4j_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_username() -> String {
    "neo4j".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_top_k() -> usize {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            username: default_neo4j_username(),
            password: String::new(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: String::new(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from the given config file, then apply process
    /// environment overrides. A missing file yields the defaults.
    pub fn load(config_path: &Path) -> Result<Self, RagError> {
        Self::load_with_env(config_path, &|key| env::var(key).ok())
    }

    pub fn load_with_env(
        config_path: &Path,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, RagError> {
        let mut settings = if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(RagError::config)?;
            serde_yaml::from_str::<Settings>(&contents).map_err(RagError::config)?
        } else {
            Settings::default()
        };

        if let Some(uri) = lookup("NEO4J_URI") {
            settings.neo4j.uri = uri;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            settings.neo4j.username = username;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            settings.neo4j.password = password;
        }
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            settings.openai.api_key = api_key;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), RagError> {
        if self.neo4j.uri.trim().is_empty() {
            return Err(RagError::Config("neo4j.uri must not be empty".into()));
        }
        if self.openai.base_url.trim().is_empty() {
            return Err(RagError::Config("openai.base_url must not be empty".into()));
        }
        if self.openai.chat_model.trim().is_empty() {
            return Err(RagError::Config("openai.chat_model must not be empty".into()));
        }
        if self.openai.embedding_model.trim().is_empty() {
            return Err(RagError::Config(
                "openai.embedding_model must not be empty".into(),
            ));
        }
        if self.openai.embedding_dimensions == 0 {
            return Err(RagError::Config(
                "openai.embedding_dimensions must be positive".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("retrieval.top_k must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/config.yml");
        let settings = Settings::load_with_env(path, &no_env).unwrap();

        assert_eq!(settings.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(settings.openai.embedding_dimensions, 1536);
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn file_values_and_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "neo4j:\n  uri: bolt://db:7687\n  password: from-file\nretrieval:\n  top_k: 5"
        )
        .unwrap();

        let env: HashMap<&str, &str> =
            [("NEO4J_PASSWORD", "from-env"), ("OPENAI_API_KEY", "sk-test")]
                .into_iter()
                .collect();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let settings = Settings::load_with_env(file.path(), &lookup).unwrap();

        assert_eq!(settings.neo4j.uri, "bolt://db:7687");
        assert_eq!(settings.neo4j.password, "from-env");
        assert_eq!(settings.openai.api_key, "sk-test");
        assert_eq!(settings.retrieval.top_k, 5);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retrieval:\n  top_k: 0").unwrap();

        let err = Settings::load_with_env(file.path(), &no_env).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }
}
