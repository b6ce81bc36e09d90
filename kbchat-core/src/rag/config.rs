//! Retrieval configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings read by every retrieval call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Master switch; when off retrieval returns no context without any provider call
    pub enabled: bool,
    /// Minimum cosine similarity for a document to be considered relevant
    pub similarity_threshold: f32,
    /// Maximum number of ranked documents
    pub max_results: usize,
    /// Character budget for the assembled context
    pub context_window_chars: usize,
    /// How many document embeddings may be computed at once during a search
    pub max_concurrent_embeddings: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: 0.7,
            max_results: 5,
            context_window_chars: 4000,
            max_concurrent_embeddings: 4,
        }
    }
}

impl RetrievalConfig {
    /// Parse from YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(Error::config(format!(
                "unsupported config file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.similarity_threshold.is_finite() || !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::config(format!(
                "similarityThreshold must be within [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_concurrent_embeddings == 0 {
            return Err(Error::config("maxConcurrentEmbeddings must be at least 1"));
        }
        Ok(())
    }

    /// Copy of this config with `update` merged over it, validated
    pub fn merged(&self, update: &RetrievalConfigUpdate) -> Result<Self> {
        let mut next = self.clone();
        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        if let Some(threshold) = update.similarity_threshold {
            next.similarity_threshold = threshold;
        }
        if let Some(max_results) = update.max_results {
            next.max_results = max_results;
        }
        if let Some(chars) = update.context_window_chars {
            next.context_window_chars = chars;
        }
        if let Some(concurrency) = update.max_concurrent_embeddings {
            next.max_concurrent_embeddings = concurrency;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Partial change to a [`RetrievalConfig`]; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfigUpdate {
    /// New value for `enabled`
    pub enabled: Option<bool>,
    /// New value for `similarity_threshold`
    pub similarity_threshold: Option<f32>,
    /// New value for `max_results`
    pub max_results: Option<usize>,
    /// New value for `context_window_chars`
    pub context_window_chars: Option<usize>,
    /// New value for `max_concurrent_embeddings`
    pub max_concurrent_embeddings: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert!(config.enabled);
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.context_window_chars, 4000);
    }

    #[test]
    fn test_yaml_partial() {
        let config = RetrievalConfig::from_yaml_str("similarityThreshold: 0.8\nmaxResults: 2\n").expect("parse");
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.max_results, 2);
        assert_eq!(config.context_window_chars, 4000);
    }

    #[test]
    fn test_json_rejects_out_of_range_threshold() {
        let err = RetrievalConfig::from_json_str(r#"{"similarityThreshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let base = RetrievalConfig::default();
        let update = RetrievalConfigUpdate {
            enabled: Some(false),
            max_results: Some(9),
            ..Default::default()
        };

        let merged = base.merged(&update).expect("merge");
        assert!(!merged.enabled);
        assert_eq!(merged.max_results, 9);
        assert_eq!(merged.similarity_threshold, base.similarity_threshold);
    }

    #[test]
    fn test_merge_rejects_invalid() {
        let update = RetrievalConfigUpdate {
            max_concurrent_embeddings: Some(0),
            ..Default::default()
        };
        assert!(RetrievalConfig::default().merged(&update).is_err());
    }

    #[tokio::test]
    async fn test_load_yaml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("retrieval.yaml");
        tokio::fs::write(&path, "enabled: false\n").await.expect("write");

        let config = RetrievalConfig::load(&path).await.expect("load");
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_load_unknown_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("retrieval.ini");
        tokio::fs::write(&path, "").await.expect("write");

        assert!(RetrievalConfig::load(&path).await.is_err());
    }
}
