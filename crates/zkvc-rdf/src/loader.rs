//! # Document Loader Abstraction
//!
//! Remote JSON-LD contexts resolve exclusively through the
//! [`DocumentLoader`] capability injected at construction time. The
//! library itself never opens a socket: the default loader denies every
//! fetch, and offline callers preload the contexts they trust into a
//! [`StaticLoader`].

use std::collections::HashMap;

use serde_json::Value;

use crate::error::JsonLdError;

/// Resolves a URL to a parsed JSON document.
pub trait DocumentLoader: Send + Sync {
    /// Load the document at `url`.
    fn load(&self, url: &str) -> Result<Value, JsonLdError>;
}

/// The default loader: refuses every fetch.
///
/// Documents whose contexts are fully inline work without any loader
/// configuration; anything remote surfaces
/// [`JsonLdError::LoaderDenied`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyLoader;

impl DocumentLoader for DenyLoader {
    fn load(&self, url: &str) -> Result<Value, JsonLdError> {
        Err(JsonLdError::LoaderDenied(url.to_string()))
    }
}

/// A loader over a preloaded URL → document map.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    documents: HashMap<String, Value>,
}

impl StaticLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a document under its URL, returning the loader for
    /// chaining.
    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    /// Parse and preload a JSON source text under its URL.
    pub fn with_document_str(
        self,
        url: impl Into<String>,
        source: &str,
    ) -> Result<Self, JsonLdError> {
        let document: Value = serde_json::from_str(source)
            .map_err(|e| JsonLdError::InvalidDocument(e.to_string()))?;
        Ok(self.with_document(url, document))
    }
}

impl DocumentLoader for StaticLoader {
    fn load(&self, url: &str) -> Result<Value, JsonLdError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| JsonLdError::ContextResolution {
                url: url.to_string(),
                reason: "not preloaded".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deny_loader_refuses_everything() {
        let err = DenyLoader.load("https://example.com/ctx").unwrap_err();
        assert!(matches!(err, JsonLdError::LoaderDenied(_)));
    }

    #[test]
    fn static_loader_serves_preloaded_documents() {
        let loader = StaticLoader::new()
            .with_document("https://example.com/ctx", json!({"@context": {}}));
        assert_eq!(
            loader.load("https://example.com/ctx").unwrap(),
            json!({"@context": {}})
        );
        assert!(loader.load("https://example.com/other").is_err());
    }

    #[test]
    fn static_loader_parses_source_text() {
        let loader = StaticLoader::new()
            .with_document_str("https://example.com/ctx", r#"{"@context": {"a": "https://a/"}}"#)
            .unwrap();
        assert!(loader.load("https://example.com/ctx").is_ok());
    }
}
