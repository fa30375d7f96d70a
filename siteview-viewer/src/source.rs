//! Where model documents come from

use crate::error::LoadError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA};
use serde_json::Value;
use std::time::Duration;

/// A source of model documents
#[async_trait(?Send)]
pub trait DocumentSource {
    /// Fetch and decode the document
    async fn fetch(&self) -> Result<Value, LoadError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Fetches the document over HTTP(S) with caching disabled
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `url`; `timeout` only applies on native targets
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LoadError> {
        let builder = reqwest::Client::builder().default_headers(no_cache_headers());
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    /// The endpoint this source fetches
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Request headers that defeat intermediate and browser caches
pub fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

#[async_trait(?Send)]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        tracing::debug!(url = %self.url, "fetching model document");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from a local file
#[cfg(not(target_arch = "wasm32"))]
pub struct FileSource {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    /// Create a source reading `path`
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl DocumentSource for FileSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a document that is already in memory
#[derive(Debug, Clone)]
pub struct StaticSource {
    document: Value,
}

impl StaticSource {
    /// Create a source that always returns `document`
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

#[async_trait(?Send)]
impl DocumentSource for StaticSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        Ok(self.document.clone())
    }

    fn describe(&self) -> String {
        "in-memory document".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_cache_headers() {
        let headers = no_cache_headers();
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[EXPIRES], "0");
    }

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "answer": 42 }}"#).unwrap();

        let source = FileSource::new(file.path());
        let document = source.fetch().await.unwrap();
        assert_eq!(document["answer"], 42);
    }

    #[tokio::test]
    async fn test_file_source_errors_are_transport() {
        let missing = FileSource::new("/definitely/not/here.json");
        assert!(missing.fetch().await.unwrap_err().is_transport());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<html>").unwrap();
        let garbage = FileSource::new(file.path());
        assert!(matches!(garbage.fetch().await, Err(LoadError::Document(_))));
    }

    #[tokio::test]
    async fn test_unreachable_http_is_transport() {
        let source =
            HttpSource::new("http://127.0.0.1:9/model.json", Some(Duration::from_secs(2))).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.is_transport());
    }
}
