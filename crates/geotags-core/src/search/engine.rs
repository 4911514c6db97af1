// crates/geotags-core/src/search/engine.rs

//! Transport to a document search engine.

use crate::error::Result;
use serde_json::Value;

/// Executes a search request body against an index and returns the raw
/// response document.
///
/// Transport failures and non-success statuses are reported as
/// [`SearchError::BackendUnavailable`](crate::error::SearchError::BackendUnavailable).
pub trait SearchEngine {
    fn search(&self, index: &str, body: &Value) -> Result<Value>;
}

impl<E: SearchEngine + ?Sized> SearchEngine for &E {
    fn search(&self, index: &str, body: &Value) -> Result<Value> {
        (**self).search(index, body)
    }
}

#[cfg(feature = "http")]
mod http {
    use super::SearchEngine;
    use crate::config::GeoIndexConfig;
    use crate::error::{Result, SearchError};
    use serde_json::Value;
    use std::time::Duration;

    fn unavailable(msg: String) -> crate::error::GeoError {
        SearchError::BackendUnavailable(msg).into()
    }

    /// Blocking HTTP client posting to `{url}/{index}/_search`.
    #[derive(Clone)]
    pub struct HttpSearchEngine {
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl HttpSearchEngine {
        pub fn new(config: &GeoIndexConfig) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| unavailable(format!("failed to create HTTP client: {e}")))?;
            Ok(Self {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
            })
        }
    }

    impl SearchEngine for HttpSearchEngine {
        fn search(&self, index: &str, body: &Value) -> Result<Value> {
            let url = format!("{}/{}/_search", self.base_url, index);
            tracing::debug!(%url, "posting search request");

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .map_err(|e| unavailable(format!("request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(unavailable(format!("HTTP {} from {}", response.status(), url)));
            }

            response
                .json::<Value>()
                .map_err(|e| unavailable(format!("malformed response: {e}")))
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpSearchEngine;
