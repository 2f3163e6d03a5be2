//! Yandex search API client.
//!
//! Sends a reformulated query to the XML search endpoint and parses the
//! ranked result documents. Search is a hard dependency of the pipeline:
//! every transport, status, or parse failure here is surfaced to the caller
//! untouched.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Region id for Saint Petersburg, where the university is located.
const REGION_ID: &str = "11316";

/// Passages requested per result document.
const MAX_PASSAGES: &str = "5";

/// One ranked search hit. Both fields default to empty when the response
/// omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Short excerpt of the page text
    pub snippet: String,

    /// Page URL
    pub url: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed search response: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Query-in, ranked-results-out search capability.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Search client for the Yandex XML search API.
pub struct YandexSearchClient {
    http: reqwest::Client,
    endpoint: String,
    folder_id: String,
    api_key: String,
}

impl YandexSearchClient {
    /// Build a client from the agent configuration.
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(config.search_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.search_endpoint.clone(),
            folder_id: config.folder_id.clone(),
            api_key: config.search_api_key.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for YandexSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("folderid", self.folder_id.as_str()),
                ("apikey", self.api_key.as_str()),
                ("query", query),
                ("lr", REGION_ID),
                ("l10n", "ru"),
                ("sortby", "rlv"),
                ("filter", "none"),
                ("maxpassages", MAX_PASSAGES),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let results = parse_results(&body)?;
        debug!("search returned {} results", results.len());
        Ok(results)
    }
}

/// Parse the XML response body into ordered results.
///
/// Every `doc` element anywhere in the tree yields one result; `snippet`
/// and `url` are direct children and default to empty when missing.
fn parse_results(xml: &str) -> Result<Vec<SearchResult>, roxmltree::Error> {
    let document = roxmltree::Document::parse(xml)?;

    let results = document
        .descendants()
        .filter(|node| node.has_tag_name("doc"))
        .map(|doc| SearchResult {
            snippet: child_text(doc, "snippet"),
            url: child_text(doc, "url"),
        })
        .collect();

    Ok(results)
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> String {
    node.children()
        .find(|child| child.has_tag_name(name))
        .and_then(|child| child.text())
        .unwrap_or_default()
        .to_string()
}
