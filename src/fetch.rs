//! Best-effort page retrieval for answer verification.
//!
//! Unlike search and completion, a failed fetch never aborts the pipeline:
//! the failure is logged and the source is skipped, so one dead link cannot
//! block verification against the remaining sources.

use async_trait::async_trait;
use tracing::warn;

use crate::config::Config;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ItmoQaAgent/0.2)";

/// Width hint for the HTML renderer; the output is prompt text, not a
/// terminal, so the exact value only affects wrapping.
const RENDER_WIDTH: usize = 100;

/// URL-in, visible-text-out fetch capability.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and reduce it to visible text, or `None` on any failure.
    async fn fetch_text(&self, url: &str) -> Option<String>;
}

/// HTTP fetcher with a fixed per-request timeout.
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    /// Build a fetcher from the agent configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self { http })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(html) => Some(visible_text(&html)),
            Err(e) => {
                warn!("failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}

/// Reduce HTML to its visible text: scripts, styles, and markup dropped,
/// lines trimmed, blank lines removed.
pub fn visible_text(html: &str) -> String {
    let text = html2text::from_read(html.as_bytes(), RENDER_WIDTH);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup() {
        let html = "<html><body><p>ИТМО основан в <b>1900</b> году.</p></body></html>";
        let text = visible_text(html);
        assert!(text.contains("ИТМО основан в"));
        assert!(text.contains("1900"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = r#"<html><head><style>.x { color: red }</style></head>
            <body><script>var secret = 42;</script><p>видимый текст</p></body></html>"#;
        let text = visible_text(html);
        assert!(text.contains("видимый текст"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn collapses_blank_lines() {
        let html = "<p>первая</p>\n\n\n<p>вторая</p>";
        let text = visible_text(html);
        assert!(!text.contains("\n\n"));
    }
}
