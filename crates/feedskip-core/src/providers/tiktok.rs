// TikTok provider - best-effort suggested links scraped off the search
// page. The embedded surface is the real search experience; this only
// decorates it.
use tracing::debug;

use feedskip_api::tiktok::{extract_links, TikTokClient};

use crate::models::SearchResult;
use crate::normalize;
use crate::Result;

pub struct TikTokProvider {
    client: TikTokClient,
}

impl TikTokProvider {
    pub fn new() -> Self {
        Self {
            client: TikTokClient::new(),
        }
    }

    pub fn with_client(client: TikTokClient) -> Self {
        Self { client }
    }

    /// Fetch the search page and extract suggested links, synthesizing
    /// fallbacks when the markup gives us nothing.
    pub async fn suggested_links(&self, query: &str) -> Result<Vec<SearchResult>> {
        let html = self.client.fetch_search_page(query).await?;
        Ok(Self::results_from_html(query, &html))
    }

    /// Pure path, split out so tests feed HTML fixtures instead of the
    /// live site. Never returns an empty list for a non-empty query.
    pub fn results_from_html(query: &str, html: &str) -> Vec<SearchResult> {
        let links = extract_links(html);
        if links.is_empty() {
            debug!(query, "extraction found nothing usable, synthesizing fallback");
            return normalize::tiktok_fallback(query);
        }
        links.iter().map(normalize::tiktok_link).collect()
    }
}

impl Default for TikTokProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_html_yields_exactly_three_fallbacks() {
        let results = TikTokProvider::results_from_html("cat videos", "<html><body></body></html>");
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_synthesized_fallback));
    }

    #[test]
    fn fifteen_anchors_cap_at_ten_unique_results() {
        let html: String = (0..15)
            .map(|i| {
                format!(
                    r#"<a href="https://example.com/v/{i}">An interesting video title</a>"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let results = TikTokProvider::results_from_html("cats", &html);
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| !r.is_synthesized_fallback));

        let mut urls: Vec<_> = results.iter().map(|r| r.content_url.clone()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 10);
    }

    #[test]
    fn extracted_results_describe_source_domain() {
        let html = r#"<a href="https://blog.example.org/post">A long enough title here</a>"#;
        let results = TikTokProvider::results_from_html("anything", html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].description, "Search result from blog.example.org");
    }
}
