use crate::models::Page;
use crate::notify::Notifier;
use crate::traits::{Fetcher, PageParser};

/// Fetches and parses one page, degrading to an empty [`Page`] on any failure.
#[derive(Clone)]
pub struct PageFetcher<F, P, N>
where
    F: Fetcher,
    P: PageParser,
    N: Notifier,
{
    fetcher: F,
    parser: P,
    notifier: N,
}

impl<F, P, N> PageFetcher<F, P, N>
where
    F: Fetcher,
    P: PageParser,
    N: Notifier,
{
    pub fn new(fetcher: F, parser: P, notifier: N) -> Self {
        Self {
            fetcher,
            parser,
            notifier,
        }
    }

    /// Fetch `url` once. Never fails: errors are reported through the notifier.
    pub async fn fetch(&self, url: &str) -> Page {
        let result = match self.fetcher.fetch(url).await {
            Ok(html) => {
                tracing::debug!(%url, bytes = html.len(), "Fetched page");
                self.parser.parse(url, &html)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(page) => {
                tracing::debug!(
                    %url,
                    title = page.title(),
                    links = page.links().len(),
                    "Parsed page"
                );
                page
            }
            Err(e) => {
                self.notifier
                    .warning(&format!("Could not fetch website {url}: {e}"));
                Page::empty(url)
            }
        }
    }
}
