use crate::classify::LinkClassifier;
use crate::models::AggregateDocument;
use crate::notify::Notifier;
use crate::page::PageFetcher;
use crate::traits::{Fetcher, LanguageModel, PageParser};

/// Collects the landing page and every relevant sub-page into one document.
///
/// Sub-pages are fetched one after another, in the order the classifier
/// returned them. Duplicate URLs are fetched again.
#[derive(Clone)]
pub struct ContentAggregator<F, P, L, N>
where
    F: Fetcher,
    P: PageParser,
    L: LanguageModel,
    N: Notifier,
{
    pages: PageFetcher<F, P, N>,
    classifier: LinkClassifier<L, N>,
    notifier: N,
}

impl<F, P, L, N> ContentAggregator<F, P, L, N>
where
    F: Fetcher,
    P: PageParser,
    L: LanguageModel,
    N: Notifier,
{
    pub fn new(pages: PageFetcher<F, P, N>, classifier: LinkClassifier<L, N>, notifier: N) -> Self {
        Self {
            pages,
            classifier,
            notifier,
        }
    }

    /// Never fails; at worst the document holds an empty landing block.
    pub async fn aggregate(&self, url: &str) -> AggregateDocument {
        self.notifier.info("Step 1: Scraping landing page...");
        let landing = self.pages.fetch(url).await;

        self.notifier
            .info("Step 2: Finding and scraping relevant sub-pages...");
        let relevant = self.classifier.classify(&landing).await;

        let mut document = AggregateDocument::with_landing(url, landing);

        if relevant.is_empty() {
            self.notifier.warning(
                "No relevant sub-pages found by AI. Proceeding with landing page content only.",
            );
            return document;
        }

        for link in relevant.iter().filter(|l| l.is_fetchable()) {
            self.notifier.info(&format!(
                "Scraping '{}' page: {}",
                link.link_type, link.url
            ));
            let page = self.pages.fetch(&link.url).await;
            document.push(link.label(), &link.url, page);
        }

        tracing::info!(
            %url,
            blocks = document.blocks().len(),
            bytes = document.render().len(),
            "Aggregated website content"
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::LANDING_LABEL;
    use crate::testutil::*;

    const LANDING: &str = r#"<title>Acme</title><a href="/about"></a><a href="/legal"></a><a href="/careers"></a>"#;

    fn aggregator(
        fetcher: MockFetcher,
        model: MockLanguageModel,
        notifier: RecordingNotifier,
    ) -> ContentAggregator<MockFetcher, MockParser, MockLanguageModel, RecordingNotifier> {
        ContentAggregator::new(
            PageFetcher::new(fetcher, MockParser::new(), notifier.clone()),
            LinkClassifier::new(model, notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn blocks_follow_classifier_order() {
        let fetcher = MockFetcher::new()
            .with_page("https://acme.example", LANDING)
            .with_page("https://acme.example/about", "<title>About Acme</title>")
            .with_page("https://acme.example/careers", "<title>Jobs</title>");
        let model = MockLanguageModel::new().with_completion(Ok(r#"{"links": [
            {"type": "careers", "url": "https://acme.example/careers"},
            {"type": "about", "url": "/about"}
        ]}"#
        .into()));

        let doc = aggregator(fetcher.clone(), model, RecordingNotifier::new())
            .aggregate("https://acme.example")
            .await;

        assert_eq!(doc.labels(), vec![LANDING_LABEL, "Careers", "About"]);
        assert_eq!(doc.blocks()[2].url, "https://acme.example/about");
        assert_eq!(doc.blocks()[2].page.title(), "About Acme");
        assert_eq!(
            fetcher.requested(),
            vec![
                "https://acme.example",
                "https://acme.example/careers",
                "https://acme.example/about",
            ]
        );
    }

    #[tokio::test]
    async fn unparseable_classification_gives_landing_only() {
        let fetcher = MockFetcher::new().with_page("https://acme.example", LANDING);
        let model = MockLanguageModel::new().with_completion(Ok("not json at all".into()));
        let notifier = RecordingNotifier::new();

        let doc = aggregator(fetcher.clone(), model, notifier.clone())
            .aggregate("https://acme.example")
            .await;

        assert_eq!(doc.labels(), vec![LANDING_LABEL]);
        assert_eq!(fetcher.requested().len(), 1);
        assert!(
            notifier
                .messages()
                .iter()
                .any(|m| m.starts_with("No relevant sub-pages found"))
        );
    }

    #[tokio::test]
    async fn total_failure_still_returns_landing_block() {
        let fetcher = MockFetcher::new()
            .with_error("https://acme.example", AppError::NetworkError("refused".into()));

        let doc = aggregator(fetcher, MockLanguageModel::new(), RecordingNotifier::new())
            .aggregate("https://acme.example")
            .await;

        assert_eq!(doc.blocks().len(), 1);
        assert!(doc.blocks()[0].page.text().is_empty());
        assert!(doc.render().contains("Webpage Title: No title found"));
    }

    #[tokio::test]
    async fn failed_sub_page_does_not_abort_others() {
        let fetcher = MockFetcher::new()
            .with_page("https://acme.example", LANDING)
            .with_error(
                "https://acme.example/about",
                AppError::HttpStatus {
                    status: 500,
                    url: "https://acme.example/about".into(),
                },
            )
            .with_page("https://acme.example/careers", "<title>Jobs</title>");
        let model = MockLanguageModel::new().with_completion(Ok(r#"{"links": [
            {"type": "about", "url": "https://acme.example/about"},
            {"type": "careers", "url": "https://acme.example/careers"}
        ]}"#
        .into()));

        let doc = aggregator(fetcher, model, RecordingNotifier::new())
            .aggregate("https://acme.example")
            .await;

        assert_eq!(doc.labels(), vec![LANDING_LABEL, "About", "Careers"]);
        assert!(doc.blocks()[1].page.text().is_empty());
        assert_eq!(doc.blocks()[2].page.title(), "Jobs");
    }

    #[tokio::test]
    async fn duplicates_are_fetched_twice_and_empty_urls_skipped() {
        let fetcher = MockFetcher::new()
            .with_page("https://acme.example", LANDING)
            .with_page("https://acme.example/about", "<title>About</title>");
        let model = MockLanguageModel::new().with_completion(Ok(r#"{"links": [
            {"type": "about", "url": "https://acme.example/about"},
            {"type": "company", "url": ""},
            {"type": "team", "url": "https://acme.example/about"}
        ]}"#
        .into()));

        let doc = aggregator(fetcher.clone(), model, RecordingNotifier::new())
            .aggregate("https://acme.example")
            .await;

        assert_eq!(doc.labels(), vec![LANDING_LABEL, "About", "Team"]);
        assert_eq!(
            fetcher
                .requested()
                .iter()
                .filter(|u| *u == "https://acme.example/about")
                .count(),
            2
        );
    }
}
