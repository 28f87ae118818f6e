use crate::aggregate::ContentAggregator;
use crate::classify::LinkClassifier;
use crate::error::AppError;
use crate::generate::{BrochureGenerator, BrochureStream};
use crate::models::{AggregateDocument, BrochureRequest, RelevantLink, validate_url};
use crate::notify::Notifier;
use crate::page::PageFetcher;
use crate::traits::{Fetcher, LanguageModel, PageParser};

/// Orchestrates the full brochure pipeline: validate → scrape → classify → scrape → generate.
///
/// Generic over all external dependencies via traits, enabling dependency injection
/// and testability without real HTTP or LLM calls.
pub struct BrochureService<F, P, L, N>
where
    F: Fetcher,
    P: PageParser,
    L: LanguageModel,
    N: Notifier,
{
    pages: PageFetcher<F, P, N>,
    classifier: LinkClassifier<L, N>,
    aggregator: ContentAggregator<F, P, L, N>,
    generator: BrochureGenerator<L, N>,
}

impl<F, P, L, N> BrochureService<F, P, L, N>
where
    F: Fetcher,
    P: PageParser,
    L: LanguageModel,
    N: Notifier,
{
    /// Wire every component to the same fetcher, parser, model and notifier.
    pub fn new(fetcher: F, parser: P, model: L, notifier: N) -> Self {
        let pages = PageFetcher::new(fetcher, parser, notifier.clone());
        let classifier = LinkClassifier::new(model.clone(), notifier.clone());
        let aggregator = ContentAggregator::new(pages.clone(), classifier.clone(), notifier.clone());
        let generator = BrochureGenerator::new(model, notifier);

        Self {
            pages,
            classifier,
            aggregator,
            generator,
        }
    }

    /// Run the whole pipeline for one request.
    ///
    /// 1. Validate the request (no network activity on failure)
    /// 2. Aggregate the landing page and relevant sub-pages
    /// 3. Start the streaming generation call
    pub async fn run(&self, request: &BrochureRequest) -> Result<BrochureStream<N>, AppError> {
        request.validate()?;

        tracing::info!(company = %request.company_name, url = %request.url, "Generating brochure");
        let document = self.aggregator.aggregate(request.url.trim()).await;

        self.generator
            .generate(&request.company_name, &document, &request.tone)
            .await
    }

    /// Only the aggregation half of the pipeline.
    pub async fn aggregate(&self, url: &str) -> Result<AggregateDocument, AppError> {
        validate_url(url)?;
        Ok(self.aggregator.aggregate(url.trim()).await)
    }

    /// Fetch the landing page and return the links the model selects.
    pub async fn relevant_links(&self, url: &str) -> Result<Vec<RelevantLink>, AppError> {
        validate_url(url)?;
        let landing = self.pages.fetch(url.trim()).await;
        Ok(self.classifier.classify(&landing).await)
    }
}
