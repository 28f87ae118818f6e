use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::AppError;
use crate::models::{AggregateDocument, ChatPrompt, Tone};
use crate::notify::Notifier;
use crate::traits::{FragmentStream, LanguageModel};

/// Writes the brochure from an aggregate document with one streaming model call.
#[derive(Clone)]
pub struct BrochureGenerator<L, N>
where
    L: LanguageModel,
    N: Notifier,
{
    model: L,
    notifier: N,
}

impl<L, N> BrochureGenerator<L, N>
where
    L: LanguageModel,
    N: Notifier,
{
    pub fn new(model: L, notifier: N) -> Self {
        Self { model, notifier }
    }

    /// Start generation.
    ///
    /// Returns `Err` only when the call fails before any fragment exists.
    /// Calling again issues a fresh model call.
    pub async fn generate(
        &self,
        company_name: &str,
        document: &AggregateDocument,
        tone: &Tone,
    ) -> Result<BrochureStream<N>, AppError> {
        let prompt = build_prompt(company_name, document, tone);
        tracing::info!(company = %company_name, %tone, "Generating brochure");

        match self.model.stream(&prompt).await {
            Ok(inner) => Ok(BrochureStream::new(inner, self.notifier.clone())),
            Err(e) => {
                self.notifier
                    .error(&format!("An error occurred during brochure generation: {e}"));
                Err(e)
            }
        }
    }
}

fn build_prompt(company_name: &str, document: &AggregateDocument, tone: &Tone) -> ChatPrompt {
    let system = format!(
        "You are an expert marketing assistant. Write a compelling, {tone} company brochure \
in Markdown format. Use the provided text scraped from the company's website. \
Structure the brochure logically with clear headings. Highlight company culture, \
products/solutions, and career opportunities if available."
    );
    let user = format!(
        "Company Name: {company_name}\n\n\
Here is the collected content from the company's website. Use this to create the brochure.\n\n\
--- WEBSITE CONTENT ---\n{document}"
    );
    ChatPrompt::new(system, user)
}

/// Brochure text fragments, forwarded one by one as the model produces them.
///
/// An upstream failure after the stream started is reported through the
/// notifier and ends the stream; fragments already yielded stay valid and the
/// error is kept for [`error`](Self::error). Once ended, the stream keeps
/// returning `None`.
pub struct BrochureStream<N: Notifier> {
    inner: FragmentStream,
    notifier: N,
    finished: bool,
    fragments: usize,
    error: Option<AppError>,
}

impl<N: Notifier> BrochureStream<N> {
    fn new(inner: FragmentStream, notifier: N) -> Self {
        Self {
            inner,
            notifier,
            finished: false,
            fragments: 0,
            error: None,
        }
    }

    /// The error that cut the stream short, if any.
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    /// Number of fragments yielded so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<N: Notifier + Unpin> Stream for BrochureStream<N> {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => {
                self.fragments += 1;
                Poll::Ready(Some(fragment))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(fragments = self.fragments, error = %e, "Brochure stream interrupted");
                self.notifier
                    .error(&format!("An error occurred during brochure generation: {e}"));
                self.error = Some(e);
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(None) => {
                tracing::debug!(fragments = self.fragments, "Brochure stream complete");
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
