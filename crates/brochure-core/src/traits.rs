use std::future::Future;
use std::pin::Pin;

use futures::Stream;

use crate::error::AppError;
use crate::models::{ChatPrompt, OutputFormat, Page};

/// Incremental text fragments from a streaming model call, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, AppError>> + Send>>;

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    /// One GET request. Non-2xx responses are errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns raw HTML into a [`Page`].
pub trait PageParser: Send + Sync + Clone {
    fn parse(&self, url: &str, html: &str) -> Result<Page, AppError>;
}

/// Chat-style access to a language model.
pub trait LanguageModel: Send + Sync + Clone {
    /// Single request returning the complete response text.
    fn complete(
        &self,
        prompt: &ChatPrompt,
        format: OutputFormat,
    ) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Starts a streaming request.
    ///
    /// An `Err` here means nothing was produced; errors after the stream is
    /// established arrive as items of the returned stream.
    fn stream(
        &self,
        prompt: &ChatPrompt,
    ) -> impl Future<Output = Result<FragmentStream, AppError>> + Send;
}
