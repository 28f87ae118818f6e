pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod generate;
pub mod models;
pub mod notify;
pub mod page;
pub mod service;
pub mod traits;

#[cfg(test)]
pub mod testutil;

pub use aggregate::ContentAggregator;
pub use classify::LinkClassifier;
pub use config::{FetchConfig, LlmConfig};
pub use error::AppError;
pub use generate::{BrochureGenerator, BrochureStream};
pub use models::{
    AggregateDocument, BrochureRequest, ChatPrompt, DocumentBlock, OutputFormat, Page,
    RelevantLink, Tone,
};
pub use notify::{NoticeLevel, Notifier, TracingNotifier};
pub use page::PageFetcher;
pub use service::BrochureService;
pub use traits::{Fetcher, FragmentStream, LanguageModel, PageParser};
