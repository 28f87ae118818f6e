//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{ChatPrompt, OutputFormat, Page};
use crate::notify::{NoticeLevel, Notifier};
use crate::traits::{Fetcher, FragmentStream, LanguageModel, PageParser};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher with per-URL responses.
///
/// The last successful response for a URL is served again on later fetches;
/// errors are served once. Unknown URLs answer with HTTP 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Vec<Result<String, AppError>>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.push(url, Ok(html.to_string()));
        self
    }

    pub fn with_error(self, url: &str, error: AppError) -> Self {
        self.push(url, Err(error));
        self
    }

    fn push(&self, url: &str, response: Result<String, AppError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(response);
    }

    /// URLs fetched so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());

        let mut responses = self.responses.lock().unwrap();
        let not_found = || AppError::HttpStatus {
            status: 404,
            url: url.to_string(),
        };
        match responses.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => match queue.first() {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(_)) => queue.remove(0),
                None => Err(not_found()),
            },
            None => Err(not_found()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockParser
// ---------------------------------------------------------------------------

/// Naive parser: title from `<title>`, links from `href="..."`, text is the input.
#[derive(Clone, Default)]
pub struct MockParser {
    fail: bool,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser that returns an error for every document.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl PageParser for MockParser {
    fn parse(&self, url: &str, html: &str) -> Result<Page, AppError> {
        if self.fail {
            return Err(AppError::ParseError("unparseable document".into()));
        }

        let title = html
            .split_once("<title>")
            .and_then(|(_, rest)| rest.split_once("</title>"))
            .map(|(title, _)| title.to_string());

        let links = html
            .split("href=\"")
            .skip(1)
            .filter_map(|rest| rest.split_once('"').map(|(href, _)| href.to_string()))
            .collect();

        Ok(Page::new(url, title, html, links))
    }
}

// ---------------------------------------------------------------------------
// MockLanguageModel
// ---------------------------------------------------------------------------

/// One recorded model invocation. `format` is `None` for streaming calls.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub prompt: ChatPrompt,
    pub format: Option<OutputFormat>,
}

type StreamScript = Result<Vec<Result<String, AppError>>, AppError>;

/// Mock model with queued completions and scripted streams.
///
/// With nothing queued, completions return `{"links": []}` and streams are empty.
#[derive(Clone, Default)]
pub struct MockLanguageModel {
    completions: Arc<Mutex<Vec<Result<String, AppError>>>>,
    streams: Arc<Mutex<Vec<StreamScript>>>,
    calls: Arc<Mutex<Vec<ModelCall>>>,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion(self, response: Result<String, AppError>) -> Self {
        self.completions.lock().unwrap().push(response);
        self
    }

    /// `Err` fails the call itself; `Ok` lists the items the stream yields.
    pub fn with_stream(self, script: StreamScript) -> Self {
        self.streams.lock().unwrap().push(script);
        self
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl LanguageModel for MockLanguageModel {
    async fn complete(&self, prompt: &ChatPrompt, format: OutputFormat) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(ModelCall {
            prompt: prompt.clone(),
            format: Some(format),
        });

        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            Ok(r#"{"links": []}"#.to_string())
        } else {
            completions.remove(0)
        }
    }

    async fn stream(&self, prompt: &ChatPrompt) -> Result<FragmentStream, AppError> {
        self.calls.lock().unwrap().push(ModelCall {
            prompt: prompt.clone(),
            format: None,
        });

        let script = {
            let mut streams = self.streams.lock().unwrap();
            if streams.is_empty() {
                Ok(Vec::new())
            } else {
                streams.remove(0)
            }
        };
        let items = script?;
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// Notifier that records every notice.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<(NoticeLevel, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|(_, m)| m).collect()
    }

    pub fn has_level(&self, level: NoticeLevel) -> bool {
        self.notices.lock().unwrap().iter().any(|(l, _)| *l == level)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}
