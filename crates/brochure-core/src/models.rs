use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;

/// Title used when a page has no `<title>` or could not be fetched.
pub const DEFAULT_TITLE: &str = "No title found";

/// Label of the first block of every aggregate document.
pub const LANDING_LABEL: &str = "Landing";

/// A single fetched web page.
///
/// Built once from one fetch attempt; a failed attempt yields [`Page::empty`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    url: String,
    title: String,
    text: String,
    links: Vec<String>,
}

impl Page {
    pub fn new(
        url: impl Into<String>,
        title: Option<String>,
        text: impl Into<String>,
        links: Vec<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            text: text.into(),
            links,
        }
    }

    /// The page produced by a failed fetch: default title, no text, no links.
    pub fn empty(url: impl Into<String>) -> Self {
        Self::new(url, None, String::new(), Vec::new())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Title and text formatted for inclusion in an aggregate document.
    pub fn contents(&self) -> String {
        format!(
            "Webpage Title: {}\nWebpage Contents:\n{}\n\n",
            self.title, self.text
        )
    }
}

/// A sub-page the classifier judged useful for a brochure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantLink {
    /// Free-form label such as "about" or "careers".
    #[serde(rename = "type", default = "default_link_type")]
    pub link_type: String,
    #[serde(default)]
    pub url: String,
}

fn default_link_type() -> String {
    "page".to_string()
}

impl RelevantLink {
    pub fn new(link_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            link_type: link_type.into(),
            url: url.into(),
        }
    }

    /// True when `url` is a non-empty absolute http(s) URL.
    pub fn is_fetchable(&self) -> bool {
        !self.url.is_empty()
            && Url::parse(&self.url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
    }

    /// Block label derived from the link type ("about us" -> "About Us").
    pub fn label(&self) -> String {
        title_case(&self.link_type)
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// One labeled page inside an [`AggregateDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub label: String,
    pub url: String,
    pub page: Page,
}

impl fmt::Display for DocumentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "== START: Content from {label} Page ({url}) ==\n{contents}== END: Content from {label} Page ==\n\n",
            label = self.label,
            url = self.url,
            contents = self.page.contents(),
        )
    }
}

/// Every fetched page of one request, landing page first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateDocument {
    blocks: Vec<DocumentBlock>,
}

impl AggregateDocument {
    /// Start a document with the landing page block.
    pub fn with_landing(url: impl Into<String>, page: Page) -> Self {
        let mut doc = Self::default();
        doc.push(LANDING_LABEL, url, page);
        doc
    }

    pub fn push(&mut self, label: impl Into<String>, url: impl Into<String>, page: Page) {
        self.blocks.push(DocumentBlock {
            label: label.into(),
            url: url.into(),
            page,
        });
    }

    pub fn blocks(&self) -> &[DocumentBlock] {
        &self.blocks
    }

    pub fn labels(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AggregateDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

/// Voice of the generated brochure.
///
/// Any text that is not one of the named tones is kept as [`Tone::Custom`]
/// and handed to the model as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Professional,
    Humorous,
    Inspirational,
    Technical,
    Custom(String),
}

impl Tone {
    pub fn as_str(&self) -> &str {
        match self {
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
            Tone::Inspirational => "inspirational",
            Tone::Technical => "technical",
            Tone::Custom(s) => s,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "professional" => Tone::Professional,
            "humorous" => Tone::Humorous,
            "inspirational" => Tone::Inspirational,
            "technical" => Tone::Technical,
            _ => Tone::Custom(s.to_string()),
        })
    }
}

/// What the caller asked for: one brochure for one company website.
#[derive(Debug, Clone)]
pub struct BrochureRequest {
    pub company_name: String,
    pub url: String,
    pub tone: Tone,
}

impl BrochureRequest {
    pub fn new(company_name: impl Into<String>, url: impl Into<String>, tone: Tone) -> Self {
        Self {
            company_name: company_name.into(),
            url: url.into(),
            tone,
        }
    }

    /// Check the request before any network activity.
    pub fn validate(&self) -> Result<Url, AppError> {
        if self.company_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter both a company name and a URL.".into(),
            ));
        }
        validate_url(&self.url)
    }
}

/// Accept only full `http`/`https` URLs with a host.
pub fn validate_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InvalidInput(
            "Please enter both a company name and a URL.".into(),
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| {
        AppError::InvalidInput(format!(
            "Please enter a valid, full URL (e.g., https://example.com): {e}"
        ))
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::InvalidInput(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::InvalidInput(format!("URL has no host: {raw}")));
    }

    Ok(parsed)
}

/// Ordered instruction pair sent to a language model: system first, then user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Output shape requested from a non-streaming completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// Strictly machine-parseable JSON.
    Json,
}
