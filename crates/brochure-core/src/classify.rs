use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::AppError;
use crate::models::{ChatPrompt, OutputFormat, Page, RelevantLink};
use crate::notify::Notifier;
use crate::traits::LanguageModel;

const CLASSIFY_SYSTEM_PROMPT: &str = "You are an expert assistant analyzing website links to identify pages for a company brochure. \
Focus on 'About Us', 'Company', 'Solutions', 'Products', or 'Careers' pages and their close variants (e.g. 'Team', 'Jobs', 'Services'). \
Ensure all URLs are absolute, resolving relative links against the base URL. \
Ignore 'Terms of Service', 'Privacy Policy', social media, or login pages. \
Respond ONLY with a JSON object: {\"links\": [{\"type\": \"page type\", \"url\": \"full_url\"}, ...]}";

/// Shape of the model's answer. Entries are checked one by one so a single
/// malformed entry does not discard the rest.
#[derive(Debug, Deserialize)]
struct LinkSelection {
    #[serde(default)]
    links: Option<Vec<Value>>,
}

/// Asks a language model which links of a page belong in a brochure.
#[derive(Clone)]
pub struct LinkClassifier<L, N>
where
    L: LanguageModel,
    N: Notifier,
{
    model: L,
    notifier: N,
}

impl<L, N> LinkClassifier<L, N>
where
    L: LanguageModel,
    N: Notifier,
{
    pub fn new(model: L, notifier: N) -> Self {
        Self { model, notifier }
    }

    /// Select brochure-relevant links from `page`.
    ///
    /// Makes exactly one model call. Any failure yields an empty list.
    pub async fn classify(&self, page: &Page) -> Vec<RelevantLink> {
        self.notifier
            .info(&format!("AI is analyzing links from {}...", page.url()));

        match self.select(page).await {
            Ok(links) => {
                self.notifier.success(&format!(
                    "AI analysis complete. Found {} relevant link(s).",
                    links.len()
                ));
                links
            }
            Err(e) => {
                self.notifier
                    .error(&format!("An error occurred during AI link analysis: {e}"));
                Vec::new()
            }
        }
    }

    async fn select(&self, page: &Page) -> Result<Vec<RelevantLink>, AppError> {
        let prompt = build_prompt(page);
        let raw = self.model.complete(&prompt, OutputFormat::Json).await?;
        let selection: LinkSelection = serde_json::from_str(raw.trim())?;
        let entries = selection.links.unwrap_or_default();

        let base = Url::parse(page.url()).ok();
        let links: Vec<RelevantLink> = entries
            .iter()
            .filter_map(link_from_entry)
            .map(|link| normalize(link, base.as_ref()))
            .collect();
        tracing::debug!(
            url = page.url(),
            entries = entries.len(),
            links = links.len(),
            "Links selected"
        );
        Ok(links)
    }
}

/// One entry of the model's `links` array. Entries without a string `url`
/// are dropped; a missing or non-string `type` becomes "page".
fn link_from_entry(entry: &Value) -> Option<RelevantLink> {
    let url = entry.get("url")?.as_str()?.trim();
    if url.is_empty() {
        return None;
    }
    let link_type = entry
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("page");
    Some(RelevantLink::new(link_type, url))
}

fn build_prompt(page: &Page) -> ChatPrompt {
    let user = format!(
        "Base URL: {}\nHere are the links from the website. Return the relevant ones in the specified JSON format.\n\nLinks:\n{}",
        page.url(),
        page.links().join("\n")
    );
    ChatPrompt::new(CLASSIFY_SYSTEM_PROMPT, user)
}

/// Resolve a possibly relative link against the page it came from.
///
/// Links that cannot be resolved are kept verbatim; the aggregator skips them.
fn normalize(mut link: RelevantLink, base: Option<&Url>) -> RelevantLink {
    let trimmed = link.url.trim();
    if trimmed.is_empty() {
        link.url.clear();
        return link;
    }

    let resolved = match base {
        Some(base) => base.join(trimmed),
        None => Url::parse(trimmed),
    };
    if let Ok(resolved) = resolved {
        link.url = resolved.to_string();
    }
    link
}
