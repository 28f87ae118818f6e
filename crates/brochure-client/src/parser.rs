use brochure_core::error::AppError;
use brochure_core::models::Page;
use brochure_core::traits::PageParser;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never reaches the page text.
const NOISE_TAGS: &[&str] = &["script", "style", "img", "input", "nav", "footer", "header"];

/// `href` prefixes that never point at another page.
const SKIPPED_HREF_PREFIXES: &[&str] = &["#", "mailto:", "tel:"];

/// HTML parser using scraper.
///
/// Extracts the title, the visible body text (one line per text node,
/// noise elements skipped), and the raw anchor targets in document order.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlPageParser;

impl HtmlPageParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, url: &str, html: &str) -> Result<Page, AppError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&selector("title")?)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string());

        let text = match document.select(&selector("body")?).next() {
            Some(body) => {
                let mut lines = Vec::new();
                collect_text(body, &mut lines);
                lines.join("\n")
            }
            None => String::new(),
        };

        let links = document
            .select(&selector("a[href]")?)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .filter(|href| !SKIPPED_HREF_PREFIXES.iter().any(|p| href.starts_with(p)))
            .map(str::to_string)
            .collect();

        Ok(Page::new(url, title, text, links))
    }
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("Bad selector '{css}': {e}")))
}

/// Depth-first walk collecting trimmed, non-empty text nodes outside noise subtrees.
fn collect_text<'a>(element: ElementRef<'a>, lines: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed);
                }
            }
            Node::Element(el) if NOISE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, lines);
                }
            }
            _ => {}
        }
    }
}
