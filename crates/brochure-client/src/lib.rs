pub mod fetcher;
pub mod llm;
pub mod parser;
pub mod sse;

#[cfg(test)]
mod test_server;

pub use fetcher::ReqwestFetcher;
pub use llm::OpenAiClient;
pub use parser::HtmlPageParser;
