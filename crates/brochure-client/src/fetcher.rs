use std::time::Duration;

use brochure_core::config::FetchConfig;
use brochure_core::error::AppError;
use brochure_core::traits::Fetcher;
use reqwest::Client;

/// Browser-like User-Agent; many company sites reject unknown clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML with a browser User-Agent and a bounded timeout.
/// One attempt per call; non-2xx responses are errors.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(&FetchConfig::default())
    }

    pub fn with_config(config: &FetchConfig) -> Result<Self, AppError> {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::Html;
    use axum::routing::get;

    use super::*;
    use crate::test_server::spawn;

    fn routes() -> Router {
        Router::new()
            .route(
                "/",
                get(|| async { Html("<html><head><title>Acme</title></head><body>Hi</body></html>") }),
            )
            .route(
                "/agent",
                get(|headers: HeaderMap| async move {
                    headers
                        .get(header::USER_AGENT)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = spawn(routes()).await;
        let fetcher = ReqwestFetcher::new().unwrap();

        let html = fetcher.fetch(&format!("{base}/")).await.unwrap();
        assert!(html.contains("<title>Acme</title>"));
    }

    #[tokio::test]
    async fn test_sends_browser_user_agent() {
        let base = spawn(routes()).await;
        let fetcher = ReqwestFetcher::new().unwrap();

        let agent = fetcher.fetch(&format!("{base}/agent")).await.unwrap();
        assert_eq!(agent, BROWSER_USER_AGENT);
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error() {
        let base = spawn(routes()).await;
        let fetcher = ReqwestFetcher::new().unwrap();

        let err = fetcher.fetch(&format!("{base}/missing")).await.unwrap_err();
        assert!(matches!(err, AppError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let base = spawn(routes()).await;
        let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(1)).unwrap();

        let err = fetcher.fetch(&format!("{base}/slow")).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let fetcher = ReqwestFetcher::new().unwrap();

        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, AppError::NetworkError(_)), "{err}");
    }
}
