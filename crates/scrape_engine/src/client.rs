use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use scrape_logging::{scrape_debug, scrape_warn};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{ApiError, ApiErrorKind, ApiReply, Credentials};

const API_PREFIX: [&str; 2] = ["api", "v1"];

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Scrapes log in and crawl before answering; expect 30-60 seconds.
    pub request_timeout: Duration,
    pub extra_headers: Vec<(String, String)>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            extra_headers: vec![(
                "ngrok-skip-browser-warning".to_string(),
                "true".to_string(),
            )],
        }
    }
}

/// The three backend calls. Any HTTP response, error statuses included, is an
/// `Ok(ApiReply)`; `Err` means no response was obtained.
#[async_trait::async_trait]
pub trait ScrapeApi: Send + Sync {
    async fn scrape(&self, credentials: &Credentials) -> Result<ApiReply, ApiError>;

    async fn submit_verification(
        &self,
        credentials: &Credentials,
        code: &str,
    ) -> Result<ApiReply, ApiError>;

    async fn fetch_posts(&self, username: &str) -> Result<ApiReply, ApiError>;
}

#[derive(Serialize)]
struct VerificationBody<'a> {
    email: &'a str,
    password: &'a str,
    code: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.settings.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ApiError::unexpected(format!("invalid header name {name:?}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ApiError::unexpected(format!("invalid header value for {name}: {err}")))?;
            headers.insert(name, value);
        }

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::unexpected(err.to_string()))
    }

    /// `{base_url}/api/v1/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let base = &self.settings.base_url;
        let mut url = Url::parse(base)
            .map_err(|err| ApiError::unexpected(format!("invalid base URL {base:?}: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::unexpected(format!("base URL {base:?} cannot take a path")))?
            .pop_if_empty()
            .extend(API_PREFIX.iter().chain(segments));
        Ok(url)
    }

    async fn post_json<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<ApiReply, ApiError> {
        let url = self.endpoint(segments)?;
        let client = self.build_client()?;
        scrape_debug!("POST {}", url);
        read_reply(client.post(url).json(body).send().await).await
    }
}

#[async_trait::async_trait]
impl ScrapeApi for ReqwestApi {
    async fn scrape(&self, credentials: &Credentials) -> Result<ApiReply, ApiError> {
        self.post_json(&["scrape"], credentials).await
    }

    async fn submit_verification(
        &self,
        credentials: &Credentials,
        code: &str,
    ) -> Result<ApiReply, ApiError> {
        let body = VerificationBody {
            email: &credentials.email,
            password: &credentials.password,
            code,
        };
        self.post_json(&["submit-verification"], &body).await
    }

    async fn fetch_posts(&self, username: &str) -> Result<ApiReply, ApiError> {
        let url = self.endpoint(&["posts", username])?;
        let client = self.build_client()?;
        scrape_debug!("GET {}", url);
        read_reply(client.get(url).send().await).await
    }
}

async fn read_reply(
    sent: Result<reqwest::Response, reqwest::Error>,
) -> Result<ApiReply, ApiError> {
    let response = sent.map_err(map_reqwest_error)?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            scrape_warn!(
                "Status {} reply is not JSON ({} bytes): {}",
                status,
                bytes.len(),
                err
            );
            Value::Null
        })
    };
    Ok(ApiReply { status, body })
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        return ApiError::new(ApiErrorKind::Unexpected, err.to_string());
    }
    ApiError::new(ApiErrorKind::Connectivity, err.to_string())
}
