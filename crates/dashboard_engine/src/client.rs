use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::NewKeyword;
use crate::{
    ApiError, CleanupReport, FailureKind, ItemPage, ItemQueryParams, JobStatus, KeywordEntry,
    SourceEntry, UserId,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root of the API, e.g. `http://localhost:8000/api/`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Remote job, item, catalog and keyword endpoints.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    async fn start_scrape(&self) -> Result<(), ApiError>;

    async fn job_status(&self) -> Result<JobStatus, ApiError>;

    async fn query_items(&self, params: &ItemQueryParams) -> Result<ItemPage, ApiError>;

    async fn list_sources(&self) -> Result<Vec<SourceEntry>, ApiError>;

    async fn list_keywords(&self, user_id: UserId) -> Result<Vec<KeywordEntry>, ApiError>;

    async fn create_keyword(&self, user_id: UserId, word: &str)
        -> Result<KeywordEntry, ApiError>;

    async fn delete_keyword(&self, user_id: UserId, keyword_id: u64) -> Result<(), ApiError>;

    async fn cleanup_duplicates(&self) -> Result<CleanupReport, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.endpoint(path)?))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        response.text().await.map_err(map_reqwest_error)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        decode(&body)
    }
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestApi {
    async fn start_scrape(&self) -> Result<(), ApiError> {
        // Any 2xx counts as accepted, including "already running".
        self.send(self.request(Method::POST, "scraping/")?)
            .await
            .map(|_| ())
    }

    async fn job_status(&self) -> Result<JobStatus, ApiError> {
        self.fetch_json(self.request(Method::GET, "scraping/status")?)
            .await
    }

    async fn query_items(&self, params: &ItemQueryParams) -> Result<ItemPage, ApiError> {
        let mut url = self.endpoint("items")?;
        url.query_pairs_mut().extend_pairs(params.pairs());
        self.fetch_json(self.client.get(url)).await
    }

    async fn list_sources(&self) -> Result<Vec<SourceEntry>, ApiError> {
        self.fetch_json(self.request(Method::GET, "sources")?).await
    }

    async fn list_keywords(&self, user_id: UserId) -> Result<Vec<KeywordEntry>, ApiError> {
        self.fetch_json(self.request(Method::GET, &format!("users/{user_id}/keywords/"))?)
            .await
    }

    async fn create_keyword(
        &self,
        user_id: UserId,
        word: &str,
    ) -> Result<KeywordEntry, ApiError> {
        let body = serde_json::to_string(&NewKeyword { word })
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let request = self
            .request(Method::POST, &format!("users/{user_id}/keywords/"))?
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.fetch_json(request).await
    }

    async fn delete_keyword(&self, user_id: UserId, keyword_id: u64) -> Result<(), ApiError> {
        self.send(self.request(
            Method::DELETE,
            &format!("users/{user_id}/keywords/{keyword_id}"),
        )?)
        .await
        .map(|_| ())
    }

    async fn cleanup_duplicates(&self) -> Result<CleanupReport, ApiError> {
        self.fetch_json(self.request(Method::POST, "cleanup")?)
            .await
    }
}

/// Relative joins only keep the last segment when the base ends with `/`.
fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::new(FailureKind::InvalidUrl, "not a base url"));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
