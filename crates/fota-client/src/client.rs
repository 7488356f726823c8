//! FOTA HTTP client implementation

use std::time::Duration;

use bytes::Bytes;
use fota_core::paths;
use fota_core::{
    AvailableUpdateDevice, BulkDevice, BulkRequest, HistoryEntry, JobActionResult, JobId,
    JobIdsRequest, JobRecord, RetryRequest, SignedDownload, UpdateJobsResponse,
};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use tracing::{debug, instrument};
use url::Url;

use crate::auth::Auth;
use crate::error::{FotaClientError, Result};
use crate::query::{ListQuery, SortDir};
use crate::response::ApiResponse;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// FOTA REST API client
///
/// The raw methods ([`get`](Self::get), [`post`](Self::post),
/// [`delete`](Self::delete), [`request`](Self::request)) return whatever
/// the service answered and take the credentials explicitly. The typed
/// helpers send the client's own bearer token and map error statuses to
/// [`FotaClientError::Api`].
#[derive(Debug, Clone)]
pub struct FotaClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl FotaClient {
    /// Create a new FOTA client without credentials
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the FOTA service (e.g., "https://sam-staging.example.com")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new FOTA client with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Create a new FOTA client whose typed helpers send `token`
    pub fn with_bearer_token(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self::new(base_url)?.with_token(token))
    }

    /// Same client, typed helpers authenticated with `token`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Credentials the typed helpers use
    pub fn auth(&self) -> Auth {
        match &self.token {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::None,
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with('/') {
            Ok(self.base_url.join(path)?)
        } else {
            Ok(self.base_url.join(&format!("/{}", path))?)
        }
    }

    // =========================================================================
    // Raw exchange
    // =========================================================================

    /// Send one request and capture the answer, whatever its status.
    ///
    /// A JSON `body` is sent with `Content-Type: application/json`.
    #[instrument(skip(self, query, body), fields(status = tracing::field::Empty))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
        auth: &Auth,
    ) -> Result<ApiResponse> {
        let url = self.url(path)?;
        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(value) = auth.header_value() {
            let header = HeaderValue::from_str(&value)
                .map_err(|e| FotaClientError::InvalidHeader(e.to_string()))?;
            request = request.header(AUTHORIZATION, header);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = ApiResponse::read(request.send().await?).await?;
        tracing::Span::current().record("status", response.status());
        debug!(status = response.status(), bytes = response.body.len(), "Response");
        Ok(response)
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        auth: &Auth,
    ) -> Result<ApiResponse> {
        self.request(Method::GET, path, query, None, auth).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        auth: &Auth,
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, &[], Some(body), auth).await
    }

    pub async fn delete(
        &self,
        path: &str,
        body: &serde_json::Value,
        auth: &Auth,
    ) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, &[], Some(body), auth)
            .await
    }

    async fn post_typed<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| FotaClientError::ParseError(e.to_string()))?;
        self.post(path, &body, &self.auth()).await?.into_result()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List devices with the updates they are offered
    #[instrument(skip(self))]
    pub async fn list_available_updates(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<AvailableUpdateDevice>> {
        self.get(paths::AVAILABLE_UPDATES, query.pairs(), &self.auth())
            .await?
            .into_result()
    }

    /// List firmware jobs
    #[instrument(skip(self))]
    pub async fn list_jobs(&self, query: &ListQuery) -> Result<Vec<JobRecord>> {
        self.get(paths::JOBS, query.pairs(), &self.auth())
            .await?
            .into_result()
    }

    /// Most recently updated job of a device
    #[instrument(skip(self))]
    pub async fn latest_job(&self, uid: &str) -> Result<Option<JobRecord>> {
        let query = ListQuery::paged(1, 1)
            .sort("updated_at")
            .sort_dir(SortDir::Desc)
            .search(uid);
        Ok(self.list_jobs(&query).await?.into_iter().next())
    }

    /// Look a job up by id among the jobs of its device
    #[instrument(skip(self))]
    pub async fn find_job(&self, uid: &str, job_id: JobId) -> Result<Option<JobRecord>> {
        let query = ListQuery::paged(1, paths::MAX_PER_PAGE)
            .sort("updated_at")
            .sort_dir(SortDir::Desc)
            .search(uid);
        Ok(self
            .list_jobs(&query)
            .await?
            .into_iter()
            .find(|job| job.id == job_id))
    }

    /// Firmware history of one device
    #[instrument(skip(self))]
    pub async fn device_history(&self, uid: &str) -> Result<Vec<HistoryEntry>> {
        self.get(&paths::device_history(uid), &[], &self.auth())
            .await?
            .into_result()
    }

    // =========================================================================
    // Job operations
    // =========================================================================

    /// Queue firmware downloads for the given update ids
    #[instrument(skip(self))]
    pub async fn bulk_create(&self, update_ids: &[u64]) -> Result<Vec<BulkDevice>> {
        let body = BulkRequest {
            updates: update_ids.to_vec(),
        };
        self.post_typed(paths::JOBS_BULK, &body).await
    }

    /// Cancel pending downloads, leaving the jobs `DownloadReady`
    #[instrument(skip(self))]
    pub async fn cancel_downloaded(&self, job_ids: &[JobId]) -> Result<Vec<JobActionResult>> {
        let body = JobIdsRequest {
            job_ids: job_ids.to_vec(),
        };
        self.post_typed(paths::JOBS_DOWNLOADED_CANCEL, &body).await
    }

    /// Queue installation of downloaded jobs
    #[instrument(skip(self))]
    pub async fn update_jobs(&self, job_ids: &[JobId]) -> Result<UpdateJobsResponse> {
        let body = JobIdsRequest {
            job_ids: job_ids.to_vec(),
        };
        self.post_typed(paths::JOBS_UPDATE, &body).await
    }

    /// Cancel jobs; each result reports the state the job had when cancelled
    #[instrument(skip(self))]
    pub async fn cancel_jobs(&self, job_ids: &[JobId]) -> Result<Vec<JobActionResult>> {
        let body = JobIdsRequest {
            job_ids: job_ids.to_vec(),
        };
        self.post_typed(paths::JOBS_CANCEL, &body).await
    }

    /// Re-queue failed jobs
    #[instrument(skip(self))]
    pub async fn retry_jobs(&self, job_ids: &[JobId]) -> Result<Vec<JobActionResult>> {
        let body = RetryRequest {
            jobs: job_ids.to_vec(),
        };
        self.post_typed(paths::JOBS_RETRY, &body).await
    }

    // =========================================================================
    // Firmware download
    // =========================================================================

    /// Fetch a firmware binary through a signed link; sends no credentials
    #[instrument(skip(self))]
    pub async fn download_firmware(&self, link: &SignedDownload) -> Result<Bytes> {
        let response = self.download_raw(link).await?.error_for_status()?;
        Ok(response.body)
    }

    /// Fetch a signed link and return the raw answer
    pub async fn download_raw(&self, link: &SignedDownload) -> Result<ApiResponse> {
        let query: Vec<(String, String)> = link
            .query_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self.get(&paths::firmware_download(&link.file), &query, &Auth::None)
            .await
    }
}
