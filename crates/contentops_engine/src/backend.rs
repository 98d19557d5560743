use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;

use crate::wire::{decode_enqueue_response, decode_job_list};
use crate::{BackendError, FailureKind, JobId, JobType, RemoteJob};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the job API, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// The three calls the job panel makes against the backend.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    /// `GET {base}/jobs`: the authoritative job list, in server order.
    async fn list_jobs(&self) -> Result<Vec<RemoteJob>, BackendError>;

    /// `POST {base}/jobs/{type}`: returns the id of the created job.
    async fn enqueue(&self, job_type: JobType, params: &Value) -> Result<JobId, BackendError>;

    /// `DELETE {base}/jobs/{id}`.
    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, BackendError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::new(FailureKind::InvalidUrl, self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl JobBackend for ReqwestBackend {
    async fn list_jobs(&self) -> Result<Vec<RemoteJob>, BackendError> {
        let url = self.endpoint(&["jobs"])?;
        let body = self.send(self.client.get(url)).await?;
        decode_job_list(&body)
    }

    async fn enqueue(&self, job_type: JobType, params: &Value) -> Result<JobId, BackendError> {
        let url = self.endpoint(&["jobs", job_type.path_segment()])?;
        let payload = serde_json::to_vec(params)
            .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let body = self.send(request).await?;
        decode_enqueue_response(&body)
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&["jobs", id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
