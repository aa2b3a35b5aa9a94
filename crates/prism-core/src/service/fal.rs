//! fal.ai queue API client.
//!
//! Jobs are submitted to `POST {endpoint}/{model_id}`; the response carries
//! the URLs used to poll status and fetch the result.

use super::{GenerationService, JobHandle, JobOutput, JobRequest, JobStatus};
use crate::credential::Credential;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;

/// Client for the fal.ai queue REST API.
#[derive(Debug, Clone)]
pub struct FalClient {
    endpoint: String,
    client: reqwest::Client,
}

impl FalClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn submit_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.endpoint, model_id.trim_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        credential: &Credential,
        url: &str,
        what: &str,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(url)
            .header("Authorization", auth_header(credential))
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("fal {what} request failed: {e}")))?;
        let resp = check_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse fal {what} response: {e}")))
    }
}

fn auth_header(credential: &Credential) -> String {
    format!("Key {}", credential.expose())
}

/// Turn a non-success response into a [`ServiceError`] carrying its status.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(ServiceError::with_status(
        status.as_u16(),
        format!("fal HTTP {status}: {}", error_detail(&text)),
    ))
}

/// Pull the human-readable part out of a fal error body.
///
/// Bodies look like `{"detail": "..."}` or `{"detail": [{"msg": "..."}]}`;
/// anything else is returned as-is.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct SubmitResponse {
    request_id: String,
    status_url: String,
    response_url: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    queue_position: Option<u32>,
    #[serde(default)]
    logs: Option<Vec<LogEntry>>,
}

#[derive(Deserialize)]
struct LogEntry {
    message: String,
}

#[derive(Deserialize)]
struct ResultResponse {
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Deserialize)]
struct ImageEntry {
    url: String,
}

impl StatusResponse {
    fn into_status(self) -> Result<JobStatus, ServiceError> {
        let logs = self
            .logs
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.message)
            .collect();
        match self.status.as_str() {
            "IN_QUEUE" => Ok(JobStatus::InQueue {
                position: self.queue_position,
                logs,
            }),
            "IN_PROGRESS" => Ok(JobStatus::InProgress { logs }),
            "COMPLETED" => Ok(JobStatus::Completed { logs }),
            other => Err(ServiceError::new(format!("Unknown fal job status: {other}"))),
        }
    }
}

#[async_trait]
impl GenerationService for FalClient {
    fn name(&self) -> &str {
        "fal"
    }

    async fn submit(
        &self,
        credential: &Credential,
        request: &JobRequest,
    ) -> Result<JobHandle, ServiceError> {
        let url = self.submit_url(&request.model_id);
        tracing::debug!("Submitting job to {url}");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", auth_header(credential))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("fal submit request failed: {e}")))?;
        let resp = check_status(resp).await?;

        let submitted: SubmitResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse fal submit response: {e}")))?;

        Ok(JobHandle {
            request_id: submitted.request_id,
            status_url: submitted.status_url,
            response_url: submitted.response_url,
        })
    }

    async fn status(
        &self,
        credential: &Credential,
        handle: &JobHandle,
    ) -> Result<JobStatus, ServiceError> {
        let url = format!("{}?logs=1", handle.status_url);
        let status: StatusResponse = self.get_json(credential, &url, "status").await?;
        status.into_status()
    }

    async fn result(
        &self,
        credential: &Credential,
        handle: &JobHandle,
    ) -> Result<JobOutput, ServiceError> {
        let result: ResultResponse = self
            .get_json(credential, &handle.response_url, "result")
            .await?;
        Ok(JobOutput {
            image_urls: result.images.into_iter().map(|i| i.url).collect(),
        })
    }
}
