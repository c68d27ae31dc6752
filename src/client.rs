use std::future::Future;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::RunpodConfig;
use crate::error::{Result, RunpodError};
use crate::types::{GenerationParams, Job, JobStatus, JobUpdate};

/// The surface of the remote job API the session depends on.
///
/// [`RunpodClient`] is the production implementation; tests drive the
/// session against scripted fakes.
pub trait JobApi: Send + Sync {
    /// Submit a generation request. Returns the assigned job.
    fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<Job>> + Send;

    /// Fetch the current status of a job.
    fn status(&self, job_id: &str) -> impl Future<Output = Result<JobUpdate>> + Send;
}

/// Typed HTTP client for a RunPod serverless endpoint.
///
/// Wraps the two calls of the job API: `POST /run` to submit and
/// `GET /status/{id}` to poll, both bearer-authenticated.
#[derive(Debug, Clone)]
pub struct RunpodClient {
    http: Client,
    config: RunpodConfig,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<JobStatus>,
}

impl RunpodClient {
    /// Create a client for the endpoint described by `config`.
    pub fn new(config: RunpodConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn run_url(&self) -> String {
        format!("{}/{}/run", self.config.base_url, self.config.endpoint_id)
    }

    fn status_url(&self, job_id: &str) -> String {
        format!(
            "{}/{}/status/{}",
            self.config.base_url, self.config.endpoint_id, job_id
        )
    }

    /// Map a non-success reply. A 404 means the endpoint id itself is
    /// wrong, which deserves a pointed message.
    fn map_error_status(&self, status: StatusCode, body: String) -> RunpodError {
        if status == StatusCode::NOT_FOUND {
            RunpodError::EndpointNotFound {
                endpoint_id: self.config.endpoint_id.clone(),
            }
        } else {
            RunpodError::Http {
                status: status.as_u16(),
                body,
            }
        }
    }
}

impl JobApi for RunpodClient {
    async fn submit(&self, prompt: &str, params: &GenerationParams) -> Result<Job> {
        let body = json!({
            "input": {
                "prompt": prompt,
                "negative_prompt": params.negative_prompt,
                "num_inference_steps": params.num_inference_steps,
                "guidance_scale": params.guidance_scale,
                "width": params.width,
                "height": params.height,
            },
        });

        let resp = self
            .http
            .post(self.run_url())
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| RunpodError::Connection(self.config.base_url.clone(), e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, body_text));
        }

        let parsed: SubmitResponse = resp
            .json()
            .await
            .map_err(|e| RunpodError::InvalidResponse(e.to_string()))?;

        let id = parsed
            .id
            .filter(|id| !id.is_empty())
            .ok_or(RunpodError::Submission)?;

        Ok(Job {
            id,
            status: parsed.status.unwrap_or(JobStatus::Queued),
        })
    }

    async fn status(&self, job_id: &str) -> Result<JobUpdate> {
        let resp = self
            .http
            .get(self.status_url(job_id))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| RunpodError::Polling(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, body_text));
        }

        resp.json()
            .await
            .map_err(|e| RunpodError::Polling(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RunpodClient {
        RunpodClient::new(RunpodConfig::new("key", "my-endpoint"))
    }

    #[test]
    fn test_run_url() {
        assert_eq!(
            test_client().run_url(),
            "https://api.runpod.ai/v2/my-endpoint/run"
        );
    }

    #[test]
    fn test_status_url() {
        assert_eq!(
            test_client().status_url("abc-123"),
            "https://api.runpod.ai/v2/my-endpoint/status/abc-123"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let client = RunpodClient::new(
            RunpodConfig::new("key", "ep").base_url("http://localhost:8000/"),
        );
        assert_eq!(client.run_url(), "http://localhost:8000/ep/run");
    }

    #[test]
    fn test_404_names_endpoint_config() {
        let err = test_client().map_error_status(StatusCode::NOT_FOUND, String::new());
        let message = err.to_string();
        assert!(message.contains("my-endpoint"));
        assert!(message.contains("RUNPOD_ENDPOINT_ID"));
    }

    #[test]
    fn test_other_http_errors_keep_status_and_body() {
        let err = test_client()
            .map_error_status(StatusCode::INTERNAL_SERVER_ERROR, "worker crashed".into());
        match err {
            RunpodError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "worker crashed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_submit_response() {
        let parsed: SubmitResponse =
            serde_json::from_str(r#"{"id": "abc-123", "status": "QUEUED"}"#).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("abc-123"));
        assert_eq!(parsed.status, Some(JobStatus::Queued));
    }

    #[test]
    fn test_parse_submit_response_without_id() {
        let parsed: SubmitResponse = serde_json::from_str(r#"{"status": "QUEUED"}"#).unwrap();
        assert!(parsed.id.is_none());
    }
}
