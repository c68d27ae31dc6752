use serde::{Deserialize, Serialize};

use crate::error::{Result, RunpodError};

/// Fixed diffusion parameters embedded in every submission.
///
/// These are deliberately constants of the application rather than
/// user-facing knobs; [`Default`] carries the production values.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    pub negative_prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            negative_prompt: "ugly, blurry, poor quality, distorted".to_string(),
            num_inference_steps: 50,
            guidance_scale: 7.5,
            width: 512,
            height: 512,
        }
    }
}

/// Job lifecycle states as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    /// Any status string this client does not recognize. Non-terminal,
    /// so polling continues.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether polling stops at this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A generation job tracked by the remote service.
#[derive(Debug, Clone)]
pub struct Job {
    /// Opaque id assigned by the service at submission.
    pub id: String,
    /// Last observed status.
    pub status: JobStatus,
}

/// One status-check result.
#[derive(Debug, Clone, Deserialize)]
pub struct JobUpdate {
    pub status: JobStatus,
    /// Present only once the job has completed.
    #[serde(default)]
    pub output: Option<JobOutput>,
}

/// Output payload of a completed job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobOutput {
    /// Base64-encoded image payloads, in generation order.
    #[serde(default)]
    pub images: Vec<String>,
}

/// A decoded, display-ready image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    data: Vec<u8>,
}

impl GeneratedImage {
    /// Decode a base64 payload as returned by the status endpoint.
    pub fn from_base64(payload: &str) -> Result<Self> {
        let data = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload)
            .map_err(|e| RunpodError::InvalidResponse(format!("undecodable image payload: {}", e)))?;
        Ok(Self { data })
    }

    /// Raw image bytes (PNG as produced by the endpoint).
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// `data:` URL form, suitable for an `<img>` element or a webview.
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &self.data)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_status(s: &str) -> JobStatus {
        serde_json::from_str(&format!("\"{}\"", s)).unwrap()
    }

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(parse_status("QUEUED"), JobStatus::Queued);
        assert_eq!(parse_status("IN_PROGRESS"), JobStatus::InProgress);
        assert_eq!(parse_status("COMPLETED"), JobStatus::Completed);
        assert_eq!(parse_status("FAILED"), JobStatus::Failed);
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        assert_eq!(parse_status("IN_QUEUE"), JobStatus::Unknown);
        assert_eq!(parse_status(""), JobStatus::Unknown);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.negative_prompt, "ugly, blurry, poor quality, distorted");
        assert_eq!(params.num_inference_steps, 50);
        assert_eq!(params.guidance_scale, 7.5);
        assert_eq!(params.width, 512);
        assert_eq!(params.height, 512);
    }

    #[test]
    fn test_params_wire_field_names() {
        let json = serde_json::to_string(&GenerationParams::default()).unwrap();
        assert!(json.contains("\"negative_prompt\""));
        assert!(json.contains("\"num_inference_steps\":50"));
        assert!(json.contains("\"guidance_scale\":7.5"));
        assert!(json.contains("\"width\":512"));
        assert!(json.contains("\"height\":512"));
    }

    #[test]
    fn test_parse_status_response_with_output() {
        let update: JobUpdate = serde_json::from_str(
            r#"{"status": "COMPLETED", "output": {"images": ["aGVsbG8="]}}"#,
        )
        .unwrap();
        assert_eq!(update.status, JobStatus::Completed);
        assert_eq!(update.output.unwrap().images, vec!["aGVsbG8=".to_string()]);
    }

    #[test]
    fn test_parse_status_response_without_output() {
        let update: JobUpdate = serde_json::from_str(r#"{"status": "IN_PROGRESS"}"#).unwrap();
        assert_eq!(update.status, JobStatus::InProgress);
        assert!(update.output.is_none());
    }

    #[test]
    fn test_decode_image_payload() {
        // "hello" in base64
        let image = GeneratedImage::from_base64("aGVsbG8=").unwrap();
        assert_eq!(image.bytes(), b"hello");
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_decode_bad_payload() {
        let err = GeneratedImage::from_base64("not!!valid##base64").unwrap_err();
        assert!(matches!(err, RunpodError::InvalidResponse(_)));
    }
}
