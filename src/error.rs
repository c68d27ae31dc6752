use thiserror::Error;

/// Errors returned by RunPod generation operations.
///
/// Every variant renders the short human-readable message shown to the
/// user; callers can display these directly.
#[derive(Error, Debug)]
pub enum RunpodError {
    /// Required configuration is missing. No network call was attempted.
    #[error("Missing configuration: {0}")]
    Config(String),

    /// The endpoint accepted the request but returned no job id.
    #[error("Failed to submit job: response contained no job id")]
    Submission,

    /// The endpoint URL does not exist.
    #[error(
        "Endpoint '{endpoint_id}' not found (404). Verify the RUNPOD_ENDPOINT_ID value against your RunPod dashboard"
    )]
    EndpointNotFound { endpoint_id: String },

    /// RunPod returned a non-success HTTP status.
    #[error("RunPod returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport failure while submitting the job.
    #[error("Cannot reach RunPod at {0}: {1}")]
    Connection(String, String),

    /// Transport failure while checking job status.
    #[error("Error polling job status: {0}")]
    Polling(String),

    /// The remote service reported a terminal failure.
    #[error("Image generation failed")]
    Failed,

    /// The status-check budget ran out before a terminal state.
    #[error("Image generation timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The job completed but its output contained no images.
    #[error("Generation completed but returned no images")]
    EmptyResult,

    /// The response from RunPod was missing expected fields or carried
    /// an undecodable payload.
    #[error("Invalid response from endpoint: {0}")]
    InvalidResponse(String),

    /// The attempt was cancelled by the user. Never surfaced as a
    /// failure; the session converts it into a quiet no-op.
    #[error("Request cancelled by user")]
    Cancelled,
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RunpodError>;
