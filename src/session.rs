use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::client::{JobApi, RunpodClient};
use crate::config::RunpodConfig;
use crate::error::{Result, RunpodError};
use crate::types::{GeneratedImage, GenerationParams, JobStatus};

/// Where the session is in the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
}

/// Snapshot of the session state for presentation layers.
///
/// Cloneable by value; rendering code polls [`Generator::state`] and never
/// holds a lock into the session.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Prompt of the last accepted generation attempt.
    pub prompt: String,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Most recent successful image, if any.
    pub image: Option<GeneratedImage>,
    /// User-facing error or notice from the last attempt.
    pub message: Option<String>,
}

impl UiState {
    /// True while a generation attempt is in flight.
    pub fn busy(&self) -> bool {
        self.phase != Phase::Idle
    }
}

#[derive(Default)]
struct Inner {
    ui: UiState,
    /// Cancellation scope of the in-flight attempt, if any.
    scope: Option<CancellationToken>,
    /// Bumped per accepted attempt; a suspended attempt only writes state
    /// back if it is still the current one.
    epoch: u64,
}

/// Drives the submit/poll/display lifecycle, one generation at a time.
///
/// Cheaply cloneable; clones share state, so one task can await
/// [`generate`](Self::generate) while another calls
/// [`cancel`](Self::cancel). Starting a new generation cancels any
/// attempt still in flight.
pub struct Generator<A> {
    api: Arc<A>,
    config: RunpodConfig,
    params: GenerationParams,
    inner: Arc<Mutex<Inner>>,
}

impl<A> Clone for Generator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: self.config.clone(),
            params: self.params.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Generator<RunpodClient> {
    /// Create a session wired to the production RunPod client.
    pub fn runpod(config: RunpodConfig) -> Self {
        Generator::new(RunpodClient::new(config.clone()), config)
    }
}

impl<A: JobApi> Generator<A> {
    /// Create a session over any job API implementation.
    pub fn new(api: A, config: RunpodConfig) -> Self {
        Self {
            api: Arc::new(api),
            config,
            params: GenerationParams::default(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Override the fixed generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.lock().ui.clone()
    }

    /// Run one full generation attempt.
    ///
    /// Returns `Ok(None)` when the prompt is empty or the attempt was
    /// cancelled; both are quiet no-ops. Every other failure is returned
    /// and also recorded as the user-facing message in [`UiState`].
    pub async fn generate(&self, prompt: &str) -> Result<Option<GeneratedImage>> {
        if prompt.trim().is_empty() {
            return Ok(None);
        }

        if let Err(e) = self.config.validate() {
            self.lock().ui.message = Some(e.to_string());
            return Err(e);
        }

        let (token, epoch) = {
            let mut inner = self.lock();
            // A new attempt supersedes any in-flight one.
            if let Some(prev) = inner.scope.take() {
                prev.cancel();
            }
            let token = CancellationToken::new();
            inner.scope = Some(token.clone());
            inner.epoch += 1;
            inner.ui.prompt = prompt.to_string();
            inner.ui.phase = Phase::Submitting;
            inner.ui.image = None;
            inner.ui.message = None;
            (token, inner.epoch)
        };

        let result = self.run(prompt, &token, epoch).await;

        let mut inner = self.lock();
        if inner.epoch == epoch {
            inner.ui.phase = Phase::Idle;
            inner.scope = None;
        }
        match result {
            Ok(image) => {
                if inner.epoch == epoch {
                    inner.ui.image = Some(image.clone());
                }
                Ok(Some(image))
            }
            Err(RunpodError::Cancelled) => {
                // cancel() already published its notice; exit quietly.
                Ok(None)
            }
            Err(e) => {
                if inner.epoch == epoch {
                    inner.ui.message = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Abort the in-flight attempt, if any.
    ///
    /// The suspended operation observes the token before acting on any
    /// response, so no further requests are issued and nothing beyond the
    /// neutral notice is surfaced.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let Some(token) = inner.scope.take() {
            token.cancel();
            inner.ui.phase = Phase::Idle;
            inner.ui.message = Some(RunpodError::Cancelled.to_string());
        }
    }

    async fn run(
        &self,
        prompt: &str,
        token: &CancellationToken,
        epoch: u64,
    ) -> Result<GeneratedImage> {
        debug!("submitting generation job");
        let mut job = self
            .guarded(token, self.api.submit(prompt, &self.params))
            .await?;
        debug!("job {} submitted with status {:?}", job.id, job.status);

        {
            let mut inner = self.lock();
            if inner.epoch == epoch {
                inner.ui.phase = Phase::Polling;
            }
        }

        let mut output = None;
        let mut attempts = 0u32;
        while !job.status.is_terminal() {
            if attempts >= self.config.max_polls {
                warn!(
                    "job {} not terminal after {} status checks, giving up",
                    job.id, attempts
                );
                return Err(RunpodError::Timeout { attempts });
            }
            attempts += 1;

            self.guarded(token, async {
                tokio::time::sleep(self.config.poll_interval).await;
                Ok(())
            })
            .await?;

            debug!(
                "status check {}/{} for job {}",
                attempts, self.config.max_polls, job.id
            );
            let update = self.guarded(token, self.api.status(&job.id)).await?;
            job.status = update.status;
            output = update.output;
        }

        match job.status {
            JobStatus::Failed => Err(RunpodError::Failed),
            _ => {
                let images = output.map(|o| o.images).unwrap_or_default();
                let first = images.into_iter().next().ok_or(RunpodError::EmptyResult)?;
                GeneratedImage::from_base64(&first)
            }
        }
    }

    /// Race an operation against the scope token. Cancellation drops the
    /// in-flight future, which aborts the underlying request; the token is
    /// re-checked after completion so a cancel that lands together with a
    /// response still wins.
    async fn guarded<T>(
        &self,
        token: &CancellationToken,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            _ = token.cancelled() => Err(RunpodError::Cancelled),
            result = fut => {
                if token.is_cancelled() {
                    Err(RunpodError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Job, JobUpdate};

    struct NeverApi;

    impl JobApi for NeverApi {
        async fn submit(&self, _prompt: &str, _params: &GenerationParams) -> Result<Job> {
            Err(RunpodError::Submission)
        }

        async fn status(&self, _job_id: &str) -> Result<JobUpdate> {
            Err(RunpodError::Polling("unused".into()))
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        let session = Generator::new(NeverApi, RunpodConfig::new("key", "endpoint"));
        let state = session.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.busy());
        assert!(state.prompt.is_empty());
        assert!(state.image.is_none());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let session = Generator::new(NeverApi, RunpodConfig::new("key", "endpoint"));
        session.cancel();
        assert!(session.state().message.is_none());
    }

    #[test]
    fn test_busy_phases() {
        let mut state = UiState::default();
        state.phase = Phase::Submitting;
        assert!(state.busy());
        state.phase = Phase::Polling;
        assert!(state.busy());
        state.phase = Phase::Idle;
        assert!(!state.busy());
    }
}
