//! # runpod-txt2img
//!
//! Async Rust client for a [RunPod](https://www.runpod.io) serverless
//! text-to-image endpoint.
//!
//! Wraps the submit/poll lifecycle of the asynchronous job API: submit a
//! prompt, poll the job status at a fixed interval with a bounded attempt
//! budget, and decode the resulting base64 image payload. A generation
//! session exposes UI-shaped state (busy phase, last image, last error
//! message) and supports cooperative cancellation of whatever request is
//! in flight.
//!
//! ## Quick Start
//!
//! ```no_run
//! use runpod_txt2img::{Generator, RunpodConfig};
//!
//! # async fn example() -> runpod_txt2img::Result<()> {
//! // Reads RUNPOD_API_KEY and RUNPOD_ENDPOINT_ID.
//! let config = RunpodConfig::from_env()?;
//! let session = Generator::runpod(config);
//!
//! if let Some(image) = session.generate("a lighthouse in a storm").await? {
//!     std::fs::write("lighthouse.png", image.bytes()).unwrap();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! [`Generator`] is cheaply cloneable and clones share state, so a UI task
//! can hold one clone for its cancel button while another awaits the
//! generation:
//!
//! ```no_run
//! # async fn example() -> runpod_txt2img::Result<()> {
//! # let config = runpod_txt2img::RunpodConfig::from_env()?;
//! let session = runpod_txt2img::Generator::runpod(config);
//! let cancel_handle = session.clone();
//!
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.unwrap();
//!     cancel_handle.cancel();
//! });
//!
//! match session.generate("a cat in space").await? {
//!     Some(image) => std::fs::write("cat.png", image.bytes()).unwrap(),
//!     None => println!("{}", session.state().message.unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A cancelled attempt resolves to `Ok(None)` and leaves a neutral notice
//! in the session state; it is never reported as an error.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use client::{JobApi, RunpodClient};
pub use config::RunpodConfig;
pub use error::{Result, RunpodError};
pub use session::{Generator, Phase, UiState};
pub use types::{GeneratedImage, GenerationParams, Job, JobOutput, JobStatus, JobUpdate};
