//! Client for the fal.ai generation backend.
//!
//! Covers the two calls the generator needs: uploading the source image to
//! fal storage, and running an image-to-video request through the queue
//! (submit, poll status, fetch result).

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::FalClient;
pub use config::FalConfig;
pub use error::{reduce_error_body, FalError, FalResult};
pub use types::{GenerationInput, GenerationOutput, QueueState, QueueStatus, QueuedRequest, VideoFile};
