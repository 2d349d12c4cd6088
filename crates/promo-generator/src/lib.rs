//! Promo video generation.
//!
//! Wires the fal backend and the media transform engine together:
//! - `classifier`: maps raw backend failures to retryable or fatal kinds
//! - `orchestrator`: upload once, retry content-policy refusals, post-process
//! - `backend`: the traits the orchestrator talks to

pub mod backend;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;

pub use backend::{GenerationBackend, VideoTransformer};
pub use classifier::{classify, ClassifiedError, ErrorKind};
pub use config::GeneratorConfig;
pub use error::{GenerationError, GenerationResult, DEFAULT_SUGGESTIONS};
pub use logging::JobLogger;
pub use orchestrator::{GenerationRequest, UploadedAsset, VideoGenerator, VideoResult};
