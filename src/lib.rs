pub mod auth;
pub mod capabilities;
pub mod config;
pub mod errors;
pub mod modes;
pub mod orchestrator;
pub mod providers;
pub mod store;
pub mod util;

pub use errors::{ErrorKind, Result, SlopError};
pub use modes::{GenerationMode, IntensityLevel};
pub use orchestrator::{PipelineRequest, PipelineResult, ProgressUpdate, SlopPipeline};
