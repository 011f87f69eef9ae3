//! caption-core: pipeline de dos etapas (caption -> aumento con tendencias)
pub mod capability;
pub mod constants;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod pipeline;
pub mod stage;

pub use capability::{AugmentationRequest, CaptionEngine, CaptionRequest, TrendingTopicsSource};
pub use errors::{EngineError, ErrorKind, PipelineError, ToolError};
pub use event::{PipelineEvent, PipelineEventKind, RunLog};
pub use pipeline::{GeneratedPost, Pipeline, PipelineResult, PipelineRun, RawImage};
pub use stage::{AugmentationOutcome, StageId, ToolActivity};
