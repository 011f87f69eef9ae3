//! Traza de ejecución: tipos de evento y el log de una invocación.

mod log;
mod types;

pub use self::log::RunLog;
pub use types::{PipelineEvent, PipelineEventKind};
