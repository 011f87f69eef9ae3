//! caption-adapters: implementaciones concretas de las capacidades del core
//!
//! - `ToolLoopEngine`: `CaptionEngine` sobre cualquier `ModelClient`, con el
//!   bucle de tool calls para el aumento de hashtags.
//! - `OfflineModelClient` / `ScriptedModelClient`: clientes deterministas.
//! - `StaticTrendingTopics`: fuente de tendencias con tabla fija.

pub mod model;
pub mod offline;
pub mod prompts;
pub mod scripted;
pub mod tool_loop;
pub mod trending;

pub use model::{Message, ModelClient, ModelError, ModelRequest, ModelTurn, ToolCall, ToolSpec};
pub use offline::OfflineModelClient;
pub use scripted::ScriptedModelClient;
pub use tool_loop::{ToolLoopConfig, ToolLoopEngine};
pub use trending::StaticTrendingTopics;
