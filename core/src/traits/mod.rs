pub mod media;
pub mod provider;
pub mod tool;

pub use media::{GeneratedImage, ImageGenerator, SpeechSynthesizer};
pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, Role, ToolCall, ToolChoice};
pub use tool::{ArgValue, Number, ParamKind, ParamSpec, Tool, ToolArgs, ToolSpec};
