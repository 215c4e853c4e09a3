pub mod conversation;
pub mod executor;
pub mod loop_;
pub mod registry;

pub use conversation::Conversation;
pub use executor::{ToolExecutor, ToolOutcome};
pub use loop_::{AgentLoop, DispatchState, TurnReport};
pub use registry::ToolRegistry;
