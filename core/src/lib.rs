pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod studio;
pub mod tools;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{
    AgentLoop, Conversation, DispatchState, ToolExecutor, ToolOutcome, ToolRegistry, TurnReport,
};
pub use config::*;
pub use error::*;
pub use providers::*;
pub use studio::*;
pub use tools::*;
pub use traits::*;
