use crate::agent::ToolRegistry;
use crate::error::{RegistryError, ToolError};
use crate::traits::{Number, ToolArgs};
use std::sync::Arc;

pub mod arithmetic;

pub use arithmetic::{AddTool, DivideTool, MultiplyTool, SubtractTool};

pub fn number_arg(tool: &str, args: &ToolArgs, key: &str) -> Result<Number, ToolError> {
    args.number(key)
        .ok_or_else(|| ToolError::invalid(tool, format!("missing numeric '{}' parameter", key)))
}

/// Registry with the four arithmetic functions, in advertising order.
pub fn arithmetic_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(AddTool))?;
    registry.register(Arc::new(SubtractTool))?;
    registry.register(Arc::new(MultiplyTool))?;
    registry.register(Arc::new(DivideTool))?;
    Ok(registry)
}
