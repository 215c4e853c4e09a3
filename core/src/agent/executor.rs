use crate::agent::ToolRegistry;
use crate::error::ToolError;
use crate::traits::{ArgValue, Number, ParamKind, ToolArgs, ToolCall, ToolSpec};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of running one [`ToolCall`]. `output` is the text that goes back
/// to the model, whether the call succeeded or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub call: ToolCall,
    pub output: String,
    pub error: Option<ToolError>,
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    strict_arguments: bool,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            strict_arguments: true,
        }
    }

    /// When disabled, argument keys the schema does not declare are ignored
    /// instead of rejected.
    pub fn with_strict_arguments(mut self, strict: bool) -> Self {
        self.strict_arguments = strict;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn execute(
        &self,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let tool = self
            .registry
            .lookup(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let args = self.validate(&tool.spec(), arguments)?;
        tool.execute(&args).await
    }

    /// Decodes, executes and renders a model tool call. Never fails: every
    /// error becomes the outcome text.
    pub async fn run(&self, call: &ToolCall) -> ToolOutcome {
        let result = match decode_arguments(call) {
            Ok(arguments) => self.execute(&call.name, &arguments).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(output) => {
                debug!(tool = %call.name, id = %call.id, %output, "Tool succeeded");
                ToolOutcome {
                    call: call.clone(),
                    output,
                    error: None,
                }
            }
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, "Tool failed: {}", e);
                ToolOutcome {
                    call: call.clone(),
                    output: e.to_string(),
                    error: Some(e),
                }
            }
        }
    }

    fn validate(
        &self,
        spec: &ToolSpec,
        arguments: &Map<String, Value>,
    ) -> Result<ToolArgs, ToolError> {
        if self.strict_arguments
            && !spec.additional_properties
            && let Some(unknown) = arguments.keys().find(|k| spec.param(k).is_none())
        {
            return Err(ToolError::invalid(
                &spec.name,
                format!("unexpected parameter '{}'", unknown),
            ));
        }

        let mut args = ToolArgs::default();
        for param in &spec.parameters {
            let value = match arguments.get(&param.name) {
                Some(Value::Null) | None if param.required => {
                    return Err(ToolError::invalid(
                        &spec.name,
                        format!("missing required parameter '{}'", param.name),
                    ));
                }
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };

            let coerced = match param.kind {
                ParamKind::Number => Number::from_json(value).map(ArgValue::Number),
                ParamKind::String => value.as_str().map(|s| ArgValue::Text(s.to_string())),
            };

            match coerced {
                Some(v) => args.insert(param.name.clone(), v),
                None => {
                    return Err(ToolError::invalid(
                        &spec.name,
                        format!(
                            "parameter '{}' must be a {}, got {}",
                            param.name,
                            param.kind.json_type(),
                            value
                        ),
                    ));
                }
            }
        }

        Ok(args)
    }
}

fn decode_arguments(call: &ToolCall) -> Result<Map<String, Value>, ToolError> {
    if call.arguments.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::malformed(
            &call.name,
            format!("expected a JSON object, got {}", other),
        )),
        Err(e) => Err(ToolError::malformed(&call.name, e.to_string())),
    }
}
