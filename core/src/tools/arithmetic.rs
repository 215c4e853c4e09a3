use crate::error::ToolError;
use crate::tools::number_arg;
use crate::traits::{Number, ParamSpec, Tool, ToolArgs};
use async_trait::async_trait;

fn checked(
    a: Number,
    b: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => match int_op(x, y) {
            Some(v) => Number::Int(v),
            None => Number::Float(float_op(x as f64, y as f64)),
        },
        _ => Number::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

pub fn add(a: Number, b: Number) -> Number {
    checked(a, b, i64::checked_add, |x, y| x + y)
}

pub fn subtract(a: Number, b: Number) -> Number {
    checked(a, b, i64::checked_sub, |x, y| x - y)
}

pub fn multiply(a: Number, b: Number) -> Number {
    checked(a, b, i64::checked_mul, |x, y| x * y)
}

/// True division; a zero divisor is a defined error result.
pub fn divide(a: Number, b: Number) -> Result<Number, ToolError> {
    if b.is_zero() {
        return Err(ToolError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

fn operands(tool: &str, args: &ToolArgs) -> Result<(Number, Number), ToolError> {
    Ok((number_arg(tool, args, "a")?, number_arg(tool, args, "b")?))
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers together"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("a", "First number"),
            ParamSpec::number("b", "Second number"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let (a, b) = operands(self.name(), args)?;
        Ok(add(a, b).to_string())
    }
}

pub struct SubtractTool;

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtract the second number from the first number"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("a", "Number to subtract from"),
            ParamSpec::number("b", "Number to subtract"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let (a, b) = operands(self.name(), args)?;
        Ok(subtract(a, b).to_string())
    }
}

pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two numbers together"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("a", "First number"),
            ParamSpec::number("b", "Second number"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let (a, b) = operands(self.name(), args)?;
        Ok(multiply(a, b).to_string())
    }
}

pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide the first number by the second number"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("a", "Number to be divided (dividend)"),
            ParamSpec::number("b", "Number to divide by (divisor)"),
        ]
    }

    async fn execute(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let (a, b) = operands(self.name(), args)?;
        divide(a, b).map(|n| n.to_string())
    }
}
