//! Arithmetic tools for the math agent.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

fn operands(args: &Value) -> anyhow::Result<(i64, i64)> {
    let a = args["a"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("Missing integer 'a' argument"))?;
    let b = args["b"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("Missing integer 'b' argument"))?;
    Ok((a, b))
}

fn two_int_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "integer", "description": "First int" },
            "b": { "type": "integer", "description": "Second int" }
        },
        "required": ["a", "b"]
    })
}

pub struct Add;

#[async_trait]
impl Tool for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds `a` and `b`."
    }

    fn parameters_schema(&self) -> Value {
        two_int_schema()
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let (a, b) = operands(&args)?;
        a.checked_add(b)
            .map(|v| v.to_string())
            .ok_or_else(|| anyhow::anyhow!("integer overflow"))
    }
}

pub struct Multiply;

#[async_trait]
impl Tool for Multiply {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply `a` and `b`."
    }

    fn parameters_schema(&self) -> Value {
        two_int_schema()
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let (a, b) = operands(&args)?;
        a.checked_mul(b)
            .map(|v| v.to_string())
            .ok_or_else(|| anyhow::anyhow!("integer overflow"))
    }
}

pub struct Divide;

#[async_trait]
impl Tool for Divide {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide `a` by `b`. Returns a decimal number."
    }

    fn parameters_schema(&self) -> Value {
        two_int_schema()
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let (a, b) = operands(&args)?;
        if b == 0 {
            return Err(anyhow::anyhow!("division by zero"));
        }
        Ok((a as f64 / b as f64).to_string())
    }
}
