//! Tool trait: narrowly scoped callables an agent may use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,

    /// Structured output, shaped by the tool's output schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Squares a number and reports it as structured output.
    struct SquareTool;

    #[async_trait]
    impl Tool for SquareTool {
        fn name(&self) -> &str {
            "square"
        }

        fn description(&self) -> &str {
            "Multiplies a number by itself"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "value": { "type": "number" } },
                "required": ["value"]
            })
        }

        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError> {
            let value = arguments["value"]
                .as_f64()
                .ok_or_else(|| ToolError::InvalidArguments("value must be a number".into()))?;
            let squared = (value * value).to_string();
            Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: squared.clone(),
                data: Some(serde_json::json!({ "result": squared })),
            })
        }
    }

    #[test]
    fn definition_carries_schema() {
        let def = SquareTool.to_definition();
        assert_eq!(def.name, "square");
        assert_eq!(def.description, "Multiplies a number by itself");
        assert_eq!(def.parameters["required"][0], "value");
    }

    #[tokio::test]
    async fn execute_through_trait_object() {
        let tool: Box<dyn Tool> = Box::new(SquareTool);
        let result = tool.execute(serde_json::json!({"value": 3})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "9");
        assert_eq!(result.data.unwrap()["result"], "9");
    }

    #[tokio::test]
    async fn bad_arguments_rejected() {
        let err = SquareTool
            .execute(serde_json::json!({"value": "three"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
