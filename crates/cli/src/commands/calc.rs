//! `atomchat calc`: run the calculator tool directly.

use std::process::ExitCode;

use atomchat_core::tool::Tool;
use atomchat_tools::CalculatorTool;

/// Output schema of the calculator tool.
fn output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "result": {
                "type": "string",
                "description": "Result of the calculation."
            }
        },
        "required": ["result"]
    })
}

pub async fn run(
    expression: Option<String>,
    schema: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let tool = CalculatorTool;

    if schema {
        let definition = serde_json::json!({
            "definition": tool.to_definition(),
            "output": output_schema(),
        });
        println!("{}", serde_json::to_string_pretty(&definition)?);
        return Ok(ExitCode::SUCCESS);
    }

    let expression = expression.ok_or("an expression is required, e.g. atomchat calc \"2 + 2\"")?;
    let result = tool
        .execute(serde_json::json!({ "expression": expression }))
        .await?;

    let data = result
        .data
        .unwrap_or_else(|| serde_json::json!({ "result": result.output }));
    println!("{data}");
    Ok(ExitCode::SUCCESS)
}
