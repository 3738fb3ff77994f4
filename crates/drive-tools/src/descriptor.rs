//! MCP-shaped tool surface for `list_drive_files`.

use crate::context::StateLookup;
use crate::runtime::DriveFileLister;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde_json::{Value, json};
use std::sync::Arc;

pub const TOOL_NAME: &str = "list_drive_files";

const TOOL_DESCRIPTION: &str = "Lists files and folders from the user's Google Drive. \
The query is ignored, and items from the root directory are returned.";

/// Tool definition advertised to the agent runtime.
#[must_use]
pub fn list_drive_files_tool() -> Tool {
    let schema = json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Free-form request text (currently unused)."
            }
        },
        "required": ["query"]
    });
    let schema_obj = schema.as_object().cloned().unwrap_or_else(JsonObject::new);

    let mut tool = Tool::new(TOOL_NAME, TOOL_DESCRIPTION, Arc::new(schema_obj));
    // Single GET against an external API.
    tool.annotations = Some(ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    });
    tool
}

/// Execute a `tools/call` for [`TOOL_NAME`].
///
/// A missing or non-string `query` argument is treated as an empty query. Failures are still
/// returned as text, flagged with `is_error`.
pub async fn call_tool(
    lister: &DriveFileLister,
    ctx: &dyn StateLookup,
    arguments: &Value,
) -> CallToolResult {
    let query = arguments
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let outcome = lister.list(query, ctx).await;

    CallToolResult {
        content: vec![Content::text(outcome.render())],
        structured_content: None,
        is_error: Some(outcome.is_error()),
        meta: None,
    }
}
