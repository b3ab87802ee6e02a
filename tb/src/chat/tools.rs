//! The `get_tasks` tool: declaration and resolution against a task snapshot

use taskstore::{Task, TaskSnapshot};
use tracing::debug;

use crate::llm::{ToolCall, ToolDefinition};

/// Name the model uses to request the task list
pub const GET_TASKS: &str = "get_tasks";

/// Sentence sent when the task list is empty
pub const NO_TASKS: &str = "The user has no tasks currently.";

/// Tool declaration offered on every request
pub fn get_tasks_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_TASKS,
        "Retrieve the list of tasks for the user",
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    )
}

/// Render tasks as the flat bulleted list the model reads
pub fn format_tasks(tasks: &[Task]) -> String {
    debug!(count = tasks.len(), "format_tasks: called");
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let lines: Vec<String> = tasks
        .iter()
        .map(|task| format!("- {}: {} ({})", task.title, task.description, task.status))
        .collect();
    format!("The user has the following tasks:\n{}", lines.join("\n"))
}

/// Answer a tool call, or `None` if the tool is unknown
pub fn resolve(call: &ToolCall, snapshot: &TaskSnapshot) -> Option<String> {
    debug!(name = %call.name, id = %call.id, "resolve: called");
    match call.name.as_str() {
        GET_TASKS => Some(format_tasks(snapshot)),
        _ => None,
    }
}
