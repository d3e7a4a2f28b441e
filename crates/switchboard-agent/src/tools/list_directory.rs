// ABOUTME: The list_directory tool: returns the entry names of a local directory.
// ABOUTME: Filesystem errors (not found, permission denied, ...) propagate untranslated.

use std::path::Path;

use serde_json::{Value, json};

use super::{ToolError, ToolOutput, string_arg};

/// Lists the contents of a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDirectoryTool;

impl ListDirectoryTool {
    pub const NAME: &'static str = "list_directory";
    pub const DESCRIPTION: &'static str = "List the contents of a directory.";

    pub fn parameters() -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the directory to list."
                }
            },
            "required": ["path"]
        })
    }

    pub(crate) async fn invoke(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let path = string_arg(arguments, &["path", "query"])?;
        let names = list_directory(Path::new(&path)).await?;
        tracing::debug!(path = %path, entries = names.len(), "listed directory");
        let text = serde_json::to_string(&names)
            .map_err(|e| ToolError::InvalidInput(format!("unencodable entry names: {}", e)))?;
        Ok(ToolOutput::Text(text))
    }
}

/// Entry names at `path`, in the order the filesystem yields them.
pub async fn list_directory(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
