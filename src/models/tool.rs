// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name under which the fetch tool is registered
pub const FETCH_TOOL_NAME: &str = "fetch";

/// Descriptor of a tool exposed to the host tool-invocation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool parameters
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Descriptor for the `fetch` tool.
    pub fn fetch() -> Self {
        Self {
            name: FETCH_TOOL_NAME.to_string(),
            description:
                "Fetches a URL from the internet and optionally extracts its contents as markdown."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "format": "uri",
                        "description": "URL to fetch"
                    },
                    "max_length": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of characters to return"
                    },
                    "start_index": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Start index for truncated content"
                    },
                    "raw": {
                        "type": "boolean",
                        "default": false,
                        "description": "Get the actual HTML content without simplification"
                    }
                },
                "required": ["url"]
            }),
        }
    }
}
