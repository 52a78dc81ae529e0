use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MessageRole {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// One backend-side tool call reported with an edit response.
///
/// `arguments`, `result` and `error` are carried through untouched; the
/// client only checks whether they exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default)]
    pub success: bool,
}

impl ToolInvocation {
    pub fn status_mark(&self) -> &'static str {
        if self.success { "✅" } else { "❌" }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<ToolInvocation>>,
}

impl Message {
    pub fn new(id: u64, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tools_used: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolInvocation>) -> Self {
        self.tools_used = Some(tools);
        self
    }

    /// Tools to render under the message; empty when none were reported.
    pub fn tools(&self) -> &[ToolInvocation] {
        self.tools_used.as_deref().unwrap_or_default()
    }

    /// `HH:MM` in the viewer's local time zone.
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Request body for `POST /api/tasks/{id}/edit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEditRequest {
    pub message: String,
}

/// Response from the chat edit endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEditResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub tools_used: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

/// Request body for `POST /api/tasks/{id}/set-email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSubmitRequest {
    pub recipient_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSubmitResponse {
    pub message: String,
    pub task_id: String,
    pub email: String,
}
