use recollector_core::Message;

/// Formats one transcript entry for the terminal:
///
/// ```text
/// [14:03] assistant: 완료했습니다
///     사용된 도구 (1개)
///     - smooth ✅
/// ```
pub fn format_message(msg: &Message) -> String {
    let mut out = format!("[{}] {}: {}", msg.time_label(), msg.role, msg.content);
    let tools = msg.tools();
    if !tools.is_empty() {
        out.push_str(&format!("\n    사용된 도구 ({}개)", tools.len()));
        for tool in tools {
            out.push_str(&format!("\n    - {} {}", tool.tool, tool.status_mark()));
        }
    }
    out
}

/// Messages newer than `last_shown`, in transcript order.
pub fn unseen(messages: &[Message], last_shown: Option<u64>) -> impl Iterator<Item = &Message> {
    messages
        .iter()
        .filter(move |m| last_shown.is_none_or(|id| m.id > id))
}
