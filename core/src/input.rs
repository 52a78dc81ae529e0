/// Canned instructions offered as one-click chips: (label, prompt).
pub const EXAMPLE_PROMPTS: [(&str, &str); 4] = [
    ("부드럽게", "모델을 더 부드럽게 만들어줘"),
    ("색상 변경", "색상을 파란색으로 바꿔줘"),
    ("크기 조정", "모델 크기를 2배로 키워줘"),
    ("재질 변경", "금속 재질로 바꿔줘"),
];

/// Whether a key press in the message box should send.
///
/// Plain Enter sends; Shift+Enter is left alone so a line break is inserted.
pub fn should_submit(key: &str, shift_held: bool) -> bool {
    key == "Enter" && !shift_held
}

/// Input that would be accepted by a send.
pub fn is_sendable(text: &str) -> bool {
    !text.trim().is_empty()
}
