use leptos::ev;
use leptos::html::Div;
use leptos::prelude::*;
use recollector_core::input::{EXAMPLE_PROMPTS, is_sendable, should_submit};
use recollector_core::Message;

use crate::state::ChatPanelState;

/// Chat panel for editing one task's model: transcript, input and
/// example instructions.
#[component]
pub fn EditChat(
    task_id: String,
    /// Called with the model URL whenever an edit produced a new model.
    #[prop(optional)]
    on_model_updated: Option<Callback<String>>,
) -> impl IntoView {
    let state = ChatPanelState::provide(task_id, on_model_updated);
    let end_ref = NodeRef::<Div>::new();

    // Keep the newest message in view
    Effect::new(move |_| {
        state.messages.track();
        state.is_busy.track();
        if let Some(end) = end_ref.get() {
            end.scroll_into_view();
        }
    });

    view! {
        <div class="blender-chat-container">
            <div class="chat-header">
                <h3>"🎨 Blender AI 편집"</h3>
                <div class="chat-actions">
                    <button
                        class="download-btn"
                        on:click=move |_| state.download()
                        disabled=move || state.is_busy.get()
                    >
                        "모델 다운로드"
                    </button>
                    <button
                        class="reset-btn"
                        on:click=move |_| state.reset()
                        disabled=move || state.is_busy.get()
                    >
                        "대화 초기화"
                    </button>
                </div>
            </div>

            {move || {
                state.notice.get().map(|notice| {
                    view! { <div class="error-banner">{notice}</div> }
                })
            }}

            <div class="chat-messages">
                <For
                    each=move || state.messages.get()
                    key=|m| m.id
                    let:msg
                >
                    <MessageBubble msg=msg />
                </For>
                <Show when=move || state.is_busy.get()>
                    <div class="message assistant">
                        <div class="message-content">
                            <div class="typing-indicator">
                                <span></span>
                                <span></span>
                                <span></span>
                            </div>
                        </div>
                    </div>
                </Show>
                <div node_ref=end_ref />
            </div>

            <ChatInput />
            <ExampleChips />
        </div>
    }
}

/// A single transcript entry with its tool summary and time.
#[component]
fn MessageBubble(msg: Message) -> impl IntoView {
    let css_class = format!("message {}", msg.role);
    let time = msg.time_label();
    let tools = msg.tools().to_vec();

    let tool_list = (!tools.is_empty()).then(|| {
        let summary = format!("사용된 도구 ({}개)", tools.len());
        let items = tools
            .into_iter()
            .map(|tool| {
                let mark = format!(" {}", tool.status_mark());
                view! { <li><strong>{tool.tool}</strong>{mark}</li> }
            })
            .collect_view();
        view! {
            <div class="tools-used">
                <details>
                    <summary>{summary}</summary>
                    <ul>{items}</ul>
                </details>
            </div>
        }
    });

    view! {
        <div class=css_class>
            <div class="message-content">
                <div class="message-text">{msg.content}</div>
                {tool_list}
            </div>
            <div class="message-time">{time}</div>
        </div>
    }
}

/// Message textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<ChatPanelState>();
    let is_busy = move || state.is_busy.get();

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if should_submit(&ev.key(), ev.shift_key()) {
            ev.prevent_default();
            state.send();
        }
    };

    view! {
        <div class="chat-input-container">
            <textarea
                rows="2"
                placeholder="편집 요청을 입력하세요... (예: 모델을 더 부드럽게 만들어줘)"
                prop:value=move || state.input.get()
                on:input=move |ev| state.set_input(event_target_value(&ev))
                on:keydown=on_keydown
                disabled=is_busy
            />
            <button
                class="send-btn"
                on:click=move |_| state.send()
                disabled=move || is_busy() || !is_sendable(&state.input.get())
            >
                {move || if is_busy() { "처리중..." } else { "전송" }}
            </button>
        </div>
    }
}

/// One-click example instructions that fill the input.
#[component]
fn ExampleChips() -> impl IntoView {
    let state = expect_context::<ChatPanelState>();

    let chips = EXAMPLE_PROMPTS
        .iter()
        .map(|&(label, prompt)| {
            view! {
                <button on:click=move |_| state.set_input(prompt.to_string())>{label}</button>
            }
        })
        .collect_view();

    view! {
        <div class="chat-examples">
            <p>"💡 편집 예시:"</p>
            <div class="example-chips">{chips}</div>
        </div>
    }
}
