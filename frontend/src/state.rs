use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use recollector_core::api::edited_file_name;
use recollector_core::input::is_sendable;
use recollector_core::{ChatSession, Message, SessionEvent};

use crate::api::ApiGateway;
use crate::browser;

const GLB_MIME: &str = "model/gltf-binary";

/// Chat panel state, provided via Leptos context.
///
/// The [`ChatSession`] owns the real state; the signals mirror it through a
/// session observer so components can subscribe.
#[derive(Clone, Copy)]
pub struct ChatPanelState {
    // --- Read signals (for components to subscribe to) ---
    pub messages: ReadSignal<Vec<Message>>,
    pub input: ReadSignal<String>,
    pub is_busy: ReadSignal<bool>,
    pub notice: ReadSignal<Option<String>>,

    // --- Write signals ---
    pub set_notice: WriteSignal<Option<String>>,

    session: StoredValue<Rc<ChatSession<ApiGateway>>, LocalStorage>,
}

impl ChatPanelState {
    /// Create the session for `task_id` and provide its state in the current
    /// Leptos context.
    pub fn provide(task_id: String, on_model_updated: Option<Callback<String>>) -> Self {
        let session = ChatSession::new(task_id, ApiGateway);

        let (messages, set_messages) = signal(session.messages());
        let (input, set_input) = signal(String::new());
        let (is_busy, set_is_busy) = signal(false);
        let (notice, set_notice) = signal(None::<String>);

        session.subscribe(move |event| match event {
            SessionEvent::TranscriptChanged(msgs) => set_messages.set(msgs.clone()),
            SessionEvent::BusyChanged(busy) => set_is_busy.set(*busy),
            SessionEvent::InputChanged(text) => set_input.set(text.clone()),
            SessionEvent::ModelUpdated(url) => {
                log::info!("Model updated: {url}");
                if let Some(callback) = on_model_updated {
                    callback.run(url.clone());
                }
            }
        });

        let state = Self {
            messages,
            input,
            is_busy,
            notice,
            set_notice,
            session: StoredValue::new_local(Rc::new(session)),
        };

        provide_context(state);
        state
    }

    fn session(&self) -> Rc<ChatSession<ApiGateway>> {
        self.session.get_value()
    }

    pub fn set_input(&self, text: String) {
        self.session().set_pending_input(text);
    }

    /// Send the current input, unless it is blank or a request is in flight.
    pub fn send(&self) {
        let session = self.session();
        if session.is_busy() || !is_sendable(&session.pending_input()) {
            return;
        }
        self.set_notice.set(None);
        spawn_local(async move {
            session.submit_pending_input().await;
        });
    }

    pub fn reset(&self) {
        let session = self.session();
        spawn_local(async move {
            // Failures are logged by the session and leave the transcript alone
            session.reset_session().await;
        });
    }

    /// Download the edited model and hand it to the browser as a file.
    pub fn download(&self) {
        let session = self.session();
        let set_notice = self.set_notice;
        spawn_local(async move {
            match session.download_edited_model().await {
                Ok(bytes) => {
                    let file_name = edited_file_name(session.task_id());
                    if let Err(e) = browser::save_bytes(&file_name, GLB_MIME, &bytes) {
                        log::error!("Failed to save {file_name}: {e:?}");
                        set_notice.set(Some("파일 저장에 실패했습니다.".to_string()));
                    }
                }
                Err(e) => {
                    log::error!("Failed to download edited model: {e}");
                    set_notice.set(Some(format!("다운로드 실패: {e}")));
                }
            }
        });
    }
}
