use std::cell::RefCell;

use log::{debug, error};

use crate::api::EditGateway;
use crate::errors::RequestError;
use crate::input::is_sendable;
use crate::models::{ChatEditResponse, Message, MessageRole};

pub const INITIAL_GREETING: &str = "안녕하세요! 3D 모델을 어떻게 편집해드릴까요? \
                                    예: \"모델을 더 부드럽게 만들어줘\", \"색상을 파란색으로 바꿔줘\"";
pub const RESET_GREETING: &str = "대화가 초기화되었습니다. 새로운 편집을 시작해주세요!";
pub const ERROR_PREFIX: &str = "오류가 발생했습니다: ";
pub const FALLBACK_ERROR: &str = "요청을 처리하지 못했습니다.";

/// Notification pushed to every subscriber after a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The transcript changed; carries the full new transcript.
    TranscriptChanged(Vec<Message>),
    BusyChanged(bool),
    InputChanged(String),
    /// An edit produced a new model, URL exactly as the server sent it.
    ModelUpdated(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or a request already in flight; nothing changed.
    Ignored,
    Answered,
    /// The failure was written to the transcript as an assistant turn.
    Failed,
}

#[derive(Debug)]
pub enum ResetOutcome {
    /// A request is in flight; the transcript was left alone.
    Ignored,
    Reset,
    Failed(RequestError),
}

/// Transcript, unsent input and the in-flight flag for one chat panel.
#[derive(Debug, Clone)]
pub struct ChatSessionState {
    messages: Vec<Message>,
    pending_input: String,
    is_busy: bool,
    next_id: u64,
}

impl Default for ChatSessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSessionState {
    pub fn new() -> Self {
        let mut state = Self {
            messages: Vec::new(),
            pending_input: String::new(),
            is_busy: false,
            next_id: 0,
        };
        state.push(MessageRole::Assistant, INITIAL_GREETING);
        state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Records the user turn and marks the session busy. Returns `false`
    /// without touching anything if the send must be ignored.
    pub fn begin_send(&mut self, text: &str) -> bool {
        if self.is_busy || !is_sendable(text) {
            return false;
        }
        self.push(MessageRole::User, text);
        self.pending_input.clear();
        self.is_busy = true;
        true
    }

    /// Appends exactly one assistant turn for the settled request and clears
    /// the busy flag. Returns the model URL to announce, if any.
    pub fn settle(
        &mut self,
        result: Result<ChatEditResponse, RequestError>,
    ) -> (SendOutcome, Option<String>) {
        self.is_busy = false;
        match result {
            Ok(response) => {
                let id = self.take_id();
                let reply = Message::new(id, MessageRole::Assistant, response.message)
                    .with_tools(response.tools_used);
                self.messages.push(reply);
                (SendOutcome::Answered, response.model_url)
            }
            Err(err) => {
                self.push(MessageRole::Assistant, failure_text(&err));
                (SendOutcome::Failed, None)
            }
        }
    }

    /// Replaces the whole transcript with the reset greeting.
    pub fn reset_transcript(&mut self) {
        self.messages.clear();
        self.push(MessageRole::Assistant, RESET_GREETING);
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        let id = self.take_id();
        self.messages.push(Message::new(id, role, content));
    }
}

/// Assistant-turn text for a failed edit. Never empty.
pub fn failure_text(err: &RequestError) -> String {
    let reason = err.to_string();
    let reason = reason.trim();
    if reason.is_empty() {
        format!("{ERROR_PREFIX}{FALLBACK_ERROR}")
    } else {
        format!("{ERROR_PREFIX}{reason}")
    }
}

pub type Observer = Box<dyn Fn(&SessionEvent)>;

/// Clears the busy flag, and tells observers, if a send future is dropped
/// before it settles.
struct InFlight<'a, G: EditGateway> {
    session: &'a ChatSession<G>,
    settled: bool,
}

impl<G: EditGateway> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let cleared = match self.session.state.try_borrow_mut() {
            Ok(mut state) => {
                state.is_busy = false;
                true
            }
            Err(_) => false,
        };
        if cleared {
            self.session.emit(SessionEvent::BusyChanged(false));
        }
    }
}

/// Chat panel logic for one task: owns the transcript and forwards
/// instructions to the backend one at a time.
///
/// Observers must not call [`ChatSession::subscribe`] from inside a
/// notification.
pub struct ChatSession<G> {
    task_id: String,
    gateway: G,
    state: RefCell<ChatSessionState>,
    observers: RefCell<Vec<Observer>>,
}

impl<G: EditGateway> ChatSession<G> {
    pub fn new(task_id: impl Into<String>, gateway: G) -> Self {
        Self {
            task_id: task_id.into(),
            gateway,
            state: RefCell::new(ChatSessionState::new()),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn subscribe(&self, observer: impl Fn(&SessionEvent) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().messages.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy
    }

    pub fn pending_input(&self) -> String {
        self.state.borrow().pending_input.clone()
    }

    pub fn set_pending_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.borrow_mut().set_pending_input(text.clone());
        self.emit(SessionEvent::InputChanged(text));
    }

    /// Sends whatever is currently in the input box.
    pub async fn submit_pending_input(&self) -> SendOutcome {
        let text = self.pending_input();
        self.send_user_message(&text).await
    }

    /// Appends `text` as a user turn, asks the backend to apply it and
    /// appends the single assistant turn that answers it.
    pub async fn send_user_message(&self, text: &str) -> SendOutcome {
        if !self.state.borrow_mut().begin_send(text) {
            debug!("Ignoring send for task {}: blank input or request in flight", self.task_id);
            return SendOutcome::Ignored;
        }
        let mut in_flight = InFlight { session: self, settled: false };

        self.emit_transcript();
        self.emit(SessionEvent::InputChanged(String::new()));
        self.emit(SessionEvent::BusyChanged(true));

        let result = self.gateway.edit_with_chat(&self.task_id, text).await;
        if let Err(e) = &result {
            error!("Edit request failed for task {}: {e}", self.task_id);
        }

        let (outcome, model_url) = self.state.borrow_mut().settle(result);
        in_flight.settled = true;

        self.emit_transcript();
        if let Some(url) = model_url {
            self.emit(SessionEvent::ModelUpdated(url));
        }
        self.emit(SessionEvent::BusyChanged(false));
        outcome
    }

    /// Clears the server-side conversation and restarts the transcript.
    /// A failure is logged and leaves the transcript as it was.
    pub async fn reset_session(&self) -> ResetOutcome {
        if self.is_busy() {
            debug!("Ignoring reset for task {}: request in flight", self.task_id);
            return ResetOutcome::Ignored;
        }
        match self.gateway.reset_conversation(&self.task_id).await {
            Ok(()) => {
                self.state.borrow_mut().reset_transcript();
                self.emit_transcript();
                ResetOutcome::Reset
            }
            Err(e) => {
                error!("Failed to reset conversation for task {}: {e}", self.task_id);
                ResetOutcome::Failed(e)
            }
        }
    }

    pub async fn download_edited_model(&self) -> Result<Vec<u8>, RequestError> {
        self.gateway.download_edited_model(&self.task_id).await
    }

    fn emit_transcript(&self) {
        let messages = self.messages();
        self.emit(SessionEvent::TranscriptChanged(messages));
    }

    fn emit(&self, event: SessionEvent) {
        for observer in self.observers.borrow().iter() {
            observer(&event);
        }
    }
}
