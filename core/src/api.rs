//! Backend contract shared by every transport.
//!
//! The traits use plain `async fn` with no `Send` bound so the same session
//! runs on a browser's single-threaded executor and on a native runtime.

use crate::errors::RequestError;
use crate::models::{ChatEditResponse, EmailSubmitResponse};

/// Default request timeout; Blender edits can take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat-driven model editing for a task.
#[allow(async_fn_in_trait)]
pub trait EditGateway {
    /// Sends one natural-language instruction for the task's model.
    async fn edit_with_chat(
        &self,
        task_id: &str,
        message: &str,
    ) -> Result<ChatEditResponse, RequestError>;

    /// Drops the server-side edit conversation for the task.
    async fn reset_conversation(&self, task_id: &str) -> Result<(), RequestError>;

    /// Fetches the edited GLB bytes.
    async fn download_edited_model(&self, task_id: &str) -> Result<Vec<u8>, RequestError>;
}

/// Result-notification email registration.
#[allow(async_fn_in_trait)]
pub trait EmailGateway {
    async fn submit_email(
        &self,
        task_id: &str,
        email: &str,
    ) -> Result<EmailSubmitResponse, RequestError>;
}

/// Route for one task; the id is percent-encoded so it stays a single
/// path segment.
fn task_route(task_id: &str, action: &str) -> String {
    format!("/api/tasks/{}/{action}", urlencoding::encode(task_id))
}

pub fn edit_path(task_id: &str) -> String {
    task_route(task_id, "edit")
}

pub fn reset_path(task_id: &str) -> String {
    task_route(task_id, "reset-edit")
}

pub fn download_path(task_id: &str) -> String {
    task_route(task_id, "download-edited")
}

pub fn email_path(task_id: &str) -> String {
    task_route(task_id, "set-email")
}

/// Default file name for a downloaded edited model.
pub fn edited_file_name(task_id: &str) -> String {
    format!("{task_id}_edited.glb")
}

/// Turns a server-relative asset path (e.g. `/static/models/x.glb`) into an
/// absolute URL. Absolute URLs pass through unchanged.
pub fn resolve_asset_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = url.trim_start_matches('/');
    format!("{base}/{path}")
}
