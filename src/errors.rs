use std::path::PathBuf;

use thiserror::Error;

/// Terminal client error. Backend call failures are not here: they arrive
/// as [`recollector_core::RequestError`] and are rendered by the session.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Setup ────────────────────────────────────────────────────────────────
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    // ── Commands ─────────────────────────────────────────────────────────────
    #[error("Usage: {usage}")]
    Usage { usage: &'static str },

    #[error("Unknown command '{name}' (try /help)")]
    UnknownCommand { name: String },

    // ── Files ────────────────────────────────────────────────────────────────
    #[error("Failed to write {}: {source}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
