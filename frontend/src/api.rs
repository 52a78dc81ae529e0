use std::time::Duration;

use futures_util::future::{Either, select};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use recollector_core::api::{self, DEFAULT_TIMEOUT_SECS, EditGateway, EmailGateway};
use recollector_core::models::{
    ChatEditRequest, ChatEditResponse, EmailSubmitRequest, EmailSubmitResponse,
};
use recollector_core::RequestError;
use serde::de::DeserializeOwned;

/// Base URL of the backend API server.
pub const API_BASE: &str = match option_env!("RECOLLECTOR_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};

const TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

fn url(path: &str) -> String {
    format!("{API_BASE}{path}")
}

/// Backend gateway over the browser's `fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApiGateway;

/// Sends `request`, giving up after [`TIMEOUT`]. The fetch itself is not
/// aborted; its late result is dropped.
async fn send(request: Result<Request, gloo_net::Error>) -> Result<Response, RequestError> {
    let request = request.map_err(|e| RequestError::Transport(format!("Invalid request: {e}")))?;

    let pending = Box::pin(request.send());
    let timer = Box::pin(TimeoutFuture::new(TIMEOUT.as_millis() as u32));
    let resp = match select(pending, timer).await {
        Either::Left((result, _)) => result.map_err(|e| RequestError::Transport(e.to_string()))?,
        Either::Right(_) => return Err(RequestError::Timeout(TIMEOUT)),
    };

    if !resp.ok() {
        let status = resp.status();
        log::warn!("Backend answered {status} for {}", resp.url());
        let body = resp.text().await.unwrap_or_default();
        return Err(RequestError::from_status(status, &body));
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RequestError> {
    resp.json::<T>()
        .await
        .map_err(|e| RequestError::Decode(e.to_string()))
}

impl EditGateway for ApiGateway {
    async fn edit_with_chat(
        &self,
        task_id: &str,
        message: &str,
    ) -> Result<ChatEditResponse, RequestError> {
        let body = ChatEditRequest { message: message.to_string() };
        let resp = send(Request::post(&url(&api::edit_path(task_id))).json(&body)).await?;
        decode(resp).await
    }

    async fn reset_conversation(&self, task_id: &str) -> Result<(), RequestError> {
        send(Request::post(&url(&api::reset_path(task_id))).build()).await?;
        Ok(())
    }

    async fn download_edited_model(&self, task_id: &str) -> Result<Vec<u8>, RequestError> {
        let resp = send(Request::get(&url(&api::download_path(task_id))).build()).await?;
        resp.binary()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))
    }
}

impl EmailGateway for ApiGateway {
    async fn submit_email(
        &self,
        task_id: &str,
        email: &str,
    ) -> Result<EmailSubmitResponse, RequestError> {
        let body = EmailSubmitRequest { recipient_email: email.to_string() };
        let resp = send(Request::post(&url(&api::email_path(task_id))).json(&body)).await?;
        decode(resp).await
    }
}
