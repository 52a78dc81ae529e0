use recollector_core::api::{self, EditGateway, EmailGateway};
use recollector_core::models::{
    ChatEditRequest, ChatEditResponse, EmailSubmitRequest, EmailSubmitResponse,
};
use recollector_core::RequestError;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::AppError;

/// Backend gateway over `reqwest`. Cheap to clone; every call is a single
/// request with no retry.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: ClientConfig,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AppError::HttpClient)?;
        Ok(Self { client, config: config.clone() })
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, RequestError> {
        debug!("Calling backend: {path}");
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RequestError::from_status(status.as_u16(), &body);
        warn!("Backend rejected {path}: {err}");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, RequestError> {
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| RequestError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.config.timeout)
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

impl EditGateway for HttpGateway {
    async fn edit_with_chat(
        &self,
        task_id: &str,
        message: &str,
    ) -> Result<ChatEditResponse, RequestError> {
        let path = api::edit_path(task_id);
        let body = ChatEditRequest { message: message.to_string() };
        let request = self.client.post(self.config.url(&path)).json(&body);
        let response = self.send(request, &path).await?;
        self.decode(response).await
    }

    async fn reset_conversation(&self, task_id: &str) -> Result<(), RequestError> {
        let path = api::reset_path(task_id);
        let request = self.client.post(self.config.url(&path));
        self.send(request, &path).await?;
        Ok(())
    }

    async fn download_edited_model(&self, task_id: &str) -> Result<Vec<u8>, RequestError> {
        let path = api::download_path(task_id);
        let request = self.client.get(self.config.url(&path));
        let response = self.send(request, &path).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(bytes.to_vec())
    }
}

impl EmailGateway for HttpGateway {
    async fn submit_email(
        &self,
        task_id: &str,
        email: &str,
    ) -> Result<EmailSubmitResponse, RequestError> {
        let path = api::email_path(task_id);
        let body = EmailSubmitRequest { recipient_email: email.to_string() };
        let request = self.client.post(self.config.url(&path)).json(&body);
        let response = self.send(request, &path).await?;
        self.decode(response).await
    }
}
