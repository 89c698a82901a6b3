use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::session::SessionStore;

/// Failure taxonomy shared by every API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused) or a response whose
    /// body is not JSON.
    #[error("Error de conexión con el servidor")]
    Connection,
    /// Non-2xx response carrying a server-supplied message.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// Client-side field check that never reached the network.
    #[error("{0}")]
    Validation(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Build an application error from a non-2xx JSON body: the server puts its
/// message in `error` or `message`, with a generic fallback otherwise.
pub fn api_error(status: StatusCode, body: &Value) -> ApiError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .unwrap_or("Error en la petición")
        .to_string();
    ApiError::Api { status, message }
}

/// Thin client over the inventory REST API. Attaches the bearer token from
/// the session store when one is present and normalizes every outcome into
/// the `ApiError` taxonomy.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn builder(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let req = self.http.request(method, url);
        match self.session.token() {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    /// Send a request and decode a JSON response. A body whose content type
    /// is not JSON is classified as a connection error, matching transport
    /// failures, so callers only ever distinguish "server said no" from
    /// "could not talk to the server".
    async fn dispatch<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let response = req.send().await.map_err(|err| {
            debug!(error = %err, "request failed to send");
            ApiError::Connection
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            debug!(%status, "response is not JSON");
            return Err(ApiError::Connection);
        }

        let body: Value = response.json().await.map_err(|err| {
            debug!(error = %err, "response body is not valid JSON");
            ApiError::Connection
        })?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_value(body).map_err(|err| {
            debug!(error = %err, "response did not match the expected shape");
            ApiError::Connection
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.dispatch(self.builder(Method::GET, endpoint)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        self.dispatch(self.builder(Method::GET, endpoint).query(params))
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.dispatch(self.builder(Method::POST, endpoint).json(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.dispatch(self.builder(Method::PUT, endpoint).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.dispatch(self.builder(Method::DELETE, endpoint)).await
    }

    /// Multipart POST. No JSON content type is set; the transport supplies
    /// the multipart boundary itself.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        self.dispatch(self.builder(Method::POST, endpoint).multipart(form))
            .await
    }

    /// Authenticated GET for binary payloads (spreadsheet templates). A
    /// non-2xx response is surfaced with its JSON message when there is one.
    pub async fn get_bytes(&self, endpoint: &str) -> ApiResult<Bytes> {
        let response = self
            .builder(Method::GET, endpoint)
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "request failed to send");
                ApiError::Connection
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(api_error(status, &body));
        }

        response.bytes().await.map_err(|err| {
            debug!(error = %err, "failed to read binary body");
            ApiError::Connection
        })
    }
}
