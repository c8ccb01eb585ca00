//! HTTP client for the catalog service.

use std::future::Future;

use bookstore_model::{Book, BookList, Deleted, ErrorEnvelope, NewBook};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The view was torn down before the response arrived.
    #[error("request cancelled")]
    Cancelled,
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("invalid api url '{0}'")]
    InvalidUrl(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// The server's own message when there is one, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Typed access to `/books`. Every call races the given cancellation token.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("bookstore-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn list(&self, cancel: &CancellationToken) -> Result<BookList, ClientError> {
        self.send(self.request(Method::GET, &["books"]), cancel).await
    }

    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Book, ClientError> {
        self.send(self.request(Method::GET, &["books", id]), cancel)
            .await
    }

    pub async fn create(
        &self,
        book: &NewBook,
        cancel: &CancellationToken,
    ) -> Result<Book, ClientError> {
        self.send(self.request(Method::POST, &["books"]).json(book), cancel)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        book: &NewBook,
        cancel: &CancellationToken,
    ) -> Result<Book, ClientError> {
        self.send(self.request(Method::PUT, &["books", id]).json(book), cancel)
            .await
    }

    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<Deleted, ClientError> {
        self.send(self.request(Method::DELETE, &["books", id]), cancel)
            .await
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut url = self.base.clone();
        // Checked in `new`: the base can take path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        tracing::debug!(%method, %url, "sending request");
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        cancellable(cancel, async move {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            let message = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        })
        .await
    }
}

/// Run `work` unless `cancel` fires first. A token that is already
/// cancelled wins without polling `work`.
pub async fn cancellable<T, F>(cancel: &CancellationToken, work: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = work => result,
    }
}
