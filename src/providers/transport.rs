//! HTTP executor abstraction used by provider clients.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Request, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Response body that has not been read yet.
///
/// Dropping the body releases the underlying connection whether or not it was read.
#[async_trait]
pub trait ResponseBody: Send {
    async fn read_to_end(&mut self) -> Result<Vec<u8>, TransportError>;
}

pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn ResponseBody>,
}

/// Anything that can execute a single request.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: Request) -> Result<TransportResponse, TransportError>;
}

/// Default executor backed by a shared `reqwest::Client`
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("coinconv/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ReqwestExecutor {
            client: builder.build()?,
        })
    }
}

impl Default for ReqwestExecutor {
    fn default() -> Self {
        ReqwestExecutor {
            client: reqwest::Client::new(),
        }
    }
}

struct ReqwestBody(Option<reqwest::Response>);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read_to_end(&mut self) -> Result<Vec<u8>, TransportError> {
        match self.0.take() {
            Some(response) => Ok(response.bytes().await?.to_vec()),
            None => Err(TransportError::Other("body already consumed".to_string())),
        }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: Request) -> Result<TransportResponse, TransportError> {
        let response = self.client.execute(request).await?;
        debug!(status = %response.status(), "Received response");

        Ok(TransportResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Box::new(ReqwestBody(Some(response))),
        })
    }
}
