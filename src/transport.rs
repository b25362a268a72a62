use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part as FormPart};
use reqwest::Client;

use crate::config::Config;
use crate::core::error::TransportError;
use crate::core::payload::{MultipartPayload, PartBody};

/// HTTP status returned by the intake endpoint. The body is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

/// Sends a payload somewhere and reports either a status or a transport
/// failure. Retries, timeouts and TLS are the implementation's business.
pub trait Transport {
    fn send(
        &self,
        payload: &MultipartPayload,
    ) -> impl Future<Output = std::result::Result<HttpStatus, TransportError>> + Send;
}

/// POSTs the payload as `multipart/form-data` to a fixed endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(payload: &MultipartPayload) -> std::result::Result<Form, TransportError> {
        let mut form = Form::new();
        for part in payload.parts() {
            form = match &part.body {
                PartBody::Text(value) => form.text(part.name, value.clone()),
                PartBody::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let file = FormPart::bytes(bytes.to_vec())
                        .file_name(file_name.clone())
                        .mime_str(content_type)
                        .map_err(|e| TransportError::Request(e.to_string()))?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::Request(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}

impl Transport for HttpTransport {
    async fn send(&self, payload: &MultipartPayload) -> std::result::Result<HttpStatus, TransportError> {
        let form = Self::form(payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(classify)?;

        Ok(HttpStatus(response.status().as_u16()))
    }
}
