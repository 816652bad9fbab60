// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use keen_query::RequestArgs;
use reqwest::{Client, header::AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, info};
use url::Url;

use crate::types::{ClientConfig, ClientError, ClientResult, HttpSnafu, JsonSnafu};

/// Carries a rendered request to the service and brings back its JSON body.
///
/// Non-success statuses are returned as `ClientError::ServerError`; nothing
/// is retried.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: Url, body: &RequestArgs) -> ClientResult<Value>;
}

/// Error response structure from the server
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message:    String,
    #[serde(default)]
    error_code: Option<String>,
}

/// `Transport` over HTTP using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The HTTP client
    client:   Client,
    read_key: Option<String>,
}

impl HttpTransport {
    /// Creates a transport with the timeout and read key from `config`
    ///
    /// # Errors
    /// Returns a `ClientError::Http` if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        info!("Creating HTTP transport for {}", config.base_url);

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context(HttpSnafu)?;

        Ok(Self {
            client,
            read_key: config.read_key.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: Url, body: &RequestArgs) -> ClientResult<Value> {
        debug!("Sending POST request to: {}", url);

        let mut request = self.client.post(url).json(body);
        if let Some(read_key) = &self.read_key {
            request = request.header(AUTHORIZATION, read_key);
        }

        let response = request.send().await.context(HttpSnafu)?;
        let status = response.status();
        debug!("Response status: {}", status);

        let bytes = response.bytes().await.context(HttpSnafu)?;

        if status.is_success() {
            serde_json::from_slice(&bytes).context(JsonSnafu)
        } else {
            // Try to parse error response
            match serde_json::from_slice::<ErrorResponse>(&bytes) {
                Ok(error_resp) => Err(ClientError::ServerError {
                    status:     status.as_u16(),
                    error_code: error_resp.error_code,
                    message:    error_resp.message,
                }),
                Err(_) => Err(ClientError::ServerError {
                    status:     status.as_u16(),
                    error_code: None,
                    message:    format!("Server returned status: {status}"),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_code_is_optional() {
        let parsed: ErrorResponse =
            serde_json::from_str(r#"{"message": "Missing read key"}"#).unwrap();
        assert_eq!(parsed.message, "Missing read key");
        assert!(parsed.error_code.is_none());

        let parsed: ErrorResponse = serde_json::from_str(
            r#"{"message": "bad timeframe", "error_code": "TimeframeDefinitionError"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.error_code.as_deref(),
            Some("TimeframeDefinitionError")
        );
    }

    #[test]
    fn builds_from_default_config() {
        let transport = HttpTransport::new(&ClientConfig::new("p").with_read_key("key")).unwrap();
        assert_eq!(transport.read_key.as_deref(), Some("key"));
    }
}
