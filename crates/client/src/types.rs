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

use std::time::Duration;

use keen_query::{
    QueryError, RequestUrlBuilder,
    url_builder::{DEFAULT_API_VERSION, DEFAULT_BASE_URL},
};
use snafu::Snafu;

/// Common result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    /// Descriptor, URL or response decoding error
    #[snafu(transparent)]
    Query { source: QueryError },

    /// HTTP request error
    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// Server returned a non-success status
    #[snafu(display("Server error ({status}): {message}"))]
    ServerError {
        status:     u16,
        error_code: Option<String>,
        message:    String,
    },
}

/// Default timeout for a single analysis request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the query client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `https://api.keen.io`
    pub base_url:    String,
    pub api_version: String,
    pub project_id:  String,
    /// Sent as the `Authorization` header when present
    pub read_key:    Option<String>,
    pub timeout:     Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url:    DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            project_id:  String::new(),
            read_key:    None,
            timeout:     DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for a project with default service settings
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_read_key(mut self, read_key: impl Into<String>) -> Self {
        self.read_key = Some(read_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL builder for the configured service root and version
    pub fn url_builder(&self) -> RequestUrlBuilder {
        RequestUrlBuilder::new(&self.base_url, &self.api_version)
    }
}
