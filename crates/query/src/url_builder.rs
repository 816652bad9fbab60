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

use snafu::{ResultExt, ensure};
use url::Url;

use crate::error::{Result, UrlComponentSnafu, UrlConstructionSnafu};

pub const DEFAULT_BASE_URL: &str = "https://api.keen.io";
pub const DEFAULT_API_VERSION: &str = "3.0";

/// Builds analysis URLs of the form
/// `{base}/{version}/projects/{project_id}/queries/{analysis_type}`.
///
/// Holds only its configuration; every call is a pure function of it and the
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrlBuilder {
    base_url:    String,
    api_version: String,
}

impl Default for RequestUrlBuilder {
    fn default() -> Self { Self::new(DEFAULT_BASE_URL, DEFAULT_API_VERSION) }
}

impl RequestUrlBuilder {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url:    base_url.into(),
            api_version: api_version.into(),
        }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn api_version(&self) -> &str { &self.api_version }

    /// Returns the URL of the analysis endpoint for a project.
    ///
    /// # Errors
    /// Returns `UrlConstruction` if the base URL does not parse or cannot
    /// carry a path, and `UrlComponent` if an identifier is empty or is a
    /// dot segment.
    pub fn analysis_url(&self, project_id: &str, analysis_type: &str) -> Result<Url> {
        let project = encode_segment("project id", project_id)?;
        let analysis = encode_segment("analysis type", analysis_type)?;
        let version = encode_segment("api version", &self.api_version)?;

        // A trailing slash keeps any path prefix of the base when joining.
        let base = Url::parse(&format!("{}/", self.base_url.trim_end_matches('/')))
            .context(UrlConstructionSnafu)?;

        base.join(&format!("{version}/projects/{project}/queries/{analysis}"))
            .context(UrlConstructionSnafu)
    }
}

fn encode_segment(what: &str, segment: &str) -> Result<String> {
    ensure!(
        !segment.is_empty(),
        UrlComponentSnafu {
            message: format!("{what} must not be empty"),
        }
    );
    ensure!(
        segment != "." && segment != "..",
        UrlComponentSnafu {
            message: format!("{what} '{segment}' is not a valid path segment"),
        }
    );
    Ok(urlencoding::encode(segment).into_owned())
}
