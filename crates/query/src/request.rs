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

use serde_json::{Map, Value};
use url::Url;

use crate::{error::Result, url_builder::RequestUrlBuilder};

/// Ordered JSON object used as a request body.
pub type RequestArgs = Map<String, Value>;

/// A validated, immutable query descriptor that can be sent to the service.
pub trait QueryRequest {
    /// Tag selecting the service endpoint, e.g. `count` or `funnel`.
    fn analysis_type(&self) -> &str;

    /// Builds the JSON body for this request.
    fn request_args(&self) -> RequestArgs;

    fn request_url(&self, url_builder: &RequestUrlBuilder, project_id: &str) -> Result<Url> {
        url_builder.analysis_url(project_id, self.analysis_type())
    }

    fn expects_grouped_response(&self) -> bool;

    fn expects_interval_response(&self) -> bool;

    /// Describes how the `result` field of the response has to be decoded.
    fn response_shape(&self) -> ResponseShape {
        ResponseShape {
            interval: self.expects_interval_response(),
            group_by: Vec::new(),
        }
    }
}

/// Expected nesting of a response: optional interval buckets on the outside,
/// optional group-by objects inside them, scalars or lists at the leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseShape {
    pub interval: bool,
    /// Names of the group-by properties. Empty means not grouped.
    pub group_by: Vec<String>,
}

impl ResponseShape {
    pub fn scalar() -> Self { Self::default() }

    pub fn interval() -> Self {
        Self {
            interval: true,
            group_by: Vec::new(),
        }
    }

    pub fn grouped<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interval: false,
            group_by: properties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_interval(mut self) -> Self {
        self.interval = true;
        self
    }

    pub fn is_grouped(&self) -> bool { !self.group_by.is_empty() }

    /// The shape of each interval bucket's value.
    pub(crate) fn without_interval(&self) -> ResponseShape {
        ResponseShape {
            interval: false,
            group_by: self.group_by.clone(),
        }
    }
}
