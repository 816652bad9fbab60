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

use snafu::Snafu;

/// Common result type for query construction and result access
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while building descriptors, forming URLs or reading results
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueryError {
    /// A descriptor is missing required fields or violates a constraint
    #[snafu(display("Invalid argument: {message}"))]
    InvalidArgument { message: String },

    /// A builder method was called in a way that would discard earlier input
    #[snafu(display("Invalid usage: {message}"))]
    InvalidUsage { message: String },

    /// A single-set field was set twice, or a result was read as the wrong
    /// variant
    #[snafu(display("Invalid state: {message}"))]
    InvalidState { message: String },

    /// The request URL could not be parsed or joined
    #[snafu(display("Failed to construct URL: {source}"))]
    UrlConstruction { source: url::ParseError },

    /// An identifier cannot be encoded into the URL
    #[snafu(display("Failed to construct URL: {message}"))]
    UrlComponent { message: String },

    /// The response document does not have the expected shape
    #[snafu(display("Malformed response: {message}"))]
    MalformedResponse { message: String },
}

impl QueryError {
    /// Returns true when the error is one of the URL construction failures.
    pub fn is_url_construction(&self) -> bool {
        matches!(
            self,
            QueryError::UrlConstruction { .. } | QueryError::UrlComponent { .. }
        )
    }
}
