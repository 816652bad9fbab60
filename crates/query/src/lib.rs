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

//! Query construction and result model for the Keen analysis API
//!
//! This library describes analyses as validated, immutable descriptors that
//! render themselves into a JSON request body and an endpoint URL, and
//! decodes the service's responses into a typed result tree. It does no I/O;
//! see `keen-client` for a transport.
//!
//! # Examples
//!
//! ```rust
//! use keen_query::{Funnel, FunnelStep, QueryRequest, RequestUrlBuilder, Timeframe};
//!
//! # fn main() -> Result<(), keen_query::QueryError> {
//! let funnel = Funnel::builder()
//!     .with_step(
//!         FunnelStep::builder()
//!             .event_collection("signups")
//!             .actor_property("user.id")
//!             .build(),
//!     )
//!     .with_step(
//!         FunnelStep::builder()
//!             .event_collection("purchases")
//!             .actor_property("user.id")
//!             .build(),
//!     )
//!     .with_timeframe(Timeframe::relative("last_7_days"))?
//!     .build()?;
//!
//! let url = funnel.request_url(&RequestUrlBuilder::default(), "my-project")?;
//! assert_eq!(
//!     url.as_str(),
//!     "https://api.keen.io/3.0/projects/my-project/queries/funnel"
//! );
//! assert_eq!(funnel.request_args()["timeframe"], "last_7_days");
//! # Ok(())
//! # }
//! ```
//!
//! Decoding a grouped response:
//!
//! ```rust
//! use keen_query::{Group, QueryResult, ResponseShape};
//! use serde_json::json;
//!
//! let body = json!({ "result": [{ "country": "US", "result": 12 }] });
//! let result = QueryResult::from_response(&body, &ResponseShape::grouped(["country"])).unwrap();
//!
//! assert!(result.is_group_result());
//! let groups = result.group_results().unwrap();
//! assert_eq!(groups[&Group::new().with("country", "US")].long_value().unwrap(), 12);
//! ```

pub mod constants;
pub mod error;
pub mod filter;
pub mod funnel;
pub mod parameter;
pub mod query;
pub mod request;
pub mod result;
pub mod timeframe;
pub mod url_builder;

pub use error::{QueryError, Result};
pub use filter::{Filter, FilterOperator};
pub use funnel::{Funnel, FunnelBuilder, FunnelStep};
pub use parameter::{RequestParameter, RequestParameterCollection};
pub use query::{Query, QueryType};
pub use request::{QueryRequest, RequestArgs, ResponseShape};
pub use result::{Group, GroupResults, GroupValue, IntervalResultValue, QueryResult, ResultKind};
pub use timeframe::{AbsoluteTimeframe, RelativeTimeframe, Timeframe};
pub use url_builder::RequestUrlBuilder;
