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

//! Keen Query Client Library
//!
//! This library runs the analysis descriptors of `keen-query` against the
//! Keen analysis API over HTTP.
//!
//! # Features
//!
//! - **Typed descriptors**: funnels and single analyses validated before
//!   they are sent
//! - **Pluggable transport**: `HttpTransport` by default, any `Transport`
//!   implementation for tests or proxies
//! - **Comprehensive Error Handling**: Using snafu for structured error types
//! - **Async/Await Support**: Full tokio compatibility
//!
//! # Examples
//!
//! ```rust,no_run
//! use keen_client::{ClientConfig, QueryClient};
//! use keen_query::{Funnel, FunnelStep, Timeframe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QueryClient::new(ClientConfig::new("my-project"))?;
//!
//!     let funnel = Funnel::builder()
//!         .with_step(
//!             FunnelStep::builder()
//!                 .event_collection("signups")
//!                 .actor_property("user.id")
//!                 .build(),
//!         )
//!         .with_step(
//!             FunnelStep::builder()
//!                 .event_collection("purchases")
//!                 .actor_property("user.id")
//!                 .build(),
//!         )
//!         .with_timeframe(Timeframe::relative("this_30_days"))?
//!         .build()?;
//!
//!     for (step, count) in client.funnel(&funnel).await?.iter().enumerate() {
//!         println!("step {step}: {count}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod transport;
pub mod types;

// Re-export the main client types
pub use client::QueryClient;
pub use transport::{HttpTransport, Transport};
pub use types::{ClientConfig, ClientError, ClientResult};
