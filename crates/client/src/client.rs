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

use keen_query::{Funnel, Query, QueryRequest, QueryResult, QueryType, RequestUrlBuilder, Timeframe};
use tracing::{debug, info};

use crate::{
    transport::{HttpTransport, Transport},
    types::{ClientConfig, ClientResult},
};

/// Runs analysis descriptors against the service
///
/// The client renders a descriptor into its URL and JSON body, hands both to
/// the transport, and decodes the response with the shape the descriptor
/// expects.
///
/// # Examples
///
/// ```rust,no_run
/// use keen_client::{ClientConfig, QueryClient};
/// use keen_query::Timeframe;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::new("my-project").with_read_key("read-key");
///     let client = QueryClient::new(config)?;
///
///     let pageviews = client
///         .count("pageviews", Timeframe::relative("this_7_days"))
///         .await?;
///     println!("Pageviews this week: {pageviews}");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QueryClient<T = HttpTransport> {
    transport:   T,
    url_builder: RequestUrlBuilder,
    project_id:  String,
}

impl QueryClient<HttpTransport> {
    /// Creates a client that talks HTTP to the configured service
    ///
    /// # Errors
    /// Returns a `ClientError::Http` if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> QueryClient<T> {
    /// Creates a client on top of an existing transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        info!("Creating query client for project {}", config.project_id);
        Self {
            transport,
            url_builder: config.url_builder(),
            project_id: config.project_id,
        }
    }

    pub fn project_id(&self) -> &str { &self.project_id }

    pub fn transport(&self) -> &T { &self.transport }

    /// Runs any descriptor and returns its decoded result
    ///
    /// # Errors
    /// Returns `ClientError::Query` if the URL cannot be formed or the
    /// response does not have the expected shape, and the transport's error
    /// otherwise
    pub async fn execute<Q>(&self, request: &Q) -> ClientResult<QueryResult>
    where
        Q: QueryRequest + Sync,
    {
        let url = request.request_url(&self.url_builder, &self.project_id)?;
        let args = request.request_args();
        debug!(
            "Executing {} query, request body: {:?}",
            request.analysis_type(),
            args
        );

        let body = self.transport.post(url, &args).await?;
        let result = QueryResult::from_response(&body, &request.response_shape())?;

        debug!("Received {} result", result.kind());
        Ok(result)
    }

    /// Number of events in a collection over a timeframe
    pub async fn count(
        &self,
        event_collection: &str,
        timeframe: impl Into<Timeframe>,
    ) -> ClientResult<i64> {
        let query = Query::builder()
            .query_type(QueryType::Count)
            .event_collection(event_collection)
            .timeframe(timeframe)
            .build()?;
        Ok(self.execute(&query).await?.long_value()?)
    }

    /// Number of distinct values of a property over a timeframe
    pub async fn count_unique(
        &self,
        event_collection: &str,
        target_property: &str,
        timeframe: impl Into<Timeframe>,
    ) -> ClientResult<i64> {
        let query = Query::builder()
            .query_type(QueryType::CountUnique)
            .event_collection(event_collection)
            .target_property(target_property)
            .timeframe(timeframe)
            .build()?;
        Ok(self.execute(&query).await?.long_value()?)
    }

    /// Sum of a numeric property over a timeframe
    ///
    /// The service answers with an integer when every summed value is one,
    /// so both numeric results are accepted here.
    pub async fn sum(
        &self,
        event_collection: &str,
        target_property: &str,
        timeframe: impl Into<Timeframe>,
    ) -> ClientResult<f64> {
        let query = Query::builder()
            .query_type(QueryType::Sum)
            .event_collection(event_collection)
            .target_property(target_property)
            .timeframe(timeframe)
            .build()?;
        match self.execute(&query).await? {
            QueryResult::Long(sum) => Ok(sum as f64),
            other => Ok(other.double_value()?),
        }
    }

    /// Actor counts reaching each step of a funnel, in step order
    pub async fn funnel(&self, funnel: &Funnel) -> ClientResult<Vec<i64>> {
        let result = self.execute(funnel).await?;
        let counts = result
            .list_results()?
            .iter()
            .map(QueryResult::long_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
