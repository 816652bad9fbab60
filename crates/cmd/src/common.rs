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

use clap::Args;
use keen_client::{ClientConfig, QueryClient};
use keen_query::{
    Filter, FilterOperator, QueryRequest, RelativeTimeframe, Timeframe,
    url_builder::DEFAULT_BASE_URL,
};
use serde_json::Value;
use snafu::{ResultExt, Whatever};
use tracing::info;

/// Where and how to send a request
#[derive(Debug, Clone, Args)]
pub(crate) struct ServiceArgs {
    /// Project to run the analysis in
    #[arg(long)]
    project_id: String,

    /// Service root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Read key, sent as the Authorization header
    #[arg(long)]
    read_key: Option<String>,

    /// Send the request instead of printing it
    #[arg(long)]
    execute: bool,
}

impl ServiceArgs {
    fn config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.project_id).with_base_url(&self.base_url);
        match &self.read_key {
            Some(read_key) => config.with_read_key(read_key),
            None => config,
        }
    }
}

/// Timeframe flags: either a relative window or an absolute start and end
#[derive(Debug, Clone, Args)]
pub(crate) struct TimeframeArgs {
    /// Relative timeframe, e.g. this_7_days
    #[arg(long, conflicts_with_all = ["start", "end"])]
    timeframe: Option<String>,

    /// Timezone for a relative timeframe, e.g. US/Pacific
    #[arg(long, requires = "timeframe")]
    timezone: Option<String>,

    /// Start of an absolute timeframe (ISO-8601)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// End of an absolute timeframe (ISO-8601)
    #[arg(long, requires = "start")]
    end: Option<String>,
}

impl TimeframeArgs {
    pub(crate) fn timeframe(&self) -> Option<Timeframe> {
        if let Some(relative) = &self.timeframe {
            let mut relative = RelativeTimeframe::new(relative);
            if let Some(timezone) = &self.timezone {
                relative = relative.with_timezone(timezone);
            }
            return Some(relative.into());
        }
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(Timeframe::absolute(start, end)),
            _ => None,
        }
    }
}

/// Parses `property:operator:value`. The value is read as JSON when it
/// parses, as a plain string otherwise.
pub(crate) fn parse_filter(s: &str) -> Result<Filter, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(property), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected property:operator:value, got '{s}'"));
    };
    if property.is_empty() {
        return Err(format!("filter '{s}' has an empty property name"));
    }
    let operator: FilterOperator = operator
        .parse()
        .map_err(|_| format!("unknown filter operator '{operator}'"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(Filter::new(property, operator, value))
}

/// Prints the request, or sends it and prints the result.
pub(crate) async fn run_request<Q>(service: &ServiceArgs, request: &Q) -> Result<(), Whatever>
where
    Q: QueryRequest + Sync,
{
    let config = service.config();

    if !service.execute {
        let url = request
            .request_url(&config.url_builder(), &config.project_id)
            .whatever_context("Failed to build request URL")?;
        let body = serde_json::to_string_pretty(&request.request_args())
            .whatever_context("Failed to render request body")?;
        println!("POST {url}");
        println!("{body}");
        return Ok(());
    }

    let client = QueryClient::new(config).whatever_context("Failed to create client")?;
    info!("Running {} query", request.analysis_type());
    let result = client
        .execute(request)
        .await
        .whatever_context("Query failed")?;

    println!("{result}");
    Ok(())
}
