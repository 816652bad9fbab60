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
use keen_query::{Filter, Query, QueryType};
use snafu::{OptionExt, ResultExt, Whatever};

use crate::common::{ServiceArgs, TimeframeArgs, parse_filter, run_request};

#[derive(Debug, Clone, Args)]
#[command(
    name = "query",
    about = "Build or run a single analysis",
    long_about = "Build a single analysis over one event collection and print the request, or run \
                  it with --execute.

Examples:
  keen query --project-id p --type count --collection pageviews --timeframe this_7_days
  keen query --project-id p --type sum --collection purchases --target-property price \\
      --timeframe this_30_days --interval daily --group-by country"
)]
pub(crate) struct QueryArgs {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(flatten)]
    timeframe: TimeframeArgs,

    /// Analysis type, e.g. count, count_unique, sum, percentile
    #[arg(long = "type")]
    query_type: QueryType,

    /// Event collection to analyze
    #[arg(long)]
    collection: String,

    /// Property to analyze; required for everything but count
    #[arg(long)]
    target_property: Option<String>,

    /// Percentile to compute, for the percentile analysis
    #[arg(long)]
    percentile: Option<f64>,

    /// Bucket the result by interval, e.g. daily or hourly
    #[arg(long)]
    interval: Option<String>,

    /// Group the result by a property; repeat for several
    #[arg(long)]
    group_by: Vec<String>,

    /// Filter: property:operator:value
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<Filter>,
}

impl QueryArgs {
    fn query(&self) -> Result<Query, Whatever> {
        let timeframe = self
            .timeframe
            .timeframe()
            .whatever_context("A timeframe is required: pass --timeframe or --start and --end")?;

        Query::builder()
            .query_type(self.query_type)
            .event_collection(&self.collection)
            .maybe_target_property(self.target_property.as_deref())
            .maybe_percentile(self.percentile)
            .filters(self.filters.clone())
            .timeframe(timeframe)
            .maybe_interval(self.interval.as_deref())
            .group_by(self.group_by.clone())
            .build()
            .whatever_context("Invalid query")
    }
}

pub(crate) async fn run(args: QueryArgs) -> Result<(), Whatever> {
    let query = args.query()?;
    run_request(&args.service, &query).await
}
