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
use keen_query::{Filter, Funnel, FunnelStep};
use snafu::{ResultExt, Whatever};

use crate::common::{ServiceArgs, TimeframeArgs, parse_filter, run_request};

#[derive(Debug, Clone, Args)]
#[command(
    name = "funnel",
    about = "Build or run a funnel analysis",
    long_about = "Build a funnel from an ordered list of steps and print the request, or run it with \
                  --execute.

Each step is collection:actor_property, optionally followed by :inverted or :optional.

Examples:
  keen funnel --project-id p --timeframe this_7_days --step signups:user.id --step purchases:user.id
  keen funnel --project-id p --start 2024-01-01 --end 2024-02-01 \\
      --step visits:visitor.id --step signups:visitor.id:optional --step purchases:visitor.id"
)]
pub(crate) struct FunnelArgs {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(flatten)]
    timeframe: TimeframeArgs,

    /// Funnel step, in order: collection:actor_property[:inverted|:optional]
    #[arg(long = "step", required = true, value_parser = parse_step)]
    steps: Vec<FunnelStep>,

    /// Filter applied to every step: property:operator:value
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<Filter>,
}

fn parse_step(s: &str) -> Result<FunnelStep, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (collection, actor_property, flag) = match parts.as_slice() {
        [collection, actor_property] => (*collection, *actor_property, None),
        [collection, actor_property, flag] => (*collection, *actor_property, Some(*flag)),
        _ => {
            return Err(format!(
                "expected collection:actor_property[:inverted|:optional], got '{s}'"
            ));
        }
    };
    if collection.is_empty() || actor_property.is_empty() {
        return Err(format!("step '{s}' has an empty collection or actor property"));
    }

    let (inverted, optional) = match flag {
        None => (None, None),
        Some("inverted") => (Some(true), None),
        Some("optional") => (None, Some(true)),
        Some(other) => return Err(format!("unknown step flag '{other}'")),
    };

    Ok(FunnelStep::builder()
        .event_collection(collection)
        .actor_property(actor_property)
        .maybe_inverted(inverted)
        .maybe_optional(optional)
        .build())
}

impl FunnelArgs {
    fn funnel(&self) -> Result<Funnel, Whatever> {
        let steps = self.steps.iter().map(|step| {
            if self.filters.is_empty() {
                return step.clone();
            }
            FunnelStep::builder()
                .event_collection(step.event_collection())
                .actor_property(step.actor_property())
                .filters(self.filters.clone())
                .maybe_inverted(step.inverted())
                .maybe_optional(step.optional())
                .build()
        });

        let mut builder = Funnel::builder()
            .with_steps(steps)
            .whatever_context("Invalid funnel steps")?;
        if let Some(timeframe) = self.timeframe.timeframe() {
            builder = builder
                .with_timeframe(timeframe)
                .whatever_context("Invalid funnel timeframe")?;
        }
        builder.build().whatever_context("Invalid funnel")
    }
}

pub(crate) async fn run(args: FunnelArgs) -> Result<(), Whatever> {
    let funnel = args.funnel()?;
    run_request(&args.service, &funnel).await
}
