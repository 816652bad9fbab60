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

use bon::Builder;
use serde_json::Value;
use snafu::ensure;
use tracing::debug;

use crate::{
    constants::{
        ACTOR_PROPERTY, EVENT_COLLECTION, FILTERS, FUNNEL, INVERTED, OPTIONAL, STEPS, WITH_ACTORS,
    },
    error::{InvalidArgumentSnafu, InvalidStateSnafu, InvalidUsageSnafu, Result},
    filter::Filter,
    parameter::{RequestParameter, RequestParameterCollection},
    request::{QueryRequest, RequestArgs},
    timeframe::Timeframe,
};

/// One stage of a funnel.
///
/// A step's own timeframe overrides the funnel's. `inverted` and `optional`
/// are only meaningful after the first step.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct FunnelStep {
    #[builder(into)]
    event_collection: String,
    #[builder(into)]
    actor_property:   String,
    #[builder(into)]
    timeframe:        Option<Timeframe>,
    #[builder(default, into)]
    filters:          RequestParameterCollection<Filter>,
    inverted:         Option<bool>,
    optional:         Option<bool>,
    with_actors:      Option<bool>,
}

impl FunnelStep {
    pub fn event_collection(&self) -> &str { &self.event_collection }

    pub fn actor_property(&self) -> &str { &self.actor_property }

    pub fn timeframe(&self) -> Option<&Timeframe> { self.timeframe.as_ref() }

    pub fn filters(&self) -> &RequestParameterCollection<Filter> { &self.filters }

    pub fn inverted(&self) -> Option<bool> { self.inverted }

    pub fn optional(&self) -> Option<bool> { self.optional }

    pub fn with_actors(&self) -> Option<bool> { self.with_actors }
}

impl RequestParameter for FunnelStep {
    fn request_args(&self) -> RequestArgs {
        let mut args = RequestArgs::new();
        args.insert(
            EVENT_COLLECTION.to_string(),
            Value::String(self.event_collection.clone()),
        );
        args.insert(
            ACTOR_PROPERTY.to_string(),
            Value::String(self.actor_property.clone()),
        );

        if let Some(timeframe) = &self.timeframe {
            args.extend(timeframe.timeframe_args());
        }

        if !self.filters.is_empty() {
            args.insert(
                FILTERS.to_string(),
                Value::Array(self.filters.request_args()),
            );
        }

        for (key, flag) in [
            (INVERTED, self.inverted),
            (OPTIONAL, self.optional),
            (WITH_ACTORS, self.with_actors),
        ] {
            if let Some(flag) = flag {
                args.insert(key.to_string(), Value::Bool(flag));
            }
        }

        args
    }
}

/// A funnel analysis: the number of actors that made it through each of an
/// ordered list of steps.
///
/// Created through [`Funnel::builder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Funnel {
    steps:     RequestParameterCollection<FunnelStep>,
    timeframe: Option<Timeframe>,
}

impl Funnel {
    pub fn builder() -> FunnelBuilder { FunnelBuilder::default() }

    pub fn steps(&self) -> &RequestParameterCollection<FunnelStep> { &self.steps }

    pub fn timeframe(&self) -> Option<&Timeframe> { self.timeframe.as_ref() }
}

impl QueryRequest for Funnel {
    fn analysis_type(&self) -> &str { FUNNEL }

    fn request_args(&self) -> RequestArgs {
        let mut args = RequestArgs::new();
        args.insert(STEPS.to_string(), Value::Array(self.steps.request_args()));

        if let Some(timeframe) = &self.timeframe {
            // Timeframe keys are `timeframe` and `timezone` only, so this never
            // overwrites `steps`.
            args.extend(timeframe.timeframe_args());
        }

        args
    }

    fn expects_grouped_response(&self) -> bool { false }

    fn expects_interval_response(&self) -> bool { false }
}

/// Accumulates steps and an optional timeframe for a [`Funnel`].
///
/// Steps are appended one at a time with [`with_step`](Self::with_step) or
/// supplied all at once with [`with_steps`](Self::with_steps), not both.
#[derive(Debug, Clone, Default)]
pub struct FunnelBuilder {
    steps:     Vec<FunnelStep>,
    timeframe: Option<Timeframe>,
}

impl FunnelBuilder {
    /// Appends a step after the ones already added.
    pub fn with_step(mut self, step: FunnelStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Supplies the complete list of steps.
    ///
    /// # Errors
    /// Returns `InvalidUsage` if steps were already added, since they would be
    /// silently replaced.
    pub fn with_steps<I>(mut self, steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = FunnelStep>,
    {
        ensure!(
            self.steps.is_empty(),
            InvalidUsageSnafu {
                message: "with_steps() would replace steps that were already added; add steps \
                          one at a time with with_step() or pass them all to with_steps()",
            }
        );
        self.steps = steps.into_iter().collect();
        Ok(self)
    }

    /// Sets the timeframe shared by every step without its own.
    ///
    /// # Errors
    /// Returns `InvalidState` if a timeframe was already set.
    pub fn with_timeframe(mut self, timeframe: impl Into<Timeframe>) -> Result<Self> {
        ensure!(
            self.timeframe.is_none(),
            InvalidStateSnafu {
                message: "with_timeframe() called, but a timeframe has already been set",
            }
        );
        self.timeframe = Some(timeframe.into());
        Ok(self)
    }

    pub fn steps(&self) -> &[FunnelStep] { &self.steps }

    pub fn timeframe(&self) -> Option<&Timeframe> { self.timeframe.as_ref() }

    /// Validates the accumulated input and creates the funnel.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if there are no steps, if a step has no
    /// timeframe while the funnel has none either, or if the first step is
    /// inverted or optional.
    pub fn build(self) -> Result<Funnel> {
        let Some(first) = self.steps.first() else {
            return InvalidArgumentSnafu {
                message: "funnel steps must be provided",
            }
            .fail();
        };

        if self.timeframe.is_none() {
            if let Some(index) = self.steps.iter().position(|s| s.timeframe.is_none()) {
                return InvalidArgumentSnafu {
                    message: format!(
                        "funnel step {index} is missing a timeframe but no funnel timeframe was \
                         provided"
                    ),
                }
                .fail();
            }
        }

        ensure!(
            first.inverted != Some(true),
            InvalidArgumentSnafu {
                message: "first funnel step cannot have 'inverted' set to true",
            }
        );
        ensure!(
            first.optional != Some(true),
            InvalidArgumentSnafu {
                message: "first funnel step cannot have 'optional' set to true",
            }
        );

        debug!(
            "Built funnel with {} steps, funnel timeframe: {}",
            self.steps.len(),
            self.timeframe.is_some()
        );

        Ok(Funnel {
            steps:     self.steps.into(),
            timeframe: self.timeframe,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::{error::QueryError, filter::FilterOperator};

    fn step(collection: &str) -> FunnelStep {
        FunnelStep::builder()
            .event_collection(collection)
            .actor_property("user.id")
            .build()
    }

    fn step_with_timeframe(collection: &str) -> FunnelStep {
        FunnelStep::builder()
            .event_collection(collection)
            .actor_property("user.id")
            .timeframe(Timeframe::relative("this_14_days"))
            .build()
    }

    #[test]
    fn missing_timeframes_fail_until_funnel_timeframe_is_set() {
        let builder = Funnel::builder().with_step(step("A")).with_step(step("B"));

        let err = builder.clone().build().unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");

        let funnel = builder
            .with_timeframe(Timeframe::relative("last_7_days"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            Value::Object(funnel.request_args()),
            json!({
                "steps": [
                    { "event_collection": "A", "actor_property": "user.id" },
                    { "event_collection": "B", "actor_property": "user.id" }
                ],
                "timeframe": "last_7_days"
            })
        );
    }

    #[test]
    fn per_step_timeframes_are_enough() {
        let funnel = Funnel::builder()
            .with_steps(vec![step_with_timeframe("A"), step_with_timeframe("B")])
            .unwrap()
            .build()
            .unwrap();

        assert!(funnel.timeframe().is_none());
        let args = funnel.request_args();
        assert!(!args.contains_key("timeframe"));
        assert_eq!(args["steps"][1]["timeframe"], json!("this_14_days"));
    }

    #[test]
    fn one_step_without_timeframe_fails() {
        let err = Funnel::builder()
            .with_step(step_with_timeframe("A"))
            .with_step(step("B"))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");
        assert!(err.to_string().contains("step 1"), "{err}");
    }

    #[test]
    fn empty_steps_fail() {
        let err = Funnel::builder()
            .with_timeframe(Timeframe::relative("today"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");

        let err = Funnel::builder()
            .with_steps(Vec::new())
            .unwrap()
            .with_timeframe(Timeframe::relative("today"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");
    }

    #[test_case(Some(true), None, false; "inverted first step")]
    #[test_case(None, Some(true), false; "optional first step")]
    #[test_case(Some(false), Some(false), true; "explicitly false flags")]
    #[test_case(None, None, true; "no flags")]
    fn first_step_flags(inverted: Option<bool>, optional: Option<bool>, ok: bool) {
        let first = FunnelStep::builder()
            .event_collection("signups")
            .actor_property("user.id")
            .maybe_inverted(inverted)
            .maybe_optional(optional)
            .build();

        let result = Funnel::builder()
            .with_step(first)
            .with_step(step("purchases"))
            .with_timeframe(Timeframe::relative("this_7_days"))
            .unwrap()
            .build();

        match result {
            Ok(_) => assert!(ok),
            Err(err) => {
                assert!(!ok, "unexpected failure: {err}");
                assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");
            }
        }
    }

    #[test]
    fn later_steps_may_be_inverted_or_optional() {
        let inverted = FunnelStep::builder()
            .event_collection("cancellations")
            .actor_property("user.id")
            .inverted(true)
            .build();
        let optional = FunnelStep::builder()
            .event_collection("shares")
            .actor_property("user.id")
            .optional(true)
            .build();

        let funnel = Funnel::builder()
            .with_step(step("signups"))
            .with_step(inverted)
            .with_step(optional)
            .with_timeframe(Timeframe::relative("this_7_days"))
            .unwrap()
            .build()
            .unwrap();

        let args = funnel.request_args();
        assert_eq!(args["steps"][1]["inverted"], json!(true));
        assert_eq!(args["steps"][2]["optional"], json!(true));
        assert!(args["steps"][0].get("inverted").is_none());
    }

    #[test]
    fn with_steps_after_with_step_is_usage_error() {
        let err = Funnel::builder()
            .with_step(step("A"))
            .with_steps(vec![step("B")])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidUsage { .. }), "{err}");
    }

    #[test]
    fn second_timeframe_is_state_error() {
        let err = Funnel::builder()
            .with_timeframe(Timeframe::relative("today"))
            .unwrap()
            .with_timeframe(Timeframe::relative("yesterday"))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidState { .. }), "{err}");
    }

    #[test]
    fn step_order_matches_insertion_order() {
        let names = ["visit", "signup", "activate", "purchase", "renew"];
        let funnel = names
            .iter()
            .fold(Funnel::builder(), |builder, name| builder.with_step(step(name)))
            .with_timeframe(Timeframe::relative("this_30_days"))
            .unwrap()
            .build()
            .unwrap();

        let built: Vec<_> = funnel.steps().iter().map(|s| s.event_collection()).collect();
        assert_eq!(built, names);

        let rendered: Vec<_> = funnel.request_args()["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["event_collection"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(rendered, names);
    }

    #[test]
    fn step_renders_every_field() {
        let step = FunnelStep::builder()
            .event_collection("purchases")
            .actor_property("visitor.guid")
            .timeframe(Timeframe::absolute("2024-01-01", "2024-01-31"))
            .filters(vec![Filter::new("price", FilterOperator::Gte, 10)])
            .optional(true)
            .with_actors(true)
            .build();

        assert_eq!(
            Value::Object(step.request_args()),
            json!({
                "event_collection": "purchases",
                "actor_property": "visitor.guid",
                "timeframe": { "start": "2024-01-01", "end": "2024-01-31" },
                "filters": [
                    { "property_name": "price", "operator": "gte", "property_value": 10 }
                ],
                "optional": true,
                "with_actors": true
            })
        );
    }

    #[test]
    fn funnel_is_ungrouped_scalar_endpoint() {
        let funnel = Funnel::builder()
            .with_step(step_with_timeframe("A"))
            .build()
            .unwrap();
        assert_eq!(funnel.analysis_type(), "funnel");
        assert!(!funnel.expects_grouped_response());
        assert!(!funnel.expects_interval_response());
    }

    #[test]
    fn timeframe_keys_never_collide_with_steps() {
        let funnel = Funnel::builder()
            .with_step(step("A"))
            .with_timeframe(
                crate::timeframe::RelativeTimeframe::new("this_7_days").with_timezone("UTC"),
            )
            .unwrap()
            .build()
            .unwrap();

        let timeframe_keys = funnel.timeframe().unwrap().timeframe_args();
        assert!(!timeframe_keys.contains_key(STEPS));
        let keys: Vec<_> = funnel.request_args().keys().cloned().collect();
        assert_eq!(keys, ["steps", "timeframe", "timezone"]);
    }
}
