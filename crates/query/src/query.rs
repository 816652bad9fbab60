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

use std::collections::HashSet;

use serde_json::Value;
use snafu::ensure;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::{
    constants::{EVENT_COLLECTION, FILTERS, GROUP_BY, INTERVAL, PERCENTILE_VALUE, TARGET_PROPERTY},
    error::{InvalidArgumentSnafu, Result},
    filter::Filter,
    parameter::RequestParameterCollection,
    request::{QueryRequest, RequestArgs, ResponseShape},
    timeframe::Timeframe,
};

/// Single-collection analyses. The tag doubles as the endpoint name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QueryType {
    Count,
    CountUnique,
    Minimum,
    Maximum,
    Average,
    Median,
    Percentile,
    Sum,
    SelectUnique,
    StandardDeviation,
}

impl QueryType {
    /// Every analysis except `count` runs over a property of the events.
    pub fn requires_target_property(self) -> bool { self != QueryType::Count }
}

/// A single analysis over one event collection, optionally bucketed by
/// interval and grouped by properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    query_type:       QueryType,
    event_collection: String,
    target_property:  Option<String>,
    percentile:       Option<f64>,
    filters:          RequestParameterCollection<Filter>,
    timeframe:        Timeframe,
    interval:         Option<String>,
    group_by:         Vec<String>,
}

#[bon::bon]
impl Query {
    /// Validates and creates a query.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the event collection is empty, if the
    /// target property is missing for an analysis other than `count`, if a
    /// percentile is missing, out of `(0, 100]` or given to another analysis,
    /// or if the interval or a group-by property is empty or repeated.
    #[builder]
    pub fn new(
        query_type: QueryType,
        #[builder(into)] event_collection: String,
        #[builder(into)] target_property: Option<String>,
        percentile: Option<f64>,
        #[builder(default, into)] filters: RequestParameterCollection<Filter>,
        #[builder(into)] timeframe: Timeframe,
        #[builder(into)] interval: Option<String>,
        #[builder(default)] group_by: Vec<String>,
    ) -> Result<Self> {
        ensure!(
            !event_collection.is_empty(),
            InvalidArgumentSnafu {
                message: "event collection must not be empty",
            }
        );

        if query_type.requires_target_property() {
            ensure!(
                target_property.as_deref().is_some_and(|p| !p.is_empty()),
                InvalidArgumentSnafu {
                    message: format!("{query_type} requires a target property"),
                }
            );
        }

        match (query_type, percentile) {
            (QueryType::Percentile, Some(p)) => ensure!(
                p > 0.0 && p <= 100.0,
                InvalidArgumentSnafu {
                    message: format!("percentile must be in (0, 100], got {p}"),
                }
            ),
            (QueryType::Percentile, None) => {
                return InvalidArgumentSnafu {
                    message: "percentile requires a percentile value",
                }
                .fail();
            }
            (_, Some(_)) => {
                return InvalidArgumentSnafu {
                    message: format!("{query_type} does not take a percentile value"),
                }
                .fail();
            }
            (_, None) => {}
        }

        ensure!(
            interval.as_deref() != Some(""),
            InvalidArgumentSnafu {
                message: "interval must not be empty",
            }
        );

        let mut seen = HashSet::new();
        for property in &group_by {
            ensure!(
                !property.is_empty(),
                InvalidArgumentSnafu {
                    message: "group_by property must not be empty",
                }
            );
            ensure!(
                seen.insert(property.as_str()),
                InvalidArgumentSnafu {
                    message: format!("group_by property '{property}' is repeated"),
                }
            );
        }

        debug!(
            "Built {} query on {}, interval: {:?}, group_by: {:?}",
            query_type, event_collection, interval, group_by
        );

        Ok(Self {
            query_type,
            event_collection,
            target_property,
            percentile,
            filters,
            timeframe,
            interval,
            group_by,
        })
    }
}

impl Query {
    pub fn query_type(&self) -> QueryType { self.query_type }

    pub fn event_collection(&self) -> &str { &self.event_collection }

    pub fn target_property(&self) -> Option<&str> { self.target_property.as_deref() }

    pub fn percentile(&self) -> Option<f64> { self.percentile }

    pub fn filters(&self) -> &RequestParameterCollection<Filter> { &self.filters }

    pub fn timeframe(&self) -> &Timeframe { &self.timeframe }

    pub fn interval(&self) -> Option<&str> { self.interval.as_deref() }

    pub fn group_by(&self) -> &[String] { &self.group_by }
}

impl QueryRequest for Query {
    fn analysis_type(&self) -> &str { self.query_type.as_ref() }

    fn request_args(&self) -> RequestArgs {
        let mut args = RequestArgs::new();
        args.insert(
            EVENT_COLLECTION.to_string(),
            Value::String(self.event_collection.clone()),
        );

        if let Some(target_property) = &self.target_property {
            args.insert(
                TARGET_PROPERTY.to_string(),
                Value::String(target_property.clone()),
            );
        }

        if let Some(percentile) = self.percentile {
            args.insert(PERCENTILE_VALUE.to_string(), Value::from(percentile));
        }

        args.extend(self.timeframe.timeframe_args());

        if let Some(interval) = &self.interval {
            args.insert(INTERVAL.to_string(), Value::String(interval.clone()));
        }

        if !self.group_by.is_empty() {
            args.insert(
                GROUP_BY.to_string(),
                Value::Array(self.group_by.iter().cloned().map(Value::String).collect()),
            );
        }

        if !self.filters.is_empty() {
            args.insert(
                FILTERS.to_string(),
                Value::Array(self.filters.request_args()),
            );
        }

        args
    }

    fn expects_grouped_response(&self) -> bool { !self.group_by.is_empty() }

    fn expects_interval_response(&self) -> bool { self.interval.is_some() }

    fn response_shape(&self) -> ResponseShape {
        ResponseShape {
            interval: self.expects_interval_response(),
            group_by: self.group_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;
    use crate::{constants, error::QueryError, filter::FilterOperator};

    #[test_case("count", QueryType::Count)]
    #[test_case("COUNT_UNIQUE", QueryType::CountUnique)]
    #[test_case("Standard_Deviation", QueryType::StandardDeviation)]
    #[test_case("select_unique", QueryType::SelectUnique)]
    fn parses_ignoring_case(tag: &str, expected: QueryType) {
        assert_eq!(QueryType::from_str(tag).unwrap(), expected);
    }

    #[test]
    fn tags_are_snake_case() {
        let tags: Vec<String> = QueryType::iter().map(|t| t.to_string()).collect();
        assert_eq!(
            tags,
            [
                "count",
                "count_unique",
                "minimum",
                "maximum",
                "average",
                "median",
                "percentile",
                "sum",
                "select_unique",
                "standard_deviation"
            ]
        );
    }

    #[test_case(QueryType::Count, constants::COUNT)]
    #[test_case(QueryType::CountUnique, constants::COUNT_UNIQUE)]
    #[test_case(QueryType::Minimum, constants::MINIMUM)]
    #[test_case(QueryType::Maximum, constants::MAXIMUM)]
    #[test_case(QueryType::Average, constants::AVERAGE)]
    #[test_case(QueryType::Median, constants::MEDIAN)]
    #[test_case(QueryType::Percentile, constants::PERCENTILE)]
    #[test_case(QueryType::Sum, constants::SUM)]
    #[test_case(QueryType::SelectUnique, constants::SELECT_UNIQUE)]
    #[test_case(QueryType::StandardDeviation, constants::STANDARD_DEVIATION)]
    fn tag_matches_endpoint_constant(query_type: QueryType, tag: &str) {
        assert_eq!(query_type.as_ref(), tag);
    }

    #[test]
    fn count_renders_minimal_body() {
        let query = Query::builder()
            .query_type(QueryType::Count)
            .event_collection("pageviews")
            .timeframe(Timeframe::relative("this_7_days"))
            .build()
            .unwrap();

        assert_eq!(query.analysis_type(), "count");
        assert!(!query.expects_grouped_response());
        assert!(!query.expects_interval_response());
        assert_eq!(query.response_shape(), ResponseShape::scalar());
        assert_eq!(
            Value::Object(query.request_args()),
            json!({ "event_collection": "pageviews", "timeframe": "this_7_days" })
        );
    }

    #[test]
    fn grouped_interval_sum_renders_everything() {
        let query = Query::builder()
            .query_type(QueryType::Sum)
            .event_collection("purchases")
            .target_property("price")
            .timeframe(Timeframe::absolute("2024-01-01", "2024-01-08"))
            .interval("daily")
            .group_by(vec!["country".to_string(), "device".to_string()])
            .filters(vec![Filter::new("price", FilterOperator::Gt, 0)])
            .build()
            .unwrap();

        assert_eq!(query.analysis_type(), "sum");
        assert!(query.expects_grouped_response());
        assert!(query.expects_interval_response());
        assert_eq!(
            query.response_shape(),
            ResponseShape::grouped(["country", "device"]).with_interval()
        );
        assert_eq!(
            Value::Object(query.request_args()),
            json!({
                "event_collection": "purchases",
                "target_property": "price",
                "timeframe": { "start": "2024-01-01", "end": "2024-01-08" },
                "interval": "daily",
                "group_by": ["country", "device"],
                "filters": [
                    { "property_name": "price", "operator": "gt", "property_value": 0 }
                ]
            })
        );
    }

    #[test]
    fn percentile_renders_value() {
        let query = Query::builder()
            .query_type(QueryType::Percentile)
            .event_collection("requests")
            .target_property("latency_ms")
            .percentile(99.5)
            .timeframe(Timeframe::relative("today"))
            .build()
            .unwrap();

        assert_eq!(query.analysis_type(), "percentile");
        assert_eq!(query.request_args()["percentile"], json!(99.5));
    }

    #[test_case(QueryType::Sum, "purchases", None, None; "missing target property")]
    #[test_case(QueryType::Count, "", None, None; "empty collection")]
    #[test_case(QueryType::Percentile, "requests", Some("latency"), None; "missing percentile")]
    #[test_case(QueryType::Percentile, "requests", Some("latency"), Some(0.0); "zero percentile")]
    #[test_case(QueryType::Percentile, "requests", Some("latency"), Some(100.5); "percentile above range")]
    #[test_case(QueryType::Average, "requests", Some("latency"), Some(50.0); "percentile on average")]
    fn invalid_queries(
        query_type: QueryType,
        collection: &str,
        target: Option<&str>,
        percentile: Option<f64>,
    ) {
        let err = Query::builder()
            .query_type(query_type)
            .event_collection(collection)
            .maybe_target_property(target)
            .maybe_percentile(percentile)
            .timeframe(Timeframe::relative("today"))
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");
    }

    #[test_case(Some(""), vec![]; "empty interval")]
    #[test_case(None, vec!["".to_string()]; "empty group_by property")]
    #[test_case(None, vec!["a".to_string(), "a".to_string()]; "repeated group_by property")]
    fn invalid_breakdowns(interval: Option<&str>, group_by: Vec<String>) {
        let err = Query::builder()
            .query_type(QueryType::Count)
            .event_collection("pageviews")
            .timeframe(Timeframe::relative("today"))
            .maybe_interval(interval)
            .group_by(group_by)
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }), "{err}");
    }
}
