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

//! Typed model of analysis responses.
//!
//! The service answers with scalars, lists, interval buckets or group-by
//! objects, nested in each other depending on the query. [`QueryResult`]
//! is the closed set of those shapes.

mod codec;
mod group;
mod interval;

use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use strum_macros::{AsRefStr, Display};

pub use self::{
    group::{Group, GroupValue},
    interval::IntervalResultValue,
};
use crate::error::{InvalidStateSnafu, Result};

/// Nested results keyed by the group-by property values that produced them.
pub type GroupResults = BTreeMap<Group, QueryResult>;

/// Variant tag of a [`QueryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResultKind {
    Double,
    Long,
    String,
    List,
    Interval,
    Group,
}

/// Result of an analysis.
///
/// Callers that know the shape from their query can `match`; callers that do
/// not can probe with the `is_*` predicates and read with the paired
/// accessor. Every other accessor returns `InvalidState`.
///
/// Equality and hashing are structural. Doubles compare by bit pattern, so a
/// `NaN` equals itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Double(f64),
    Long(i64),
    String(String),
    List(Vec<QueryResult>),
    /// Buckets in the chronological order the service returned them.
    Interval(Vec<IntervalResultValue>),
    Group(GroupResults),
}

impl QueryResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            QueryResult::Double(_) => ResultKind::Double,
            QueryResult::Long(_) => ResultKind::Long,
            QueryResult::String(_) => ResultKind::String,
            QueryResult::List(_) => ResultKind::List,
            QueryResult::Interval(_) => ResultKind::Interval,
            QueryResult::Group(_) => ResultKind::Group,
        }
    }

    pub fn is_double(&self) -> bool { matches!(self, QueryResult::Double(_)) }

    pub fn is_long(&self) -> bool { matches!(self, QueryResult::Long(_)) }

    pub fn is_string(&self) -> bool { matches!(self, QueryResult::String(_)) }

    pub fn is_list_result(&self) -> bool { matches!(self, QueryResult::List(_)) }

    pub fn is_interval_result(&self) -> bool { matches!(self, QueryResult::Interval(_)) }

    pub fn is_group_result(&self) -> bool { matches!(self, QueryResult::Group(_)) }

    pub fn double_value(&self) -> Result<f64> {
        match self {
            QueryResult::Double(value) => Ok(*value),
            other => other.wrong_kind(ResultKind::Double),
        }
    }

    pub fn long_value(&self) -> Result<i64> {
        match self {
            QueryResult::Long(value) => Ok(*value),
            other => other.wrong_kind(ResultKind::Long),
        }
    }

    pub fn string_value(&self) -> Result<&str> {
        match self {
            QueryResult::String(value) => Ok(value),
            other => other.wrong_kind(ResultKind::String),
        }
    }

    pub fn list_results(&self) -> Result<&[QueryResult]> {
        match self {
            QueryResult::List(items) => Ok(items),
            other => other.wrong_kind(ResultKind::List),
        }
    }

    pub fn interval_results(&self) -> Result<&[IntervalResultValue]> {
        match self {
            QueryResult::Interval(buckets) => Ok(buckets),
            other => other.wrong_kind(ResultKind::Interval),
        }
    }

    pub fn group_results(&self) -> Result<&GroupResults> {
        match self {
            QueryResult::Group(groups) => Ok(groups),
            other => other.wrong_kind(ResultKind::Group),
        }
    }

    fn wrong_kind<T>(&self, expected: ResultKind) -> Result<T> {
        InvalidStateSnafu {
            message: format!("expected a {expected} result, found a {} result", self.kind()),
        }
        .fail()
    }
}

impl PartialEq for QueryResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QueryResult::Double(a), QueryResult::Double(b)) => a.to_bits() == b.to_bits(),
            (QueryResult::Long(a), QueryResult::Long(b)) => a == b,
            (QueryResult::String(a), QueryResult::String(b)) => a == b,
            (QueryResult::List(a), QueryResult::List(b)) => a == b,
            (QueryResult::Interval(a), QueryResult::Interval(b)) => a == b,
            (QueryResult::Group(a), QueryResult::Group(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for QueryResult {}

impl Hash for QueryResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            QueryResult::Double(value) => value.to_bits().hash(state),
            QueryResult::Long(value) => value.hash(state),
            QueryResult::String(value) => value.hash(state),
            QueryResult::List(items) => items.hash(state),
            QueryResult::Interval(buckets) => buckets.hash(state),
            QueryResult::Group(groups) => groups.hash(state),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Double(value) => write!(f, "{value:?}"),
            QueryResult::Long(value) => write!(f, "{value}"),
            QueryResult::String(value) => write!(f, "{value:?}"),
            QueryResult::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            QueryResult::Interval(buckets) => {
                write!(f, "interval[")?;
                for (i, bucket) in buckets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{bucket}")?;
                }
                write!(f, "]")
            }
            QueryResult::Group(groups) => {
                write!(f, "group{{")?;
                for (i, (group, result)) in groups.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{group} => {result}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<f64> for QueryResult {
    fn from(value: f64) -> Self { QueryResult::Double(value) }
}

impl From<i64> for QueryResult {
    fn from(value: i64) -> Self { QueryResult::Long(value) }
}

impl From<&str> for QueryResult {
    fn from(value: &str) -> Self { QueryResult::String(value.to_string()) }
}

impl From<String> for QueryResult {
    fn from(value: String) -> Self { QueryResult::String(value) }
}

impl From<Vec<QueryResult>> for QueryResult {
    fn from(items: Vec<QueryResult>) -> Self { QueryResult::List(items) }
}

impl From<Vec<IntervalResultValue>> for QueryResult {
    fn from(buckets: Vec<IntervalResultValue>) -> Self { QueryResult::Interval(buckets) }
}

impl From<GroupResults> for QueryResult {
    fn from(groups: GroupResults) -> Self { QueryResult::Group(groups) }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, hash::DefaultHasher};

    use test_case::test_case;

    use super::*;
    use crate::{error::QueryError, timeframe::AbsoluteTimeframe};

    fn sample_interval() -> QueryResult {
        QueryResult::Interval(vec![
            IntervalResultValue::new(
                AbsoluteTimeframe::new("2024-01-01", "2024-01-02"),
                QueryResult::Long(3),
            ),
            IntervalResultValue::new(
                AbsoluteTimeframe::new("2024-01-02", "2024-01-03"),
                QueryResult::Long(5),
            ),
        ])
    }

    fn sample_group() -> QueryResult {
        let mut groups = GroupResults::new();
        groups.insert(Group::new().with("country", "US"), QueryResult::Long(10));
        groups.insert(Group::new().with("country", "DE"), sample_interval());
        QueryResult::Group(groups)
    }

    fn predicates(result: &QueryResult) -> [bool; 6] {
        [
            result.is_double(),
            result.is_long(),
            result.is_string(),
            result.is_list_result(),
            result.is_interval_result(),
            result.is_group_result(),
        ]
    }

    fn accessors_ok(result: &QueryResult) -> [bool; 6] {
        [
            result.double_value().is_ok(),
            result.long_value().is_ok(),
            result.string_value().is_ok(),
            result.list_results().is_ok(),
            result.interval_results().is_ok(),
            result.group_results().is_ok(),
        ]
    }

    #[test_case(QueryResult::Double(1.5), 0; "double")]
    #[test_case(QueryResult::Long(7), 1; "long")]
    #[test_case(QueryResult::from("a"), 2; "string")]
    #[test_case(QueryResult::List(vec![QueryResult::Long(1)]), 3; "list")]
    #[test_case(sample_interval(), 4; "interval")]
    #[test_case(sample_group(), 5; "group")]
    fn exactly_one_predicate_and_accessor(result: QueryResult, index: usize) {
        let mut expected = [false; 6];
        expected[index] = true;
        assert_eq!(predicates(&result), expected);
        assert_eq!(accessors_ok(&result), expected);
    }

    #[test]
    fn accessors_return_payloads() {
        assert_eq!(QueryResult::Double(2.25).double_value().unwrap(), 2.25);
        assert_eq!(QueryResult::Long(-4).long_value().unwrap(), -4);
        assert_eq!(QueryResult::from("x").string_value().unwrap(), "x");
        assert_eq!(
            QueryResult::List(vec![QueryResult::Long(1), QueryResult::Long(2)])
                .list_results()
                .unwrap(),
            [QueryResult::Long(1), QueryResult::Long(2)]
        );

        let interval = sample_interval();
        let buckets = interval.interval_results().unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].timeframe().start, "2024-01-01");
        assert_eq!(buckets[1].result().long_value().unwrap(), 5);

        let group = sample_group();
        let us = Group::new().with("country", "US");
        assert_eq!(group.group_results().unwrap()[&us], QueryResult::Long(10));
    }

    #[test]
    fn wrong_accessor_is_invalid_state() {
        let err = QueryResult::Long(1).double_value().unwrap_err();
        assert!(matches!(err, QueryError::InvalidState { .. }), "{err}");
        assert_eq!(
            err.to_string(),
            "Invalid state: expected a double result, found a long result"
        );

        let err = sample_group().interval_results().unwrap_err();
        assert!(matches!(err, QueryError::InvalidState { .. }), "{err}");
    }

    #[test]
    fn independently_built_trees_are_equal() {
        assert_eq!(sample_group(), sample_group());

        let mut set = HashSet::new();
        set.insert(sample_group());
        assert!(set.contains(&sample_group()));
    }

    #[test]
    fn changing_a_leaf_breaks_equality() {
        let mut groups = GroupResults::new();
        groups.insert(Group::new().with("country", "US"), QueryResult::Long(10));
        groups.insert(
            Group::new().with("country", "DE"),
            QueryResult::Interval(vec![
                IntervalResultValue::new(
                    AbsoluteTimeframe::new("2024-01-01", "2024-01-02"),
                    QueryResult::Long(3),
                ),
                IntervalResultValue::new(
                    AbsoluteTimeframe::new("2024-01-02", "2024-01-03"),
                    QueryResult::Long(6),
                ),
            ]),
        );
        assert_ne!(sample_group(), QueryResult::Group(groups));
    }

    #[test]
    fn interval_order_is_significant() {
        let QueryResult::Interval(mut buckets) = sample_interval() else {
            unreachable!()
        };
        buckets.reverse();
        assert_ne!(sample_interval(), QueryResult::Interval(buckets));
    }

    #[test]
    fn long_and_double_never_equal() {
        assert_ne!(QueryResult::Long(1), QueryResult::Double(1.0));
        assert_eq!(QueryResult::Double(f64::NAN), QueryResult::Double(f64::NAN));
    }

    #[test]
    fn equal_trees_hash_equal() {
        let hash = |result: &QueryResult| {
            let mut hasher = DefaultHasher::new();
            result.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&sample_group()), hash(&sample_group()));
    }

    #[test_case(QueryResult::Double(1.0), "1.0")]
    #[test_case(QueryResult::Long(1), "1")]
    #[test_case(QueryResult::from("US"), "\"US\"")]
    #[test_case(QueryResult::List(vec![QueryResult::Long(1), QueryResult::Double(0.5)]), "[1, 0.5]")]
    #[test_case(sample_interval(), "interval[2024-01-01/2024-01-02 => 3, 2024-01-02/2024-01-03 => 5]")]
    fn display(result: QueryResult, expected: &str) {
        assert_eq!(result.to_string(), expected);
    }

    #[test]
    fn display_group() {
        let mut groups = GroupResults::new();
        groups.insert(
            Group::new().with("country", "US").with("mobile", true),
            QueryResult::Long(2),
        );
        assert_eq!(
            QueryResult::Group(groups).to_string(),
            "group{{country: \"US\", mobile: true} => 2}"
        );
    }
}
