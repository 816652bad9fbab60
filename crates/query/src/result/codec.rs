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

//! JSON encoding of results in the service's wire shape, and decoding back.
//!
//! Wire shapes:
//! - scalars and lists are plain JSON values;
//! - an interval result is `[{"timeframe": {"start", "end"}, "value": v}, ..]`;
//! - a group result is `[{<property>: <value>, .., "result": v}, ..]`.

use serde::{
    Deserialize, Serialize, Serializer,
    ser::SerializeMap,
};
use serde_json::{Map, Value};
use snafu::{OptionExt, ensure};
use tracing::trace;

use super::{Group, GroupResults, GroupValue, IntervalResultValue, QueryResult};
use crate::{
    constants::{RESULT, TIMEFRAME, VALUE},
    error::{MalformedResponseSnafu, Result},
    request::ResponseShape,
    timeframe::AbsoluteTimeframe,
};

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            QueryResult::Double(value) => serializer.serialize_f64(*value),
            QueryResult::Long(value) => serializer.serialize_i64(*value),
            QueryResult::String(value) => serializer.serialize_str(value),
            QueryResult::List(items) => serializer.collect_seq(items),
            QueryResult::Interval(buckets) => serializer.collect_seq(buckets),
            QueryResult::Group(groups) => serializer.collect_seq(
                groups
                    .iter()
                    .map(|(group, result)| GroupEntry { group, result }),
            ),
        }
    }
}

/// One element of a grouped response: the group's properties flattened next
/// to its `result`.
struct GroupEntry<'a> {
    group:  &'a Group,
    result: &'a QueryResult,
}

impl Serialize for GroupEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.group.len() + 1))?;
        for (property, value) in self.group.properties() {
            map.serialize_entry(property, value)?;
        }
        map.serialize_entry(RESULT, self.result)?;
        map.end()
    }
}

impl QueryResult {
    /// Decodes a whole response body, `{"result": ..}`, with the shape the
    /// query expects.
    ///
    /// # Errors
    /// Returns `MalformedResponse` if the body has no `result` field or it does
    /// not match `shape`.
    pub fn from_response(body: &Value, shape: &ResponseShape) -> Result<Self> {
        let result = body.get(RESULT).context(MalformedResponseSnafu {
            message: "response has no 'result' field",
        })?;
        let decoded = Self::from_result_value(result, shape)?;
        trace!("Decoded {} result", decoded.kind());
        Ok(decoded)
    }

    /// Decodes the `result` field of a response with the expected shape.
    ///
    /// Interval buckets are the outer layer, group entries the next one; the
    /// values inside are decoded with [`from_json`](Self::from_json).
    pub fn from_result_value(value: &Value, shape: &ResponseShape) -> Result<Self> {
        if shape.interval {
            let inner = shape.without_interval();
            decode_interval(value, |bucket| Self::from_result_value(bucket, &inner))
        } else if shape.is_grouped() {
            decode_groups(value, &shape.group_by)
        } else {
            Self::from_json(value)
        }
    }

    /// Decodes a value without a known shape.
    ///
    /// Integers become `Long`, other numbers `Double`, strings `String`. An
    /// array whose elements are all interval buckets becomes `Interval`, one
    /// whose elements all carry a `result` next to other properties becomes
    /// `Group`, and any other array a `List`.
    ///
    /// # Errors
    /// Returns `MalformedResponse` for `null`, booleans and objects outside of
    /// the bucket and group layouts.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(long) => Ok(QueryResult::Long(long)),
                None => number
                    .as_f64()
                    .map(QueryResult::Double)
                    .context(MalformedResponseSnafu {
                        message: format!("number {number} is out of range"),
                    }),
            },
            Value::String(string) => Ok(QueryResult::String(string.clone())),
            Value::Array(items) if !items.is_empty() && items.iter().all(is_interval_bucket) => {
                decode_interval(value, Self::from_json)
            }
            Value::Array(items) if !items.is_empty() && items.iter().all(is_group_entry) => {
                decode_inferred_groups(items)
            }
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(QueryResult::List),
            other => MalformedResponseSnafu {
                message: format!("unexpected result value {other}"),
            }
            .fail(),
        }
    }
}

fn is_interval_bucket(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.len() == 2 && o.contains_key(TIMEFRAME) && o.contains_key(VALUE))
}

fn is_group_entry(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.len() > 1 && o.contains_key(RESULT))
}

fn decode_interval<F>(value: &Value, decode_value: F) -> Result<QueryResult>
where
    F: Fn(&Value) -> Result<QueryResult>,
{
    let buckets = value.as_array().context(MalformedResponseSnafu {
        message: format!("expected an array of interval buckets, got {value}"),
    })?;

    buckets
        .iter()
        .map(|bucket| -> Result<IntervalResultValue> {
            let timeframe = bucket.get(TIMEFRAME).context(MalformedResponseSnafu {
                message: format!("interval bucket has no 'timeframe': {bucket}"),
            })?;
            let timeframe = AbsoluteTimeframe::deserialize(timeframe).map_err(|e| {
                MalformedResponseSnafu {
                    message: format!("invalid interval timeframe {timeframe}: {e}"),
                }
                .build()
            })?;
            let inner = bucket.get(VALUE).context(MalformedResponseSnafu {
                message: format!("interval bucket has no 'value': {bucket}"),
            })?;
            Ok(IntervalResultValue::new(timeframe, decode_value(inner)?))
        })
        .collect::<Result<Vec<_>>>()
        .map(QueryResult::Interval)
}

fn decode_groups(value: &Value, group_by: &[String]) -> Result<QueryResult> {
    let entries = value.as_array().context(MalformedResponseSnafu {
        message: format!("expected an array of groups, got {value}"),
    })?;

    let mut groups = GroupResults::new();
    for entry in entries {
        let object = group_object(entry)?;
        let group = group_by
            .iter()
            .map(|property| -> Result<(String, GroupValue)> {
                let value = object.get(property).context(MalformedResponseSnafu {
                    message: format!("group has no '{property}' property: {entry}"),
                })?;
                Ok((property.clone(), GroupValue::from_json(value)?))
            })
            .collect::<Result<Group>>()?;
        insert_group(&mut groups, group, object)?;
    }

    Ok(QueryResult::Group(groups))
}

fn decode_inferred_groups(entries: &[Value]) -> Result<QueryResult> {
    let mut groups = GroupResults::new();
    for entry in entries {
        let object = group_object(entry)?;
        let group = object
            .iter()
            .filter(|(property, _)| property.as_str() != RESULT)
            .map(|(property, value)| -> Result<(String, GroupValue)> {
                Ok((property.clone(), GroupValue::from_json(value)?))
            })
            .collect::<Result<Group>>()?;
        insert_group(&mut groups, group, object)?;
    }

    Ok(QueryResult::Group(groups))
}

fn group_object(entry: &Value) -> Result<&Map<String, Value>> {
    entry.as_object().context(MalformedResponseSnafu {
        message: format!("expected a group object, got {entry}"),
    })
}

fn insert_group(
    groups: &mut GroupResults,
    group: Group,
    object: &Map<String, Value>,
) -> Result<()> {
    let result = object.get(RESULT).context(MalformedResponseSnafu {
        message: format!("group {group} has no 'result'"),
    })?;
    ensure!(
        !groups.contains_key(&group),
        MalformedResponseSnafu {
            message: format!("group {group} appears more than once"),
        }
    );
    let result = QueryResult::from_json(result)?;
    groups.insert(group, result);
    Ok(())
}
