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

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{MalformedResponseSnafu, Result};

/// Value of one group-by property.
#[derive(Debug, Clone)]
pub enum GroupValue {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl GroupValue {
    fn rank(&self) -> u8 {
        match self {
            GroupValue::Null => 0,
            GroupValue::Bool(_) => 1,
            GroupValue::Long(_) => 2,
            GroupValue::Double(_) => 3,
            GroupValue::String(_) => 4,
        }
    }

    /// Converts a JSON property value. Arrays and objects cannot be group keys.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(GroupValue::Null),
            Value::Bool(b) => Ok(GroupValue::Bool(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => GroupValue::Long(i),
                None => GroupValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Ok(GroupValue::String(s.clone())),
            other => MalformedResponseSnafu {
                message: format!("group-by value must be a scalar, got {other}"),
            }
            .fail(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            GroupValue::Null => Value::Null,
            GroupValue::Bool(b) => Value::Bool(*b),
            GroupValue::Long(i) => Value::from(*i),
            GroupValue::Double(d) => Value::from(*d),
            GroupValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl PartialEq for GroupValue {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for GroupValue {}

impl PartialOrd for GroupValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Orders by variant first. Doubles use `total_cmp`, which is equal exactly
/// when the bit patterns are equal.
impl Ord for GroupValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupValue::Bool(a), GroupValue::Bool(b)) => a.cmp(b),
            (GroupValue::Long(a), GroupValue::Long(b)) => a.cmp(b),
            (GroupValue::Double(a), GroupValue::Double(b)) => a.total_cmp(b),
            (GroupValue::String(a), GroupValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for GroupValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            GroupValue::Null => {}
            GroupValue::Bool(b) => b.hash(state),
            GroupValue::Long(i) => i.hash(state),
            GroupValue::Double(d) => d.to_bits().hash(state),
            GroupValue::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Null => write!(f, "null"),
            GroupValue::Bool(b) => write!(f, "{b}"),
            GroupValue::Long(i) => write!(f, "{i}"),
            GroupValue::Double(d) => write!(f, "{d:?}"),
            GroupValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl Serialize for GroupValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GroupValue::Null => serializer.serialize_unit(),
            GroupValue::Bool(b) => serializer.serialize_bool(*b),
            GroupValue::Long(i) => serializer.serialize_i64(*i),
            GroupValue::Double(d) => serializer.serialize_f64(*d),
            GroupValue::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for GroupValue {
    fn from(value: bool) -> Self { GroupValue::Bool(value) }
}

impl From<i64> for GroupValue {
    fn from(value: i64) -> Self { GroupValue::Long(value) }
}

impl From<f64> for GroupValue {
    fn from(value: f64) -> Self { GroupValue::Double(value) }
}

impl From<&str> for GroupValue {
    fn from(value: &str) -> Self { GroupValue::String(value.to_string()) }
}

impl From<String> for GroupValue {
    fn from(value: String) -> Self { GroupValue::String(value) }
}

/// The group-by property values identifying one group of a grouped result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Group {
    properties: BTreeMap<String, GroupValue>,
}

impl Group {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<GroupValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&GroupValue> { self.properties.get(property) }

    pub fn properties(&self) -> &BTreeMap<String, GroupValue> { &self.properties }

    pub fn len(&self) -> usize { self.properties.len() }

    pub fn is_empty(&self) -> bool { self.properties.is_empty() }
}

impl FromIterator<(String, GroupValue)> for Group {
    fn from_iter<I: IntoIterator<Item = (String, GroupValue)>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (property, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{property}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case(json!(null), GroupValue::Null)]
    #[test_case(json!(true), GroupValue::Bool(true))]
    #[test_case(json!(42), GroupValue::Long(42))]
    #[test_case(json!(4.5), GroupValue::Double(4.5))]
    #[test_case(json!("US"), GroupValue::String("US".to_string()))]
    fn scalar_values_convert(value: Value, expected: GroupValue) {
        let converted = GroupValue::from_json(&value).unwrap();
        assert_eq!(converted, expected);
        assert_eq!(converted.to_json(), value);
    }

    #[test_case(json!([1, 2]); "array")]
    #[test_case(json!({ "a": 1 }); "object")]
    fn compound_values_are_rejected(value: Value) {
        assert!(GroupValue::from_json(&value).is_err());
    }

    #[test]
    fn groups_compare_by_contents() {
        let a = Group::new().with("country", "US").with("device", "ios");
        let b = Group::new().with("device", "ios").with("country", "US");
        assert_eq!(a, b);
        assert_ne!(a, Group::new().with("country", "US"));
        assert_ne!(
            Group::new().with("n", GroupValue::Long(1)),
            Group::new().with("n", GroupValue::Double(1.0))
        );
    }

    #[test]
    fn serializes_as_plain_object() {
        let group = Group::new().with("country", "US").with("mobile", false);
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({ "country": "US", "mobile": false })
        );
    }
}
