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

use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
    constants::{OPERATOR, PROPERTY_NAME, PROPERTY_VALUE},
    parameter::RequestParameter,
    request::RequestArgs,
};

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Exists,
    In,
    Contains,
    NotContains,
    Within,
}

/// Restricts the events an analysis considers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    property_name:  String,
    operator:       FilterOperator,
    property_value: Value,
}

impl Filter {
    pub fn new(
        property_name: impl Into<String>,
        operator: FilterOperator,
        property_value: impl Into<Value>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            property_value: property_value.into(),
        }
    }

    pub fn property_name(&self) -> &str { &self.property_name }

    pub fn operator(&self) -> FilterOperator { self.operator }

    pub fn property_value(&self) -> &Value { &self.property_value }
}

impl RequestParameter for Filter {
    fn request_args(&self) -> RequestArgs {
        let mut args = RequestArgs::new();
        args.insert(
            PROPERTY_NAME.to_string(),
            Value::String(self.property_name.clone()),
        );
        args.insert(
            OPERATOR.to_string(),
            Value::String(self.operator.as_ref().to_string()),
        );
        args.insert(PROPERTY_VALUE.to_string(), self.property_value.clone());
        args
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;

    #[test_case(FilterOperator::Eq, "eq")]
    #[test_case(FilterOperator::Gte, "gte")]
    #[test_case(FilterOperator::In, "in")]
    #[test_case(FilterOperator::NotContains, "not_contains")]
    fn operator_tags(operator: FilterOperator, tag: &str) {
        assert_eq!(operator.to_string(), tag);
        assert_eq!(FilterOperator::from_str(tag).unwrap(), operator);
    }

    #[test]
    fn every_operator_parses_back() {
        for operator in FilterOperator::iter() {
            assert_eq!(FilterOperator::from_str(operator.as_ref()).unwrap(), operator);
        }
    }

    #[test]
    fn renders_three_keys_in_order() {
        let filter = Filter::new("user.age", FilterOperator::Gt, 21);
        let rendered = Value::Object(filter.request_args());
        assert_eq!(
            rendered,
            json!({ "property_name": "user.age", "operator": "gt", "property_value": 21 })
        );
        let keys: Vec<_> = filter.request_args().keys().cloned().collect();
        assert_eq!(keys, ["property_name", "operator", "property_value"]);
    }
}
