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

//! Fixed argument keys and analysis type tags understood by the service.

/// Analysis type tag for funnel queries
pub const FUNNEL: &str = "funnel";
pub const COUNT: &str = "count";
pub const COUNT_UNIQUE: &str = "count_unique";
pub const MINIMUM: &str = "minimum";
pub const MAXIMUM: &str = "maximum";
pub const AVERAGE: &str = "average";
pub const MEDIAN: &str = "median";
pub const PERCENTILE: &str = "percentile";
pub const SUM: &str = "sum";
pub const SELECT_UNIQUE: &str = "select_unique";
pub const STANDARD_DEVIATION: &str = "standard_deviation";

// Request argument keys
pub const STEPS: &str = "steps";
pub const TIMEFRAME: &str = "timeframe";
pub const TIMEZONE: &str = "timezone";
pub const START: &str = "start";
pub const END: &str = "end";
pub const EVENT_COLLECTION: &str = "event_collection";
pub const ACTOR_PROPERTY: &str = "actor_property";
pub const TARGET_PROPERTY: &str = "target_property";
pub const FILTERS: &str = "filters";
pub const INVERTED: &str = "inverted";
pub const OPTIONAL: &str = "optional";
pub const WITH_ACTORS: &str = "with_actors";
pub const INTERVAL: &str = "interval";
pub const GROUP_BY: &str = "group_by";
pub const PERCENTILE_VALUE: &str = "percentile";
pub const PROPERTY_NAME: &str = "property_name";
pub const OPERATOR: &str = "operator";
pub const PROPERTY_VALUE: &str = "property_value";

// Response keys
pub const RESULT: &str = "result";
pub const VALUE: &str = "value";
