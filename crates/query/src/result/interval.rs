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

use std::fmt;

use serde::Serialize;

use super::QueryResult;
use crate::timeframe::AbsoluteTimeframe;

/// One bucket of an interval result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IntervalResultValue {
    timeframe: AbsoluteTimeframe,
    #[serde(rename = "value")]
    result:    QueryResult,
}

impl IntervalResultValue {
    pub fn new(timeframe: AbsoluteTimeframe, result: QueryResult) -> Self {
        Self { timeframe, result }
    }

    pub fn timeframe(&self) -> &AbsoluteTimeframe { &self.timeframe }

    pub fn result(&self) -> &QueryResult { &self.result }

    pub fn into_parts(self) -> (AbsoluteTimeframe, QueryResult) { (self.timeframe, self.result) }
}

impl fmt::Display for IntervalResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} => {}",
            self.timeframe.start, self.timeframe.end, self.result
        )
    }
}
