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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{END, START, TIMEFRAME, TIMEZONE},
    request::RequestArgs,
};

/// A window bounded by two ISO-8601 timestamps.
///
/// This is also the key of each bucket in an interval result, so it orders
/// and hashes by `(start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsoluteTimeframe {
    pub start: String,
    pub end:   String,
}

impl AbsoluteTimeframe {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end:   end.into(),
        }
    }
}

/// A named window such as `this_7_days` or `previous_month`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativeTimeframe {
    relative: String,
    timezone: Option<String>,
}

impl RelativeTimeframe {
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            timezone: None,
        }
    }

    /// Sets the timezone the service uses to resolve the window boundaries.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn relative(&self) -> &str { &self.relative }

    pub fn timezone(&self) -> Option<&str> { self.timezone.as_deref() }
}

/// Time window of a query: exactly one of the absolute or relative forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Absolute(AbsoluteTimeframe),
    Relative(RelativeTimeframe),
}

impl Timeframe {
    pub fn absolute(start: impl Into<String>, end: impl Into<String>) -> Self {
        Timeframe::Absolute(AbsoluteTimeframe::new(start, end))
    }

    pub fn relative(relative: impl Into<String>) -> Self {
        Timeframe::Relative(RelativeTimeframe::new(relative))
    }

    /// Renders the arguments this timeframe contributes to a request.
    ///
    /// The keys are spread at the top level of whatever request embeds the
    /// timeframe: always `timeframe`, plus `timezone` for a relative window
    /// that names one.
    pub fn timeframe_args(&self) -> RequestArgs {
        let mut args = RequestArgs::new();
        match self {
            Timeframe::Absolute(absolute) => {
                let mut window = RequestArgs::new();
                window.insert(START.to_string(), Value::String(absolute.start.clone()));
                window.insert(END.to_string(), Value::String(absolute.end.clone()));
                args.insert(TIMEFRAME.to_string(), Value::Object(window));
            }
            Timeframe::Relative(relative) => {
                args.insert(
                    TIMEFRAME.to_string(),
                    Value::String(relative.relative.clone()),
                );
                if let Some(timezone) = &relative.timezone {
                    args.insert(TIMEZONE.to_string(), Value::String(timezone.clone()));
                }
            }
        }
        args
    }
}

impl From<AbsoluteTimeframe> for Timeframe {
    fn from(timeframe: AbsoluteTimeframe) -> Self { Timeframe::Absolute(timeframe) }
}

impl From<RelativeTimeframe> for Timeframe {
    fn from(timeframe: RelativeTimeframe) -> Self { Timeframe::Relative(timeframe) }
}
