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

use std::slice::Iter;

use serde_json::Value;

use crate::request::RequestArgs;

/// Something that renders itself into one JSON object of a request, such as
/// a funnel step or a filter.
pub trait RequestParameter {
    fn request_args(&self) -> RequestArgs;
}

/// An ordered list of homogeneous request parameters.
///
/// Order is preserved from construction to rendering: for funnel steps the
/// position in the list is the stage of the funnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameterCollection<T> {
    params: Vec<T>,
}

impl<T> RequestParameterCollection<T> {
    pub fn new(params: Vec<T>) -> Self { Self { params } }

    pub fn len(&self) -> usize { self.params.len() }

    pub fn is_empty(&self) -> bool { self.params.is_empty() }

    pub fn first(&self) -> Option<&T> { self.params.first() }

    pub fn iter(&self) -> Iter<'_, T> { self.params.iter() }

    pub fn as_slice(&self) -> &[T] { &self.params }
}

impl<T: RequestParameter> RequestParameterCollection<T> {
    /// Renders every element in order.
    pub fn request_args(&self) -> Vec<Value> {
        self.params
            .iter()
            .map(|param| Value::Object(param.request_args()))
            .collect()
    }
}

impl<T> Default for RequestParameterCollection<T> {
    fn default() -> Self { Self { params: Vec::new() } }
}

impl<T> From<Vec<T>> for RequestParameterCollection<T> {
    fn from(params: Vec<T>) -> Self { Self::new(params) }
}

impl<T> FromIterator<T> for RequestParameterCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self { Self::new(iter.into_iter().collect()) }
}

impl<'a, T> IntoIterator for &'a RequestParameterCollection<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter { self.params.iter() }
}
