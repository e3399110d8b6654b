// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The capability a distribution summary must offer to back a percentile result.

use crate::error::Error;

/// A compact, mergeable approximation of a value distribution.
///
/// Merging is associative and commutative up to the summary's own accuracy
/// bounds, and the merge of two summaries answers quantile queries as if it
/// had observed the union of both inputs.
pub trait MergeableSummary: Clone + Sized {
    /// Returns a new summary combining `self` and `other`. Neither operand is modified.
    fn merge(&self, other: &Self) -> Self;

    /// Returns the approximate value at the normalized `rank` in `[0.0, 1.0]`.
    fn quantile(&self, rank: f64) -> f64;

    /// Encodes the summary. The encoding is opaque to callers.
    fn serialize(&self) -> Vec<u8>;

    /// Decodes a summary previously produced by [`MergeableSummary::serialize`].
    fn deserialize(bytes: &[u8]) -> Result<Self, Error>;
}
