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

use crate::error::{Error, ErrorKind};
use crate::percentiles::cut_points::{
    CutPoints, MAX_PERCENT, MIN_PERCENT, format_percent_key, is_valid_percent,
};
use crate::percentiles::iter::PercentileIter;
use crate::registry::ResultType;
use crate::summary::MergeableSummary;

/// The percentiles of one field, either for a single partition or merged across partitions.
///
/// See the [module documentation](super) for more details.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileResult<S> {
    pub(super) name: String,
    pub(super) cut_points: CutPoints,
    pub(super) keyed: bool,
    pub(super) values: Values<S>,
}

/// Where the percentile values of a result come from.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Values<S> {
    /// Computed on demand from a summary that can still be merged.
    Live(S),
    /// Fixed values decoded from a document, in document order.
    Materialized(Vec<MaterializedValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct MaterializedValue {
    pub(super) key: String,
    pub(super) percent: f64,
    pub(super) value: f64,
}

impl<S> PercentileResult<S> {
    /// The identifier this result type is registered and framed under.
    pub const TYPE: ResultType = ResultType::new("tdigest_percentiles", 20);

    /// Creates a live result backed by `summary`.
    pub fn new(name: impl Into<String>, cut_points: CutPoints, summary: S, keyed: bool) -> Self {
        PercentileResult {
            name: name.into(),
            cut_points,
            keyed,
            values: Values::Live(summary),
        }
    }

    pub(super) fn materialized(
        name: String,
        cut_points: CutPoints,
        keyed: bool,
        values: Vec<MaterializedValue>,
    ) -> Self {
        debug_assert_eq!(values.len(), cut_points.len());
        PercentileResult {
            name,
            cut_points,
            keyed,
            values: Values::Materialized(values),
        }
    }

    /// Returns the aggregation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requested percents.
    pub fn cut_points(&self) -> &CutPoints {
        &self.cut_points
    }

    /// Returns true if the result is reported as key/value pairs.
    pub fn keyed(&self) -> bool {
        self.keyed
    }

    /// Returns the backing summary, or `None` for a materialized result.
    pub fn summary(&self) -> Option<&S> {
        match &self.values {
            Values::Live(summary) => Some(summary),
            Values::Materialized(_) => None,
        }
    }

    /// Returns true if the values were decoded from a document and can no longer be merged.
    pub fn is_materialized(&self) -> bool {
        matches!(self.values, Values::Materialized(_))
    }
}

impl<S: MergeableSummary> PercentileResult<S> {
    /// Returns the value at `percent`.
    ///
    /// A live result asks its summary for the quantile at `percent / 100` and
    /// rejects percents outside `[0, 100]`. A materialized result looks up the
    /// key [`format_percent_key`] gives for `percent` and fails with
    /// [`UnknownPercentileKey`](ErrorKind::UnknownPercentileKey) if it holds no
    /// such key.
    pub fn percentile(&self, percent: f64) -> Result<f64, Error> {
        match &self.values {
            Values::Live(summary) => {
                if !is_valid_percent(percent) {
                    return Err(Error::config_invalid(format!(
                        "percent must be in [{MIN_PERCENT}, {MAX_PERCENT}], got {percent}"
                    ))
                    .with_context("name", &self.name));
                }
                Ok(summary.quantile(percent / 100.0))
            }
            Values::Materialized(values) => {
                let key = format_percent_key(percent);
                values
                    .iter()
                    .find(|v| v.key == key)
                    .map(|v| v.value)
                    .ok_or_else(|| {
                        Error::new(ErrorKind::UnknownPercentileKey, "no value for percentile")
                            .with_context("name", &self.name)
                            .with_context("key", key)
                    })
            }
        }
    }

    /// Returns the value of the percentile named by `key`, e.g. `"99.0"`.
    pub fn value(&self, key: &str) -> Result<f64, Error> {
        let percent = key.parse::<f64>().map_err(|err| {
            Error::new(ErrorKind::UnknownPercentileKey, "percentile key is not a number")
                .with_context("name", &self.name)
                .with_context("key", key)
                .set_source(err)
        })?;
        self.percentile(percent)
    }

    /// Returns an iterator over the `(percent, value)` pairs of this result.
    ///
    /// Live results yield the cut points in request order and compute each
    /// value when it is reached. Materialized results yield their stored pairs
    /// in the order they were decoded.
    pub fn iter(&self) -> PercentileIter<'_, S> {
        match &self.values {
            Values::Live(summary) => PercentileIter::live(self.cut_points.as_slice(), summary),
            Values::Materialized(values) => PercentileIter::materialized(values),
        }
    }
}

impl<'a, S: MergeableSummary> IntoIterator for &'a PercentileResult<S> {
    type Item = crate::percentiles::Percentile;
    type IntoIter = PercentileIter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
