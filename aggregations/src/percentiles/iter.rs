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

use std::slice;

use crate::percentiles::result::MaterializedValue;
use crate::summary::MergeableSummary;

/// A requested percent and the value reported for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentile {
    percent: f64,
    value: f64,
}

impl Percentile {
    pub fn new(percent: f64, value: f64) -> Self {
        Percentile { percent, value }
    }

    /// The requested percent, in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Iterator over the percentiles of a [`PercentileResult`](super::PercentileResult).
///
/// Cloning the iterator restarts nothing; it forks the remaining sequence.
/// Call [`iter`](super::PercentileResult::iter) again to start over.
#[derive(Debug, Clone)]
pub struct PercentileIter<'a, S> {
    inner: Inner<'a, S>,
}

#[derive(Debug, Clone)]
enum Inner<'a, S> {
    Live {
        percents: slice::Iter<'a, f64>,
        summary: &'a S,
    },
    Materialized(slice::Iter<'a, MaterializedValue>),
}

impl<'a, S> PercentileIter<'a, S> {
    pub(super) fn live(percents: &'a [f64], summary: &'a S) -> Self {
        PercentileIter {
            inner: Inner::Live {
                percents: percents.iter(),
                summary,
            },
        }
    }

    pub(super) fn materialized(values: &'a [MaterializedValue]) -> Self {
        PercentileIter {
            inner: Inner::Materialized(values.iter()),
        }
    }
}

impl<S: MergeableSummary> Iterator for PercentileIter<'_, S> {
    type Item = Percentile;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Live { percents, summary } => {
                let percent = *percents.next()?;
                Some(Percentile::new(percent, summary.quantile(percent / 100.0)))
            }
            Inner::Materialized(values) => {
                let v = values.next()?;
                Some(Percentile::new(v.percent, v.value))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Live { percents, .. } => percents.size_hint(),
            Inner::Materialized(values) => values.size_hint(),
        }
    }
}

impl<S: MergeableSummary> ExactSizeIterator for PercentileIter<'_, S> {}
