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

use log::debug;

use crate::error::{Error, ErrorKind};
use crate::percentiles::cut_points::CutPoints;
use crate::percentiles::result::PercentileResult;
use crate::summary::MergeableSummary;

/// Merges partial results into a single live result named `name`.
///
/// Every operand must carry `cut_points` and `keyed`, otherwise the call
/// fails with [`InconsistentOperands`](ErrorKind::InconsistentOperands), and
/// every operand must still be backed by a summary, otherwise it fails with
/// [`UnmergeableOperand`](ErrorKind::UnmergeableOperand). The first summary is
/// cloned as the accumulator and the others are merged into it in order;
/// operands are never modified.
pub fn reduce<S: MergeableSummary>(
    results: &[PercentileResult<S>],
    name: impl Into<String>,
    cut_points: &CutPoints,
    keyed: bool,
) -> Result<PercentileResult<S>, Error> {
    let name = name.into();
    let Some((first, rest)) = results.split_first() else {
        return Err(Error::config_invalid("no results to reduce").with_context("name", name));
    };

    let mut merged = operand_summary(first, 0, cut_points, keyed)?.clone();
    for (i, result) in rest.iter().enumerate() {
        merged = merged.merge(operand_summary(result, i + 1, cut_points, keyed)?);
    }

    debug!(
        "reduced {} partial percentile results into {name:?} ({} cut points, keyed={keyed})",
        results.len(),
        cut_points.len()
    );
    Ok(PercentileResult::new(name, cut_points.clone(), merged, keyed))
}

fn operand_summary<'a, S>(
    result: &'a PercentileResult<S>,
    index: usize,
    cut_points: &CutPoints,
    keyed: bool,
) -> Result<&'a S, Error> {
    if result.cut_points() != cut_points {
        return Err(Error::new(
            ErrorKind::InconsistentOperands,
            format!(
                "cut points differ: expected {:?}, got {:?}",
                cut_points.as_slice(),
                result.cut_points().as_slice()
            ),
        )
        .with_context("index", index));
    }
    if result.keyed() != keyed {
        return Err(Error::new(
            ErrorKind::InconsistentOperands,
            format!("keyed differs: expected {keyed}, got {}", result.keyed()),
        )
        .with_context("index", index));
    }
    result.summary().ok_or_else(|| {
        Error::new(
            ErrorKind::UnmergeableOperand,
            "materialized percentiles cannot be merged",
        )
        .with_context("index", index)
        .with_context("name", result.name())
    })
}

impl<S: MergeableSummary> PercentileResult<S> {
    /// Merges partial results, taking name, cut points and mode from the first one.
    ///
    /// See [`reduce`] for the failure modes.
    pub fn reduce(results: &[Self]) -> Result<Self, Error> {
        let Some(first) = results.first() else {
            return Err(Error::config_invalid("no results to reduce"));
        };
        reduce(results, first.name(), first.cut_points(), first.keyed())
    }
}
