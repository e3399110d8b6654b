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

mod common;

use aggregations::error::ErrorKind;
use aggregations::percentiles::{Percentile, PercentileResult, format_percent_key};
use common::{ExactSummary, cut_points, exact_result, tdigest_result};
use googletest::assert_that;
use googletest::prelude::contains_substring;
use serde_json::json;

fn values(result: &PercentileResult<ExactSummary>) -> Vec<(f64, f64)> {
    result.iter().map(|p| (p.percent(), p.value())).collect()
}

#[test]
fn test_live_lookup() {
    let result = exact_result((1..=100).map(f64::from), &[50.0, 95.0, 99.0], false);
    assert_eq!(result.percentile(50.0).unwrap(), 50.0);
    assert_eq!(result.percentile(95.0).unwrap(), 95.0);
    // any percent can be asked of a live result, not just the cut points
    assert_eq!(result.percentile(10.0).unwrap(), 10.0);
    assert_eq!(result.percentile(0.0).unwrap(), 1.0);
    assert_eq!(result.percentile(100.0).unwrap(), 100.0);
}

#[test]
fn test_live_out_of_range() {
    let result = exact_result([1.0, 2.0], &[50.0], false);
    for percent in [-0.1, 100.1, f64::NAN] {
        let err = result.percentile(percent).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}

#[test]
fn test_unkeyed_iteration_order() {
    let result = exact_result((1..=100).map(f64::from), &[50.0, 95.0, 99.0], false);

    let iter = result.iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(values(&result), vec![(50.0, 50.0), (95.0, 95.0), (99.0, 99.0)]);
}

#[test]
fn test_iteration_follows_request_order() {
    let result = exact_result((1..=100).map(f64::from), &[99.0, 1.0, 50.0], false);
    let percents: Vec<f64> = result.iter().map(|p| p.percent()).collect();
    assert_eq!(percents, vec![99.0, 1.0, 50.0]);
}

#[test]
fn test_iteration_is_restartable() {
    let result = tdigest_result((0..500).map(f64::from), &[25.0, 75.0], true);

    let first: Vec<Percentile> = result.iter().collect();
    let second: Vec<Percentile> = (&result).into_iter().collect();
    assert_eq!(first, second);

    let mut iter = result.iter();
    let head = iter.next().unwrap();
    let fork = iter.clone();
    assert_eq!(iter.collect::<Vec<_>>(), fork.collect::<Vec<_>>());
    assert_eq!(head, first[0]);

    let mut count = 0;
    for p in &result {
        assert_eq!(p.value(), result.percentile(p.percent()).unwrap());
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn test_value_by_key() {
    let result = exact_result((1..=100).map(f64::from), &[50.0, 99.0], true);
    assert_eq!(result.value("99.0").unwrap(), 99.0);
    assert_eq!(result.value("99").unwrap(), 99.0);

    let err = result.value("p99").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownPercentileKey);
}

#[test]
fn test_materialized_lookup() {
    let percents = cut_points(&[50.0, 95.0, 99.0]);
    let result = PercentileResult::<ExactSummary>::from_document(
        "latency",
        &percents,
        true,
        &json!({ "values": { "50.0": 12.0, "95.0": 40.5, "99.0": 81.25 } }),
    )
    .unwrap();

    assert!(result.is_materialized());
    assert!(result.summary().is_none());
    assert_eq!(result.percentile(50.0).unwrap(), 12.0);
    assert_eq!(result.percentile(99.0).unwrap(), 81.25);
    assert_eq!(result.value("95.0").unwrap(), 40.5);
    assert_eq!(
        values(&result),
        vec![(50.0, 12.0), (95.0, 40.5), (99.0, 81.25)]
    );
}

#[test]
fn test_materialized_lookup_miss() {
    let percents = cut_points(&[50.0, 99.0]);
    let result = PercentileResult::<ExactSummary>::from_document(
        "latency",
        &percents,
        true,
        &json!({ "values": { "50.0": 12.0, "99.0": 81.25 } }),
    )
    .unwrap();

    for percent in [75.0, 99.9, 150.0] {
        let err = result.percentile(percent).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownPercentileKey);
        let text = err.to_string();
        let key = format_percent_key(percent);
        assert_that!(text.as_str(), contains_substring(key.as_str()));
    }
}

#[test]
fn test_materialized_keeps_document_order() {
    let percents = cut_points(&[50.0, 95.0, 99.0]);
    let result = PercentileResult::<ExactSummary>::from_document(
        "latency",
        &percents,
        true,
        &json!({ "values": { "99.0": 3.0, "50.0": 1.0, "95.0": 2.0 } }),
    )
    .unwrap();

    assert_eq!(values(&result), vec![(99.0, 3.0), (50.0, 1.0), (95.0, 2.0)]);
    assert_eq!(result.iter().len(), 3);
}
