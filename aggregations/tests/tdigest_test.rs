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

use aggregations::tdigest::TDigest;
use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;

#[test]
fn test_empty() {
    let tdigest = TDigest::new(10);
    assert!(tdigest.is_empty());
    assert_eq!(tdigest.k(), 10);
    assert_eq!(tdigest.total_weight(), 0);
    assert_eq!(tdigest.min_value(), None);
    assert_eq!(tdigest.max_value(), None);
    assert_eq!(tdigest.quantile(0.5), None);
}

#[test]
#[should_panic(expected = "k must be at least 10")]
fn test_k_too_small_panics() {
    TDigest::new(9);
}

#[test]
#[should_panic(expected = "rank must be in [0.0, 1.0]")]
fn test_quantile_out_of_range_panics() {
    let mut tdigest = TDigest::default();
    tdigest.update(1.0);
    tdigest.quantile(1.5);
}

#[test]
fn test_one_value() {
    let mut tdigest = TDigest::new(100);
    tdigest.update(1.0);
    assert_eq!(tdigest.k(), 100);
    assert_eq!(tdigest.total_weight(), 1);
    assert_eq!(tdigest.min_value(), Some(1.0));
    assert_eq!(tdigest.max_value(), Some(1.0));
    assert_eq!(tdigest.quantile(0.0), Some(1.0));
    assert_eq!(tdigest.quantile(0.5), Some(1.0));
    assert_eq!(tdigest.quantile(1.0), Some(1.0));
}

#[test]
fn test_nan_ignored() {
    let mut tdigest = TDigest::new(100);
    tdigest.update(f64::NAN);
    assert!(tdigest.is_empty());
    tdigest.update(2.0);
    tdigest.update(f64::NAN);
    assert_eq!(tdigest.total_weight(), 1);
}

#[test]
fn test_many_values() {
    let n = 10000;
    let mut tdigest = TDigest::default();
    for i in 0..n {
        tdigest.update(i as f64);
    }
    let n = n as f64;
    assert!(!tdigest.is_empty());
    assert_eq!(tdigest.total_weight(), 10000);
    assert_eq!(tdigest.min_value(), Some(0.0));
    assert_eq!(tdigest.max_value(), Some(n - 1.0));
    assert_eq!(tdigest.quantile(0.0), Some(0.0));
    assert_that!(tdigest.quantile(0.5).unwrap(), near(n / 2.0, n * 0.03));
    assert_that!(tdigest.quantile(0.9).unwrap(), near(n * 0.9, n * 0.01));
    assert_that!(tdigest.quantile(0.95).unwrap(), near(n * 0.95, n * 0.01));
    assert_eq!(tdigest.quantile(1.0), Some(n - 1.0));
}

#[test]
fn test_quantiles_are_monotonic() {
    let mut tdigest = TDigest::new(50);
    for i in 0..5000 {
        tdigest.update(((i * 7919) % 5000) as f64);
    }
    let mut previous = f64::NEG_INFINITY;
    for step in 0..=100 {
        let q = tdigest.quantile(step as f64 / 100.0).unwrap();
        assert_that!(q, ge(previous));
        previous = q;
    }
    assert_that!(previous, le(4999.0));
}

#[test]
fn test_merge() {
    let n = 10000;
    let mut left = TDigest::new(100);
    let mut right = TDigest::new(100);
    for i in 0..n / 2 {
        left.update(i as f64);
        right.update((n / 2 + i) as f64);
    }

    left.merge_from(&right);
    let n = n as f64;
    assert_eq!(left.total_weight(), 10000);
    assert_eq!(left.min_value(), Some(0.0));
    assert_eq!(left.max_value(), Some(n - 1.0));
    assert_that!(left.quantile(0.5).unwrap(), near(n / 2.0, n * 0.03));
    assert_that!(left.quantile(0.9).unwrap(), near(n * 0.9, n * 0.01));
}

#[test]
fn test_merge_empty() {
    let mut tdigest = TDigest::new(100);
    tdigest.update(5.0);
    let before = tdigest.clone();

    tdigest.merge_from(&TDigest::new(100));
    assert_eq!(tdigest, before);

    let mut empty = TDigest::new(100);
    empty.merge_from(&before);
    assert_eq!(empty.total_weight(), 1);
    assert_eq!(empty.quantile(0.5), Some(5.0));
}
