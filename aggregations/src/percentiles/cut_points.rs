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

use std::sync::Arc;

use crate::error::Error;

/// The lowest percent a cut point may request.
pub const MIN_PERCENT: f64 = 0.0;
/// The highest percent a cut point may request.
pub const MAX_PERCENT: f64 = 100.0;

/// Formats a percent as the key it is reported under in keyed output.
///
/// This is the only place a percent is turned into a key: keyed documents are
/// written with it and materialized lookups search with it, so both sides agree
/// byte for byte. The text is the shortest representation that parses back to
/// the same `f64`, and integral values keep a fractional part.
///
/// ```
/// # use aggregations::percentiles::format_percent_key;
/// assert_eq!(format_percent_key(50.0), "50.0");
/// assert_eq!(format_percent_key(99.9), "99.9");
/// assert_eq!(format_percent_key(100.0), "100.0");
/// ```
pub fn format_percent_key(percent: f64) -> String {
    format!("{percent:?}")
}

/// The percentiles requested by a query, in the order they were requested.
///
/// Cut points are shared by every partial result of one query, so cloning is
/// a reference count bump.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPoints(Arc<[f64]>);

impl CutPoints {
    /// Validates and wraps the requested percents.
    ///
    /// Fails with [`ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// when the list is empty, when a percent is not a finite value in
    /// `[0, 100]`, or when two percents share the same key.
    pub fn new(percents: impl Into<Vec<f64>>) -> Result<Self, Error> {
        let mut percents = percents.into();
        if percents.is_empty() {
            return Err(Error::config_invalid("at least one percent is required"));
        }
        for (index, percent) in percents.iter_mut().enumerate() {
            if !is_valid_percent(*percent) {
                return Err(Error::config_invalid(format!(
                    "percent must be in [{MIN_PERCENT}, {MAX_PERCENT}], got {percent}"
                ))
                .with_context("index", index));
            }
            // -0.0 and 0.0 are the same cut point
            *percent += 0.0;
        }
        for (index, percent) in percents.iter().enumerate() {
            if percents[..index].contains(percent) {
                return Err(Error::config_invalid(format!(
                    "duplicate percent {}",
                    format_percent_key(*percent)
                ))
                .with_context("index", index));
            }
        }
        Ok(CutPoints(percents.into()))
    }

    /// Returns the percents in request order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the number of cut points. Never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no cut points.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the position of the cut point reported under `key`.
    pub(crate) fn position_of_key(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|p| format_percent_key(*p) == key)
    }
}

impl TryFrom<Vec<f64>> for CutPoints {
    type Error = Error;

    fn try_from(percents: Vec<f64>) -> Result<Self, Self::Error> {
        CutPoints::new(percents)
    }
}

impl TryFrom<&[f64]> for CutPoints {
    type Error = Error;

    fn try_from(percents: &[f64]) -> Result<Self, Self::Error> {
        CutPoints::new(percents.to_vec())
    }
}

pub(crate) fn is_valid_percent(percent: f64) -> bool {
    (MIN_PERCENT..=MAX_PERCENT).contains(&percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_keys() {
        assert_eq!(format_percent_key(0.0), "0.0");
        assert_eq!(format_percent_key(1.0), "1.0");
        assert_eq!(format_percent_key(25.5), "25.5");
        assert_eq!(format_percent_key(99.99), "99.99");
    }

    #[test]
    fn test_keeps_request_order() {
        let cut_points = CutPoints::new(vec![99.0, 50.0, 1.0]).unwrap();
        assert_eq!(cut_points.as_slice(), &[99.0, 50.0, 1.0]);
        assert_eq!(cut_points.len(), 3);
        assert_eq!(cut_points.position_of_key("50.0"), Some(1));
        assert_eq!(cut_points.position_of_key("50"), None);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let cut_points = CutPoints::new(vec![-0.0]).unwrap();
        assert!(cut_points.as_slice()[0].is_sign_positive());
        assert_eq!(cut_points.position_of_key("0.0"), Some(0));
    }

    #[test]
    fn test_rejects_invalid() {
        for percents in [
            vec![],
            vec![-1.0],
            vec![100.5],
            vec![f64::NAN],
            vec![f64::INFINITY],
        ] {
            let err = CutPoints::new(percents).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        // equal percents would share one key
        for percents in [vec![50.0, 50.0], vec![99.0, 50.0, 99.0], vec![0.0, -0.0]] {
            let err = CutPoints::new(percents).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
            assert!(err.message().contains("duplicate percent"));
        }
        let err = CutPoints::new(vec![25.0, 75.0, 25.0]).unwrap_err();
        assert!(err.to_string().contains("index: 2"));
    }
}
