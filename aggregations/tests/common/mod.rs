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

#![allow(dead_code)]

use aggregations::error::{Error, ErrorKind};
use aggregations::percentiles::{CutPoints, PercentileResult};
use aggregations::summary::MergeableSummary;
use aggregations::tdigest::TDigest;

/// A summary that keeps every value and answers nearest-rank quantiles exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactSummary {
    values: Vec<f64>,
}

impl ExactSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(f64::total_cmp);
        ExactSummary { values }
    }
}

impl MergeableSummary for ExactSummary {
    fn merge(&self, other: &Self) -> Self {
        ExactSummary::from_values(self.values.iter().chain(&other.values).copied())
    }

    fn quantile(&self, rank: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return f64::NAN;
        }
        let index = ((rank * n as f64).ceil() as usize).clamp(1, n) - 1;
        self.values[index]
    }

    fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.values.len() * 8);
        bytes.extend_from_slice(&(self.values.len() as u32).to_le_bytes());
        for v in &self.values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let (count, rest) = bytes
            .split_first_chunk::<4>()
            .ok_or_else(|| Error::new(ErrorKind::MalformedPayload, "missing count"))?;
        let count = u32::from_le_bytes(*count) as usize;
        if rest.len() != count * 8 {
            return Err(Error::new(
                ErrorKind::MalformedPayload,
                format!("expected {count} values, got {} bytes", rest.len()),
            ));
        }
        let values = rest
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect();
        Ok(ExactSummary { values })
    }
}

pub fn cut_points(percents: &[f64]) -> CutPoints {
    CutPoints::new(percents.to_vec()).unwrap()
}

pub fn exact_result(
    values: impl IntoIterator<Item = f64>,
    percents: &[f64],
    keyed: bool,
) -> PercentileResult<ExactSummary> {
    PercentileResult::new(
        "latency",
        cut_points(percents),
        ExactSummary::from_values(values),
        keyed,
    )
}

pub fn tdigest(values: impl IntoIterator<Item = f64>) -> TDigest {
    let mut td = TDigest::default();
    for v in values {
        td.update(v);
    }
    td
}

pub fn tdigest_result(
    values: impl IntoIterator<Item = f64>,
    percents: &[f64],
    keyed: bool,
) -> PercentileResult<TDigest> {
    PercentileResult::new("latency", cut_points(percents), tdigest(values), keyed)
}
