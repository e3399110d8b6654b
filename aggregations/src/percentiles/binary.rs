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

//! Binary form of a percentile result.
//!
//! ```text
//! [cut_point_count: u32][cut_points: f64 x count][keyed: u8][summary_len: u32][summary]
//! ```
//!
//! All numbers are little-endian.

use crate::codec::{SketchBytes, SketchSlice};
use crate::error::{Error, ErrorKind};
use crate::percentiles::cut_points::CutPoints;
use crate::percentiles::result::PercentileResult;
use crate::registry;
use crate::summary::MergeableSummary;

const KEYED_FALSE: u8 = 0;
const KEYED_TRUE: u8 = 1;

impl<S: MergeableSummary> PercentileResult<S> {
    /// Serializes this result to bytes.
    ///
    /// Only live results have a binary form; a materialized result fails with
    /// [`UnmergeableOperand`](ErrorKind::UnmergeableOperand).
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let summary = self.summary().ok_or_else(|| {
            Error::new(
                ErrorKind::UnmergeableOperand,
                "materialized percentiles have no binary form",
            )
            .with_context("name", &self.name)
        })?;
        let summary_bytes = summary.serialize();

        let cut_points = self.cut_points.as_slice();
        let mut bytes =
            SketchBytes::with_capacity(4 + cut_points.len() * 8 + 1 + 4 + summary_bytes.len());
        bytes.write_u32_le(cut_points.len() as u32);
        for percent in cut_points {
            bytes.write_f64_le(*percent);
        }
        bytes.write_u8(if self.keyed { KEYED_TRUE } else { KEYED_FALSE });
        bytes.write_len_prefixed(&summary_bytes);
        Ok(bytes.into_bytes())
    }

    /// Deserializes a result named `name` from bytes written by [`serialize`](Self::serialize).
    pub fn deserialize(name: impl Into<String>, bytes: &[u8]) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let name = name.into();
        let mut cursor = SketchSlice::new(bytes);

        let count = cursor.read_u32_le().map_err(make_error("cut_point_count"))? as usize;
        if count == 0 {
            return Err(Error::deserial("cut point count must be > 0").with_context("name", name));
        }
        if count > cursor.remaining().len() / 8 {
            return Err(Error::insufficient_data("cut_points")
                .with_context("name", name)
                .with_context("count", count));
        }
        let mut percents = Vec::with_capacity(count);
        for _ in 0..count {
            percents.push(cursor.read_f64_le().map_err(make_error("cut_points"))?);
        }
        let cut_points = CutPoints::new(percents).map_err(|err| {
            Error::deserial("invalid cut points")
                .with_context("name", &name)
                .set_source(err)
        })?;

        let keyed = match cursor.read_u8().map_err(make_error("keyed"))? {
            KEYED_FALSE => false,
            KEYED_TRUE => true,
            flag => {
                return Err(Error::deserial(format!("invalid keyed flag: {flag}"))
                    .with_context("name", name));
            }
        };

        let summary_bytes = cursor.read_len_prefixed().map_err(make_error("summary"))?;
        let summary = S::deserialize(summary_bytes).map_err(|err| {
            Error::deserial("failed to read summary")
                .with_context("name", &name)
                .set_source(err)
        })?;

        let trailing = cursor.remaining().len();
        if trailing != 0 {
            return Err(
                Error::deserial(format!("{trailing} trailing bytes after percentiles"))
                    .with_context("name", name),
            );
        }

        Ok(PercentileResult::new(name, cut_points, summary, keyed))
    }

    /// Serializes this result inside the registry envelope, tagged with [`Self::TYPE`].
    pub fn to_envelope(&self) -> Result<Vec<u8>, Error> {
        let payload = self.serialize()?;
        Ok(registry::write_envelope(Self::TYPE, &self.name, &payload))
    }
}
