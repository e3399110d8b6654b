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

//! Binary serialization of [`TDigest`].
//!
//! The layout follows the DataSketches t-digest format for `double` values:
//! an 8 byte preamble, then either nothing (empty), a single value, or the
//! centroid and buffer sections.

use crate::codec::{SketchBytes, SketchSlice};
use crate::error::Error;
use crate::tdigest::sketch::{BUFFER_MULTIPLIER, Centroid, TDigest, centroids_capacity};

const PREAMBLE_LONGS_EMPTY_OR_SINGLE: u8 = 1;
const PREAMBLE_LONGS_MULTIPLE: u8 = 2;
const SERIAL_VERSION: u8 = 1;
const TDIGEST_FAMILY_ID: u8 = 20;

const FLAG_EMPTY: u8 = 1 << 0;
const FLAG_SINGLE_VALUE: u8 = 1 << 1;
const FLAG_REVERSE_MERGE: u8 = 1 << 2;

const PREAMBLE_BYTES: usize = 8;
const CENTROID_BYTES: usize = 16;

impl TDigest {
    /// Serializes this TDigest to bytes.
    ///
    /// Buffered values are written as they are, so serializing does not
    /// change the digest and the same digest always produces the same bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let is_single_value = self.total_weight() == 1;

        let preamble_longs = if is_empty || is_single_value {
            PREAMBLE_LONGS_EMPTY_OR_SINGLE
        } else {
            PREAMBLE_LONGS_MULTIPLE
        };
        let flags = (if is_empty { FLAG_EMPTY } else { 0 })
            | (if is_single_value { FLAG_SINGLE_VALUE } else { 0 })
            | (if self.reverse_merge {
                FLAG_REVERSE_MERGE
            } else {
                0
            });

        let mut bytes = SketchBytes::with_capacity(
            PREAMBLE_BYTES
                + 24
                + self.centroids.len() * CENTROID_BYTES
                + self.buffer.len() * 8,
        );
        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(TDIGEST_FAMILY_ID);
        bytes.write_u16_le(self.k);
        bytes.write_u8(flags);
        bytes.write_u16_le(0);

        if is_empty {
            return bytes.into_bytes();
        }
        if is_single_value {
            bytes.write_f64_le(self.min);
            return bytes.into_bytes();
        }

        bytes.write_u32_le(self.centroids.len() as u32);
        bytes.write_u32_le(self.buffer.len() as u32);
        bytes.write_f64_le(self.min);
        bytes.write_f64_le(self.max);
        for centroid in &self.centroids {
            bytes.write_f64_le(centroid.mean);
            bytes.write_u64_le(centroid.weight);
        }
        for value in &self.buffer {
            bytes.write_f64_le(*value);
        }
        bytes.into_bytes()
    }

    /// Deserializes a TDigest from bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<TDigest, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let k = cursor.read_u16_le().map_err(make_error("k"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let _unused = cursor.read_u16_le().map_err(make_error("unused"))?;

        if family_id != TDIGEST_FAMILY_ID {
            return Err(Error::invalid_family(
                TDIGEST_FAMILY_ID,
                family_id,
                "TDIGEST",
            ));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::deserial(format!(
                "invalid serial version: {serial_version}"
            )));
        }
        if k < TDigest::MIN_K {
            return Err(Error::deserial(format!("k out of range: {k}")));
        }

        let is_empty = (flags & FLAG_EMPTY) != 0;
        let is_single_value = (flags & FLAG_SINGLE_VALUE) != 0;
        let reverse_merge = (flags & FLAG_REVERSE_MERGE) != 0;
        let expected_preamble_longs = if is_empty || is_single_value {
            PREAMBLE_LONGS_EMPTY_OR_SINGLE
        } else {
            PREAMBLE_LONGS_MULTIPLE
        };
        if preamble_longs != expected_preamble_longs {
            return Err(Error::deserial(format!(
                "invalid preamble longs: expected {expected_preamble_longs}, got {preamble_longs}"
            )));
        }

        let mut tdigest = TDigest::new(k);
        tdigest.reverse_merge = reverse_merge;
        if is_empty {
            return finish(tdigest, cursor);
        }

        if is_single_value {
            let value = cursor.read_f64_le().map_err(make_error("single_value"))?;
            if value.is_nan() {
                return Err(Error::deserial("single value must not be NaN"));
            }
            tdigest.min = value;
            tdigest.max = value;
            tdigest.centroids.push(Centroid {
                mean: value,
                weight: 1,
            });
            tdigest.centroids_weight = 1;
            return finish(tdigest, cursor);
        }

        let num_centroids = cursor.read_u32_le().map_err(make_error("num_centroids"))? as usize;
        let num_buffered = cursor.read_u32_le().map_err(make_error("num_buffered"))? as usize;
        if num_buffered > centroids_capacity(k) * BUFFER_MULTIPLIER {
            return Err(Error::deserial(format!(
                "too many buffered values for k={k}: {num_buffered}"
            )));
        }
        tdigest.min = cursor.read_f64_le().map_err(make_error("min"))?;
        tdigest.max = cursor.read_f64_le().map_err(make_error("max"))?;

        for _ in 0..num_centroids {
            let mean = cursor.read_f64_le().map_err(make_error("centroid_mean"))?;
            let weight = cursor.read_u64_le().map_err(make_error("centroid_weight"))?;
            if mean.is_nan() || weight == 0 {
                return Err(Error::deserial(format!(
                    "invalid centroid: mean={mean}, weight={weight}"
                )));
            }
            tdigest.centroids_weight = tdigest
                .centroids_weight
                .checked_add(weight)
                .ok_or_else(|| Error::deserial("total weight overflow"))?;
            tdigest.centroids.push(Centroid { mean, weight });
        }
        for _ in 0..num_buffered {
            let value = cursor.read_f64_le().map_err(make_error("buffered_value"))?;
            if value.is_nan() {
                return Err(Error::deserial("buffered value must not be NaN"));
            }
            tdigest.buffer.push(value);
        }
        if tdigest.total_weight() < 2 {
            return Err(Error::deserial(format!(
                "multi-value digest carries total weight {}",
                tdigest.total_weight()
            )));
        }

        finish(tdigest, cursor)
    }
}

fn finish(tdigest: TDigest, cursor: SketchSlice<'_>) -> Result<TDigest, Error> {
    let trailing = cursor.remaining().len();
    if trailing != 0 {
        return Err(Error::deserial(format!(
            "{trailing} trailing bytes after tdigest"
        )));
    }
    Ok(tdigest)
}
