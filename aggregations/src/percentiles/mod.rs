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

//! Percentile aggregation results.
//!
//! Every partition of a dataset builds its own [`PercentileResult`] over a
//! [`MergeableSummary`]. The coordinating node decodes the partial results,
//! [`reduce`]s them into one, and reads percentiles from the merged result.
//!
//! # Live and materialized results
//!
//! A result is either *live*, backed by a summary that answers any percentile
//! and can be merged again, or *materialized*, holding fixed values decoded
//! from the document form. Materialized results can be read but not merged,
//! and only live results have a binary form.
//!
//! # Keyed and ordered output
//!
//! A keyed result reports its values under the keys produced by
//! [`format_percent_key`]; an ordered one reports them in the order the cut
//! points were requested. Iteration always yields one [`Percentile`] per cut
//! point.
//!
//! # Usage
//!
//! ```rust
//! # use aggregations::percentiles::{CutPoints, PercentileResult};
//! # use aggregations::tdigest::TDigest;
//! let cut_points = CutPoints::new(vec![50.0, 100.0]).unwrap();
//! let partials: Vec<_> = [1..=10, 11..=20]
//!     .into_iter()
//!     .map(|range| {
//!         let mut td = TDigest::default();
//!         range.for_each(|v| td.update(v as f64));
//!         PercentileResult::new("latency", cut_points.clone(), td, false)
//!     })
//!     .collect();
//!
//! let merged = PercentileResult::reduce(&partials).unwrap();
//! assert_eq!(merged.percentile(100.0).unwrap(), 20.0);
//! assert_eq!(merged.iter().count(), 2);
//! ```
//!
//! [`MergeableSummary`]: crate::summary::MergeableSummary

mod binary;
mod cut_points;
mod document;
mod iter;
mod reduce;
mod result;

use crate::error::Error;
use crate::registry::{ResultRegistry, ResultStream};
use crate::summary::MergeableSummary;

pub use self::cut_points::{CutPoints, MAX_PERCENT, MIN_PERCENT, format_percent_key};
pub use self::document::{VALUE_FIELD, VALUES_FIELD};
pub use self::iter::{Percentile, PercentileIter};
pub use self::reduce::reduce;
pub use self::result::PercentileResult;

/// Registers the binary and document readers of [`PercentileResult`] under
/// [`PercentileResult::TYPE`].
///
/// Call once while the registry is being set up, before any payload is read.
pub fn register_streams<S: MergeableSummary>(
    registry: &mut ResultRegistry<PercentileResult<S>>,
) -> Result<(), Error> {
    registry.register(
        PercentileResult::<S>::TYPE,
        ResultStream {
            read_binary: |name, bytes| PercentileResult::deserialize(name, bytes),
            read_document: |name, cut_points, keyed, document| {
                PercentileResult::from_document(name, cut_points, keyed, document)
            },
        },
    )
}
