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

//! T-Digest implementation for estimating quantiles.
//!
//! The t-digest clusters observed values into weighted centroids whose size is
//! bounded by the K_2 scale function, so accuracy is highest near the tails of
//! the distribution. Digests built independently on different partitions can
//! be merged, which makes this the summary backing
//! [`PercentileResult`](crate::percentiles::PercentileResult) on every shard.
//!
//! # Usage
//!
//! ```rust
//! # use aggregations::tdigest::TDigest;
//! let mut left = TDigest::default();
//! let mut right = TDigest::default();
//! for i in 1..=5 {
//!     left.update(i as f64);
//!     right.update((i + 5) as f64);
//! }
//! left.merge_from(&right);
//! assert_eq!(left.total_weight(), 10);
//! assert_eq!(left.quantile(1.0), Some(10.0));
//! ```

mod serialization;
mod sketch;

pub use self::sketch::TDigest;
