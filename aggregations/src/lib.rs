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

//! Reduction, access and transport of percentile aggregation results.
//!
//! Each partition of a dataset summarizes a numeric field with a mergeable
//! summary such as a [`tdigest::TDigest`]. This crate merges the partial
//! [`percentiles::PercentileResult`]s of all partitions, reads percentile
//! values from the merged result, and moves results between processes in a
//! binary and a document form.

mod codec;

pub mod error;
pub mod percentiles;
pub mod registry;
pub mod summary;
pub mod tdigest;
