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

//! Document form of a percentile result.
//!
//! A single unkeyed cut point is written as `{ "value": 12.5 }`. Everything
//! else is written as `{ "values": { "50.0": 12.5, "99.0": 30.1 } }` with keys
//! from [`format_percent_key`]. Non-finite values are written as `null`.

use serde_json::{Map, Number, Value};

use crate::error::Error;
use crate::percentiles::cut_points::{CutPoints, format_percent_key};
use crate::percentiles::result::{MaterializedValue, PercentileResult};
use crate::summary::MergeableSummary;

/// Field holding the value of a single unkeyed cut point.
pub const VALUE_FIELD: &str = "value";
/// Field holding the key/value pairs of keyed or multi-point results.
pub const VALUES_FIELD: &str = "values";

impl<S: MergeableSummary> PercentileResult<S> {
    /// Renders this result as a document.
    pub fn to_document(&self) -> Value {
        let mut document = Map::new();
        if is_single_value(self.keyed, &self.cut_points) {
            let value = self.iter().next().map_or(f64::NAN, |p| p.value());
            document.insert(VALUE_FIELD.to_string(), number(value));
        } else {
            let values = self
                .iter()
                .map(|p| (format_percent_key(p.percent()), number(p.value())))
                .collect::<Map<_, _>>();
            document.insert(VALUES_FIELD.to_string(), Value::Object(values));
        }
        Value::Object(document)
    }

    /// Reads a result from a document rendered for `cut_points` and `keyed`.
    ///
    /// The result is always materialized: the document holds final values,
    /// not a summary, so it cannot take part in further reductions. A document
    /// whose shape or keys do not match the request fails with
    /// [`SchemaMismatch`](crate::error::ErrorKind::SchemaMismatch).
    pub fn from_document(
        name: impl Into<String>,
        cut_points: &CutPoints,
        keyed: bool,
        document: &Value,
    ) -> Result<Self, Error> {
        let name = name.into();
        let Some(object) = document.as_object() else {
            return Err(Error::schema_mismatch("percentiles document must be an object")
                .with_context("name", name));
        };

        let values = if is_single_value(keyed, cut_points) {
            if object.contains_key(VALUES_FIELD) {
                return Err(Error::schema_mismatch(format!(
                    "expected a single `{VALUE_FIELD}`, found `{VALUES_FIELD}`"
                ))
                .with_context("name", name));
            }
            let Some(raw) = object.get(VALUE_FIELD) else {
                return Err(Error::schema_mismatch(format!("missing `{VALUE_FIELD}`"))
                    .with_context("name", name));
            };
            let percent = cut_points.as_slice()[0];
            vec![MaterializedValue {
                key: format_percent_key(percent),
                percent,
                value: read_number(raw).map_err(|e| e.with_context("name", &name))?,
            }]
        } else {
            if object.contains_key(VALUE_FIELD) {
                return Err(Error::schema_mismatch(format!(
                    "expected `{VALUES_FIELD}`, found a single `{VALUE_FIELD}`"
                ))
                .with_context("name", name)
                .with_context("keyed", keyed));
            }
            let Some(entries) = object.get(VALUES_FIELD).and_then(Value::as_object) else {
                return Err(
                    Error::schema_mismatch(format!("missing object `{VALUES_FIELD}`"))
                        .with_context("name", name),
                );
            };
            if entries.len() != cut_points.len() {
                return Err(Error::schema_mismatch(format!(
                    "expected {} percentiles, found {}",
                    cut_points.len(),
                    entries.len()
                ))
                .with_context("name", name));
            }
            let mut values = Vec::with_capacity(entries.len());
            for (key, raw) in entries {
                let Some(position) = cut_points.position_of_key(key) else {
                    return Err(Error::schema_mismatch("unexpected percentile key")
                        .with_context("name", name)
                        .with_context("key", key));
                };
                values.push(MaterializedValue {
                    key: key.clone(),
                    percent: cut_points.as_slice()[position],
                    value: read_number(raw).map_err(|e| {
                        e.with_context("name", &name).with_context("key", key)
                    })?,
                });
            }
            values
        };

        Ok(PercentileResult::materialized(
            name,
            cut_points.clone(),
            keyed,
            values,
        ))
    }
}

fn is_single_value(keyed: bool, cut_points: &CutPoints) -> bool {
    !keyed && cut_points.len() == 1
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn read_number(raw: &Value) -> Result<f64, Error> {
    match raw {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::schema_mismatch(format!("{n} is not representable as f64"))),
        other => Err(Error::schema_mismatch(format!(
            "percentile value must be a number or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::tdigest::TDigest;

    #[test]
    fn test_single_unkeyed_is_scalar() {
        let mut td = TDigest::new(100);
        td.update(7.0);
        let cut_points = CutPoints::new(vec![50.0]).unwrap();
        let result = PercentileResult::new("p", cut_points, td, false);
        assert_eq!(result.to_document(), json!({ "value": 7.0 }));
    }

    #[test]
    fn test_empty_summary_renders_null() {
        let cut_points = CutPoints::new(vec![50.0, 99.0]).unwrap();
        let result = PercentileResult::new("p", cut_points, TDigest::default(), true);
        assert_eq!(
            result.to_document(),
            json!({ "values": { "50.0": null, "99.0": null } })
        );
    }

    #[test]
    fn test_null_reads_as_nan() {
        let cut_points = CutPoints::new(vec![50.0]).unwrap();
        let result = PercentileResult::<TDigest>::from_document(
            "p",
            &cut_points,
            false,
            &json!({ "value": null }),
        )
        .unwrap();
        assert!(result.percentile(50.0).unwrap().is_nan());
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        let cut_points = CutPoints::new(vec![50.0]).unwrap();
        let err = PercentileResult::<TDigest>::from_document(
            "p",
            &cut_points,
            true,
            &json!({ "values": { "50.0": "fast" } }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }
}
