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

//! Dispatch of incoming payloads to the reader of their result type.
//!
//! Binary payloads travel inside an envelope naming their type and aggregation:
//!
//! ```text
//! [type_code: u8][name_len: u32][name: utf-8][payload]
//! ```
//!
//! A [`ResultRegistry`] is built and populated explicitly during startup; there
//! is no global instance.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use serde_json::Value;

use crate::codec::{SketchBytes, SketchSlice};
use crate::error::{Error, ErrorKind};
use crate::percentiles::CutPoints;

/// Stable identifier of a result type: a name and a one byte wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultType {
    name: &'static str,
    code: u8,
}

impl ResultType {
    pub const fn new(name: &'static str, code: u8) -> Self {
        ResultType { name, code }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> u8 {
        self.code
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.code)
    }
}

/// Reads the payload of an envelope; receives the aggregation name and the payload bytes.
pub type ReadBinary<R> = fn(String, &[u8]) -> Result<R, Error>;

/// Reads a document rendered for the given cut points and keyed mode.
pub type ReadDocument<R> = fn(String, &CutPoints, bool, &Value) -> Result<R, Error>;

/// The readers registered for one result type.
pub struct ResultStream<R> {
    pub read_binary: ReadBinary<R>,
    pub read_document: ReadDocument<R>,
}

/// Maps result types, by code and by name, to their readers.
pub struct ResultRegistry<R> {
    streams: HashMap<u8, (ResultType, ResultStream<R>)>,
    codes_by_name: HashMap<&'static str, u8>,
}

impl<R> Default for ResultRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResultRegistry<R> {
    pub fn new() -> Self {
        ResultRegistry {
            streams: HashMap::new(),
            codes_by_name: HashMap::new(),
        }
    }

    /// Registers the readers of `ty`.
    ///
    /// Fails with [`ConfigInvalid`](ErrorKind::ConfigInvalid) if the name or
    /// the code of `ty` is already taken.
    pub fn register(&mut self, ty: ResultType, stream: ResultStream<R>) -> Result<(), Error> {
        if let Some((existing, _)) = self.streams.get(&ty.code) {
            return Err(Error::config_invalid(format!(
                "type code {} is already registered by {existing}",
                ty.code
            ))
            .with_context("type", ty));
        }
        if let Some(code) = self.codes_by_name.get(ty.name) {
            return Err(Error::config_invalid(format!(
                "type name {} is already registered with code {code}",
                ty.name
            ))
            .with_context("type", ty));
        }
        self.codes_by_name.insert(ty.name, ty.code);
        self.streams.insert(ty.code, (ty, stream));
        debug!("registered result type {ty}");
        Ok(())
    }

    /// Returns the number of registered result types.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn stream_by_code(&self, code: u8) -> Option<&ResultStream<R>> {
        self.streams.get(&code).map(|(_, stream)| stream)
    }

    pub fn stream_by_name(&self, name: &str) -> Option<&ResultStream<R>> {
        let code = self.codes_by_name.get(name)?;
        self.stream_by_code(*code)
    }

    /// Reads an enveloped binary payload with the reader registered for its type code.
    pub fn read(&self, bytes: &[u8]) -> Result<R, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);
        let code = cursor.read_u8().map_err(make_error("type_code"))?;
        let name = cursor.read_len_prefixed().map_err(make_error("name"))?;
        let name = String::from_utf8(name.to_vec()).map_err(|err| {
            Error::deserial("aggregation name is not valid utf-8").set_source(err)
        })?;

        let Some(stream) = self.stream_by_code(code) else {
            warn!("dropping payload of {name:?} with unregistered type code {code}");
            return Err(Error::deserial(format!("unknown type code {code}"))
                .with_context("name", name));
        };
        (stream.read_binary)(name, cursor.remaining())
    }

    /// Reads a document with the reader registered under `type_name`.
    pub fn read_document(
        &self,
        type_name: &str,
        name: impl Into<String>,
        cut_points: &CutPoints,
        keyed: bool,
        document: &Value,
    ) -> Result<R, Error> {
        let name = name.into();
        let Some(stream) = self.stream_by_name(type_name) else {
            warn!("dropping document of {name:?} with unregistered type {type_name:?}");
            return Err(Error::new(
                ErrorKind::SchemaMismatch,
                format!("unknown type {type_name:?}"),
            )
            .with_context("name", name));
        };
        (stream.read_document)(name, cut_points, keyed, document)
    }
}

/// Wraps `payload` in the envelope read by [`ResultRegistry::read`].
pub fn write_envelope(ty: ResultType, name: &str, payload: &[u8]) -> Vec<u8> {
    let mut bytes = SketchBytes::with_capacity(1 + 4 + name.len() + payload.len());
    bytes.write_u8(ty.code);
    bytes.write_len_prefixed(name.as_bytes());
    bytes.write(payload);
    bytes.into_bytes()
}
