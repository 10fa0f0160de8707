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

//! Byte-stream framing shared by all sketch families.
//!
//! Every serialized sketch starts with a preamble whose first four bytes are
//! `(preamble_longs, serial_version, family_id, flags)` followed by
//! family-specific header fields. All multi-byte fields are little-endian;
//! the big-endian flag bit in every family's flags byte must be zero.

mod decode;
mod encode;
mod family;

pub(crate) use self::decode::SketchSlice;
pub(crate) use self::encode::SketchBytes;
pub use self::family::Family;
