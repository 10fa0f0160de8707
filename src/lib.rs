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

//! Compact, mergeable probabilistic sketches for streaming analytics.
//!
//! This crate provides a family of sketches that answer approximate queries
//! over very large or unbounded streams in bounded memory:
//!
//! - [`theta`] — distinct counting with set algebra (union, intersection,
//!   A-not-B) over a sampled set of 64-bit hash keys.
//! - [`kll`] — streaming quantiles, ranks, PMF and CDF.
//! - [`countmin`] — approximate frequency counts with one-sided error.
//! - [`frequencies`] — heavy hitters with deterministic error bounds.
//! - [`bloom`] — set membership with no false negatives.
//!
//! All sketches are mergeable: independent workers can sketch disjoint
//! partitions of a stream and the results combine with well-defined error.
//! Serialized forms use little-endian preamble-framed byte layouts that are
//! stable across processes.
//!
//! # Example
//!
//! ```
//! use streamsketch::theta::ThetaSketch;
//! use streamsketch::theta::ThetaUnion;
//!
//! let mut a = ThetaSketch::builder().build();
//! let mut b = ThetaSketch::builder().build();
//! for i in 0..1000 {
//!     a.update(i);
//!     b.update(i + 500);
//! }
//!
//! let mut union = ThetaUnion::builder().build();
//! union.update(&a).unwrap();
//! union.update(&b).unwrap();
//! assert_eq!(union.result(true).estimate(), 1500.0);
//! ```

pub mod bloom;
pub mod codec;
pub mod common;
pub mod countmin;
pub mod error;
pub mod frequencies;
pub mod hash;
pub mod kll;
pub mod theta;
