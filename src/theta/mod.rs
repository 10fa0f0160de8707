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

//! Theta sketches for distinct counting with set algebra.
//!
//! A Theta sketch keeps a uniform sample of the 64-bit hash keys of the
//! distinct items seen so far: every retained key lies below the sampling
//! threshold theta, and theta only decreases over the sketch's lifetime.
//! The distinct-count estimate is `num_retained / theta`.
//!
//! Because the retained keys are themselves a uniform sample, sketches
//! built with the same seed compose under set operations:
//!
//! - [`ThetaUnion`] accumulates any number of sketches.
//! - [`ThetaIntersection`] narrows an accumulated set to the overlap.
//! - [`a_not_b`] computes a stateless set difference.
//!
//! [`ThetaSketch`] is the mutable, updatable form; [`CompactThetaSketch`]
//! is the immutable snapshot used for serialization and as set-operation
//! input.
//!
//! # Usage
//!
//! ```rust
//! # use streamsketch::theta::ThetaSketch;
//! let mut sketch = ThetaSketch::builder().lg_k(12).build();
//! for i in 0..100 {
//!     sketch.update(i);
//! }
//! assert_eq!(sketch.estimate(), 100.0);
//! ```

mod a_not_b;
mod bit_pack;
mod compact;
mod hash_table;
mod intersection;
mod serialization;
mod sketch;
mod union;

pub use self::a_not_b::a_not_b;
pub use self::compact::CompactThetaSketch;
pub use self::hash_table::DEFAULT_LG_K;
pub use self::hash_table::MAX_LG_K;
pub use self::hash_table::MAX_THETA;
pub use self::hash_table::MIN_LG_K;
pub use self::intersection::ThetaIntersection;
pub use self::sketch::ThetaSketch;
pub use self::sketch::ThetaSketchBuilder;
pub use self::union::ThetaUnion;
pub use self::union::ThetaUnionBuilder;

/// Read access to the state every Theta set operation needs from its
/// operands.
///
/// Implemented by both [`ThetaSketch`] and [`CompactThetaSketch`], so set
/// operations accept either form. Keys yielded by [`iter`](Self::iter) are
/// already hashes and must never be re-hashed when passed between sketches.
pub trait ThetaSketchView {
    /// True if the source sketch never received a non-empty update.
    fn is_empty(&self) -> bool;

    /// The sampling threshold as a raw u64.
    fn theta64(&self) -> u64;

    /// Number of retained hash keys.
    fn num_retained(&self) -> usize;

    /// 16-bit hash of the sketch's seed, for compatibility checks.
    fn seed_hash(&self) -> u16;

    /// True if [`iter`](Self::iter) yields keys in ascending order.
    fn is_ordered(&self) -> bool;

    /// Iterates over the retained hash keys.
    fn iter(&self) -> impl Iterator<Item = u64> + '_;
}
