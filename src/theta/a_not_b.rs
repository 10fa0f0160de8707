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

use crate::error::Error;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::MAX_THETA;

/// Stateless set difference of two Theta sketches.
///
/// The result retains the keys of `a` that lie below `min(theta(a),
/// theta(b))` and are absent from `b`. The operand states compose as:
///
/// - `a` empty: the result is empty regardless of `b`.
/// - `b` empty: the result is `a` (as a compact snapshot).
/// - either operand degenerate (theta below max with nothing retained):
///   the thetas still combine, so the result can be degenerate too.
/// - exact-mode operands whose difference is exhaustive produce an empty
///   result; in estimation mode an exhausted difference stays non-empty
///   with zero retained keys.
///
/// # Errors
///
/// Returns an error if both operands are non-empty and their seed hashes
/// differ.
///
/// # Example
///
/// ```
/// use streamsketch::theta::ThetaSketch;
/// use streamsketch::theta::a_not_b;
///
/// let mut a = ThetaSketch::builder().build();
/// let mut b = ThetaSketch::builder().build();
/// for i in 0..1000 {
///     a.update(i);
/// }
/// for i in 500..1000 {
///     b.update(i);
/// }
///
/// let diff = a_not_b(&a, &b, true).unwrap();
/// assert_eq!(diff.estimate(), 500.0);
/// ```
pub fn a_not_b<A, B>(a: &A, b: &B, ordered: bool) -> Result<CompactThetaSketch, Error>
where
    A: ThetaSketchView,
    B: ThetaSketchView,
{
    if !a.is_empty() && !b.is_empty() && a.seed_hash() != b.seed_hash() {
        return Err(Error::incompatible_seed_hash(a.seed_hash(), b.seed_hash()));
    }

    if a.is_empty() {
        return Ok(CompactThetaSketch::from_parts(
            Vec::new(),
            MAX_THETA,
            a.seed_hash(),
            ordered,
            true,
        ));
    }

    let theta = a.theta64().min(b.theta64());

    let mut b_keys: Vec<u64> = b.iter().filter(|&k| k != 0 && k < theta).collect();
    if !b.is_ordered() {
        b_keys.sort_unstable();
    }

    let mut keys: Vec<u64> = a
        .iter()
        .filter(|&k| k != 0 && k < theta && b_keys.binary_search(&k).is_err())
        .collect();
    if ordered && !a.is_ordered() {
        keys.sort_unstable();
    }

    // An exhausted difference in exact mode is indistinguishable from an
    // empty set; under sampling it still witnesses a non-empty source.
    let is_empty = keys.is_empty() && theta == MAX_THETA;
    let result_ordered = ordered || a.is_ordered();

    Ok(CompactThetaSketch::from_parts(
        keys,
        theta,
        a.seed_hash(),
        result_ordered,
        is_empty,
    ))
}
