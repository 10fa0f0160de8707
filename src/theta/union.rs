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

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::DEFAULT_LG_K;
use crate::theta::hash_table::MAX_LG_K;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::MIN_LG_K;
use crate::theta::hash_table::ThetaHashTable;

/// Stateful union operator for Theta sketches.
///
/// The union holds an internal hash table with its own nominal size and
/// seed. Input keys are already hashes and are inserted directly; they are
/// screened against the running union theta (the minimum theta seen along
/// the union path) and the table's own theta, which may drop further as the
/// table rebuilds.
///
/// # Example
///
/// ```
/// use streamsketch::theta::ThetaSketch;
/// use streamsketch::theta::ThetaUnion;
///
/// let mut a = ThetaSketch::builder().build();
/// let mut b = ThetaSketch::builder().build();
/// for i in 0..100 {
///     a.update(i);
///     b.update(i + 50);
/// }
///
/// let mut union = ThetaUnion::builder().build();
/// union.update(&a).unwrap();
/// union.update(&b.compact(true)).unwrap();
/// assert_eq!(union.result(true).estimate(), 150.0);
/// ```
#[derive(Debug)]
pub struct ThetaUnion {
    table: ThetaHashTable,
    union_theta: u64,
}

impl ThetaUnion {
    /// Create a new builder for ThetaUnion.
    pub fn builder() -> ThetaUnionBuilder {
        ThetaUnionBuilder::default()
    }

    /// Creates a union with the default nominal size and seed.
    pub fn new_with_default_seed() -> Self {
        Self::builder().build()
    }

    /// Merges a sketch into the union.
    ///
    /// # Errors
    ///
    /// Returns an error if the sketch was built with an incompatible seed.
    /// The union state is unchanged on error.
    pub fn update<S: ThetaSketchView>(&mut self, sketch: &S) -> Result<(), Error> {
        if sketch.is_empty() {
            return Ok(());
        }
        if sketch.seed_hash() != self.table.seed_hash() {
            return Err(Error::incompatible_seed_hash(
                self.table.seed_hash(),
                sketch.seed_hash(),
            ));
        }

        self.table.set_empty(false);
        self.union_theta = self.union_theta.min(sketch.theta64());

        for hash in sketch.iter() {
            if hash == 0 {
                continue;
            }
            if hash >= self.union_theta {
                if sketch.is_ordered() {
                    break; // all remaining keys are at least as large
                }
                continue;
            }
            // Screening against the table's own theta happens inside.
            let _ = self.table.try_insert_hash(hash);
        }

        // Rebuilds may have pushed the table theta below the union theta.
        self.union_theta = self.union_theta.min(self.table.theta());
        Ok(())
    }

    /// Returns the union result as a compact sketch.
    ///
    /// The effective theta is the minimum of the union theta and the
    /// internal table's theta. If more than k keys survive that screen, the
    /// result is truncated to the k smallest and theta drops to the
    /// (k+1)-th smallest key.
    pub fn result(&self, ordered: bool) -> CompactThetaSketch {
        let seed_hash = self.table.seed_hash();
        if self.table.is_empty() {
            return CompactThetaSketch::from_parts(
                Vec::new(),
                self.union_theta,
                seed_hash,
                ordered,
                true,
            );
        }

        let mut theta = self.union_theta.min(self.table.theta());
        let mut keys: Vec<u64> = self.table.iter().filter(|&k| k < theta).collect();

        let nominal = 1usize << self.table.lg_nom_size();
        if keys.len() > nominal {
            keys.select_nth_unstable(nominal);
            theta = keys[nominal];
            keys.truncate(nominal);
        }
        if ordered {
            keys.sort_unstable();
        }

        CompactThetaSketch::from_parts(keys, theta, seed_hash, ordered, false)
    }

    /// Resets the union to its initial empty state.
    pub fn reset(&mut self) {
        self.table.reset();
        self.union_theta = MAX_THETA;
    }
}

/// Builder for ThetaUnion.
#[derive(Debug)]
pub struct ThetaUnionBuilder {
    lg_k: u8,
    resize_factor: ResizeFactor,
    seed: u64,
}

impl Default for ThetaUnionBuilder {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            resize_factor: ResizeFactor::X8,
            seed: DEFAULT_UPDATE_SEED,
        }
    }
}

impl ThetaUnionBuilder {
    /// Set lg_k (log2 of nominal size k) for the internal table.
    ///
    /// # Panics
    ///
    /// If lg_k is not in range [5, 26]
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        assert!(
            (MIN_LG_K..=MAX_LG_K).contains(&lg_k),
            "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}], got {lg_k}"
        );
        self.lg_k = lg_k;
        self
    }

    /// Set resize factor for the internal table.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.resize_factor = factor;
        self
    }

    /// Set hash seed. All input sketches must share it.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the ThetaUnion.
    pub fn build(self) -> ThetaUnion {
        ThetaUnion {
            table: ThetaHashTable::new(self.lg_k, self.resize_factor, 1.0, self.seed),
            union_theta: MAX_THETA,
        }
    }
}
