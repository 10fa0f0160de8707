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
use crate::hash::compute_seed_hash;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::REBUILD_THRESHOLD;
use crate::theta::hash_table::ThetaHashTable;

/// The overlap accumulated across all operands seen so far.
#[derive(Debug)]
enum Overlap {
    /// No operand yet; conceptually the universe set.
    Universe,
    /// Provably empty. Terminal: further operands cannot revive it.
    Vacant,
    /// Keys common to every operand so far. Can hold zero keys under
    /// sampling without being provably empty.
    Retained(ThetaHashTable),
}

/// Stateful intersection operator for Theta sketches.
///
/// Starts from the universe set; every [`update`](Self::update) narrows the
/// accumulated overlap to the keys the incoming sketch also retains, while
/// theta tracks the minimum across all operands. Before the first update
/// the result is undefined; use [`has_result`](Self::has_result) to check.
#[derive(Debug)]
pub struct ThetaIntersection {
    seed: u64,
    theta: u64,
    overlap: Overlap,
}

impl ThetaIntersection {
    /// Creates a new intersection operator for the given `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            theta: MAX_THETA,
            overlap: Overlap::Universe,
        }
    }

    /// Creates a new intersection operator with the default seed.
    pub fn new_with_default_seed() -> Self {
        Self::new(DEFAULT_UPDATE_SEED)
    }

    /// Narrows the accumulated overlap to the given sketch.
    ///
    /// An empty operand forces the overlap empty for good. A non-empty
    /// operand with zero retained keys (all screened by its theta) keeps
    /// the overlap alive but key-less, with theta lowered accordingly.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the state untouched, if the sketch's seed
    /// hash is incompatible or the operand is internally inconsistent.
    pub fn update<S: ThetaSketchView>(&mut self, sketch: &S) -> Result<(), Error> {
        if matches!(self.overlap, Overlap::Vacant) {
            return Ok(());
        }
        if sketch.is_empty() {
            self.theta = MAX_THETA;
            self.overlap = Overlap::Vacant;
            return Ok(());
        }

        let seed_hash = compute_seed_hash(self.seed);
        if sketch.seed_hash() != seed_hash {
            return Err(Error::incompatible_seed_hash(seed_hash, sketch.seed_hash()));
        }

        let theta = self.theta.min(sketch.theta64());
        let survivors = match &self.overlap {
            Overlap::Universe => screen_keys(sketch, theta),
            Overlap::Retained(current) => matched_keys(current, sketch, theta)?,
            Overlap::Vacant => unreachable!("vacant overlap returns early"),
        };

        // With theta still at max there is no sampling to blame: no
        // survivors means the intersection is empty, full stop.
        self.overlap = if survivors.is_empty() && theta == MAX_THETA {
            Overlap::Vacant
        } else {
            Overlap::Retained(self.index_keys(survivors, theta)?)
        };
        self.theta = theta;
        Ok(())
    }

    /// Returns whether this operator has received at least one update.
    pub fn has_result(&self) -> bool {
        !matches!(self.overlap, Overlap::Universe)
    }

    /// Returns the intersection result as a compact theta sketch (ordered).
    ///
    /// # Panics
    ///
    /// Panics if called before the first [`update`](Self::update).
    pub fn result(&self) -> CompactThetaSketch {
        self.result_with_ordered(true)
    }

    /// Returns the intersection result as a compact theta sketch.
    ///
    /// # Panics
    ///
    /// Panics if called before the first [`update`](Self::update).
    pub fn result_with_ordered(&self, ordered: bool) -> CompactThetaSketch {
        let (mut keys, is_empty) = match &self.overlap {
            Overlap::Universe => {
                panic!("ThetaIntersection::result() called before first update()")
            }
            Overlap::Vacant => (Vec::new(), true),
            Overlap::Retained(table) => (table.iter().collect::<Vec<u64>>(), false),
        };
        if ordered {
            keys.sort_unstable();
        }
        CompactThetaSketch::from_parts(
            keys,
            self.theta,
            compute_seed_hash(self.seed),
            ordered,
            is_empty,
        )
    }

    /// Builds the membership index over the surviving keys.
    ///
    /// The table is sized once for exactly this key count; surviving keys
    /// are all below `theta`, so no insert can trigger a rebuild.
    fn index_keys(&self, keys: Vec<u64>, theta: u64) -> Result<ThetaHashTable, Error> {
        let lg_size = ThetaHashTable::lg_size_from_count(keys.len(), REBUILD_THRESHOLD);
        let mut table = ThetaHashTable::from_raw_parts(
            lg_size,
            lg_size - 1,
            ResizeFactor::X1,
            1.0,
            theta,
            self.seed,
            false,
        );
        for key in keys {
            if !table.try_insert_hash(key) {
                return Err(Error::invalid_argument(
                    "duplicate key, possibly corrupted input sketch",
                ));
            }
        }
        Ok(table)
    }
}

/// The first operand seeds the overlap: every non-zero key below the
/// working theta survives.
fn screen_keys<S: ThetaSketchView>(sketch: &S, theta: u64) -> Vec<u64> {
    sketch.iter().filter(|&key| key != 0 && key < theta).collect()
}

/// Keys of the incoming sketch that the current overlap also retains.
fn matched_keys<S: ThetaSketchView>(
    current: &ThetaHashTable,
    sketch: &S,
    theta: u64,
) -> Result<Vec<u64>, Error> {
    let most = current.num_retained();
    let mut matched = Vec::with_capacity(most.min(sketch.num_retained()));
    for key in sketch.iter() {
        if key >= theta {
            if sketch.is_ordered() {
                break; // every remaining key is at least as large
            }
            continue;
        }
        if current.contains_hash(key) {
            if matched.len() == most {
                return Err(Error::invalid_argument(
                    "more overlapping keys than retained, possibly corrupted input sketch",
                ));
            }
            matched.push(key);
        }
    }
    Ok(matched)
}
