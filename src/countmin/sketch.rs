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

use std::hash::Hash;
use std::hash::Hasher;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::countmin::serialization::COUNTMIN_FAMILY_ID;
use crate::countmin::serialization::FLAGS_IS_EMPTY;
use crate::countmin::serialization::LONG_SIZE_BYTES;
use crate::countmin::serialization::PREAMBLE_LONGS_SHORT;
use crate::countmin::serialization::SERIAL_VERSION;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::MurmurHash3X64128;
use crate::hash::compute_seed_hash;

/// Count-Min sketch: a `d x w` counter matrix with a min-estimator.
///
/// Estimates are always over-estimates; the relative error is `e / w` of
/// the total stream weight with failure probability `e^-d`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMinSketch {
    num_hashes: u8,
    num_buckets: u32,
    seed: u64,
    total_weight: u64,
    // Row-major: row i occupies cells[i * num_buckets .. (i + 1) * num_buckets].
    cells: Vec<u64>,
}

impl CountMinSketch {
    /// Creates a sketch with `num_hashes` rows and `num_buckets` columns,
    /// using the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `num_hashes` is 0 or `num_buckets` is less than 3.
    pub fn new(num_hashes: u8, num_buckets: u32) -> Self {
        Self::with_seed(num_hashes, num_buckets, DEFAULT_UPDATE_SEED)
    }

    /// Creates a sketch with an explicit seed.
    ///
    /// # Panics
    ///
    /// Panics if `num_hashes` is 0 or `num_buckets` is less than 3.
    pub fn with_seed(num_hashes: u8, num_buckets: u32, seed: u64) -> Self {
        assert!(num_hashes >= 1, "num_hashes must be >= 1");
        assert!(
            num_buckets >= 3,
            "num_buckets must be >= 3 for the error bound e/w to be meaningful"
        );
        Self {
            num_hashes,
            num_buckets,
            seed,
            total_weight: 0,
            cells: vec![0; num_hashes as usize * num_buckets as usize],
        }
    }

    /// Suggests the number of buckets for a target relative error.
    ///
    /// # Panics
    ///
    /// Panics if `relative_error` is not in (0.0, 1.0).
    pub fn suggest_num_buckets(relative_error: f64) -> u32 {
        assert!(
            relative_error > 0.0 && relative_error < 1.0,
            "relative_error must be in (0.0, 1.0), got {relative_error}"
        );
        (std::f64::consts::E / relative_error).ceil() as u32
    }

    /// Suggests the number of hash rows for a target confidence.
    ///
    /// # Panics
    ///
    /// Panics if `confidence` is not in (0.0, 1.0).
    pub fn suggest_num_hashes(confidence: f64) -> u8 {
        assert!(
            confidence > 0.0 && confidence < 1.0,
            "confidence must be in (0.0, 1.0), got {confidence}"
        );
        ((1.0 / (1.0 - confidence)).ln().ceil() as u8).max(1)
    }

    /// Number of hash rows (d).
    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    /// Number of buckets per row (w).
    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    /// The hash seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total weight of all updates.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if no weight has been added.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Relative error of estimates as a fraction of the total weight.
    pub fn relative_error(&self) -> f64 {
        std::f64::consts::E / self.num_buckets as f64
    }

    /// Updates the sketch with unit weight.
    pub fn update<T: Hash>(&mut self, item: T) {
        self.update_with_weight(item, 1);
    }

    /// Updates the sketch with the given weight.
    pub fn update_with_weight<T: Hash>(&mut self, item: T, weight: u64) {
        if weight == 0 {
            return;
        }
        self.total_weight += weight;
        let buckets = self.num_buckets as usize;
        for row in 0..self.num_hashes as usize {
            let col = self.bucket_for(&item, row);
            self.cells[row * buckets + col] += weight;
        }
    }

    /// Returns the estimated weight of an item (never an under-estimate).
    pub fn estimate<T: Hash>(&self, item: T) -> u64 {
        let buckets = self.num_buckets as usize;
        let mut min = u64::MAX;
        for row in 0..self.num_hashes as usize {
            let col = self.bucket_for(&item, row);
            min = min.min(self.cells[row * buckets + col]);
        }
        if min == u64::MAX { 0 } else { min }
    }

    /// Upper bound on the item's true weight.
    pub fn upper_bound<T: Hash>(&self, item: T) -> u64 {
        self.estimate(item)
    }

    /// Lower bound on the item's true weight.
    pub fn lower_bound<T: Hash>(&self, item: T) -> u64 {
        let estimate = self.estimate(item);
        let slack = (self.relative_error() * self.total_weight as f64) as u64;
        estimate.saturating_sub(slack)
    }

    /// Merges another sketch into this one.
    ///
    /// # Errors
    ///
    /// Returns an error (before any mutation) if the sketches differ in
    /// shape or seed.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.num_hashes != other.num_hashes || self.num_buckets != other.num_buckets {
            return Err(Error::invalid_argument(format!(
                "incompatible shapes: {}x{} and {}x{}",
                self.num_hashes, self.num_buckets, other.num_hashes, other.num_buckets
            )));
        }
        if self.seed != other.seed {
            return Err(Error::invalid_argument(
                "incompatible seeds: sketches must share hash seeds to merge",
            ));
        }
        for (cell, other_cell) in self.cells.iter_mut().zip(&other.cells) {
            *cell += *other_cell;
        }
        self.total_weight += other.total_weight;
        Ok(())
    }

    /// Serializes the sketch to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let data_longs = if is_empty {
            0
        } else {
            1 + self.cells.len() // total_weight plus the matrix
        };
        let mut bytes = SketchBytes::with_capacity(
            PREAMBLE_LONGS_SHORT as usize * 8 + data_longs * LONG_SIZE_BYTES,
        );

        bytes.write_u8(PREAMBLE_LONGS_SHORT);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(COUNTMIN_FAMILY_ID);
        bytes.write_u8(if is_empty { FLAGS_IS_EMPTY } else { 0 });
        bytes.write_u8(self.num_hashes);
        bytes.write_u8(0);
        bytes.write_u16_le(compute_seed_hash(self.seed));
        bytes.write_u32_le(self.num_buckets);
        bytes.write_u32_le(0); // unused

        if !is_empty {
            bytes.write_u64_le(self.total_weight);
            for &cell in &self.cells {
                bytes.write_u64_le(cell);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch with the default seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid or corrupted.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserializes a sketch, validating the stored seed hash against
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated, the family or version
    /// is wrong, or the seed hash doesn't match.
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let num_hashes = cursor.read_u8().map_err(make_error("num_hashes"))?;
        let _unused = cursor.read_u8().map_err(make_error("unused"))?;
        let seed_hash = cursor.read_u16_le().map_err(make_error("seed_hash"))?;
        let num_buckets = cursor.read_u32_le().map_err(make_error("num_buckets"))?;
        let _unused2 = cursor.read_u32_le().map_err(make_error("unused2"))?;

        if family_id != COUNTMIN_FAMILY_ID {
            return Err(Error::invalid_family(
                COUNTMIN_FAMILY_ID,
                family_id,
                "COUNTMIN",
            ));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        if preamble_longs != PREAMBLE_LONGS_SHORT {
            return Err(Error::invalid_preamble_longs(
                PREAMBLE_LONGS_SHORT,
                preamble_longs,
            ));
        }
        let expected_seed_hash = compute_seed_hash(seed);
        if seed_hash != expected_seed_hash {
            return Err(Error::invalid_argument(format!(
                "incompatible seed hash: expected {expected_seed_hash}, got {seed_hash}"
            )));
        }
        if num_hashes == 0 || num_buckets < 3 {
            return Err(Error::deserial(format!(
                "invalid shape: {num_hashes} hashes x {num_buckets} buckets"
            )));
        }

        let mut sketch = Self::with_seed(num_hashes, num_buckets, seed);
        if (flags & FLAGS_IS_EMPTY) != 0 {
            return Ok(sketch);
        }

        let num_cells = num_hashes as usize * num_buckets as usize;
        if cursor.remaining() < (1 + num_cells) * LONG_SIZE_BYTES {
            return Err(Error::insufficient_data(format!(
                "expected {num_cells} cells, got {} bytes",
                cursor.remaining()
            )));
        }

        sketch.total_weight = cursor.read_u64_le().map_err(make_error("total_weight"))?;
        for cell in &mut sketch.cells {
            *cell = cursor.read_u64_le().map_err(make_error("cell"))?;
        }
        Ok(sketch)
    }

    fn bucket_for<T: Hash>(&self, item: &T, row: usize) -> usize {
        let mut hasher = MurmurHash3X64128::with_seed(self.seed.wrapping_add(row as u64));
        item.hash(&mut hasher);
        (hasher.finish() % self.num_buckets as u64) as usize
    }
}
