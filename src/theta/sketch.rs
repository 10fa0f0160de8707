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

use crate::codec::SketchBytes;
use crate::common::NumStdDev;
use crate::common::ResizeFactor;
use crate::common::binomial_bounds;
use crate::common::canonical_double;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::DEFAULT_LG_K;
use crate::theta::hash_table::MAX_LG_K;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::MIN_LG_K;
use crate::theta::hash_table::ThetaHashTable;
use crate::theta::serialization::FLAG_IS_COMPACT;
use crate::theta::serialization::FLAG_IS_EMPTY;
use crate::theta::serialization::FLAG_IS_ORDERED;
use crate::theta::serialization::FLAG_IS_READ_ONLY;
use crate::theta::serialization::HASH_SIZE_BYTES;
use crate::theta::serialization::PREAMBLE_LONGS_EMPTY;
use crate::theta::serialization::PREAMBLE_LONGS_ESTIMATION;
use crate::theta::serialization::PREAMBLE_LONGS_EXACT;
use crate::theta::serialization::SERIAL_VERSION;
use crate::theta::serialization::THETA_FAMILY_ID;

/// Mutable theta sketch for building from input data.
#[derive(Debug)]
pub struct ThetaSketch {
    table: ThetaHashTable,
}

impl ThetaSketch {
    /// Create a new builder for ThetaSketch
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// let sketch = ThetaSketch::builder().lg_k(12).build();
    /// assert_eq!(sketch.lg_k(), 12);
    /// ```
    pub fn builder() -> ThetaSketchBuilder {
        ThetaSketchBuilder::default()
    }

    /// Update the sketch with a hashable value.
    ///
    /// For `f32`/`f64` values, use `update_f32`/`update_f64` instead.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn update<T: Hash>(&mut self, value: T) {
        let _ = self.table.try_insert(value);
    }

    /// Update the sketch with a f64 value.
    ///
    /// The value is canonicalized first: `-0.0` and `+0.0` hash identically,
    /// and every NaN maps to the canonical quiet NaN.
    pub fn update_f64(&mut self, value: f64) {
        self.update(canonical_double(value));
    }

    /// Update the sketch with a f32 value.
    pub fn update_f32(&mut self, value: f32) {
        self.update_f64(value as f64);
    }

    /// Return cardinality estimate
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// # let mut sketch = ThetaSketch::builder().build();
    /// # sketch.update("apple");
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let num_retained = self.table.num_retained() as f64;
        let theta = self.table.theta() as f64 / MAX_THETA as f64;
        num_retained / theta
    }

    /// Return theta as a fraction (0.0 to 1.0)
    pub fn theta(&self) -> f64 {
        self.table.theta() as f64 / MAX_THETA as f64
    }

    /// Return theta as u64
    pub fn theta64(&self) -> u64 {
        self.table.theta()
    }

    /// Check if sketch is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check if sketch is in estimation mode
    pub fn is_estimation_mode(&self) -> bool {
        self.table.theta() < MAX_THETA
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.table.num_retained()
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// The 16-bit hash of this sketch's seed.
    pub fn seed_hash(&self) -> u16 {
        self.table.seed_hash()
    }

    /// Trim the sketch to nominal size k
    pub fn trim(&mut self) {
        self.table.trim();
    }

    /// Reset the sketch to empty state
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Return iterator over retained hash keys.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.table.iter()
    }

    /// Snapshot the retained keys into an immutable compact sketch.
    ///
    /// The snapshot owns its own copy of the keys; the mutable sketch may
    /// continue to evolve afterwards without affecting it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// let compact = sketch.compact(true);
    /// assert_eq!(compact.estimate(), 1.0);
    /// assert!(compact.is_ordered());
    /// ```
    pub fn compact(&self, ordered: bool) -> CompactThetaSketch {
        let mut keys: Vec<u64> = self.iter().collect();
        if ordered {
            keys.sort_unstable();
        }
        CompactThetaSketch::from_parts(
            keys,
            self.table.theta(),
            self.table.seed_hash(),
            ordered,
            self.table.is_empty(),
        )
    }

    /// Returns the approximate lower error bound given the specified number
    /// of standard deviations.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::common::NumStdDev;
    /// use streamsketch::theta::ThetaSketch;
    ///
    /// let mut sketch = ThetaSketch::builder().lg_k(12).build();
    /// for i in 0..10000 {
    ///     sketch.update(i);
    /// }
    ///
    /// let estimate = sketch.estimate();
    /// assert!(sketch.lower_bound(NumStdDev::Two) <= estimate);
    /// assert!(estimate <= sketch.upper_bound(NumStdDev::Two));
    /// ```
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        // sampling_probability is validated to be > 0, so theta is always a
        // valid fraction here
        binomial_bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
            .expect("theta should always be valid")
    }

    /// Returns the approximate upper error bound given the specified number
    /// of standard deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::upper_bound(
            self.num_retained() as u64,
            self.theta(),
            num_std_dev,
            self.is_empty(),
        )
        .expect("theta should always be valid")
    }

    /// Serialize the sketch to bytes in ordered compact format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// let bytes = sketch.serialize();
    /// let restored = ThetaSketch::deserialize(&bytes).unwrap();
    /// assert_eq!(sketch.estimate(), restored.estimate());
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let is_estimation_mode = self.is_estimation_mode();

        let preamble_longs = if is_empty {
            PREAMBLE_LONGS_EMPTY
        } else if is_estimation_mode {
            PREAMBLE_LONGS_ESTIMATION
        } else {
            PREAMBLE_LONGS_EXACT
        };

        let num_entries = self.num_retained();
        let preamble_bytes = (preamble_longs as usize) * 8;
        let data_bytes = num_entries * HASH_SIZE_BYTES;
        let total_bytes = preamble_bytes + data_bytes;

        let mut bytes = SketchBytes::with_capacity(total_bytes);

        let mut flags: u8 = FLAG_IS_COMPACT | FLAG_IS_READ_ONLY | FLAG_IS_ORDERED;
        if is_empty {
            flags |= FLAG_IS_EMPTY;
        }

        // First 8 bytes are always present; lg_k survives in byte 3 so the
        // update form can be rebuilt with its original nominal size.
        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(THETA_FAMILY_ID);
        bytes.write_u8(self.lg_k());
        bytes.write_u8(self.lg_k());
        bytes.write_u8(flags);
        bytes.write_u16_le(self.table.seed_hash());

        if is_empty {
            return bytes.into_bytes();
        }

        bytes.write_u32_le(num_entries as u32);
        bytes.write_u32_le(0); // unused

        if is_estimation_mode {
            bytes.write_u64_le(self.table.theta());
        }

        let mut entries: Vec<u64> = self.iter().collect();
        entries.sort_unstable();
        for entry in entries {
            bytes.write_u64_le(entry);
        }

        bytes.into_bytes()
    }

    /// Deserialize a sketch from bytes with the default seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid or corrupted.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserialize a sketch from bytes with a specific seed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are too short
    /// - The format is invalid (wrong family ID, unsupported version)
    /// - The seed hash doesn't match
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        // Byte 3 holds lg_k only in the uncompressed layout; the compressed
        // layout reuses it for the entry bit width.
        let lg_k = match (bytes.get(1), bytes.get(3)) {
            (Some(&version), Some(&lg_k)) if version <= SERIAL_VERSION => lg_k,
            _ => 0,
        };
        let compact = CompactThetaSketch::deserialize_with_seed(bytes, seed)?;

        let lg_k = if (MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
            lg_k
        } else if lg_k == 0 {
            // Serialized by the compact form, which does not carry lg_k.
            DEFAULT_LG_K
        } else {
            return Err(Error::new(
                ErrorKind::MalformedDeserializeData,
                format!("lg_k {lg_k} is out of range [{MIN_LG_K}, {MAX_LG_K}]"),
            ));
        };

        let keys: Vec<u64> = compact.iter().collect();
        let table =
            ThetaHashTable::from_entries(lg_k, seed, compact.theta64(), keys, compact.is_empty());
        Ok(ThetaSketch { table })
    }
}

impl ThetaSketchView for ThetaSketch {
    fn is_empty(&self) -> bool {
        ThetaSketch::is_empty(self)
    }

    fn theta64(&self) -> u64 {
        ThetaSketch::theta64(self)
    }

    fn num_retained(&self) -> usize {
        ThetaSketch::num_retained(self)
    }

    fn seed_hash(&self) -> u16 {
        ThetaSketch::seed_hash(self)
    }

    fn is_ordered(&self) -> bool {
        false
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        ThetaSketch::iter(self)
    }
}

/// Builder for ThetaSketch
#[derive(Debug)]
pub struct ThetaSketchBuilder {
    lg_k: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    seed: u64,
}

impl Default for ThetaSketchBuilder {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            resize_factor: ResizeFactor::X8,
            sampling_probability: 1.0,
            seed: DEFAULT_UPDATE_SEED,
        }
    }
}

impl ThetaSketchBuilder {
    /// Set lg_k (log2 of nominal size k).
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

    /// Set resize factor.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.resize_factor = factor;
        self
    }

    /// Set sampling probability p.
    ///
    /// When set below 1.0, the initial theta is `p * 2^63` so only that
    /// fraction of hashed values is retained from the start.
    ///
    /// # Panics
    ///
    /// Panics if p is not in range (0.0, 1.0]
    pub fn sampling_probability(mut self, probability: f32) -> Self {
        assert!(
            probability > 0.0 && probability <= 1.0,
            "sampling_probability must be in (0.0, 1.0], got {probability}"
        );
        self.sampling_probability = probability;
        self
    }

    /// Set hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the ThetaSketch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::theta::ThetaSketch;
    /// let sketch = ThetaSketch::builder().lg_k(10).build();
    /// assert_eq!(sketch.lg_k(), 10);
    /// ```
    pub fn build(self) -> ThetaSketch {
        let table = ThetaHashTable::new(
            self.lg_k,
            self.resize_factor,
            self.sampling_probability,
            self.seed,
        );

        ThetaSketch { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let sketch = ThetaSketch::builder().build();
        assert_eq!(sketch.lg_k(), DEFAULT_LG_K);
        assert!(sketch.is_empty());
        assert_eq!(sketch.theta(), 1.0);
    }

    #[test]
    #[should_panic(expected = "lg_k must be in")]
    fn test_builder_rejects_small_lg_k() {
        let _ = ThetaSketch::builder().lg_k(4);
    }

    #[test]
    #[should_panic(expected = "sampling_probability must be in")]
    fn test_builder_rejects_zero_sampling() {
        let _ = ThetaSketch::builder().sampling_probability(0.0);
    }

    #[test]
    fn test_canonical_double_updates_collapse() {
        let mut sketch = ThetaSketch::builder().build();
        sketch.update_f64(0.0);
        sketch.update_f64(-0.0);
        sketch.update_f64(f64::NAN);
        sketch.update_f64(f64::from_bits(0x7ff0000000000001));
        assert_eq!(sketch.estimate(), 2.0);
    }

    #[test]
    fn test_compact_snapshot_is_independent() {
        let mut sketch = ThetaSketch::builder().build();
        sketch.update("a");
        sketch.update("b");

        let compact = sketch.compact(true);
        sketch.update("c");

        assert_eq!(compact.num_retained(), 2);
        assert_eq!(sketch.num_retained(), 3);
    }

    #[test]
    fn test_compact_ordered_keys_ascend() {
        let mut sketch = ThetaSketch::builder().build();
        for i in 0..100 {
            sketch.update(i);
        }
        let compact = sketch.compact(true);
        let keys: Vec<u64> = compact.iter().collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
