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
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::MurmurHash3X64128;

const PREAMBLE_LONGS_EMPTY: u8 = 3;
const PREAMBLE_LONGS_STANDARD: u8 = 4;
const BLOOM_FAMILY_ID: u8 = 21;
const SERIAL_VERSION: u8 = 1;
const EMPTY_FLAG_MASK: u8 = 1 << 2;

const MIN_NUM_BITS: u64 = 64;
const MAX_NUM_BITS: u64 = (1u64 << 35) - 64;

/// A Bloom filter for probabilistic set membership testing.
///
/// Inserted items always return `true` from [`contains`](Self::contains);
/// the false positive rate is set at construction. Use
/// [`BloomFilterBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    seed: u64,
    num_hashes: u16,
    capacity_bits: u64,
    num_bits_set: u64,
    // Bit array packed into u64 words, length = ceil(capacity_bits / 64).
    bit_array: Vec<u64>,
}

impl BloomFilter {
    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilterBuilder;
    ///
    /// // By accuracy (recommended)
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
    ///
    /// // By size (manual)
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build();
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// `true` means the item was possibly inserted (or is a false
    /// positive); `false` means it was definitely not inserted.
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        if self.is_empty() {
            return false;
        }
        let (h1, h2) = self.compute_hash(item);
        self.check_bits(h1, h2)
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already present before the
    /// insertion.
    pub fn contains_and_insert<T: Hash>(&mut self, item: &T) -> bool {
        let (h1, h2) = self.compute_hash(item);
        let was_present = self.check_bits(h1, h2);
        self.set_bits(h1, h2);
        was_present
    }

    /// Inserts an item into the filter.
    pub fn insert<T: Hash>(&mut self, item: T) {
        let (h1, h2) = self.compute_hash(&item);
        self.set_bits(h1, h2);
    }

    /// Resets the filter to its initial empty state, keeping its
    /// configuration.
    pub fn reset(&mut self) {
        for word in &mut self.bit_array {
            *word = 0;
        }
        self.num_bits_set = 0;
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different size, hashes, or
    /// seed). Use [`is_compatible`](Self::is_compatible) to check first.
    pub fn union(&mut self, other: &BloomFilter) {
        assert!(
            self.is_compatible(other),
            "cannot union incompatible Bloom filters"
        );
        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
        }
        self.recount_bits_set();
    }

    /// Intersects this filter with another via bitwise AND.
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible.
    pub fn intersect(&mut self, other: &BloomFilter) {
        assert!(
            self.is_compatible(other),
            "cannot intersect incompatible Bloom filters"
        );
        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word &= *other_word;
        }
        self.recount_bits_set();
    }

    /// Inverts all bits in the filter.
    ///
    /// This approximately inverts set membership; false-positive
    /// guarantees no longer hold in a well-defined way afterwards.
    pub fn invert(&mut self) {
        for word in &mut self.bit_array {
            *word = !*word;
        }
        // Mask off excess bits in the last word.
        let excess_bits = self.capacity_bits % 64;
        if excess_bits != 0 {
            let last_idx = self.bit_array.len() - 1;
            let mask = (1u64 << excess_bits) - 1;
            self.bit_array[last_idx] &= mask;
        }
        self.recount_bits_set();
    }

    /// Returns whether the filter is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter.
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability from the load
    /// factor: `(1 - e^(-k * load))^k`.
    pub fn estimated_fpp(&self) -> f64 {
        let k = self.num_hashes as f64;
        let load = self.load_factor();
        (1.0 - (-k * load).exp()).powf(k)
    }

    /// Checks if two filters are compatible for merging: same capacity,
    /// hash count and seed.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits
            && self.num_hashes == other.num_hashes
            && self.seed == other.seed
    }

    /// Serializes the filter to a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let preamble_longs = if is_empty {
            PREAMBLE_LONGS_EMPTY
        } else {
            PREAMBLE_LONGS_STANDARD
        };

        let capacity = 8 * preamble_longs as usize
            + if is_empty { 0 } else { self.bit_array.len() * 8 };
        let mut bytes = SketchBytes::with_capacity(capacity);

        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(BLOOM_FAMILY_ID);
        bytes.write_u8(0); // reserved
        bytes.write_u8(0); // reserved
        bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 });
        bytes.write_u16_le(self.num_hashes);

        bytes.write_u64_le(self.seed);
        bytes.write_u64_le(self.capacity_bits);

        if !is_empty {
            bytes.write_u64_le(self.num_bits_set);
            for &word in &self.bit_array {
                bytes.write_u64_le(word);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is truncated, the family ID or serial
    /// version is wrong, or the declared capacity is out of range.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let _reserved1 = cursor.read_u8().map_err(make_error("reserved1"))?;
        let _reserved2 = cursor.read_u8().map_err(make_error("reserved2"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let num_hashes = cursor.read_u16_le().map_err(make_error("num_hashes"))?;
        let seed = cursor.read_u64_le().map_err(make_error("seed"))?;
        let capacity_bits = cursor.read_u64_le().map_err(make_error("capacity_bits"))?;

        if family_id != BLOOM_FAMILY_ID {
            return Err(Error::invalid_family(
                BLOOM_FAMILY_ID,
                family_id,
                "BLOOMFILTER",
            ));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        if preamble_longs != PREAMBLE_LONGS_EMPTY && preamble_longs != PREAMBLE_LONGS_STANDARD {
            return Err(Error::invalid_preamble_longs(
                PREAMBLE_LONGS_STANDARD,
                preamble_longs,
            ));
        }
        if num_hashes == 0 {
            return Err(Error::deserial("num_hashes must be > 0"));
        }
        if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&capacity_bits) {
            return Err(Error::deserial(format!(
                "capacity_bits {capacity_bits} out of range [{MIN_NUM_BITS}, {MAX_NUM_BITS}]"
            )));
        }

        let is_empty = (flags & EMPTY_FLAG_MASK) != 0;
        let num_words = capacity_bits.div_ceil(64) as usize;
        let mut bit_array = vec![0u64; num_words];
        let mut num_bits_set = 0;

        if !is_empty {
            num_bits_set = cursor.read_u64_le().map_err(make_error("num_bits_set"))?;
            for word in &mut bit_array {
                *word = cursor.read_u64_le().map_err(make_error("bit_array"))?;
            }
        }

        Ok(BloomFilter {
            seed,
            num_hashes,
            capacity_bits,
            num_bits_set,
            bit_array,
        })
    }

    fn compute_hash<T: Hash>(&self, item: &T) -> (u64, u64) {
        let mut hasher = MurmurHash3X64128::with_seed(self.seed);
        item.hash(&mut hasher);
        hasher.finish128()
    }

    // Double hashing: bit index i is (h1 + i * h2) mod capacity.
    fn bit_index(&self, h1: u64, h2: u64, i: u64) -> u64 {
        h1.wrapping_add(i.wrapping_mul(h2)) % self.capacity_bits
    }

    fn check_bits(&self, h1: u64, h2: u64) -> bool {
        for i in 0..self.num_hashes as u64 {
            let bit = self.bit_index(h1, h2, i);
            if self.bit_array[(bit / 64) as usize] & (1u64 << (bit % 64)) == 0 {
                return false;
            }
        }
        true
    }

    fn set_bits(&mut self, h1: u64, h2: u64) {
        for i in 0..self.num_hashes as u64 {
            let bit = self.bit_index(h1, h2, i);
            let word = &mut self.bit_array[(bit / 64) as usize];
            let mask = 1u64 << (bit % 64);
            if *word & mask == 0 {
                *word |= mask;
                self.num_bits_set += 1;
            }
        }
    }

    fn recount_bits_set(&mut self) {
        self.num_bits_set = self.bit_array.iter().map(|w| w.count_ones() as u64).sum();
    }
}

/// Builder for [`BloomFilter`].
#[derive(Debug)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    num_hashes: u16,
    seed: u64,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        Self::with_accuracy(1000, 0.01)
    }
}

impl BloomFilterBuilder {
    /// Sizes the filter for `num_distinct` expected items at the given
    /// false positive probability.
    ///
    /// # Panics
    ///
    /// Panics if `num_distinct` is 0 or `fpp` is not in (0.0, 1.0).
    pub fn with_accuracy(num_distinct: u64, fpp: f64) -> Self {
        assert!(num_distinct > 0, "num_distinct must be > 0");
        assert!(fpp > 0.0 && fpp < 1.0, "fpp must be in (0.0, 1.0)");
        let ln2 = std::f64::consts::LN_2;
        let num_bits = (-(num_distinct as f64) * fpp.ln() / (ln2 * ln2)).ceil() as u64;
        let num_hashes = ((num_bits as f64 / num_distinct as f64) * ln2).ceil().max(1.0) as u16;
        Self {
            num_bits: num_bits.clamp(MIN_NUM_BITS, MAX_NUM_BITS),
            num_hashes,
            seed: DEFAULT_UPDATE_SEED,
        }
    }

    /// Sizes the filter explicitly.
    ///
    /// # Panics
    ///
    /// Panics if `num_hashes` is 0 or `num_bits` is out of range.
    pub fn with_size(num_bits: u64, num_hashes: u16) -> Self {
        assert!(num_hashes > 0, "num_hashes must be > 0");
        assert!(
            (MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits),
            "num_bits must be in [{MIN_NUM_BITS}, {MAX_NUM_BITS}], got {num_bits}"
        );
        Self {
            num_bits,
            num_hashes,
            seed: DEFAULT_UPDATE_SEED,
        }
    }

    /// Sets the hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the filter.
    pub fn build(self) -> BloomFilter {
        let num_words = self.num_bits.div_ceil(64) as usize;
        BloomFilter {
            seed: self.seed,
            num_hashes: self.num_hashes,
            capacity_bits: self.num_bits,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
        for i in 0..1000u64 {
            filter.insert(i);
        }
        for i in 0..1000u64 {
            assert!(filter.contains(&i), "inserted item {i} must test positive");
        }
    }

    #[test]
    fn test_false_positive_rate_is_bounded() {
        let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
        for i in 0..1000u64 {
            filter.insert(i);
        }
        let false_positives = (1000..11_000u64).filter(|i| filter.contains(i)).count();
        // 10x headroom over the configured 1% rate.
        assert!(false_positives < 1000, "got {false_positives} false positives");
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"anything"));
        assert_eq!(filter.bits_used(), 0);
    }

    #[test]
    fn test_contains_and_insert() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        assert!(!filter.contains_and_insert(&"apple"));
        assert!(filter.contains_and_insert(&"apple"));
    }

    #[test]
    fn test_union_sees_both_sides() {
        let mut f1 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        let mut f2 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        f1.insert("a");
        f2.insert("b");

        f1.union(&f2);
        assert!(f1.contains(&"a"));
        assert!(f1.contains(&"b"));
    }

    #[test]
    fn test_intersect_keeps_common_items() {
        let mut f1 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        let mut f2 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        f1.insert("a");
        f1.insert("b");
        f2.insert("b");
        f2.insert("c");

        f1.intersect(&f2);
        assert!(f1.contains(&"b"));
    }

    #[test]
    #[should_panic(expected = "cannot union incompatible Bloom filters")]
    fn test_union_incompatible_panics() {
        let mut f1 = BloomFilterBuilder::with_size(128, 3).build();
        let f2 = BloomFilterBuilder::with_size(256, 3).build();
        f1.union(&f2);
    }

    #[test]
    fn test_reset() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        filter.insert("apple");
        assert!(!filter.is_empty());

        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"apple"));
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let mut filter = BloomFilterBuilder::with_accuracy(500, 0.05).seed(7).build();
        for i in 0..500u64 {
            filter.insert(i);
        }
        let bytes = filter.serialize();
        let restored = BloomFilter::deserialize(&bytes).unwrap();
        assert_eq!(filter, restored);
        assert_eq!(restored.serialize(), bytes);
    }

    #[test]
    fn test_serialize_deserialize_empty() {
        let filter = BloomFilterBuilder::with_size(128, 3).build();
        let bytes = filter.serialize();
        assert_eq!(bytes.len(), PREAMBLE_LONGS_EMPTY as usize * 8);
        let restored = BloomFilter::deserialize(&bytes).unwrap();
        assert_eq!(filter, restored);
    }

    #[test]
    fn test_deserialize_wrong_family() {
        let mut bytes = BloomFilterBuilder::with_size(128, 3).build().serialize();
        bytes[2] = 99;
        assert!(BloomFilter::deserialize(&bytes).is_err());
    }

    #[test]
    fn test_invert_flips_membership() {
        let mut filter = BloomFilterBuilder::with_size(128, 1).build();
        filter.insert("x");
        let bits_before = filter.bits_used();

        filter.invert();
        assert_eq!(filter.bits_used(), 128 - bits_before);
    }
}
