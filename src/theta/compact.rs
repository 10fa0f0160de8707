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

//! Compact Theta sketch: the immutable, serializable form.
//!
//! A compact sketch is a snapshot of a mutable sketch's retained keys plus
//! theta, the seed hash and the empty/ordered flags. It answers the same
//! estimate and bound queries, feeds set operations, and round-trips
//! through the byte-stream codec.
//!
//! Two wire encodings exist. Serial version 3 stores raw 8-byte keys and is
//! the canonical format. Serial version 4 delta-codes the keys of an
//! ordered sketch at `entry_bits` bits each; [`serialize_compressed`]
//! produces it and [`deserialize`] accepts both.
//!
//! [`serialize_compressed`]: CompactThetaSketch::serialize_compressed
//! [`deserialize`]: CompactThetaSketch::deserialize

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::common::NumStdDev;
use crate::common::binomial_bounds;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::compute_seed_hash;
use crate::theta::ThetaSketchView;
use crate::theta::bit_pack::BitReader;
use crate::theta::bit_pack::BitWriter;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::serialization::*;

/// A compact, immutable Theta sketch.
///
/// Unlike [`ThetaSketch`](super::ThetaSketch), this sketch cannot be
/// updated with new values.
///
/// # Example
///
/// ```
/// use streamsketch::theta::CompactThetaSketch;
/// use streamsketch::theta::ThetaSketch;
///
/// let mut sketch = ThetaSketch::builder().build();
/// sketch.update("apple");
/// sketch.update("banana");
///
/// let compact = sketch.compact(true);
/// let bytes = compact.serialize();
///
/// let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
/// assert_eq!(compact.estimate(), restored.estimate());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompactThetaSketch {
    theta: u64,
    entries: Vec<u64>,
    seed_hash: u16,
    is_ordered: bool,
    is_empty: bool,
}

impl CompactThetaSketch {
    /// Assembles a compact sketch from its parts.
    ///
    /// `ordered` promises the entries are strictly ascending; callers sort
    /// before passing `true`.
    pub(crate) fn from_parts(
        entries: Vec<u64>,
        theta: u64,
        seed_hash: u16,
        ordered: bool,
        is_empty: bool,
    ) -> Self {
        debug_assert!(
            !ordered || entries.windows(2).all(|w| w[0] < w[1]),
            "ordered entries must be strictly ascending"
        );
        Self {
            theta,
            entries,
            seed_hash,
            is_ordered: ordered,
            is_empty,
        }
    }

    /// Check if the sketch is empty (no values have been added)
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Get the cardinality estimate.
    pub fn estimate(&self) -> f64 {
        if self.is_empty {
            return 0.0;
        }
        let num_retained = self.entries.len() as f64;
        let theta_fraction = self.theta as f64 / MAX_THETA as f64;
        num_retained / theta_fraction
    }

    /// Return theta as a fraction (0.0 to 1.0)
    pub fn theta(&self) -> f64 {
        self.theta as f64 / MAX_THETA as f64
    }

    /// Return theta as u64
    pub fn theta64(&self) -> u64 {
        self.theta
    }

    /// Check if sketch is in estimation mode
    pub fn is_estimation_mode(&self) -> bool {
        self.theta < MAX_THETA
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.entries.len()
    }

    /// Return iterator over hash values
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied()
    }

    /// Get the seed hash
    pub fn seed_hash(&self) -> u16 {
        self.seed_hash
    }

    /// True if the retained keys are sorted ascending.
    pub fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    /// Returns the approximate lower error bound given the specified number
    /// of standard deviations.
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
            .expect("theta should always be valid")
    }

    /// Returns the approximate upper error bound given the specified number
    /// of standard deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::upper_bound(
            self.num_retained() as u64,
            self.theta(),
            num_std_dev,
            self.is_empty,
        )
        .expect("theta should always be valid")
    }

    /// Serialize the compact sketch to bytes (serial version 3).
    ///
    /// Empty sketches take 8 bytes; a single retained key in exact mode
    /// takes 16 (short single-item form); otherwise the preamble is
    /// followed by the raw 8-byte keys, with theta present only in
    /// estimation mode.
    pub fn serialize(&self) -> Vec<u8> {
        let is_estimation_mode = self.is_estimation_mode();
        let num_entries = self.entries.len();
        let is_single_item = !self.is_empty && !is_estimation_mode && num_entries == 1;

        let preamble_longs = if self.is_empty || is_single_item {
            PREAMBLE_LONGS_EMPTY
        } else if is_estimation_mode {
            PREAMBLE_LONGS_ESTIMATION
        } else {
            PREAMBLE_LONGS_EXACT
        };

        let preamble_bytes = (preamble_longs as usize) * 8;
        let total_size = preamble_bytes + num_entries * HASH_SIZE_BYTES;
        let mut bytes = SketchBytes::with_capacity(total_size);

        let mut flags = FLAG_IS_READ_ONLY | FLAG_IS_COMPACT;
        if self.is_ordered {
            flags |= FLAG_IS_ORDERED;
        }
        if self.is_empty {
            flags |= FLAG_IS_EMPTY;
        }
        if is_single_item {
            flags |= FLAG_HAS_SINGLE_ITEM;
        }

        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(THETA_FAMILY_ID);
        bytes.write_u8(0);
        bytes.write_u8(0);
        bytes.write_u8(flags);
        bytes.write_u16_le(self.seed_hash);

        if self.is_empty {
            return bytes.into_bytes();
        }

        if is_single_item {
            bytes.write_u64_le(self.entries[0]);
            return bytes.into_bytes();
        }

        bytes.write_u32_le(num_entries as u32);
        bytes.write_u32_le(0); // unused

        if is_estimation_mode {
            bytes.write_u64_le(self.theta);
        }

        for hash in &self.entries {
            bytes.write_u64_le(*hash);
        }

        bytes.into_bytes()
    }

    /// Serialize with the bit-packed body (serial version 4).
    ///
    /// Only ordered, non-empty, multi-key sketches compress; anything else
    /// falls back to the version-3 encoding. Keys are delta-coded at
    /// `entry_bits = 64 - leading_zeros(theta)` bits each.
    pub fn serialize_compressed(&self) -> Vec<u8> {
        if self.is_empty || !self.is_ordered || self.entries.len() < 2 {
            return self.serialize();
        }

        let is_estimation_mode = self.is_estimation_mode();
        let entry_bits = compute_entry_bits(self.theta);
        let num_entries = self.entries.len() as u32;
        let num_entries_bytes = byte_width(num_entries);

        let preamble_longs: u8 = if is_estimation_mode { 2 } else { 1 };
        let header_bytes = preamble_longs as usize * 8;
        let packed_bytes = (self.entries.len() * entry_bits as usize).div_ceil(8);
        let mut bytes =
            SketchBytes::with_capacity(header_bytes + num_entries_bytes as usize + packed_bytes);

        let flags = FLAG_IS_READ_ONLY | FLAG_IS_COMPACT | FLAG_IS_ORDERED;
        bytes.write_u8(preamble_longs);
        bytes.write_u8(SERIAL_VERSION_COMPRESSED);
        bytes.write_u8(THETA_FAMILY_ID);
        bytes.write_u8(entry_bits as u8);
        bytes.write_u8(num_entries_bytes);
        bytes.write_u8(flags);
        bytes.write_u16_le(self.seed_hash);

        if is_estimation_mode {
            bytes.write_u64_le(self.theta);
        }

        bytes.write(&num_entries.to_le_bytes()[..num_entries_bytes as usize]);

        let mut writer = BitWriter::with_capacity(packed_bytes);
        let mut previous = 0u64;
        for &entry in &self.entries {
            writer.write(entry - previous, entry_bits);
            previous = entry;
        }
        bytes.write(&writer.into_bytes());

        bytes.into_bytes()
    }

    /// Deserialize a compact sketch from bytes with the default seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid or corrupted.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserialize a compact sketch from bytes with a specific seed.
    ///
    /// Accepts serial versions 1 through 3 (uncompressed) and 4
    /// (bit-packed).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is too short for the preamble or the declared content
    /// - The family ID doesn't match
    /// - The serial version is unsupported
    /// - The endianness flag is set
    /// - The seed hash doesn't match
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let byte3 = cursor.read_u8().map_err(make_error("byte3"))?;
        let byte4 = cursor.read_u8().map_err(make_error("byte4"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let seed_hash = cursor.read_u16_le().map_err(make_error("seed_hash"))?;

        if family_id != THETA_FAMILY_ID {
            return Err(Error::invalid_family(THETA_FAMILY_ID, family_id, "THETA"));
        }
        if (flags & FLAG_IS_BIG_ENDIAN) != 0 {
            return Err(Error::deserial("big-endian sketch data is not supported"));
        }

        // Validate seed hash (stored 0 means legacy format, skip validation)
        let expected_seed_hash = compute_seed_hash(seed);
        if seed_hash != 0 && seed_hash != expected_seed_hash {
            return Err(Error::deserial(format!(
                "seed hash mismatch: expected {expected_seed_hash}, got {seed_hash}"
            )));
        }
        let seed_hash = if seed_hash == 0 {
            expected_seed_hash
        } else {
            seed_hash
        };

        match serial_version {
            1..=SERIAL_VERSION => {
                Self::parse_uncompressed(&mut cursor, preamble_longs, flags, seed_hash)
            }
            SERIAL_VERSION_COMPRESSED => Self::parse_compressed(
                &mut cursor,
                preamble_longs,
                byte3,
                byte4,
                flags,
                seed_hash,
            ),
            _ => Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            )),
        }
    }

    fn parse_uncompressed(
        cursor: &mut SketchSlice<'_>,
        preamble_longs: u8,
        flags: u8,
        seed_hash: u16,
    ) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let is_empty = (flags & FLAG_IS_EMPTY) != 0;
        let is_compact = (flags & FLAG_IS_COMPACT) != 0;
        let is_ordered = (flags & FLAG_IS_ORDERED) != 0;
        let is_single_item = (flags & FLAG_HAS_SINGLE_ITEM) != 0;

        if !is_compact {
            return Err(Error::deserial("only compact sketches are supported"));
        }

        if is_empty {
            return Ok(Self {
                theta: MAX_THETA,
                entries: Vec::new(),
                seed_hash,
                is_ordered,
                is_empty: true,
            });
        }

        // Single-item short form: one preamble long plus exactly one key.
        if preamble_longs == PREAMBLE_LONGS_EMPTY && is_single_item {
            let hash = cursor
                .read_u64_le()
                .map_err(make_error("single_item_hash"))?;
            return Ok(Self {
                theta: MAX_THETA,
                entries: vec![hash],
                seed_hash,
                is_ordered,
                is_empty: false,
            });
        }

        if preamble_longs < PREAMBLE_LONGS_EXACT {
            return Err(Error::deserial(format!(
                "non-empty sketch requires at least {PREAMBLE_LONGS_EXACT} preamble longs, got {preamble_longs}"
            )));
        }

        let num_entries = cursor.read_u32_le().map_err(make_error("num_entries"))? as usize;
        let _unused = cursor.read_u32_le().map_err(make_error("unused"))?;

        let theta = if preamble_longs >= PREAMBLE_LONGS_ESTIMATION {
            cursor.read_u64_le().map_err(make_error("theta"))?
        } else {
            MAX_THETA
        };

        if cursor.remaining() < num_entries * HASH_SIZE_BYTES {
            return Err(Error::insufficient_data(format!(
                "expected {num_entries} entries, got {} bytes",
                cursor.remaining()
            )));
        }

        let mut entries = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let hash = cursor.read_u64_le().map_err(make_error("hash_entry"))?;
            entries.push(hash);
        }

        Ok(Self {
            theta,
            entries,
            seed_hash,
            is_ordered,
            is_empty: false,
        })
    }

    fn parse_compressed(
        cursor: &mut SketchSlice<'_>,
        preamble_longs: u8,
        entry_bits: u8,
        num_entries_bytes: u8,
        flags: u8,
        seed_hash: u16,
    ) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        if (flags & FLAG_IS_ORDERED) == 0 {
            return Err(Error::deserial("compressed sketches must be ordered"));
        }
        if entry_bits == 0 || entry_bits > 63 {
            return Err(Error::deserial(format!(
                "entry_bits must be in [1, 63], got {entry_bits}"
            )));
        }
        if num_entries_bytes == 0 || num_entries_bytes > 4 {
            return Err(Error::deserial(format!(
                "num_entries_bytes must be in [1, 4], got {num_entries_bytes}"
            )));
        }

        let theta = if preamble_longs >= 2 {
            cursor.read_u64_le().map_err(make_error("theta"))?
        } else {
            MAX_THETA
        };

        let mut count_bytes = [0u8; 4];
        cursor
            .read_exact(&mut count_bytes[..num_entries_bytes as usize])
            .map_err(make_error("num_entries"))?;
        let num_entries = u32::from_le_bytes(count_bytes) as usize;

        let packed_bytes = (num_entries * entry_bits as usize).div_ceil(8);
        if cursor.remaining() < packed_bytes {
            return Err(Error::insufficient_data(format!(
                "expected {packed_bytes} packed bytes, got {}",
                cursor.remaining()
            )));
        }

        let mut packed = vec![0u8; packed_bytes];
        cursor.read_exact(&mut packed).map_err(make_error("body"))?;
        let mut reader = BitReader::new(&packed);

        let mut entries = Vec::with_capacity(num_entries);
        let mut previous = 0u64;
        for i in 0..num_entries {
            let delta = reader
                .read(entry_bits as u32)
                .ok_or_else(|| Error::insufficient_data("packed entry"))?;
            // A zero delta would yield the reserved key 0 or a duplicate.
            if delta == 0 {
                return Err(Error::deserial(format!(
                    "packed entry {i} repeats its predecessor"
                )));
            }
            previous = previous.checked_add(delta).ok_or_else(|| {
                Error::deserial(format!("packed entry {i} overflows the key space"))
            })?;
            if previous >= theta {
                return Err(Error::deserial(format!(
                    "packed entry {i} is not below theta"
                )));
            }
            entries.push(previous);
        }

        Ok(Self {
            theta,
            entries,
            seed_hash,
            is_ordered: true,
            is_empty: false,
        })
    }
}

impl ThetaSketchView for CompactThetaSketch {
    fn is_empty(&self) -> bool {
        CompactThetaSketch::is_empty(self)
    }

    fn theta64(&self) -> u64 {
        CompactThetaSketch::theta64(self)
    }

    fn num_retained(&self) -> usize {
        CompactThetaSketch::num_retained(self)
    }

    fn seed_hash(&self) -> u16 {
        CompactThetaSketch::seed_hash(self)
    }

    fn is_ordered(&self) -> bool {
        CompactThetaSketch::is_ordered(self)
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        CompactThetaSketch::iter(self)
    }
}

/// Bits needed to represent any key below theta.
fn compute_entry_bits(theta: u64) -> u32 {
    64 - theta.leading_zeros()
}

/// Minimal little-endian byte width of a count.
fn byte_width(n: u32) -> u8 {
    ((32 - n.leading_zeros()).div_ceil(8).max(1)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_hash() -> u16 {
        compute_seed_hash(DEFAULT_UPDATE_SEED)
    }

    #[test]
    fn test_empty_compact_sketch() {
        let sketch =
            CompactThetaSketch::from_parts(Vec::new(), MAX_THETA, seed_hash(), true, true);
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0.0);
        assert_eq!(sketch.num_retained(), 0);
        assert!(!sketch.is_estimation_mode());
    }

    #[test]
    fn test_compact_sketch_with_entries() {
        let entries = vec![100, 200, 300];
        let sketch =
            CompactThetaSketch::from_parts(entries.clone(), MAX_THETA, seed_hash(), true, false);
        assert!(!sketch.is_empty());
        assert_eq!(sketch.num_retained(), 3);
        assert_eq!(sketch.estimate(), 3.0);
        assert!(!sketch.is_estimation_mode());
    }

    #[test]
    fn test_compact_sketch_estimation_mode() {
        let entries = vec![100, 200, 300];
        let theta = MAX_THETA / 2;
        let sketch = CompactThetaSketch::from_parts(entries, theta, seed_hash(), true, false);
        assert!(sketch.is_estimation_mode());
        assert!(sketch.estimate() > 3.0); // approximately 6.0
    }

    #[test]
    fn test_serialize_deserialize_empty() {
        let sketch =
            CompactThetaSketch::from_parts(Vec::new(), MAX_THETA, seed_hash(), true, true);
        let bytes = sketch.serialize();
        assert_eq!(bytes.len(), 8);
        let restored = CompactThetaSketch::deserialize(&bytes).unwrap();

        assert!(restored.is_empty());
        assert_eq!(sketch.theta64(), restored.theta64());
        assert_eq!(sketch.seed_hash(), restored.seed_hash());
    }

    #[test]
    fn test_serialize_deserialize_single_item() {
        let sketch =
            CompactThetaSketch::from_parts(vec![12345], MAX_THETA, seed_hash(), true, false);
        let bytes = sketch.serialize();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], PREAMBLE_LONGS_EMPTY);
        assert_ne!(bytes[5] & FLAG_HAS_SINGLE_ITEM, 0);

        let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
        assert_eq!(restored.num_retained(), 1);
        assert_eq!(restored.iter().next(), Some(12345));
        assert_eq!(restored.estimate(), 1.0);
    }

    #[test]
    fn test_serialize_deserialize_exact_mode() {
        let entries = vec![100, 200, 300, 400, 500];
        let sketch =
            CompactThetaSketch::from_parts(entries.clone(), MAX_THETA, seed_hash(), true, false);
        let bytes = sketch.serialize();
        let restored = CompactThetaSketch::deserialize(&bytes).unwrap();

        assert!(!restored.is_empty());
        assert!(!restored.is_estimation_mode());
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_serialize_deserialize_estimation_mode() {
        let entries = vec![100, 200, 300];
        let theta = MAX_THETA / 2;
        let sketch =
            CompactThetaSketch::from_parts(entries.clone(), theta, seed_hash(), false, false);
        let bytes = sketch.serialize();
        let restored = CompactThetaSketch::deserialize(&bytes).unwrap();

        assert!(!restored.is_empty());
        assert!(restored.is_estimation_mode());
        assert!(!restored.is_ordered());
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_reserialization_is_byte_identical() {
        let entries: Vec<u64> = (1..=64).map(|i| i * 1000).collect();
        let sketch =
            CompactThetaSketch::from_parts(entries, MAX_THETA / 3, seed_hash(), true, false);
        let bytes = sketch.serialize();
        let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
        assert_eq!(restored.serialize(), bytes);
    }

    #[test]
    fn test_compressed_round_trip() {
        let entries: Vec<u64> = (1..=100).map(|i| i * 977).collect();
        let theta = entries.last().unwrap() + 1;
        let sketch = CompactThetaSketch::from_parts(entries, theta, seed_hash(), true, false);

        let compressed = sketch.serialize_compressed();
        assert!(compressed.len() < sketch.serialize().len());
        assert_eq!(compressed[1], SERIAL_VERSION_COMPRESSED);

        let restored = CompactThetaSketch::deserialize(&compressed).unwrap();
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_compressed_exact_mode_round_trip() {
        let entries: Vec<u64> = (1..=50).map(|i| i << 40).collect();
        let sketch =
            CompactThetaSketch::from_parts(entries, MAX_THETA, seed_hash(), true, false);
        let compressed = sketch.serialize_compressed();
        let restored = CompactThetaSketch::deserialize(&compressed).unwrap();
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_compressed_falls_back_for_unordered() {
        let sketch =
            CompactThetaSketch::from_parts(vec![300, 100, 200], MAX_THETA, seed_hash(), false, false);
        let bytes = sketch.serialize_compressed();
        assert_eq!(bytes[1], SERIAL_VERSION);
    }

    #[test]
    fn test_deserialize_invalid_family() {
        let mut bytes = vec![
            1,
            SERIAL_VERSION,
            99,
            0,
            0,
            FLAG_IS_EMPTY | FLAG_IS_COMPACT | FLAG_IS_ORDERED,
        ];
        bytes.extend_from_slice(&seed_hash().to_le_bytes());

        let result = CompactThetaSketch::deserialize(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_invalid_seed() {
        let mut bytes = vec![
            1,
            SERIAL_VERSION,
            THETA_FAMILY_ID,
            0,
            0,
            FLAG_IS_EMPTY | FLAG_IS_COMPACT | FLAG_IS_ORDERED,
        ];
        bytes.extend_from_slice(&9999u16.to_le_bytes()); // wrong seed hash

        let result = CompactThetaSketch::deserialize(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_big_endian_flag() {
        let mut bytes = vec![
            1,
            SERIAL_VERSION,
            THETA_FAMILY_ID,
            0,
            0,
            FLAG_IS_BIG_ENDIAN | FLAG_IS_EMPTY | FLAG_IS_COMPACT,
        ];
        bytes.extend_from_slice(&seed_hash().to_le_bytes());

        let result = CompactThetaSketch::deserialize(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_truncated_entries() {
        let entries = vec![100, 200, 300];
        let sketch =
            CompactThetaSketch::from_parts(entries, MAX_THETA, seed_hash(), true, false);
        let bytes = sketch.serialize();
        let result = CompactThetaSketch::deserialize(&bytes[..bytes.len() - 4]);
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_bits_bounds() {
        assert_eq!(compute_entry_bits(1), 1);
        assert_eq!(compute_entry_bits(2), 2);
        assert_eq!(compute_entry_bits(MAX_THETA), 63);
    }

    #[test]
    fn test_byte_width() {
        assert_eq!(byte_width(0), 1);
        assert_eq!(byte_width(255), 1);
        assert_eq!(byte_width(256), 2);
        assert_eq!(byte_width(u32::MAX), 4);
    }
}
