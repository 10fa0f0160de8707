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

//! Arbitrary-bit-width packing for the compressed compact-Theta body.
//!
//! Values are packed most-significant-bit first. The accumulator is 128
//! bits wide: at most 7 residual bits plus a 63-bit value must fit.

/// Packs fixed-width values into a byte vector.
pub(crate) struct BitWriter {
    out: Vec<u8>,
    acc: u128,
    pending_bits: u32,
}

impl BitWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            acc: 0,
            pending_bits: 0,
        }
    }

    /// Appends the low `bits` bits of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is 0 or greater than 64, or if `value` does not fit
    /// in `bits` bits.
    pub fn write(&mut self, value: u64, bits: u32) {
        assert!(bits >= 1 && bits <= 64, "bits must be in [1, 64], got {bits}");
        if bits < 64 {
            assert!(
                value < (1u64 << bits),
                "value {value} does not fit in {bits} bits"
            );
        }
        self.acc = (self.acc << bits) | value as u128;
        self.pending_bits += bits;
        while self.pending_bits >= 8 {
            self.pending_bits -= 8;
            self.out.push((self.acc >> self.pending_bits) as u8);
        }
    }

    /// Flushes the residual bits (zero padded) and returns the bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.pending_bits > 0 {
            let pad = 8 - self.pending_bits;
            self.out.push((self.acc << pad) as u8);
        }
        self.out
    }
}

/// Unpacks fixed-width values from a byte slice.
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    next: usize,
    acc: u128,
    pending_bits: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            next: 0,
            acc: 0,
            pending_bits: 0,
        }
    }

    /// Reads the next `bits` bits as an unsigned value, or None if the
    /// input is exhausted.
    pub fn read(&mut self, bits: u32) -> Option<u64> {
        debug_assert!(bits >= 1 && bits <= 64, "bits must be in [1, 64]");
        while self.pending_bits < bits {
            let byte = *self.bytes.get(self.next)?;
            self.next += 1;
            self.acc = (self.acc << 8) | byte as u128;
            self.pending_bits += 8;
        }
        self.pending_bits -= bits;
        let value = (self.acc >> self.pending_bits) as u64;
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        Some(value & mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_aligned_round_trip() {
        let mut writer = BitWriter::with_capacity(8);
        writer.write(0xab, 8);
        writer.write(0xcd, 8);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0xab, 0xcd]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read(8), Some(0xab));
        assert_eq!(reader.read(8), Some(0xcd));
        assert_eq!(reader.read(8), None);
    }

    #[test]
    fn test_unaligned_round_trip() {
        let values = [5u64, 0, 7, 3, 6, 1, 2, 4];
        let mut writer = BitWriter::with_capacity(4);
        for &value in &values {
            writer.write(value, 3);
        }
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 3); // 24 bits

        let mut reader = BitReader::new(&bytes);
        for &value in &values {
            assert_eq!(reader.read(3), Some(value));
        }
    }

    #[test]
    fn test_wide_values_round_trip() {
        let values = [0u64, 1, (1 << 62) + 12345, (1 << 63) - 1];
        let mut writer = BitWriter::with_capacity(32);
        for &value in &values {
            writer.write(value, 63);
        }
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        for &value in &values {
            assert_eq!(reader.read(63), Some(value));
        }
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_overflow_value_panics() {
        let mut writer = BitWriter::with_capacity(1);
        writer.write(8, 3);
    }

    #[test]
    fn test_truncated_input_returns_none() {
        let mut writer = BitWriter::with_capacity(2);
        writer.write(0x1ff, 9);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read(9), Some(0x1ff));
        assert_eq!(reader.read(9), None);
    }
}
