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

//! Salted 128-bit stream hash used by all key-based sketches.
//!
//! The core is MurmurHash3_x64_128 (via the `mur3` crate), exposed through a
//! [`std::hash::Hasher`] adapter so any `T: Hash` can feed a sketch. Integer
//! writes are little-endian so the same logical value produces the same hash
//! on every platform.

use std::hash::Hasher;

/// Default hash seed shared by all sketches unless overridden.
pub const DEFAULT_UPDATE_SEED: u64 = 9001;

/// MurmurHash3_x64_128 as a [`Hasher`] with access to both 64-bit halves.
///
/// The adapter buffers written bytes and hashes them in one pass in
/// [`finish128`](Self::finish128), so fragmented `Hash` impls and a single
/// `write` of the concatenated bytes produce identical digests. The 128-bit
/// core consumes the low 32 bits of the seed.
#[derive(Debug, Clone)]
pub struct MurmurHash3X64128 {
    seed: u32,
    buf: Vec<u8>,
}

impl MurmurHash3X64128 {
    /// Creates a hasher salted with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: seed as u32,
            buf: Vec::with_capacity(16),
        }
    }

    /// Returns both 64-bit halves of the 128-bit digest.
    pub fn finish128(&self) -> (u64, u64) {
        mur3::murmurhash3_x64_128(&self.buf, self.seed)
    }
}

impl Hasher for MurmurHash3X64128 {
    fn finish(&self) -> u64 {
        self.finish128().0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn write_u8(&mut self, i: u8) {
        self.buf.push(i);
    }

    fn write_u16(&mut self, i: u16) {
        self.write(&i.to_le_bytes());
    }

    fn write_u32(&mut self, i: u32) {
        self.write(&i.to_le_bytes());
    }

    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }

    fn write_u128(&mut self, i: u128) {
        self.write(&i.to_le_bytes());
    }

    fn write_usize(&mut self, i: usize) {
        self.write_u64(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.write_u8(i as u8);
    }

    fn write_i16(&mut self, i: i16) {
        self.write_u16(i as u16);
    }

    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32);
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn write_i128(&mut self, i: i128) {
        self.write_u128(i as u128);
    }

    fn write_isize(&mut self, i: isize) {
        self.write_u64(i as u64);
    }
}

/// Derives the 16-bit seed hash used as a compatibility check when sketches
/// built from different sources are combined.
///
/// The seed itself is never serialized; only this hash is, so two sketches
/// can verify they were salted identically without revealing the salt.
pub fn compute_seed_hash(seed: u64) -> u16 {
    let (h1, _) = mur3::murmurhash3_x64_128(&seed.to_le_bytes(), 0);
    (h1 & 0xffff) as u16
}
