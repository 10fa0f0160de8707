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

//! Shared support types and math utilities.

pub mod binomial_bounds;
pub mod random;

/// Growth multiplier applied when a sketch's hash table is below its
/// nominal capacity and fills past the resize threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFactor {
    /// No growth; the table starts at its maximum size.
    X1,
    /// Double on each resize.
    X2,
    /// Quadruple on each resize.
    X4,
    /// Grow eightfold on each resize (default).
    X8,
}

impl ResizeFactor {
    /// Log2 of the multiplier.
    pub fn lg_value(self) -> u8 {
        match self {
            ResizeFactor::X1 => 0,
            ResizeFactor::X2 => 1,
            ResizeFactor::X4 => 2,
            ResizeFactor::X8 => 3,
        }
    }
}

/// Number of standard deviations for confidence bounds.
///
/// One, two and three standard deviations correspond to roughly 68%, 95%
/// and 99% confidence intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumStdDev {
    /// One standard deviation (~68% confidence).
    One,
    /// Two standard deviations (~95% confidence).
    Two,
    /// Three standard deviations (~99% confidence).
    Three,
}

impl NumStdDev {
    /// The numeric multiplier.
    pub fn value(self) -> u32 {
        match self {
            NumStdDev::One => 1,
            NumStdDev::Two => 2,
            NumStdDev::Three => 3,
        }
    }
}

/// Canonicalizes a double before hashing.
///
/// `+0.0` and `-0.0` map to the bit pattern of `+0.0`, and every NaN maps
/// to the canonical quiet NaN, so two streams with equivalent values agree
/// on retained hash keys.
pub fn canonical_double(value: f64) -> i64 {
    if value.is_nan() {
        0x7ff8000000000000u64 as i64
    } else if value == 0.0 {
        0
    } else {
        value.to_bits() as i64
    }
}

/// Smallest power of two greater than or equal to `n` (minimum 1).
pub fn ceiling_power_of_2(n: u64) -> u64 {
    n.max(1).next_power_of_two()
}
