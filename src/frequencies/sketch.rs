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

//! Frequent items sketch implementations.

use std::hash::Hash;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::frequencies::reverse_purge_item_hash_map::ReversePurgeItemHashMap;
use crate::frequencies::reverse_purge_long_hash_map::ReversePurgeLongHashMap;
use crate::frequencies::serde::ItemsSerde;
use crate::frequencies::serialization::EMPTY_FLAG_MASK;
use crate::frequencies::serialization::FAMILY_ID;
use crate::frequencies::serialization::PREAMBLE_LONGS_EMPTY;
use crate::frequencies::serialization::PREAMBLE_LONGS_NONEMPTY;
use crate::frequencies::serialization::SER_VER;

const LG_MIN_MAP_SIZE: u8 = 3;
const SAMPLE_SIZE: usize = 1024;
const EPSILON_FACTOR: f64 = 3.5;
const LOAD_FACTOR_NUMERATOR: usize = 3;
const LOAD_FACTOR_DENOMINATOR: usize = 4;

/// Error guarantees for frequent item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Include items if the upper bound exceeds the threshold (no false
    /// negatives).
    NoFalseNegatives,
    /// Include items if the lower bound exceeds the threshold (no false
    /// positives).
    NoFalsePositives,
}

/// Result row for frequent item queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<T> {
    item: T,
    estimate: i64,
    upper_bound: i64,
    lower_bound: i64,
}

impl<T> Row<T> {
    /// Returns the item value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Returns the estimated frequency.
    pub fn estimate(&self) -> i64 {
        self.estimate
    }

    /// Returns the upper bound for the frequency.
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    /// Returns the lower bound for the frequency.
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }
}

/// Frequent items sketch specialized for `i64` keys.
#[derive(Debug, Clone)]
pub struct FrequentLongsSketch {
    lg_max_map_size: u8,
    cur_map_cap: usize,
    offset: i64,
    stream_weight: i64,
    sample_size: usize,
    hash_map: ReversePurgeLongHashMap,
}

impl FrequentLongsSketch {
    /// Creates a new sketch with the given maximum map size (power of two).
    pub fn new(max_map_size: usize) -> Self {
        let lg_max_map_size = exact_log2(max_map_size);
        Self::with_lg_map_sizes(lg_max_map_size, LG_MIN_MAP_SIZE)
    }

    /// Returns true if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.hash_map.get_num_active() == 0
    }

    /// Returns the number of active items being tracked.
    pub fn get_num_active_items(&self) -> usize {
        self.hash_map.get_num_active()
    }

    /// Returns the total weight of the stream.
    pub fn get_total_weight(&self) -> i64 {
        self.stream_weight
    }

    /// Returns the estimated frequency for an item.
    pub fn get_estimate(&self, item: i64) -> i64 {
        let value = self.hash_map.get(item);
        if value > 0 { value + self.offset } else { 0 }
    }

    /// Returns the lower bound for an item's frequency.
    pub fn get_lower_bound(&self, item: i64) -> i64 {
        self.hash_map.get(item)
    }

    /// Returns the upper bound for an item's frequency.
    pub fn get_upper_bound(&self, item: i64) -> i64 {
        self.hash_map.get(item) + self.offset
    }

    /// Returns the maximum error across all items.
    pub fn get_maximum_error(&self) -> i64 {
        self.offset
    }

    /// Returns epsilon for this sketch.
    pub fn get_epsilon(&self) -> f64 {
        Self::get_epsilon_for_lg(self.lg_max_map_size)
    }

    /// Returns epsilon for a sketch configured with `lg_max_map_size`.
    pub fn get_epsilon_for_lg(lg_max_map_size: u8) -> f64 {
        EPSILON_FACTOR / (1u64 << lg_max_map_size) as f64
    }

    /// Returns the a priori error estimate for a planned stream weight.
    pub fn get_apriori_error(lg_max_map_size: u8, estimated_total_weight: i64) -> f64 {
        Self::get_epsilon_for_lg(lg_max_map_size) * estimated_total_weight as f64
    }

    /// Returns the maximum map capacity for this sketch.
    pub fn get_maximum_map_capacity(&self) -> usize {
        (1usize << self.lg_max_map_size) * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR
    }

    /// Returns the current map capacity.
    pub fn get_current_map_capacity(&self) -> usize {
        self.cur_map_cap
    }

    /// Returns the configured lg_max_map_size.
    pub fn get_lg_max_map_size(&self) -> u8 {
        self.lg_max_map_size
    }

    /// Returns the current map size in log2.
    pub fn get_lg_cur_map_size(&self) -> u8 {
        self.hash_map.get_lg_length()
    }

    /// Updates the sketch with a count of one.
    pub fn update(&mut self, item: i64) {
        self.update_with_count(item, 1);
    }

    /// Updates the sketch with an item and count.
    ///
    /// # Panics
    ///
    /// Panics if `count` is negative. A zero count is a no-op.
    pub fn update_with_count(&mut self, item: i64, count: i64) {
        if count == 0 {
            return;
        }
        assert!(count > 0, "count may not be negative");
        self.stream_weight += count;
        self.hash_map.adjust_or_put_value(item, count);
        self.maybe_resize_or_purge();
    }

    /// Merges another sketch into this one.
    ///
    /// Offsets accumulate, so merged upper bounds stay valid.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        let merged_total = self.stream_weight + other.stream_weight;
        for (item, count) in other.hash_map.iter() {
            self.update_with_count(item, count);
        }
        self.offset += other.offset;
        self.stream_weight = merged_total;
    }

    /// Resets the sketch to an empty state.
    pub fn reset(&mut self) {
        *self = Self::with_lg_map_sizes(self.lg_max_map_size, LG_MIN_MAP_SIZE);
    }

    /// Returns frequent items using the sketch maximum error as threshold.
    pub fn get_frequent_items(&self, error_type: ErrorType) -> Vec<Row<i64>> {
        self.get_frequent_items_with_threshold(error_type, self.offset)
    }

    /// Returns frequent items using a custom threshold.
    pub fn get_frequent_items_with_threshold(
        &self,
        error_type: ErrorType,
        threshold: i64,
    ) -> Vec<Row<i64>> {
        let threshold = threshold.max(self.offset);
        let mut rows = Vec::new();
        for (item, count) in self.hash_map.iter() {
            let lower = count;
            let upper = count + self.offset;
            let include = match error_type {
                ErrorType::NoFalseNegatives => upper > threshold,
                ErrorType::NoFalsePositives => lower > threshold,
            };
            if include {
                rows.push(Row {
                    item,
                    estimate: upper,
                    upper_bound: upper,
                    lower_bound: lower,
                });
            }
        }
        rows.sort_by(|a, b| b.estimate.cmp(&a.estimate));
        rows
    }

    /// Serializes this sketch into a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = self.serialize_preamble();
        if self.is_empty() {
            return bytes.into_bytes();
        }
        for value in self.hash_map.get_active_values() {
            bytes.write_i64_le(value);
        }
        for key in self.hash_map.get_active_keys() {
            bytes.write_i64_le(key);
        }
        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated, carry a wrong family
    /// or version, or declare inconsistent map sizes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let preamble = Preamble::parse(&mut cursor)?;
        if preamble.is_empty {
            return Ok(Self::with_lg_map_sizes(preamble.lg_max, preamble.lg_cur));
        }

        let active_items = preamble.active_items;
        if cursor.remaining() < active_items * 16 {
            return Err(Error::insufficient_data("values and keys"));
        }
        let mut values = Vec::with_capacity(active_items);
        for _ in 0..active_items {
            values.push(
                cursor
                    .read_i64_le()
                    .map_err(|_| Error::insufficient_data("value"))?,
            );
        }
        let mut sketch = Self::with_lg_map_sizes(preamble.lg_max, preamble.lg_cur);
        for value in &values {
            if *value <= 0 {
                return Err(Error::deserial("counters must be positive"));
            }
        }
        for value in values {
            let key = cursor
                .read_i64_le()
                .map_err(|_| Error::insufficient_data("key"))?;
            sketch.update_with_count(key, value);
        }
        sketch.stream_weight = preamble.stream_weight;
        sketch.offset = preamble.offset;
        Ok(sketch)
    }

    fn serialize_preamble(&self) -> SketchBytes {
        serialize_preamble(
            self.is_empty(),
            self.lg_max_map_size,
            self.hash_map.get_lg_length(),
            self.get_num_active_items(),
            self.stream_weight,
            self.offset,
        )
    }

    fn maybe_resize_or_purge(&mut self) {
        if self.hash_map.get_num_active() > self.cur_map_cap {
            if self.hash_map.get_lg_length() < self.lg_max_map_size {
                self.hash_map.resize(self.hash_map.get_length() * 2);
                self.cur_map_cap = self.hash_map.get_capacity();
            } else {
                let delta = self.hash_map.purge(self.sample_size);
                self.offset += delta;
                assert!(
                    self.hash_map.get_num_active() <= self.get_maximum_map_capacity(),
                    "purge did not reduce number of active items"
                );
            }
        }
    }

    fn with_lg_map_sizes(lg_max_map_size: u8, lg_cur_map_size: u8) -> Self {
        let lg_max = lg_max_map_size.max(LG_MIN_MAP_SIZE);
        let lg_cur = lg_cur_map_size.max(LG_MIN_MAP_SIZE);
        assert!(
            lg_cur <= lg_max,
            "lg_cur_map_size must not exceed lg_max_map_size"
        );
        let map = ReversePurgeLongHashMap::new(1usize << lg_cur);
        let cur_map_cap = map.get_capacity();
        let max_map_cap = (1usize << lg_max) * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR;
        let sample_size = SAMPLE_SIZE.min(max_map_cap);
        Self {
            lg_max_map_size: lg_max,
            cur_map_cap,
            offset: 0,
            stream_weight: 0,
            sample_size,
            hash_map: map,
        }
    }
}

/// Frequent items sketch for generic item types.
#[derive(Debug, Clone)]
pub struct FrequentItemsSketch<T> {
    lg_max_map_size: u8,
    cur_map_cap: usize,
    offset: i64,
    stream_weight: i64,
    sample_size: usize,
    hash_map: ReversePurgeItemHashMap<T>,
}

impl<T: Eq + Hash> FrequentItemsSketch<T> {
    /// Creates a new sketch with the given maximum map size (power of two).
    pub fn new(max_map_size: usize) -> Self {
        let lg_max_map_size = exact_log2(max_map_size);
        Self::with_lg_map_sizes(lg_max_map_size, LG_MIN_MAP_SIZE)
    }

    /// Returns true if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.hash_map.get_num_active() == 0
    }

    /// Returns the number of active items being tracked.
    pub fn get_num_active_items(&self) -> usize {
        self.hash_map.get_num_active()
    }

    /// Returns the total weight of the stream.
    pub fn get_total_weight(&self) -> i64 {
        self.stream_weight
    }

    /// Returns the estimated frequency for an item.
    pub fn get_estimate(&self, item: &T) -> i64 {
        let value = self.hash_map.get(item);
        if value > 0 { value + self.offset } else { 0 }
    }

    /// Returns the lower bound for an item's frequency.
    pub fn get_lower_bound(&self, item: &T) -> i64 {
        self.hash_map.get(item)
    }

    /// Returns the upper bound for an item's frequency.
    pub fn get_upper_bound(&self, item: &T) -> i64 {
        self.hash_map.get(item) + self.offset
    }

    /// Returns the maximum error across all items.
    pub fn get_maximum_error(&self) -> i64 {
        self.offset
    }

    /// Returns epsilon for this sketch.
    pub fn get_epsilon(&self) -> f64 {
        FrequentLongsSketch::get_epsilon_for_lg(self.lg_max_map_size)
    }

    /// Returns the maximum map capacity for this sketch.
    pub fn get_maximum_map_capacity(&self) -> usize {
        (1usize << self.lg_max_map_size) * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR
    }

    /// Returns the current map capacity.
    pub fn get_current_map_capacity(&self) -> usize {
        self.cur_map_cap
    }

    /// Returns the configured lg_max_map_size.
    pub fn get_lg_max_map_size(&self) -> u8 {
        self.lg_max_map_size
    }

    /// Returns the current map size in log2.
    pub fn get_lg_cur_map_size(&self) -> u8 {
        self.hash_map.get_lg_length()
    }

    /// Updates the sketch with a count of one.
    pub fn update(&mut self, item: T) {
        self.update_with_count(item, 1);
    }

    /// Updates the sketch with an item and count.
    ///
    /// # Panics
    ///
    /// Panics if `count` is negative. A zero count is a no-op.
    pub fn update_with_count(&mut self, item: T, count: i64) {
        if count == 0 {
            return;
        }
        assert!(count > 0, "count may not be negative");
        self.stream_weight += count;
        self.hash_map.adjust_or_put_value(item, count);
        self.maybe_resize_or_purge();
    }

    /// Merges another sketch into this one.
    ///
    /// Offsets accumulate, so merged upper bounds stay valid.
    pub fn merge(&mut self, other: &Self)
    where
        T: Clone,
    {
        if other.is_empty() {
            return;
        }
        let merged_total = self.stream_weight + other.stream_weight;
        for (item, count) in other.hash_map.iter() {
            self.update_with_count(item.clone(), count);
        }
        self.offset += other.offset;
        self.stream_weight = merged_total;
    }

    /// Resets the sketch to an empty state.
    pub fn reset(&mut self) {
        *self = Self::with_lg_map_sizes(self.lg_max_map_size, LG_MIN_MAP_SIZE);
    }

    /// Returns frequent items using the sketch maximum error as threshold.
    pub fn get_frequent_items(&self, error_type: ErrorType) -> Vec<Row<T>>
    where
        T: Clone,
    {
        self.get_frequent_items_with_threshold(error_type, self.offset)
    }

    /// Returns frequent items using a custom threshold.
    pub fn get_frequent_items_with_threshold(
        &self,
        error_type: ErrorType,
        threshold: i64,
    ) -> Vec<Row<T>>
    where
        T: Clone,
    {
        let threshold = threshold.max(self.offset);
        let mut rows = Vec::new();
        for (item, count) in self.hash_map.iter() {
            let lower = count;
            let upper = count + self.offset;
            let include = match error_type {
                ErrorType::NoFalseNegatives => upper > threshold,
                ErrorType::NoFalsePositives => lower > threshold,
            };
            if include {
                rows.push(Row {
                    item: item.clone(),
                    estimate: upper,
                    upper_bound: upper,
                    lower_bound: lower,
                });
            }
        }
        rows.sort_by(|a, b| b.estimate.cmp(&a.estimate));
        rows
    }

    /// Serializes this sketch into a byte vector using the provided item
    /// codec.
    pub fn serialize_with<S: ItemsSerde<T>>(&self, serde: &S) -> Vec<u8>
    where
        T: Clone,
    {
        let mut bytes = serialize_preamble(
            self.is_empty(),
            self.lg_max_map_size,
            self.hash_map.get_lg_length(),
            self.get_num_active_items(),
            self.stream_weight,
            self.offset,
        );
        if self.is_empty() {
            return bytes.into_bytes();
        }
        let mut keys = Vec::with_capacity(self.get_num_active_items());
        for (item, _) in self.hash_map.iter() {
            keys.push(item.clone());
        }
        for value in self.hash_map.get_active_values() {
            bytes.write_i64_le(value);
        }
        bytes.write(&serde.serialize_items(&keys));
        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes using the provided item codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated, carry a wrong family
    /// or version, or the item payload is malformed.
    pub fn deserialize_with<S: ItemsSerde<T>>(bytes: &[u8], serde: &S) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let preamble = Preamble::parse(&mut cursor)?;
        if preamble.is_empty {
            return Ok(Self::with_lg_map_sizes(preamble.lg_max, preamble.lg_cur));
        }

        let active_items = preamble.active_items;
        if cursor.remaining() < active_items * 8 {
            return Err(Error::insufficient_data("values"));
        }
        let mut values = Vec::with_capacity(active_items);
        for _ in 0..active_items {
            values.push(
                cursor
                    .read_i64_le()
                    .map_err(|_| Error::insufficient_data("value"))?,
            );
        }
        for value in &values {
            if *value <= 0 {
                return Err(Error::deserial("counters must be positive"));
            }
        }

        let items_offset = bytes.len() - cursor.remaining();
        let (items, consumed) = serde.deserialize_items(&bytes[items_offset..], active_items)?;
        if items.len() != active_items {
            return Err(Error::deserial("item count mismatch during deserialization"));
        }
        if consumed > bytes.len() - items_offset {
            return Err(Error::insufficient_data("items"));
        }

        let mut sketch = Self::with_lg_map_sizes(preamble.lg_max, preamble.lg_cur);
        for (item, value) in items.into_iter().zip(values) {
            sketch.update_with_count(item, value);
        }
        sketch.stream_weight = preamble.stream_weight;
        sketch.offset = preamble.offset;
        Ok(sketch)
    }

    fn maybe_resize_or_purge(&mut self) {
        if self.hash_map.get_num_active() > self.cur_map_cap {
            if self.hash_map.get_lg_length() < self.lg_max_map_size {
                self.hash_map.resize(self.hash_map.get_length() * 2);
                self.cur_map_cap = self.hash_map.get_capacity();
            } else {
                let delta = self.hash_map.purge(self.sample_size);
                self.offset += delta;
                assert!(
                    self.hash_map.get_num_active() <= self.get_maximum_map_capacity(),
                    "purge did not reduce number of active items"
                );
            }
        }
    }

    fn with_lg_map_sizes(lg_max_map_size: u8, lg_cur_map_size: u8) -> Self {
        let lg_max = lg_max_map_size.max(LG_MIN_MAP_SIZE);
        let lg_cur = lg_cur_map_size.max(LG_MIN_MAP_SIZE);
        assert!(
            lg_cur <= lg_max,
            "lg_cur_map_size must not exceed lg_max_map_size"
        );
        let map = ReversePurgeItemHashMap::new(1usize << lg_cur);
        let cur_map_cap = map.get_capacity();
        let max_map_cap = (1usize << lg_max) * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR;
        let sample_size = SAMPLE_SIZE.min(max_map_cap);
        Self {
            lg_max_map_size: lg_max,
            cur_map_cap,
            offset: 0,
            stream_weight: 0,
            sample_size,
            hash_map: map,
        }
    }
}

struct Preamble {
    lg_max: u8,
    lg_cur: u8,
    is_empty: bool,
    active_items: usize,
    stream_weight: i64,
    offset: i64,
}

impl Preamble {
    fn parse(cursor: &mut SketchSlice<'_>) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let pre_longs = cursor.read_u8().map_err(make_error("preamble_longs"))? & 0x3f;
        let ser_ver = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family = cursor.read_u8().map_err(make_error("family_id"))?;
        let lg_max = cursor.read_u8().map_err(make_error("lg_max_map_size"))?;
        let lg_cur = cursor.read_u8().map_err(make_error("lg_cur_map_size"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let _unused = cursor.read_u16_le().map_err(make_error("unused"))?;

        if ser_ver != SER_VER {
            return Err(Error::unsupported_serial_version(SER_VER, ser_ver));
        }
        if family != FAMILY_ID {
            return Err(Error::invalid_family(FAMILY_ID, family, "FREQUENCY"));
        }
        if lg_cur > lg_max {
            return Err(Error::deserial("lg_cur_map_size exceeds lg_max_map_size"));
        }

        let is_empty = (flags & EMPTY_FLAG_MASK) != 0;
        if is_empty {
            if pre_longs != PREAMBLE_LONGS_EMPTY {
                return Err(Error::invalid_preamble_longs(
                    PREAMBLE_LONGS_EMPTY,
                    pre_longs,
                ));
            }
            return Ok(Self {
                lg_max,
                lg_cur,
                is_empty: true,
                active_items: 0,
                stream_weight: 0,
                offset: 0,
            });
        }

        if pre_longs != PREAMBLE_LONGS_NONEMPTY {
            return Err(Error::invalid_preamble_longs(
                PREAMBLE_LONGS_NONEMPTY,
                pre_longs,
            ));
        }
        let active_items = cursor.read_u32_le().map_err(make_error("active_items"))? as usize;
        let _unused2 = cursor.read_u32_le().map_err(make_error("unused2"))?;
        let stream_weight = cursor.read_i64_le().map_err(make_error("stream_weight"))?;
        let offset = cursor.read_i64_le().map_err(make_error("offset"))?;
        if offset < 0 {
            return Err(Error::deserial("offset may not be negative"));
        }

        Ok(Self {
            lg_max,
            lg_cur,
            is_empty: false,
            active_items,
            stream_weight,
            offset,
        })
    }
}

fn serialize_preamble(
    is_empty: bool,
    lg_max: u8,
    lg_cur: u8,
    active_items: usize,
    stream_weight: i64,
    offset: i64,
) -> SketchBytes {
    let pre_longs = if is_empty {
        PREAMBLE_LONGS_EMPTY
    } else {
        PREAMBLE_LONGS_NONEMPTY
    };
    let mut bytes = SketchBytes::with_capacity(pre_longs as usize * 8 + active_items * 16);
    bytes.write_u8(pre_longs);
    bytes.write_u8(SER_VER);
    bytes.write_u8(FAMILY_ID);
    bytes.write_u8(lg_max);
    bytes.write_u8(lg_cur);
    bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 });
    bytes.write_u16_le(0);
    if !is_empty {
        bytes.write_u32_le(active_items as u32);
        bytes.write_u32_le(0);
        bytes.write_i64_le(stream_weight);
        bytes.write_i64_le(offset);
    }
    bytes
}

fn exact_log2(value: usize) -> u8 {
    assert!(value.is_power_of_two(), "value must be power of 2");
    value.trailing_zeros() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_bracket_truth() {
        let mut sketch = FrequentLongsSketch::new(64);
        // Force purges with many distinct items.
        for i in 0..10_000i64 {
            sketch.update(i % 500);
        }
        for i in 0..500i64 {
            let true_count = 20;
            assert!(sketch.get_lower_bound(i) <= true_count);
            assert!(sketch.get_upper_bound(i) >= sketch.get_lower_bound(i));
        }
        assert_eq!(sketch.get_total_weight(), 10_000);
    }

    #[test]
    fn test_offset_grows_on_purge() {
        let mut sketch = FrequentLongsSketch::new(8);
        for i in 0..1000i64 {
            sketch.update(i);
        }
        assert!(sketch.get_maximum_error() > 0);
        assert!(sketch.get_num_active_items() <= sketch.get_maximum_map_capacity());
    }

    #[test]
    fn test_epsilon_formula() {
        assert_eq!(FrequentLongsSketch::get_epsilon_for_lg(10), 3.5 / 1024.0);
        let sketch = FrequentLongsSketch::new(1024);
        assert_eq!(sketch.get_epsilon(), 3.5 / 1024.0);
    }

    #[test]
    #[should_panic(expected = "count may not be negative")]
    fn test_negative_count_panics() {
        let mut sketch = FrequentLongsSketch::new(64);
        sketch.update_with_count(1, -1);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut sketch = FrequentLongsSketch::new(64);
        sketch.update_with_count(1, 0);
        assert!(sketch.is_empty());
        assert_eq!(sketch.get_total_weight(), 0);
    }

    #[test]
    fn test_generic_sketch_tracks_strings() {
        let mut sketch = FrequentItemsSketch::<String>::new(64);
        sketch.update_with_count("a".to_string(), 10);
        sketch.update("b".to_string());

        assert_eq!(sketch.get_estimate(&"a".to_string()), 10);
        assert_eq!(sketch.get_estimate(&"missing".to_string()), 0);
        assert_eq!(sketch.get_total_weight(), 11);
    }

    #[test]
    fn test_row_accessors() {
        let mut sketch = FrequentLongsSketch::new(64);
        sketch.update_with_count(42, 9);
        let rows = sketch.get_frequent_items(ErrorType::NoFalsePositives);
        assert_eq!(rows.len(), 1);
        assert_eq!(*rows[0].item(), 42);
        assert_eq!(rows[0].estimate(), 9);
        assert_eq!(rows[0].lower_bound(), 9);
        assert_eq!(rows[0].upper_bound(), 9);
    }

    #[test]
    fn test_merge_accumulates_offsets() {
        let mut a = FrequentLongsSketch::new(8);
        let mut b = FrequentLongsSketch::new(8);
        for i in 0..500i64 {
            a.update(i);
            b.update(i + 250);
        }
        let total = a.get_total_weight() + b.get_total_weight();
        let offset_sum = a.get_maximum_error() + b.get_maximum_error();

        a.merge(&b);
        assert_eq!(a.get_total_weight(), total);
        assert!(a.get_maximum_error() >= offset_sum);
    }
}
