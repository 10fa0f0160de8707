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

//! Reverse purge hash map for generic item keys.
//!
//! Same drift-tracking linear-probe scheme as the long-keyed map, with
//! boxed item slots and a salted murmur for the probe start.

use std::hash::Hash;
use std::hash::Hasher;

use crate::hash::MurmurHash3X64128;

const LOAD_FACTOR: f64 = 0.75;
const DRIFT_LIMIT: usize = 1024;
const MAX_SAMPLE_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub(super) struct ReversePurgeItemHashMap<T> {
    lg_length: u8,
    load_threshold: usize,
    keys: Vec<Option<T>>,
    values: Vec<i64>,
    states: Vec<u16>,
    num_active: usize,
}

impl<T: Eq + Hash> ReversePurgeItemHashMap<T> {
    pub fn new(map_size: usize) -> Self {
        assert!(map_size.is_power_of_two(), "map_size must be power of 2");
        let lg_length = map_size.trailing_zeros() as u8;
        let load_threshold = (map_size as f64 * LOAD_FACTOR) as usize;
        Self {
            lg_length,
            load_threshold,
            keys: std::iter::repeat_with(|| None).take(map_size).collect(),
            values: vec![0; map_size],
            states: vec![0; map_size],
            num_active: 0,
        }
    }

    pub fn get(&self, key: &T) -> i64 {
        let probe = self.hash_probe(key);
        if self.states[probe] > 0 && self.keys[probe].as_ref() == Some(key) {
            return self.values[probe];
        }
        0
    }

    pub fn adjust_or_put_value(&mut self, key: T, adjust_amount: i64) {
        let mask = self.keys.len() - 1;
        let mut probe = (hash_item(&key) as usize) & mask;
        let mut drift: usize = 1;
        while self.states[probe] != 0 && self.keys[probe].as_ref() != Some(&key) {
            probe = (probe + 1) & mask;
            drift += 1;
            debug_assert!(drift < DRIFT_LIMIT, "drift limit exceeded");
        }
        if self.states[probe] == 0 {
            self.keys[probe] = Some(key);
            self.values[probe] = adjust_amount;
            self.states[probe] = drift as u16;
            self.num_active += 1;
        } else {
            self.values[probe] += adjust_amount;
        }
    }

    pub fn keep_only_positive_counts(&mut self) {
        let len = self.keys.len();
        let mut first_probe = len - 1;
        while self.states[first_probe] > 0 {
            first_probe -= 1;
        }
        for probe in (0..first_probe).rev() {
            if self.states[probe] > 0 && self.values[probe] <= 0 {
                self.hash_delete(probe);
                self.num_active -= 1;
            }
        }
        for probe in (first_probe..len).rev() {
            if self.states[probe] > 0 && self.values[probe] <= 0 {
                self.hash_delete(probe);
                self.num_active -= 1;
            }
        }
    }

    pub fn adjust_all_values_by(&mut self, adjust_amount: i64) {
        for value in &mut self.values {
            *value += adjust_amount;
        }
    }

    /// Subtracts the sampled median value from every entry, evicts
    /// non-positive entries, and returns the subtracted amount.
    pub fn purge(&mut self, sample_size: usize) -> i64 {
        let limit = sample_size.min(self.num_active).min(MAX_SAMPLE_SIZE);
        let mut samples = Vec::with_capacity(limit);
        let mut i = 0usize;
        while samples.len() < limit {
            if self.states[i] > 0 {
                samples.push(self.values[i]);
            }
            i += 1;
        }
        let mid = samples.len() / 2;
        samples.select_nth_unstable(mid);
        let median = samples[mid];
        self.adjust_all_values_by(-median);
        self.keep_only_positive_counts();
        median
    }

    pub fn resize(&mut self, new_size: usize) {
        assert!(new_size.is_power_of_two(), "new_size must be power of 2");
        let old_keys = std::mem::take(&mut self.keys);
        let old_values = std::mem::take(&mut self.values);
        let old_states = std::mem::take(&mut self.states);
        self.keys = std::iter::repeat_with(|| None).take(new_size).collect();
        self.values = vec![0; new_size];
        self.states = vec![0; new_size];
        self.lg_length = new_size.trailing_zeros() as u8;
        self.load_threshold = (new_size as f64 * LOAD_FACTOR) as usize;
        self.num_active = 0;
        for ((key, value), state) in old_keys.into_iter().zip(old_values).zip(old_states) {
            if state > 0 {
                if let Some(key) = key {
                    self.adjust_or_put_value(key, value);
                }
            }
        }
    }

    pub fn get_length(&self) -> usize {
        self.keys.len()
    }

    pub fn get_lg_length(&self) -> u8 {
        self.lg_length
    }

    pub fn get_capacity(&self) -> usize {
        self.load_threshold
    }

    pub fn get_num_active(&self) -> usize {
        self.num_active
    }

    pub fn get_active_values(&self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.num_active);
        for i in 0..self.values.len() {
            if self.states[i] > 0 {
                values.push(self.values[i]);
            }
        }
        values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, i64)> + '_ {
        self.keys
            .iter()
            .zip(&self.values)
            .zip(&self.states)
            .filter(|&(_, &state)| state > 0)
            .filter_map(|((key, &value), _)| key.as_ref().map(|k| (k, value)))
    }

    fn hash_probe(&self, key: &T) -> usize {
        let mask = self.keys.len() - 1;
        let mut probe = (hash_item(key) as usize) & mask;
        while self.states[probe] > 0 && self.keys[probe].as_ref() != Some(key) {
            probe = (probe + 1) & mask;
        }
        probe
    }

    fn hash_delete(&mut self, mut delete_probe: usize) {
        self.states[delete_probe] = 0;
        self.keys[delete_probe] = None;
        let mut drift: usize = 1;
        let mask = self.keys.len() - 1;
        let mut probe = (delete_probe + drift) & mask;
        while self.states[probe] != 0 {
            if self.states[probe] as usize > drift {
                self.keys.swap(delete_probe, probe);
                self.values[delete_probe] = self.values[probe];
                self.states[delete_probe] = self.states[probe] - drift as u16;
                self.states[probe] = 0;
                self.keys[probe] = None;
                drift = 0;
                delete_probe = probe;
            }
            probe = (probe + 1) & mask;
            drift += 1;
            debug_assert!(drift < DRIFT_LIMIT, "drift limit exceeded");
        }
    }
}

#[inline]
fn hash_item<T: Hash>(item: &T) -> u64 {
    let mut hasher = MurmurHash3X64128::with_seed(0);
    item.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut map = ReversePurgeItemHashMap::<String>::new(16);
        map.adjust_or_put_value("a".to_string(), 3);
        map.adjust_or_put_value("a".to_string(), 2);
        map.adjust_or_put_value("b".to_string(), 1);

        assert_eq!(map.get(&"a".to_string()), 5);
        assert_eq!(map.get(&"b".to_string()), 1);
        assert_eq!(map.get(&"missing".to_string()), 0);
        assert_eq!(map.get_num_active(), 2);
    }

    #[test]
    fn test_purge_evicts_light_items() {
        let mut map = ReversePurgeItemHashMap::<String>::new(16);
        for (key, value) in [("h1", 100), ("h2", 80), ("l1", 1), ("l2", 2), ("l3", 3)] {
            map.adjust_or_put_value(key.to_string(), value);
        }

        let median = map.purge(16);
        assert_eq!(median, 3);
        assert_eq!(map.get_num_active(), 2);
        assert_eq!(map.get(&"h1".to_string()), 97);
        assert_eq!(map.get(&"h2".to_string()), 77);
        assert_eq!(map.get(&"l1".to_string()), 0);
    }

    #[test]
    fn test_resize_preserves_entries() {
        let mut map = ReversePurgeItemHashMap::<String>::new(8);
        for i in 0..6 {
            map.adjust_or_put_value(format!("key{i}"), i + 1);
        }
        map.resize(32);

        assert_eq!(map.get_num_active(), 6);
        for i in 0..6 {
            assert_eq!(map.get(&format!("key{i}")), i + 1);
        }
    }

    #[test]
    fn test_iter_yields_active_entries() {
        let mut map = ReversePurgeItemHashMap::<String>::new(16);
        map.adjust_or_put_value("x".to_string(), 1);
        map.adjust_or_put_value("y".to_string(), 2);

        let mut entries: Vec<(String, i64)> =
            map.iter().map(|(k, v)| (k.clone(), v)).collect();
        entries.sort();
        assert_eq!(entries, vec![("x".to_string(), 1), ("y".to_string(), 2)]);
    }
}
