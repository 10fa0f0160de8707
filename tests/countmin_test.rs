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

use googletest::assert_that;
use googletest::prelude::contains_substring;
use streamsketch::countmin::CountMinSketch;

#[test]
fn test_estimates_are_upper_bounds() {
    let mut sketch = CountMinSketch::new(5, 1024);
    let mut true_counts = std::collections::HashMap::new();
    for i in 0..100_000u64 {
        let item = i % 300;
        sketch.update(item);
        *true_counts.entry(item).or_insert(0u64) += 1;
    }

    let slack = (sketch.relative_error() * sketch.total_weight() as f64) as u64;
    let num_items = true_counts.len();
    let mut over_bound = 0usize;
    for (item, true_count) in true_counts {
        let estimate = sketch.estimate(item);
        assert!(estimate >= true_count, "item {item} undercounted");
        assert!(sketch.upper_bound(item) >= true_count);
        if estimate > true_count + slack {
            over_bound += 1;
        } else {
            assert!(sketch.lower_bound(item) <= true_count);
        }
    }
    // The e/w bound holds per item with probability 1 - e^-d; allow the
    // expected handful of exceptions.
    assert!(
        over_bound <= num_items / 20,
        "{over_bound} of {num_items} items exceeded the error bound"
    );
}

#[test]
fn test_merge_of_disjoint_partitions() {
    let mut left = CountMinSketch::new(4, 512);
    let mut right = CountMinSketch::new(4, 512);
    for i in 0..1000u64 {
        left.update(i % 10);
        right.update(i % 10 + 10);
    }

    left.merge(&right).unwrap();
    assert_eq!(left.total_weight(), 2000);
    for i in 0..20u64 {
        assert!(left.estimate(i) >= 100);
    }
}

#[test]
fn test_merge_incompatible_seed() {
    let mut a = CountMinSketch::new(4, 512);
    let b = CountMinSketch::with_seed(4, 512, 42);

    let err = a.merge(&b).unwrap_err();
    assert_that!(err.message(), contains_substring("incompatible seeds"));
}

#[test]
fn test_serialization_round_trip() {
    let mut sketch = CountMinSketch::new(3, 128);
    for i in 0..5_000u64 {
        sketch.update_with_weight(i % 40, 2);
    }

    let bytes = sketch.serialize();
    let restored = CountMinSketch::deserialize(&bytes).unwrap();
    assert_eq!(restored, sketch);
    assert_eq!(restored.serialize(), bytes);
}

#[test]
fn test_empty_serialization_round_trip() {
    let sketch = CountMinSketch::new(3, 128);
    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 16);

    let restored = CountMinSketch::deserialize(&bytes).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored, sketch);
}

#[test]
fn test_custom_seed_round_trip() {
    let mut sketch = CountMinSketch::with_seed(3, 128, 777);
    sketch.update("x");
    let bytes = sketch.serialize();

    assert!(CountMinSketch::deserialize(&bytes).is_err());
    let restored = CountMinSketch::deserialize_with_seed(&bytes, 777).unwrap();
    assert_eq!(restored.estimate("x"), 1);
}

#[test]
fn test_deserialize_wrong_seed_message() {
    let sketch = CountMinSketch::new(3, 128);
    let bytes = sketch.serialize();

    let err = CountMinSketch::deserialize_with_seed(&bytes, 9000).unwrap_err();
    assert_that!(err.message(), contains_substring("incompatible seed hash"));
}

#[test]
fn test_deserialize_corrupted_preamble() {
    let sketch = CountMinSketch::new(3, 128);
    let mut bytes = sketch.serialize();

    let mut wrong_family = bytes.clone();
    wrong_family[2] = 15;
    assert!(CountMinSketch::deserialize(&wrong_family).is_err());

    let mut wrong_version = bytes.clone();
    wrong_version[1] = 7;
    assert!(CountMinSketch::deserialize(&wrong_version).is_err());

    bytes[0] = 5;
    assert!(CountMinSketch::deserialize(&bytes).is_err());
}

#[test]
fn test_deserialize_truncated_cells() {
    let mut sketch = CountMinSketch::new(3, 128);
    sketch.update("x");
    let bytes = sketch.serialize();

    assert!(CountMinSketch::deserialize(&bytes[..bytes.len() - 8]).is_err());
    assert!(CountMinSketch::deserialize(&bytes[..12]).is_err());
}

#[test]
fn test_weighted_stream_totals() {
    let mut sketch = CountMinSketch::new(5, 256);
    sketch.update_with_weight("a", 100);
    sketch.update_with_weight("b", 50);
    sketch.update_with_weight("c", 0);

    assert_eq!(sketch.total_weight(), 150);
    assert!(sketch.estimate("a") >= 100);
    assert!(sketch.estimate("b") >= 50);
}
