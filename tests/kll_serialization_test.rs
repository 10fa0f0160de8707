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
use streamsketch::kll::DEFAULT_K;
use streamsketch::kll::KllSketch;

#[test]
fn test_empty_round_trip() {
    let sketch = KllSketch::<f32>::new(DEFAULT_K);
    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 8);

    let restored = KllSketch::<f32>::deserialize(&bytes).unwrap();
    assert_eq!(restored, sketch);
}

#[test]
fn test_single_item_round_trip() {
    let mut sketch = KllSketch::<f64>::new(DEFAULT_K);
    sketch.update(3.25);
    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 16);

    let restored = KllSketch::<f64>::deserialize(&bytes).unwrap();
    assert_eq!(restored, sketch);
    assert_eq!(restored.quantile(0.5, true), Some(3.25));
}

#[test]
fn test_full_round_trip_f32() {
    let mut sketch = KllSketch::<f32>::new(DEFAULT_K);
    for i in 0..50_000 {
        sketch.update(i as f32);
    }
    let bytes = sketch.serialize();
    let restored = KllSketch::<f32>::deserialize(&bytes).unwrap();

    assert_eq!(restored, sketch);
    assert_eq!(restored.serialize(), bytes);
}

#[test]
fn test_full_round_trip_i32() {
    let mut sketch = KllSketch::<i32>::new(128);
    for i in 0..10_000 {
        sketch.update(i);
    }
    let restored = KllSketch::<i32>::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
}

#[test]
fn test_full_round_trip_i64() {
    let mut sketch = KllSketch::<i64>::new(128);
    for i in 0..10_000i64 {
        sketch.update(i * 1_000_003);
    }
    let restored = KllSketch::<i64>::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
}

#[test]
fn test_full_round_trip_strings() {
    let mut sketch = KllSketch::<String>::new(DEFAULT_K);
    for i in 0..5_000 {
        sketch.update(format!("item-{i:05}"));
    }
    let restored = KllSketch::<String>::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
}

#[test]
fn test_queries_survive_round_trip() {
    let mut sketch = KllSketch::<f64>::new(DEFAULT_K);
    for i in 0..100_000 {
        sketch.update(i as f64);
    }
    let restored = KllSketch::<f64>::deserialize(&sketch.serialize()).unwrap();

    for rank in [0.01, 0.25, 0.5, 0.75, 0.99] {
        assert_eq!(
            restored.quantile(rank, true),
            sketch.quantile(rank, true),
            "quantile mismatch at rank {rank}"
        );
    }
    assert_eq!(restored.min_item(), sketch.min_item());
    assert_eq!(restored.max_item(), sketch.max_item());
    assert_eq!(restored.min_k(), sketch.min_k());
}

#[test]
fn test_deserialize_wrong_family() {
    let mut bytes = KllSketch::<f32>::new(DEFAULT_K).serialize();
    bytes[2] = 3;
    let err = KllSketch::<f32>::deserialize(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("invalid family"));
}

#[test]
fn test_deserialize_wrong_version() {
    let mut bytes = KllSketch::<f32>::new(DEFAULT_K).serialize();
    bytes[1] = 9;
    let err = KllSketch::<f32>::deserialize(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("invalid serial version"));
}

#[test]
fn test_deserialize_truncated() {
    let mut sketch = KllSketch::<f32>::new(DEFAULT_K);
    for i in 0..10_000 {
        sketch.update(i as f32);
    }
    let bytes = sketch.serialize();
    for len in [0, 4, 7, 12, bytes.len() - 1] {
        assert!(
            KllSketch::<f32>::deserialize(&bytes[..len]).is_err(),
            "truncation to {len} bytes must fail"
        );
    }
}

#[test]
fn test_deserialize_inconsistent_levels() {
    let mut sketch = KllSketch::<f32>::new(DEFAULT_K);
    for i in 0..10_000 {
        sketch.update(i as f32);
    }
    let mut bytes = sketch.serialize();
    // Corrupt the first level offset to exceed the terminal offset.
    bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(KllSketch::<f32>::deserialize(&bytes).is_err());
}
