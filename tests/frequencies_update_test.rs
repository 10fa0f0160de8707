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

use streamsketch::frequencies::ErrorType;
use streamsketch::frequencies::FrequentItemsSketch;
use streamsketch::frequencies::FrequentLongsSketch;

#[test]
fn test_skewed_stream_heavy_hitters() {
    // "A" x1000, "B" x500, "C" x100, "D" x10 into a map of 2^10 slots.
    let mut sketch = FrequentItemsSketch::<String>::new(1024);
    sketch.update_with_count("A".to_string(), 1000);
    sketch.update_with_count("B".to_string(), 500);
    sketch.update_with_count("C".to_string(), 100);
    sketch.update_with_count("D".to_string(), 10);

    assert!(sketch.get_estimate(&"A".to_string()) >= 1000);
    assert_eq!(sketch.get_total_weight(), 1610);

    let rows = sketch.get_frequent_items_with_threshold(ErrorType::NoFalseNegatives, 400);
    let items: Vec<&String> = rows.iter().map(|row| row.item()).collect();
    // No false negatives: A and B must be present; C and D may be.
    assert!(items.contains(&&"A".to_string()));
    assert!(items.contains(&&"B".to_string()));
    assert_eq!(*rows[0].item(), "A");
}

#[test]
fn test_bounds_bracket_true_counts() {
    let mut sketch = FrequentLongsSketch::new(64);
    let mut true_counts = std::collections::HashMap::new();
    // Zipf-ish stream: item i appears roughly 2000/(i+1) times.
    for i in 0..100i64 {
        let count = 2000 / (i + 1);
        sketch.update_with_count(i, count);
        true_counts.insert(i, count);
    }

    for (item, true_count) in true_counts {
        assert!(
            sketch.get_lower_bound(item) <= true_count,
            "lower bound violated for {item}"
        );
        assert!(
            sketch.get_upper_bound(item) >= true_count,
            "upper bound violated for {item}"
        );
    }
}

#[test]
fn test_error_is_bounded_by_epsilon() {
    let mut sketch = FrequentLongsSketch::new(256);
    for i in 0..50_000i64 {
        sketch.update(i);
    }
    let max_error = sketch.get_maximum_error() as f64;
    let allowed = sketch.get_epsilon() * sketch.get_total_weight() as f64;
    assert!(
        max_error <= allowed,
        "offset {max_error} exceeds epsilon bound {allowed}"
    );
}

#[test]
fn test_no_false_positives_mode() {
    let mut sketch = FrequentLongsSketch::new(32);
    for i in 0..10_000i64 {
        sketch.update(i % 1000);
    }
    sketch.update_with_count(5000, 3000);

    let rows = sketch.get_frequent_items_with_threshold(ErrorType::NoFalsePositives, 1000);
    for row in &rows {
        assert!(row.lower_bound() > 1000);
    }
    assert!(rows.iter().any(|row| *row.item() == 5000));
}

#[test]
fn test_purge_keeps_map_bounded() {
    let mut sketch = FrequentLongsSketch::new(64);
    for i in 0..100_000i64 {
        sketch.update(i);
    }
    assert!(sketch.get_num_active_items() <= sketch.get_maximum_map_capacity());
    assert!(sketch.get_maximum_error() > 0);
}

#[test]
fn test_merge_preserves_heavy_hitters() {
    let mut a = FrequentLongsSketch::new(256);
    let mut b = FrequentLongsSketch::new(256);
    for i in 0..5_000i64 {
        a.update(i % 500);
        b.update(i % 500 + 250);
    }
    a.update_with_count(9999, 4000);

    let total = a.get_total_weight() + b.get_total_weight();
    a.merge(&b);

    assert_eq!(a.get_total_weight(), total);
    assert!(a.get_upper_bound(9999) >= 4000);
    let rows = a.get_frequent_items(ErrorType::NoFalseNegatives);
    assert!(rows.iter().any(|row| *row.item() == 9999));
}

#[test]
fn test_reset() {
    let mut sketch = FrequentLongsSketch::new(64);
    for i in 0..1000i64 {
        sketch.update(i);
    }
    assert!(!sketch.is_empty());

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.get_total_weight(), 0);
    assert_eq!(sketch.get_maximum_error(), 0);
    assert_eq!(sketch.get_num_active_items(), 0);
}

#[test]
fn test_generic_items_with_tuples() {
    let mut sketch = FrequentItemsSketch::<(u32, u32)>::new(64);
    for i in 0..100 {
        sketch.update((i % 10, 0));
    }
    assert_eq!(sketch.get_estimate(&(3, 0)), 10);
    assert_eq!(sketch.get_estimate(&(0, 3)), 0);
}
