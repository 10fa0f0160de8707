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

use streamsketch::theta::ThetaSketch;
use streamsketch::theta::a_not_b;

fn sketch_with_range(start: u64, count: u64) -> ThetaSketch {
    let mut sketch = ThetaSketch::builder().build();
    for i in 0..count {
        sketch.update(start + i);
    }
    sketch
}

// A from [0, 10000), B from [5000, 15000): difference is 5000.
#[test]
fn test_estimation_half_overlap() {
    let a = sketch_with_range(0, 10_000);
    let b = sketch_with_range(5_000, 10_000);

    let result = a_not_b(&a, &b, true).unwrap();
    let estimate = result.estimate();
    assert!(
        (4_500.0..=5_500.0).contains(&estimate),
        "estimate {estimate} outside [4500, 5500]"
    );
}

#[test]
fn test_exact_difference() {
    let a = sketch_with_range(0, 2000);
    let b = sketch_with_range(1500, 1000);

    let result = a_not_b(&a, &b, true).unwrap();
    assert!(!result.is_estimation_mode());
    assert_eq!(result.estimate(), 1500.0);
}

#[test]
fn test_empty_a() {
    let a = ThetaSketch::builder().build();
    let b = sketch_with_range(0, 1000);

    let result = a_not_b(&a, &b, true).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.estimate(), 0.0);
}

#[test]
fn test_empty_b_returns_a() {
    let a = sketch_with_range(0, 1000);
    let b = ThetaSketch::builder().build();

    let result = a_not_b(&a, &b, true).unwrap();
    assert_eq!(result.estimate(), a.estimate());
    assert_eq!(result.num_retained(), a.num_retained());
}

#[test]
fn test_compact_operands_round_tripped() {
    let a = sketch_with_range(0, 10_000).compact(true);
    let b = sketch_with_range(5_000, 10_000).compact(false);

    let result = a_not_b(&a, &b, true).unwrap();
    assert!((result.estimate() - 5_000.0).abs() <= 500.0);
    assert!(result.is_ordered());
}

#[test]
fn test_difference_disjoint_from_b() {
    // Every key in the result must be a key of A and not of B.
    let a = sketch_with_range(0, 5_000);
    let b = sketch_with_range(2_500, 5_000);

    let result = a_not_b(&a, &b, true).unwrap();
    let b_keys: std::collections::HashSet<u64> = b.iter().collect();
    let a_keys: std::collections::HashSet<u64> = a.iter().collect();
    for key in result.iter() {
        assert!(a_keys.contains(&key));
        assert!(!b_keys.contains(&key));
        assert!(key < result.theta64());
    }
}

#[test]
fn test_union_of_difference_and_intersection_covers_a() {
    use streamsketch::theta::ThetaIntersection;
    use streamsketch::theta::ThetaUnion;

    let a = sketch_with_range(0, 10_000);
    let b = sketch_with_range(5_000, 10_000);

    let diff = a_not_b(&a, &b, true).unwrap();
    let mut intersection = ThetaIntersection::new_with_default_seed();
    intersection.update(&a).unwrap();
    intersection.update(&b).unwrap();

    let mut union = ThetaUnion::builder().build();
    union.update(&diff).unwrap();
    union.update(&intersection.result()).unwrap();

    // (A \ B) u (A n B) approximates A.
    let rebuilt = union.result(true).estimate();
    assert!((rebuilt - a.estimate()).abs() <= a.estimate() * 0.05);
}

#[test]
fn test_degenerate_a() {
    let mut a = ThetaSketch::builder().sampling_probability(0.001).build();
    a.update(1u64);
    let b = sketch_with_range(0, 100);

    let result = a_not_b(&a, &b, true).unwrap();
    assert!(!result.is_empty());
    assert_eq!(result.num_retained(), 0);
    assert!(result.is_estimation_mode());
}
