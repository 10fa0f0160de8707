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

use streamsketch::theta::ThetaIntersection;
use streamsketch::theta::ThetaSketch;
use streamsketch::theta::ThetaUnion;

fn sketch_with_range(start: u64, count: u64) -> ThetaSketch {
    let mut sketch = ThetaSketch::builder().build();
    for i in 0..count {
        sketch.update(start + i);
    }
    sketch
}

#[test]
fn test_partial_overlap_estimate() {
    // A covers [0, 10000), B covers [5000, 15000): 15000 distinct in total.
    let a = sketch_with_range(0, 10_000);
    let b = sketch_with_range(5_000, 10_000);

    let mut union = ThetaUnion::builder().build();
    union.update(&a).unwrap();
    union.update(&b).unwrap();

    let estimate = union.result(true).estimate();
    assert!(
        (14_000.0..=16_000.0).contains(&estimate),
        "estimate {estimate} outside [14000, 16000]"
    );
}

#[test]
fn test_exact_mode_union() {
    let a = sketch_with_range(0, 1000);
    let b = sketch_with_range(500, 1000);

    let mut union = ThetaUnion::builder().build();
    union.update(&a).unwrap();
    union.update(&b).unwrap();

    let result = union.result(true);
    assert!(!result.is_estimation_mode());
    assert_eq!(result.estimate(), 1500.0);
}

#[test]
fn test_union_commutes() {
    let a = sketch_with_range(0, 30_000);
    let b = sketch_with_range(20_000, 30_000);

    let mut ab = ThetaUnion::builder().build();
    ab.update(&a).unwrap();
    ab.update(&b).unwrap();

    let mut ba = ThetaUnion::builder().build();
    ba.update(&b).unwrap();
    ba.update(&a).unwrap();

    assert_eq!(ab.result(true).estimate(), ba.result(true).estimate());
}

#[test]
fn test_union_is_associative_over_estimate() {
    let a = sketch_with_range(0, 20_000);
    let b = sketch_with_range(10_000, 20_000);
    let c = sketch_with_range(25_000, 20_000);

    // (A u B) u C
    let mut ab = ThetaUnion::builder().build();
    ab.update(&a).unwrap();
    ab.update(&b).unwrap();
    let mut ab_c = ThetaUnion::builder().build();
    ab_c.update(&ab.result(true)).unwrap();
    ab_c.update(&c).unwrap();

    // A u (B u C)
    let mut bc = ThetaUnion::builder().build();
    bc.update(&b).unwrap();
    bc.update(&c).unwrap();
    let mut a_bc = ThetaUnion::builder().build();
    a_bc.update(&a).unwrap();
    a_bc.update(&bc.result(true)).unwrap();

    let left = ab_c.result(true).estimate();
    let right = a_bc.result(true).estimate();
    let true_count = 45_000.0;
    assert!((left - true_count).abs() <= true_count * 0.03);
    assert!((right - true_count).abs() <= true_count * 0.03);
}

#[test]
fn test_inclusion_exclusion_identity() {
    let a = sketch_with_range(0, 10_000);
    let b = sketch_with_range(5_000, 10_000);

    let mut union = ThetaUnion::builder().build();
    union.update(&a).unwrap();
    union.update(&b).unwrap();
    let union_estimate = union.result(true).estimate();

    let mut intersection = ThetaIntersection::new_with_default_seed();
    intersection.update(&a).unwrap();
    intersection.update(&b).unwrap();
    let intersection_estimate = intersection.result().estimate();

    let identity = a.estimate() + b.estimate() - intersection_estimate;
    // Both sides approximate |A u B| = 15000 within combined error bounds.
    assert!(
        (identity - union_estimate).abs() <= 15_000.0 * 0.05,
        "identity {identity} vs union {union_estimate}"
    );
}

#[test]
fn test_union_of_serialized_compacts() {
    let a = sketch_with_range(0, 10_000);
    let b = sketch_with_range(5_000, 10_000);
    let bytes_a = a.compact(true).serialize();
    let bytes_b = b.compact(true).serialize();

    let ca = streamsketch::theta::CompactThetaSketch::deserialize(&bytes_a).unwrap();
    let cb = streamsketch::theta::CompactThetaSketch::deserialize(&bytes_b).unwrap();

    let mut union = ThetaUnion::builder().build();
    union.update(&ca).unwrap();
    union.update(&cb).unwrap();

    let estimate = union.result(true).estimate();
    assert!((14_000.0..=16_000.0).contains(&estimate));
}

#[test]
fn test_many_way_merge() {
    // Mergeability contract: disjoint partitions sketched independently.
    let mut union = ThetaUnion::builder().build();
    for part in 0..10u64 {
        let sketch = sketch_with_range(part * 5_000, 5_000);
        union.update(&sketch).unwrap();
    }

    let estimate = union.result(true).estimate();
    assert!((estimate - 50_000.0).abs() <= 50_000.0 * 0.03);
}

#[test]
fn test_union_result_respects_nominal_capacity() {
    let mut union = ThetaUnion::builder().lg_k(10).build();
    union.update(&sketch_with_range(0, 100_000)).unwrap();
    union.update(&sketch_with_range(100_000, 100_000)).unwrap();

    let result = union.result(true);
    assert!(result.num_retained() <= 1024);
    assert!(result.iter().all(|k| k < result.theta64()));
}
