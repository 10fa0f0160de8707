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

use streamsketch::common::NumStdDev;
use streamsketch::theta::ThetaSketch;

#[test]
fn test_basic_update() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);

    sketch.update("value1");
    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 1.0);

    sketch.update("value2");
    assert_eq!(sketch.estimate(), 2.0);
}

#[test]
fn test_update_various_types() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();

    sketch.update("string");
    sketch.update(42i64);
    sketch.update(42u64);
    sketch.update_f64(3.15);
    sketch.update_f64(3.15);
    sketch.update_f32(3.15);
    sketch.update_f32(3.15);
    sketch.update([1u8, 2, 3]);

    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 5.0);
}

#[test]
fn test_duplicate_updates() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();

    for _ in 0..100 {
        sketch.update("same_value");
    }

    assert_eq!(sketch.estimate(), 1.0);
}

#[test]
fn test_exact_mode_small_stream() {
    // No sampling kicks in with k well above the stream size.
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    for i in 0..100 {
        sketch.update(i);
    }
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.estimate(), 100.0);
}

#[test]
fn test_theta_reduction() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    assert!(!sketch.is_estimation_mode());

    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }

    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);
}

#[test]
fn test_retained_keys_below_theta() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    for i in 0..10_000 {
        sketch.update(i);
    }
    let theta = sketch.theta64();
    assert!(sketch.iter().all(|k| k > 0 && k < theta));
    assert!(sketch.num_retained() <= 1 << 5 << 1);
}

#[test]
fn test_trim() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();

    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }

    let before_trim = sketch.num_retained();
    sketch.trim();
    let after_trim = sketch.num_retained();

    assert!(after_trim <= before_trim);
    assert_eq!(sketch.num_retained(), 32);
}

#[test]
fn test_reset() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();

    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }
    assert!(!sketch.is_empty());
    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.num_retained(), 0);
    assert!(!sketch.is_estimation_mode());
}

#[test]
fn test_iterator() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();

    sketch.update("value1");
    sketch.update("value2");
    sketch.update("value3");

    let count: usize = sketch.iter().count();
    assert_eq!(count, sketch.num_retained());
}

#[test]
fn test_bounds_empty_sketch() {
    let sketch = ThetaSketch::builder().lg_k(12).build();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);
    for num_std_dev in [NumStdDev::One, NumStdDev::Two, NumStdDev::Three] {
        assert_eq!(sketch.lower_bound(num_std_dev), 0.0);
        assert_eq!(sketch.upper_bound(num_std_dev), 0.0);
    }
}

#[test]
fn test_bounds_exact_mode() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    for i in 0..2000 {
        sketch.update(i);
    }
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.estimate(), 2000.0);
    assert_eq!(sketch.lower_bound(NumStdDev::One), 2000.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 2000.0);
}

#[test]
fn test_bounds_estimation_mode() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    let n = 10_000;
    for i in 0..n {
        sketch.update(i);
    }
    assert!(sketch.is_estimation_mode());

    let estimate = sketch.estimate();
    assert!(
        (estimate - n as f64).abs() < n as f64 * 0.02,
        "estimate {estimate} is not within 2% of {n}"
    );

    let lower_bound_1 = sketch.lower_bound(NumStdDev::One);
    let upper_bound_1 = sketch.upper_bound(NumStdDev::One);
    let lower_bound_2 = sketch.lower_bound(NumStdDev::Two);
    let upper_bound_2 = sketch.upper_bound(NumStdDev::Two);
    let lower_bound_3 = sketch.lower_bound(NumStdDev::Three);
    let upper_bound_3 = sketch.upper_bound(NumStdDev::Three);

    assert!(lower_bound_1 < estimate && estimate < upper_bound_1);
    assert!(lower_bound_2 < estimate && estimate < upper_bound_2);
    assert!(lower_bound_3 < estimate && estimate < upper_bound_3);

    // Wider confidence intervals are indeed wider.
    assert!(lower_bound_3 < lower_bound_2 && lower_bound_2 < lower_bound_1);
    assert!(upper_bound_1 < upper_bound_2 && upper_bound_2 < upper_bound_3);
}

#[test]
fn test_bounds_with_sampling() {
    let mut sketch = ThetaSketch::builder()
        .lg_k(12)
        .sampling_probability(0.5)
        .build();

    for i in 0..1000 {
        sketch.update(i);
    }

    assert!(!sketch.is_empty());
    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);

    let estimate = sketch.estimate();
    assert!(sketch.lower_bound(NumStdDev::Two) <= estimate);
    assert!(estimate <= sketch.upper_bound(NumStdDev::Two));
}

#[test]
fn test_bounds_empty_sketch_with_sampling() {
    // Empty but theta < 1: both bounds stay at zero.
    let sketch = ThetaSketch::builder()
        .lg_k(12)
        .sampling_probability(0.1)
        .build();

    assert!(sketch.is_empty());
    assert!(sketch.is_estimation_mode());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 0.0);
}

#[test]
fn test_screened_update_marks_non_empty() {
    let mut sketch = ThetaSketch::builder()
        .lg_k(12)
        .sampling_probability(0.001)
        .build();
    sketch.update(1u64);

    assert!(!sketch.is_empty());
    assert!(sketch.num_retained() <= 1);
}
