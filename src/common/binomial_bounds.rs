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

//! Confidence bounds on the number of distinct items behind a sampled set.
//!
//! A sketch retaining `num_retained` keys under sampling threshold theta
//! observed a binomial sample of the true distinct count. The bounds here
//! invert that model with a normal approximation: the estimate is
//! `num_retained / theta` and its standard deviation is
//! `sqrt(num_retained * (1 - theta)) / theta`. The lower bound never drops
//! below the retained count (those keys were distinct for certain) and
//! never below zero.

use crate::common::NumStdDev;
use crate::error::Error;

/// Returns the approximate lower bound on the distinct count.
///
/// `theta` is the sampling fraction in `(0.0, 1.0]`.
///
/// # Errors
///
/// Returns an error if `theta` is outside `(0.0, 1.0]`.
pub fn lower_bound(num_retained: u64, theta: f64, num_std_dev: NumStdDev) -> Result<f64, Error> {
    check_theta(theta)?;
    if theta >= 1.0 {
        return Ok(num_retained as f64);
    }
    if num_retained == 0 {
        return Ok(0.0);
    }
    let n = num_retained as f64;
    let estimate = n / theta;
    let std_dev = (n * (1.0 - theta)).sqrt() / theta;
    let bound = estimate - num_std_dev.value() as f64 * std_dev;
    Ok(bound.max(n).max(0.0))
}

/// Returns the approximate upper bound on the distinct count.
///
/// `is_empty` distinguishes a sketch that never saw data (bound 0) from a
/// degenerate one whose every update was screened out by theta.
///
/// # Errors
///
/// Returns an error if `theta` is outside `(0.0, 1.0]`.
pub fn upper_bound(
    num_retained: u64,
    theta: f64,
    num_std_dev: NumStdDev,
    is_empty: bool,
) -> Result<f64, Error> {
    check_theta(theta)?;
    if theta >= 1.0 {
        return Ok(num_retained as f64);
    }
    if is_empty {
        return Ok(0.0);
    }
    let n = num_retained as f64;
    let estimate = n / theta;
    // (n + 1) keeps the upper bound strictly above the estimate even when
    // nothing was retained.
    let std_dev = ((n + 1.0) * (1.0 - theta)).sqrt() / theta;
    Ok(estimate + num_std_dev.value() as f64 * std_dev)
}

fn check_theta(theta: f64) -> Result<(), Error> {
    if !(theta > 0.0 && theta <= 1.0) {
        return Err(Error::invalid_argument(format!(
            "theta must be in (0.0, 1.0], got {theta}"
        )));
    }
    Ok(())
}
