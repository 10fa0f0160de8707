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

//! Frequent items (heavy hitters) sketches.
//!
//! A bounded hash map tracks per-item counters. When the map fills past
//! 75% of its maximum size, a purge subtracts the median tracked counter
//! from every item and evicts the non-positive ones; the subtracted mass
//! accumulates in a scalar `offset`. Each tracked counter is then a lower
//! bound on the item's true weight and `counter + offset` an upper bound,
//! with `offset` bounded by `3.5 / 2^lg_max_map_size` of the total weight.
//!
//! [`FrequentLongsSketch`] specializes on `i64` keys;
//! [`FrequentItemsSketch`] works for any `Eq + Hash` item type.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::frequencies::ErrorType;
//! use streamsketch::frequencies::FrequentItemsSketch;
//!
//! let mut sketch = FrequentItemsSketch::<String>::new(1024);
//! sketch.update_with_count("heavy".to_string(), 1000);
//! sketch.update("light".to_string());
//!
//! let rows = sketch.get_frequent_items_with_threshold(ErrorType::NoFalseNegatives, 500);
//! assert_eq!(rows[0].item(), "heavy");
//! ```

mod reverse_purge_item_hash_map;
mod reverse_purge_long_hash_map;
mod serde;
mod serialization;
mod sketch;

pub use self::serde::I64Serde;
pub use self::serde::ItemsSerde;
pub use self::serde::StringSerde;
pub use self::sketch::ErrorType;
pub use self::sketch::FrequentItemsSketch;
pub use self::sketch::FrequentLongsSketch;
pub use self::sketch::Row;
