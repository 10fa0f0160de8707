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

use crate::error::Error;

/// Defines the various families of sketch and set operation classes.
///
/// A family defines a set of classes that share fundamental algorithms and
/// behaviors. The classes within a family may still differ by how they are
/// stored and accessed. The family id occupies byte 2 of every serialized
/// preamble and is the first thing deserialization dispatches on.
pub struct Family {
    /// The byte ID for this family.
    pub id: u8,
    /// The name for this family.
    pub name: &'static str,
    /// The minimum preamble size for this family in longs (8-byte integers).
    pub min_pre_longs: u8,
    /// The maximum preamble size for this family in longs (8-byte integers).
    pub max_pre_longs: u8,
}

impl Family {
    /// The Theta sketch family (compact and update forms share one id).
    pub const THETA: Family = Family {
        id: 3,
        name: "THETA",
        min_pre_longs: 1,
        max_pre_longs: 3,
    };

    /// Theta union set operation.
    pub const UNION: Family = Family {
        id: 4,
        name: "UNION",
        min_pre_longs: 1,
        max_pre_longs: 4,
    };

    /// Theta intersection set operation.
    pub const INTERSECTION: Family = Family {
        id: 5,
        name: "INTERSECTION",
        min_pre_longs: 1,
        max_pre_longs: 3,
    };

    /// Theta A-not-B set operation.
    pub const A_NOT_B: Family = Family {
        id: 6,
        name: "A_NOT_B",
        min_pre_longs: 1,
        max_pre_longs: 3,
    };

    /// The Frequency family of sketches.
    pub const FREQUENCY: Family = Family {
        id: 10,
        name: "FREQUENCY",
        min_pre_longs: 1,
        max_pre_longs: 4,
    };

    /// KLL quantiles sketch.
    pub const KLL: Family = Family {
        id: 15,
        name: "KLL",
        min_pre_longs: 1,
        max_pre_longs: 3,
    };

    /// Count-Min sketch.
    pub const COUNTMIN: Family = Family {
        id: 18,
        name: "COUNTMIN",
        min_pre_longs: 2,
        max_pre_longs: 2,
    };

    /// Bloom filter.
    pub const BLOOMFILTER: Family = Family {
        id: 21,
        name: "BLOOMFILTER",
        min_pre_longs: 3,
        max_pre_longs: 4,
    };
}

impl Family {
    /// Validates a family id read from a serialized preamble.
    pub fn validate_id(&self, family_id: u8) -> Result<(), Error> {
        if family_id != self.id {
            Err(Error::invalid_family(self.id, family_id, self.name))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_ids_are_distinct() {
        let ids = [
            Family::THETA.id,
            Family::UNION.id,
            Family::INTERSECTION.id,
            Family::A_NOT_B.id,
            Family::FREQUENCY.id,
            Family::KLL.id,
            Family::COUNTMIN.id,
            Family::BLOOMFILTER.id,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_validate_id() {
        assert!(Family::KLL.validate_id(15).is_ok());
        assert!(Family::KLL.validate_id(3).is_err());
    }
}
