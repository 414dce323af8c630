// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A sparse table of per-element constants. Constants that were never set
//! are 0.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone)]
pub struct ConstantTable<E: Ord> {
    values: BTreeMap<(E, u16), f64>,
}

impl<E: Ord> Default for ConstantTable<E> {
    fn default() -> Self {
        ConstantTable {
            values: BTreeMap::new(),
        }
    }
}

impl<E: Ord + Copy> ConstantTable<E> {
    pub fn get(&self, element: E, param: u16) -> f64 {
        self.values.get(&(element, param)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, element: E, param: u16, value: f64) {
        self.values.insert((element, param), value);
    }

    pub fn add(&mut self, element: E, param: u16, delta: f64) {
        *self.values.entry((element, param)).or_insert(0.0) += delta;
    }

    /// The number of explicitly stored constants.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (E, u16, f64)> + '_ {
        self.values.iter().map(|(&(e, p), &v)| (e, p, v))
    }
}

// Compare by value: a constant stored as 0.0 equals one never stored.
impl<E: Ord + Copy> PartialEq for ConstantTable<E> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().all(|(e, p, v)| other.get(e, p) == v)
            && other.iter().all(|(e, p, v)| self.get(e, p) == v)
    }
}

#[derive(Serialize, Deserialize)]
struct Constant<E> {
    element: E,
    param: u16,
    value: f64,
}

impl<E: Ord + Copy + Serialize> Serialize for ConstantTable<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(element, param, value)| Constant {
            element,
            param,
            value,
        }))
    }
}

impl<'de, E: Ord + Copy + Deserialize<'de>> Deserialize<'de> for ConstantTable<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let constants = Vec::<Constant<E>>::deserialize(deserializer)?;
        Ok(ConstantTable {
            values: constants
                .into_iter()
                .map(|c| ((c.element, c.param), c.value))
                .collect(),
        })
    }
}
