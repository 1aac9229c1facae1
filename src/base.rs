// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Core identifier types for catalog products.

use std::fmt;

/// Unique identifier for a catalog product.
///
/// Only ids in `1..=9` are valid; the catalog has exactly one slot per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(u8);

impl ProductId {
    /// Smallest valid product id.
    pub const MIN: u8 = 1;
    /// Largest valid product id.
    pub const MAX: u8 = 9;

    /// Creates a product id, returning `None` when `raw` is outside `1..=9`.
    pub fn new(raw: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&raw) {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    /// Returns the raw id value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based catalog slot for this id.
    pub(crate) fn slot(self) -> usize {
        usize::from(self.0 - Self::MIN)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
