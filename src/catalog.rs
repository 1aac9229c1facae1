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

//! Product catalog.
//!
//! The catalog is built once from a line-oriented `id,name,price` list and is
//! read-only afterwards. Every worker borrows the same [`Catalog`], so lookups
//! need no locking.
//!
//! # Example
//!
//! ```
//! use order_report::{Catalog, ProductId};
//! use rust_decimal_macros::dec;
//!
//! let catalog = Catalog::from_reader("1,Widget,2.00\n2,Gadget,5.50\n".as_bytes()).unwrap();
//! let widget = catalog.get(ProductId::new(1).unwrap()).unwrap();
//! assert_eq!(widget.name(), "Widget");
//! assert_eq!(widget.unit_price(), dec!(2.00));
//! ```

use crate::base::ProductId;
use crate::error::CatalogRowError;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

/// Maximum number of products a catalog holds.
pub const CATALOG_CAPACITY: usize = ProductId::MAX as usize;

/// A product known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Decimal,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Raw catalog row: `id, name, price`
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: i64,
    name: String,
    price: Decimal,
}

impl CatalogRow {
    fn into_product(self) -> Result<Product, CatalogRowError> {
        let id = ProductId::new(self.id).ok_or(CatalogRowError::IdOutOfRange(self.id))?;
        Ok(Product::new(id, self.name, self.price))
    }
}

/// Bounded set of products indexed by [`ProductId`].
///
/// # Invariants
///
/// - At most [`CATALOG_CAPACITY`] products, one per id.
/// - The first row seen for an id wins; later rows with that id are rejected.
/// - Unit prices are never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    slots: [Option<Product>; CATALOG_CAPACITY],
    len: usize,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from `id,name,price` lines.
    ///
    /// Rows with the wrong number of fields are skipped silently. Rows with a
    /// non-numeric id or price, an id outside `1..=9`, a negative price or a
    /// duplicate id are logged and skipped. Reading stops once the catalog
    /// is full.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the reader fails. Malformed rows
    /// never produce an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut catalog = Self::new();

        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .has_headers(false)
            .from_reader(reader);

        let mut record = StringRecord::new();
        while !catalog.is_full() {
            match rdr.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e),
                Err(e) => {
                    warn!("Skipping unreadable product row: {}", e);
                    continue;
                }
            }

            if record.len() != 3 {
                continue;
            }

            let product = record
                .deserialize::<CatalogRow>(None)
                .map_err(|_| CatalogRowError::InvalidNumber(raw_row(&record)))
                .and_then(CatalogRow::into_product);

            if let Err(e) = product.and_then(|p| catalog.insert(p)) {
                warn!("Skipping product row: {}", e);
            }
        }

        Ok(catalog)
    }

    /// Builds a catalog from already constructed products.
    ///
    /// Applies the same rules as [`Catalog::from_reader`]: duplicates and
    /// negative prices are logged and dropped.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::new();
        for product in products {
            if let Err(e) = catalog.insert(product) {
                warn!("Skipping product: {}", e);
            }
        }
        catalog
    }

    /// Adds a product to its slot.
    ///
    /// # Errors
    ///
    /// - [`CatalogRowError::NegativePrice`] - the unit price is below zero.
    /// - [`CatalogRowError::DuplicateProduct`] - the slot is already taken.
    pub fn insert(&mut self, product: Product) -> Result<(), CatalogRowError> {
        if product.unit_price < Decimal::ZERO {
            return Err(CatalogRowError::NegativePrice(product.id));
        }
        let slot = &mut self.slots[product.id.slot()];
        if slot.is_some() {
            return Err(CatalogRowError::DuplicateProduct(product.id));
        }
        *slot = Some(product);
        self.len += 1;
        Ok(())
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.slots[id.slot()].as_ref()
    }

    /// Looks up a product by an unchecked id.
    ///
    /// Ids outside `1..=9` simply find nothing.
    pub fn lookup(&self, raw_id: i64) -> Option<&Product> {
        ProductId::new(raw_id).and_then(|id| self.get(id))
    }

    /// Products in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == CATALOG_CAPACITY
    }
}

fn raw_row(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn id(raw: i64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    #[test]
    fn parse_simple_catalog() {
        let catalog = Catalog::from_reader("1,Widget,2.00\n2,Gadget,5.50\n".as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(id(1)).unwrap().name(), "Widget");
        assert_eq!(catalog.get(id(2)).unwrap().unit_price(), dec!(5.50));
        assert!(catalog.get(id(3)).is_none());
    }

    #[test]
    fn parse_with_whitespace() {
        let catalog = Catalog::from_reader(" 4 , Sprocket , 1.25 \n".as_bytes()).unwrap();

        let product = catalog.get(id(4)).unwrap();
        assert_eq!(product.name(), "Sprocket");
        assert_eq!(product.unit_price(), dec!(1.25));
    }

    #[test]
    fn skip_wrong_field_count() {
        let input = "1,Widget\n\n2,Gadget,5.50,extra\n3,Gizmo,3.00\n";
        let catalog = Catalog::from_reader(input.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(id(3)).is_some());
    }

    #[test]
    fn skip_non_numeric_fields() {
        let input = "x,Widget,2.00\n2,Gadget,cheap\n3,Gizmo,3.00\n";
        let catalog = Catalog::from_reader(input.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(id(3)).unwrap().name(), "Gizmo");
    }

    #[test]
    fn skip_out_of_range_and_negative() {
        let input = "0,Zero,1.00\n10,Ten,1.00\n5,Refund,-1.00\n6,Free,0\n";
        let catalog = Catalog::from_reader(input.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(id(6)).unwrap().unit_price(), Decimal::ZERO);
    }

    #[test]
    fn numeric_ids_outside_range_are_not_number_errors() {
        let classify = |fields: [&str; 3]| {
            StringRecord::from(fields.to_vec())
                .deserialize::<CatalogRow>(None)
                .map_err(|_| CatalogRowError::InvalidNumber(fields.join(",")))
                .and_then(CatalogRow::into_product)
        };

        assert_eq!(classify(["300", "Foo", "1.00"]), Err(CatalogRowError::IdOutOfRange(300)));
        assert_eq!(classify(["-1", "Foo", "1.00"]), Err(CatalogRowError::IdOutOfRange(-1)));
        assert_eq!(
            classify(["x", "Foo", "1.00"]),
            Err(CatalogRowError::InvalidNumber("x,Foo,1.00".into()))
        );
        assert!(classify(["7", "Foo", "1.00"]).is_ok());
    }

    #[test]
    fn first_row_wins_on_duplicate_id() {
        let mut catalog = Catalog::new();
        catalog.insert(Product::new(id(1), "First", dec!(1))).unwrap();

        let result = catalog.insert(Product::new(id(1), "Second", dec!(2)));
        assert_eq!(result, Err(CatalogRowError::DuplicateProduct(id(1))));
        assert_eq!(catalog.get(id(1)).unwrap().name(), "First");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn lookup_rejects_unchecked_ids() {
        let catalog = Catalog::from_products([Product::new(id(9), "Nine", dec!(9))]);

        assert!(catalog.lookup(9).is_some());
        assert!(catalog.lookup(0).is_none());
        assert!(catalog.lookup(19).is_none());
        assert!(catalog.lookup(-9).is_none());
    }

    #[test]
    fn iter_in_id_order() {
        let catalog = Catalog::from_reader("3,C,1\n1,A,1\n2,B,1\n".as_bytes()).unwrap();
        let names: Vec<_> = catalog.iter().map(Product::name).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
