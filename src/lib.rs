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

//! # Order Report
//!
//! This library computes per-file sales statistics from transaction logs,
//! validating every record against a small, read-only product catalog.
//!
//! ## Core Components
//!
//! - [`Catalog`]: Bounded set of at most nine products indexed by [`ProductId`]
//! - [`TransactionRecord`]: One parsed `productId,amount,discountPercent` line
//! - [`FileAggregate`]: Finished statistics for one transaction log
//! - [`Engine`]: Loads the catalog and aggregates every log concurrently
//! - [`Report`]: Rounded presentation view, written as text or CSV
//!
//! ## Example
//!
//! ```
//! use order_report::{Catalog, aggregate};
//! use rust_decimal_macros::dec;
//! use std::io::Cursor;
//!
//! let catalog = Catalog::from_reader("1,Widget,2.00\n".as_bytes()).unwrap();
//! let totals = aggregate("2021_order_details.txt", Cursor::new("1,3,10\n1,2,50\n"), &catalog);
//!
//! assert_eq!(totals.total_discounted_cost(), dec!(7.40));
//! assert_eq!(totals.total_units(), 5);
//! assert_eq!(totals.best_purchase().unwrap().to_string(), "Widget (Cost: $5.40)");
//! ```
//!
//! ## Thread Safety
//!
//! The catalog is immutable once built and is shared by reference with one
//! worker thread per file. Workers never share mutable state; results are
//! read only after every worker has been joined.

mod aggregate;
mod base;
pub mod catalog;
mod engine;
pub mod error;
pub mod report;
mod source;
mod transaction;

pub use aggregate::{BestPurchase, FileAggregate, LineOutcome, aggregate, discounted_cost};
pub use base::ProductId;
pub use catalog::{CATALOG_CAPACITY, Catalog, Product};
pub use engine::{DEFAULT_CATALOG, DEFAULT_ORDER_FILES, Engine};
pub use error::{CatalogLoadError, CatalogRowError, LineError, ReportError};
pub use report::{OutputFormat, Report, write_reports};
pub use source::{DirectorySource, LogSource};
pub use transaction::{TransactionRecord, parse_line};
