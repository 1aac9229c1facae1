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

//! Per-file aggregation.
//!
//! [`aggregate`] is the worker unit: it consumes one transaction log in full
//! and returns a finished [`FileAggregate`]. Running totals live in a private
//! accumulator owned by the worker; nothing is visible to other threads until
//! the finished value is returned.
//!
//! # Line Handling
//!
//! | Line | Counted | Accumulated | Logged |
//! |------|---------|-------------|--------|
//! | Known product | yes | yes | no |
//! | Wrong field count | yes | no | no |
//! | Non-numeric field | yes | no | yes |
//! | Unknown or out-of-range product | yes | no | no |
//! | Not valid UTF-8 | yes | no | yes |
//! | Cost overflows | yes | no | yes |

use crate::catalog::{Catalog, Product};
use crate::report::round_cents;
use crate::transaction::parse_line;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use std::io::BufRead;
use tracing::{debug, error, warn};

/// Cost of buying `amount` units at `unit_price` with a percentage discount.
///
/// `unit_price * amount * (1 - discount_percent / 100)`, computed exactly.
/// Returns `None` if the result does not fit in a [`Decimal`].
pub fn discounted_cost(unit_price: Decimal, amount: u32, discount_percent: i32) -> Option<Decimal> {
    let line_total = unit_price.checked_mul(Decimal::from(amount))?;
    let discount_amount = line_total
        .checked_mul(Decimal::from(discount_percent))?
        .checked_div(dec!(100))?;
    line_total.checked_sub(discount_amount)
}

/// How a single line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Folded into the totals
    Applied,
    /// Wrong shape, non-numeric field, or a cost too large to total
    Rejected,
    /// Parsed, but the product is not in the catalog
    UnknownProduct,
}

/// The highest discounted cost seen in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestPurchase {
    product_name: String,
    discounted_cost: Decimal,
}

impl BestPurchase {
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn discounted_cost(&self) -> Decimal {
        self.discounted_cost
    }
}

impl fmt::Display for BestPurchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Cost: ${:.2})",
            self.product_name,
            round_cents(self.discounted_cost)
        )
    }
}

/// Finished statistics for one transaction log.
///
/// Produced only by [`aggregate`] or [`FileAggregate::unreadable`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAggregate {
    file: String,
    readable: bool,
    total_discounted_cost: Decimal,
    total_units: u64,
    discount_sum: i64,
    line_count: u64,
    applied_lines: u64,
    rejected_lines: u64,
    unknown_product_lines: u64,
    best_purchase: Option<BestPurchase>,
}

impl FileAggregate {
    /// Empty aggregate for a file that could not be opened.
    pub fn unreadable(file: impl Into<String>) -> Self {
        Tally::default().finish(file.into(), false)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// False when the file could not be opened.
    pub fn readable(&self) -> bool {
        self.readable
    }

    pub fn total_discounted_cost(&self) -> Decimal {
        self.total_discounted_cost
    }

    pub fn total_units(&self) -> u64 {
        self.total_units
    }

    /// Sum of discount percentages over applied lines.
    pub fn discount_sum(&self) -> i64 {
        self.discount_sum
    }

    /// Every physical line read, whatever its outcome.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn applied_lines(&self) -> u64 {
        self.applied_lines
    }

    pub fn rejected_lines(&self) -> u64 {
        self.rejected_lines
    }

    pub fn unknown_product_lines(&self) -> u64 {
        self.unknown_product_lines
    }

    pub fn best_purchase(&self) -> Option<&BestPurchase> {
        self.best_purchase.as_ref()
    }

    /// Average discount percentage, unrounded.
    ///
    /// The numerator only covers applied lines while the denominator is the
    /// total number of lines read, malformed and unknown-product lines
    /// included. Zero for an empty file.
    pub fn average_discount(&self) -> Decimal {
        if self.line_count == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.discount_sum) / Decimal::from(self.line_count)
    }
}

/// Running totals for one file, owned by its worker.
#[derive(Debug, Default)]
struct Tally {
    total_discounted_cost: Decimal,
    total_units: u64,
    discount_sum: i64,
    line_count: u64,
    applied_lines: u64,
    rejected_lines: u64,
    unknown_product_lines: u64,
    best_purchase: Option<BestPurchase>,
}

impl Tally {
    fn record(&mut self, file: &str, line: &str, catalog: &Catalog) -> LineOutcome {
        self.line_count += 1;

        let Some(record) = parse_line(file, line) else {
            self.rejected_lines += 1;
            return LineOutcome::Rejected;
        };

        let Some(product) = catalog.lookup(i64::from(record.product_id)) else {
            self.unknown_product_lines += 1;
            return LineOutcome::UnknownProduct;
        };

        if self.apply(product, record.amount, record.discount_percent).is_none() {
            warn!("Cost overflow in {}: {}", file, line);
            self.rejected_lines += 1;
            return LineOutcome::Rejected;
        }
        LineOutcome::Applied
    }

    /// Folds one line into the totals, leaving them untouched on overflow.
    fn apply(&mut self, product: &Product, amount: u32, discount_percent: i32) -> Option<()> {
        let cost = discounted_cost(product.unit_price(), amount, discount_percent)?;
        let total = self.total_discounted_cost.checked_add(cost)?;

        self.applied_lines += 1;
        self.total_discounted_cost = total;
        self.total_units += u64::from(amount);
        self.discount_sum += i64::from(discount_percent);

        // Strictly greater: the first of several equal maxima is kept.
        let is_new_best = self
            .best_purchase
            .as_ref()
            .is_none_or(|best| cost > best.discounted_cost);
        if is_new_best {
            self.best_purchase = Some(BestPurchase {
                product_name: product.name().to_string(),
                discounted_cost: cost,
            });
        }
        Some(())
    }

    fn finish(self, file: String, readable: bool) -> FileAggregate {
        debug_assert_eq!(
            self.line_count,
            self.applied_lines + self.rejected_lines + self.unknown_product_lines,
            "Invariant violated: line outcomes do not add up to lines read"
        );
        FileAggregate {
            file,
            readable,
            total_discounted_cost: self.total_discounted_cost,
            total_units: self.total_units,
            discount_sum: self.discount_sum,
            line_count: self.line_count,
            applied_lines: self.applied_lines,
            rejected_lines: self.rejected_lines,
            unknown_product_lines: self.unknown_product_lines,
            best_purchase: self.best_purchase,
        }
    }
}

/// Aggregates every line of `reader` against `catalog`.
///
/// Malformed lines and unknown products are skipped but still counted.
/// Invalid UTF-8 is replaced, so such a line is rejected like any other bad
/// data. If reading fails part-way, the failure is logged and the aggregate
/// covers the lines read so far.
pub fn aggregate<R: BufRead>(file: &str, mut reader: R, catalog: &Catalog) -> FileAggregate {
    let mut tally = Tally::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(strip_line_ending(&buf));
                tally.record(file, &line, catalog);
            }
            Err(e) => {
                error!("Error reading file {}: {}", file, e);
                break;
            }
        }
    }

    debug!(
        "Aggregated {}: {} lines, {} applied",
        file, tally.line_count, tally.applied_lines
    );
    tally.finish(file.to_string(), true)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
