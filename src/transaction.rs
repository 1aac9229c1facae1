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

//! Transaction log records.
//!
//! Each line of a transaction log is `productId,amount,discountPercent`.
//! Records are transient: they are parsed, folded into a
//! [`FileAggregate`](crate::FileAggregate), and dropped.

use crate::error::LineError;
use std::str::FromStr;
use tracing::warn;

/// One parsed transaction line.
///
/// The product id is kept as read; range checking against the catalog is the
/// aggregator's job. The discount is expected to be 0–100 but is not
/// validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    pub product_id: i32,
    pub amount: u32,
    pub discount_percent: i32,
}

impl TransactionRecord {
    /// Parses one log line.
    ///
    /// # Errors
    ///
    /// - [`LineError::FieldCount`] - the line does not have exactly 3 fields.
    /// - [`LineError::InvalidNumber`] - a field is not an integer, or the
    ///   amount is negative.
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let fields: Vec<&str> = line.split(',').collect();
        let [product_id, amount, discount_percent] = fields[..] else {
            return Err(LineError::FieldCount(fields.len()));
        };

        Ok(Self {
            product_id: parse_field("product id", product_id)?,
            amount: parse_field("amount", amount)?,
            discount_percent: parse_field("discount", discount_percent)?,
        })
    }
}

impl FromStr for TransactionRecord {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T, LineError> {
    raw.trim().parse().map_err(|_| LineError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Parses a line from `file`, logging bad data.
///
/// Lines of the wrong shape are dropped silently; lines with a non-numeric
/// field are reported with the file name and the raw line.
pub fn parse_line(file: &str, line: &str) -> Option<TransactionRecord> {
    match TransactionRecord::parse(line) {
        Ok(record) => Some(record),
        Err(e) => {
            if e.is_diagnostic() {
                warn!("Invalid data in {}: {} ({})", file, line, e);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_line() {
        let record = TransactionRecord::parse("1,3,10").unwrap();
        assert_eq!(
            record,
            TransactionRecord {
                product_id: 1,
                amount: 3,
                discount_percent: 10,
            }
        );
    }

    #[test]
    fn parse_with_whitespace() {
        let record: TransactionRecord = " 2 , 4 , 0 ".parse().unwrap();
        assert_eq!(record.product_id, 2);
        assert_eq!(record.amount, 4);
        assert_eq!(record.discount_percent, 0);
    }

    #[test]
    fn product_id_is_not_range_checked() {
        let record = TransactionRecord::parse("42,1,5").unwrap();
        assert_eq!(record.product_id, 42);
    }

    #[test]
    fn discount_is_not_range_checked() {
        assert_eq!(TransactionRecord::parse("1,1,150").unwrap().discount_percent, 150);
        assert_eq!(TransactionRecord::parse("1,1,-20").unwrap().discount_percent, -20);
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(TransactionRecord::parse("1,2"), Err(LineError::FieldCount(2)));
        assert_eq!(TransactionRecord::parse("1,2,3,4"), Err(LineError::FieldCount(4)));
        assert_eq!(TransactionRecord::parse(""), Err(LineError::FieldCount(1)));
    }

    #[test]
    fn non_numeric_fields() {
        assert_eq!(
            TransactionRecord::parse("abc,1,1"),
            Err(LineError::InvalidNumber {
                field: "product id",
                value: "abc".into()
            })
        );
        assert_eq!(
            TransactionRecord::parse("1,1.5,1"),
            Err(LineError::InvalidNumber {
                field: "amount",
                value: "1.5".into()
            })
        );
        assert_eq!(
            TransactionRecord::parse("1,1,"),
            Err(LineError::InvalidNumber {
                field: "discount",
                value: "".into()
            })
        );
    }

    #[test]
    fn negative_amount_is_invalid() {
        assert!(matches!(
            TransactionRecord::parse("1,-2,0"),
            Err(LineError::InvalidNumber { field: "amount", .. })
        ));
    }

    #[test]
    fn parse_line_drops_bad_lines() {
        assert!(parse_line("test.txt", "1,2").is_none());
        assert!(parse_line("test.txt", "x,2,3").is_none());
        assert!(parse_line("test.txt", "1,2,3").is_some());
    }
}
