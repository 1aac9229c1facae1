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

//! Report rendering.
//!
//! A [`Report`] is the rounded, presentation view of a finished
//! [`FileAggregate`]. Reports are written either as text blocks or as CSV,
//! always in the order they are given.

use crate::aggregate::FileAggregate;
use clap::ValueEnum;
use csv::Writer;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Rounds half away from zero to two decimal places, keeping two places.
pub fn round_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Output format of the report writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human readable block per file
    #[default]
    Text,
    /// One CSV row per file
    Csv,
}

/// Presentation values for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub file: String,
    pub total_cost: Decimal,
    pub items_bought: u64,
    pub average_discount: Decimal,
    pub best_purchase: Option<String>,
    pub best_purchase_cost: Option<Decimal>,
    pub lines_read: u64,
}

impl From<&FileAggregate> for Report {
    fn from(aggregate: &FileAggregate) -> Self {
        let best = aggregate.best_purchase();
        Self {
            file: aggregate.file().to_string(),
            total_cost: round_cents(aggregate.total_discounted_cost()),
            items_bought: aggregate.total_units(),
            average_discount: round_cents(aggregate.average_discount()),
            best_purchase: best.map(|b| b.product_name().to_string()),
            best_purchase_cost: best.map(|b| round_cents(b.discounted_cost())),
            lines_read: aggregate.line_count(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report for file: {}", self.file)?;
        writeln!(f, "Total cost: ${:.2}", self.total_cost)?;
        writeln!(f, "Total items bought: {}", self.items_bought)?;
        writeln!(f, "Average discount: {:.2}%", self.average_discount)?;
        match (&self.best_purchase, self.best_purchase_cost) {
            (Some(name), Some(cost)) => write!(
                f,
                "Most expensive purchase after discount: {} (Cost: ${:.2})",
                name, cost
            ),
            _ => write!(f, "No expensive purchase recorded."),
        }
    }
}

/// Writes reports as text blocks, each preceded by a blank line.
///
/// # Errors
///
/// Returns the I/O error if writing fails.
pub fn write_text<W: Write>(reports: &[Report], mut writer: W) -> std::io::Result<()> {
    for report in reports {
        writeln!(writer)?;
        writeln!(writer, "{}", report)?;
    }
    writer.flush()
}

/// Writes reports as CSV with a header row.
///
/// # CSV Format
///
/// Columns: `file, total_cost, items_bought, average_discount, best_purchase, best_purchase_cost, lines_read`
///
/// ```csv
/// file,total_cost,items_bought,average_discount,best_purchase,best_purchase_cost,lines_read
/// 2021_order_details.txt,7.40,5,30.00,Widget,5.40,2
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_csv<W: Write>(reports: &[Report], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for report in reports {
        wtr.serialize(report)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes reports in the requested format.
///
/// # Errors
///
/// Returns [`crate::ReportError`] if writing fails.
pub fn write_reports<W: Write>(
    reports: &[Report],
    format: OutputFormat,
    writer: W,
) -> Result<(), crate::ReportError> {
    match format {
        OutputFormat::Text => write_text(reports, writer)?,
        OutputFormat::Csv => write_csv(reports, writer)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn widget_report() -> Report {
        Report {
            file: "2021_order_details.txt".into(),
            total_cost: dec!(7.40),
            items_bought: 5,
            average_discount: dec!(30.00),
            best_purchase: Some("Widget".into()),
            best_purchase_cost: Some(dec!(5.40)),
            lines_read: 2,
        }
    }

    fn empty_report() -> Report {
        Report {
            file: "empty.txt".into(),
            total_cost: dec!(0.00),
            items_bought: 0,
            average_discount: dec!(0.00),
            best_purchase: None,
            best_purchase_cost: None,
            lines_read: 0,
        }
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_cents(dec!(2.345)).to_string(), "2.35");
        assert_eq!(round_cents(dec!(2.355)).to_string(), "2.36");
        assert_eq!(round_cents(dec!(-1.005)).to_string(), "-1.01");
        assert_eq!(round_cents(dec!(7.4)).to_string(), "7.40");
        assert_eq!(round_cents(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn text_block_with_best_purchase() {
        let mut output = Vec::new();
        write_text(&[widget_report()], &mut output).unwrap();

        let expected = "\nReport for file: 2021_order_details.txt\n\
                        Total cost: $7.40\n\
                        Total items bought: 5\n\
                        Average discount: 30.00%\n\
                        Most expensive purchase after discount: Widget (Cost: $5.40)\n";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[test]
    fn text_block_without_purchase() {
        let text = empty_report().to_string();
        assert!(text.ends_with("No expensive purchase recorded."));
        assert!(text.contains("Total cost: $0.00"));
        assert!(text.contains("Average discount: 0.00%"));
    }

    #[test]
    fn csv_rows_in_given_order() {
        let mut output = Vec::new();
        write_csv(&[widget_report(), empty_report()], &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "file,total_cost,items_bought,average_discount,best_purchase,best_purchase_cost,lines_read",
                "2021_order_details.txt,7.40,5,30.00,Widget,5.40,2",
                "empty.txt,0.00,0,0.00,,,0",
            ]
        );
    }
}
