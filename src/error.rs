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

//! Error types for catalog loading, line parsing and report generation.

use crate::base::ProductId;
use std::io;
use thiserror::Error;

/// Fatal failure to obtain the product catalog.
///
/// Without a catalog no report can be produced, so this aborts the run
/// before any worker starts.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    /// The catalog resource could not be opened
    #[error("product file not found: {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Reading the catalog failed part-way through
    #[error("error reading product file {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: csv::Error,
    },
}

/// A single catalog row that was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogRowError {
    /// Id or price is not a number
    #[error("invalid number format in product row: {0}")]
    InvalidNumber(String),

    /// Id is a number but has no catalog slot
    #[error("product id {0} is outside 1..=9")]
    IdOutOfRange(i64),

    /// Unit prices must be non-negative
    #[error("negative price for product {0}")]
    NegativePrice(ProductId),

    /// Id already taken by an earlier row
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
}

/// Why a transaction line did not parse into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Wrong number of comma separated fields
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    /// A field is not an integer of the expected kind
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

impl LineError {
    /// Whether the line should be reported as bad data.
    ///
    /// Lines of the wrong shape are skipped silently.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::InvalidNumber { .. })
    }
}

/// Top level failures of a report run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker for {file}: {source}")]
    Spawn {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("worker for {0} panicked")]
    WorkerPanicked(String),

    /// A worker was left unjoined and panicked
    #[error("worker scope panicked")]
    ScopePanicked,

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    #[error("failed to write report: {0}")]
    Csv(#[from] csv::Error),
}
