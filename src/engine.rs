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

//! Report generation engine.
//!
//! The [`Engine`] loads the product catalog once, fans out one worker thread
//! per transaction log, waits for every worker, and hands back the finished
//! aggregates in the order the files were listed.
//!
//! # Thread Safety
//!
//! Workers share only the immutable [`Catalog`] and the [`LogSource`], both
//! by reference. Each worker owns its running totals and returns a finished
//! [`FileAggregate`] by value, so there is no shared mutable state and no
//! locking. Workers run inside a [`crossbeam::scope`], which joins all of
//! them before returning.

use crate::aggregate::{FileAggregate, aggregate};
use crate::catalog::Catalog;
use crate::error::{CatalogLoadError, ReportError};
use crate::report::Report;
use crate::source::LogSource;
use tracing::{debug, error, info};

/// Transaction logs read when none are given.
pub const DEFAULT_ORDER_FILES: [&str; 4] = [
    "2021_order_details.txt",
    "2022_order_details.txt",
    "2023_order_details.txt",
    "2024_order_details.txt",
];

/// Catalog resource read when none is given.
pub const DEFAULT_CATALOG: &str = "Products.txt";

/// Concurrent per-file report generator.
///
/// # Invariants
///
/// - One worker per file; all workers are joined before results are read.
/// - Results are in declared file order, never completion order.
/// - A file that cannot be opened yields an empty aggregate and does not
///   affect the other files.
#[derive(Debug)]
pub struct Engine<S> {
    source: S,
}

impl<S: LogSource> Engine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loads the product catalog called `name`.
    ///
    /// # Errors
    ///
    /// - [`CatalogLoadError::Open`] - the resource cannot be opened.
    /// - [`CatalogLoadError::Read`] - reading the resource failed.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog, CatalogLoadError> {
        let reader = self.source.open(name).map_err(|source| CatalogLoadError::Open {
            name: name.to_string(),
            source,
        })?;

        let catalog = Catalog::from_reader(reader).map_err(|source| CatalogLoadError::Read {
            name: name.to_string(),
            source,
        })?;

        info!("Loaded {} products from {}", catalog.len(), name);
        Ok(catalog)
    }

    /// Aggregates a single file.
    ///
    /// An unopenable file is logged and reported as empty.
    pub fn aggregate_file(&self, file: &str, catalog: &Catalog) -> FileAggregate {
        match self.source.open(file) {
            Ok(reader) => aggregate(file, reader, catalog),
            Err(e) => {
                error!("Error reading file {}: {}", file, e);
                FileAggregate::unreadable(file)
            }
        }
    }

    /// Aggregates every file concurrently, one worker thread per file.
    ///
    /// Blocks until all workers finish. The result has one entry per file,
    /// in the order of `files`.
    ///
    /// # Errors
    ///
    /// - [`ReportError::Spawn`] - a worker thread could not be started.
    /// - [`ReportError::WorkerPanicked`] - a worker panicked.
    pub fn aggregate_all<F: AsRef<str> + Sync>(
        &self,
        files: &[F],
        catalog: &Catalog,
    ) -> Result<Vec<FileAggregate>, ReportError> {
        crossbeam::scope(|scope| -> Result<Vec<FileAggregate>, ReportError> {
            let mut handles = Vec::with_capacity(files.len());
            for file in files {
                let file = file.as_ref();
                let handle = scope
                    .builder()
                    .name(format!("aggregate-{}", file))
                    .spawn(move |_| {
                        debug!("Worker started for {}", file);
                        self.aggregate_file(file, catalog)
                    })
                    .map_err(|source| ReportError::Spawn {
                        file: file.to_string(),
                        source,
                    })?;
                handles.push((file, handle));
            }

            // Joining in spawn order is what fixes the result order.
            handles
                .into_iter()
                .map(|(file, handle)| {
                    handle
                        .join()
                        .map_err(|_| ReportError::WorkerPanicked(file.to_string()))
                })
                .collect()
        })
        .map_err(|_| ReportError::ScopePanicked)?
    }

    /// Loads the catalog, aggregates every file and renders the reports.
    ///
    /// # Errors
    ///
    /// - [`ReportError::Catalog`] - the catalog could not be loaded; no worker
    ///   is started.
    /// - Any error from [`Engine::aggregate_all`].
    pub fn run<F: AsRef<str> + Sync>(
        &self,
        catalog_name: &str,
        files: &[F],
    ) -> Result<Vec<Report>, ReportError> {
        let catalog = self.load_catalog(catalog_name)?;
        let aggregates = self.aggregate_all(files, &catalog)?;
        Ok(aggregates.iter().map(Report::from).collect())
    }
}
