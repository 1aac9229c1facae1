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

//! Named input resources.
//!
//! The catalog and every transaction log are opened by name through a
//! [`LogSource`]. Sources are shared by reference across worker threads.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Opens line-oriented inputs by name.
pub trait LogSource: Sync {
    type Reader: BufRead;

    /// Opens the resource called `name` for reading.
    fn open(&self, name: &str) -> io::Result<Self::Reader>;
}

/// Resolves names relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LogSource for DirectorySource {
    type Reader = BufReader<File>;

    fn open(&self, name: &str) -> io::Result<Self::Reader> {
        File::open(self.root.join(name)).map(BufReader::new)
    }
}
