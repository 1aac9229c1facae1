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

use clap::Parser;
use order_report::{
    DEFAULT_CATALOG, DEFAULT_ORDER_FILES, DirectorySource, Engine, OutputFormat, ReportError,
    write_reports,
};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, trace};

/// Exit code when the product catalog cannot be loaded.
const EXIT_CATALOG: i32 = 2;
/// Exit code for any other failure.
const EXIT_FAILURE: i32 = 1;

/// Order Report - Per-file sales statistics
///
/// Loads the product catalog, aggregates every transaction log concurrently
/// and prints one report per log, in the order given.
#[derive(Parser, Debug)]
#[command(name = "order-report")]
#[command(about = "Generates per-file sales reports from transaction logs", long_about = None)]
struct Args {
    /// Transaction log names, resolved against the data directory
    ///
    /// Expected line format: productId,amount,discountPercent
    #[arg(value_name = "FILE", default_values = DEFAULT_ORDER_FILES)]
    files: Vec<String>,

    /// Directory holding the catalog and the transaction logs
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Product catalog name (lines of id,name,price)
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_CATALOG)]
    catalog: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let engine = Engine::new(DirectorySource::new(&args.data_dir));

    let reports = match engine.run(&args.catalog, &args.files) {
        Ok(reports) => reports,
        Err(e) => {
            error!("Error generating reports: {}", e);
            process::exit(exit_code(&e));
        }
    };

    if let Err(e) = write_reports(&reports, args.format, std::io::stdout().lock()) {
        error!("Error writing output: {}", e);
        process::exit(exit_code(&e));
    }
}

/// Log lines go to stderr so stdout carries only reports.
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_names(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();

    debug!("order-report started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

fn exit_code(error: &ReportError) -> i32 {
    match error {
        ReportError::Catalog(_) => EXIT_CATALOG,
        _ => EXIT_FAILURE,
    }
}
