mod args;
mod checks;
mod config;
mod entry;
mod error;
mod metrics;
mod report;
mod scenario;
mod scheduler;
mod system;
mod target;

use std::process::ExitCode;

use error::AppResult;

fn main() -> AppResult<ExitCode> {
    entry::run()
}
