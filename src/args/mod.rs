//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{RunArgs, TARGET_ENV};
pub use types::{HttpMethod, OutputFormat, PositiveUsize, Threshold};

pub(crate) use parsers::{parse_duration_text, parse_header, validate_status_code};
