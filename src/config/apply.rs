use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, RunArgs, parse_header, validate_status_code};
use crate::error::{ConfigError, ValidationError};

use super::types::ConfigFile;

/// Applies configuration file values to CLI arguments.
///
/// Values given on the command line or through the environment win; the
/// file only fills in what was left at its default.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut RunArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_explicit(matches, "uri")
        && let Some(uri) = config.uri.clone()
    {
        args.uri = Some(uri);
    }

    if !is_explicit(matches, "virtual_users")
        && let Some(vus) = config.vus
    {
        args.virtual_users = PositiveUsize::try_from(vus).map_err(|err| invalid("vus", err))?;
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = duration
            .to_duration(true)
            .map_err(|err| invalid("duration", err))?;
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout
            .to_duration(false)
            .map_err(|err| invalid("timeout", err))?;
    }

    if !is_explicit(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout
            .to_duration(false)
            .map_err(|err| invalid("connect_timeout", err))?;
    }

    if !is_explicit(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_explicit(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(parse_header(header).map_err(|err| invalid("headers", err))?);
        }
        args.headers = parsed;
    }

    if !is_explicit(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_explicit(matches, "expected_status")
        && let Some(status) = config.status
    {
        args.expected_status = validate_status_code(status).map_err(|err| invalid("status", err))?;
    }

    if !is_explicit(matches, "body_contains")
        && let Some(fragment) = config.body_contains.clone()
    {
        args.body_contains = Some(fragment);
    }

    if !is_explicit(matches, "max_latency")
        && let Some(limit) = config.max_latency.as_ref()
    {
        args.max_latency = Some(
            limit
                .to_duration(false)
                .map_err(|err| invalid("max_latency", err))?,
        );
    }

    if !is_explicit(matches, "threshold")
        && let Some(threshold) = config.threshold.as_ref()
    {
        args.threshold = threshold
            .to_threshold()
            .map_err(|err| invalid("threshold", err))?;
    }

    if !is_explicit(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_explicit(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_explicit(matches, "summary_export")
        && let Some(path) = config.summary_export.clone()
    {
        args.summary_export = Some(path);
    }

    if !is_explicit(matches, "progress_interval")
        && let Some(interval) = config.progress_interval.as_ref()
    {
        args.progress_interval = interval
            .to_duration(false)
            .map_err(|err| invalid("progress_interval", err))?;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

const fn invalid(field: &'static str, source: ValidationError) -> ConfigError {
    ConfigError::InvalidField { field, source }
}
