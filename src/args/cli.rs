use clap::Parser;
use std::time::Duration;

use super::parsers::{
    parse_duration_arg, parse_header, parse_positive_usize, parse_run_duration,
    parse_status_code, parse_threshold,
};
use super::types::{HttpMethod, OutputFormat, PositiveUsize, Threshold};

/// Environment variable holding the target endpoint.
pub const TARGET_ENV: &str = "LOAD_TEST_URI";

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator - runs a fixed pool of virtual users against one target for a fixed duration and checks every response."
)]
pub struct RunArgs {
    /// Target URI (defaults to $LOAD_TEST_URI)
    #[arg(long, env = TARGET_ENV)]
    pub uri: Option<String>,

    /// Number of virtual users running concurrently
    #[arg(
        long = "vus",
        short = 'u',
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub virtual_users: PositiveUsize,

    /// Run length (supports ms/s/m/h; bare numbers are seconds)
    #[arg(
        long = "duration",
        short = 'd',
        default_value = "2m",
        value_parser = parse_run_duration
    )]
    pub duration: Duration,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, default_value = "")]
    pub data: String,

    /// Expected HTTP status code, checked as "is status <code>"
    #[arg(long = "status", short = 's', default_value = "200", value_parser = parse_status_code)]
    pub expected_status: u16,

    /// Also check that the response body contains this text
    #[arg(long = "body-contains")]
    pub body_contains: Option<String>,

    /// Also check that each response arrives within this latency
    #[arg(long = "max-latency", value_parser = parse_duration_arg)]
    pub max_latency: Option<Duration>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "30s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Minimum aggregate check pass rate for a zero exit status (0.95 or 95%)
    #[arg(long, default_value = "1.0", value_parser = parse_threshold)]
    pub threshold: Threshold,

    /// Summary format printed at exit
    #[arg(long = "output-format", default_value = "text")]
    pub output_format: OutputFormat,

    /// Also write the summary as JSON to this path
    #[arg(long = "summary-export")]
    pub summary_export: Option<String>,

    /// Interval between progress log lines (supports ms/s/m/h)
    #[arg(long = "progress-interval", default_value = "1s", value_parser = parse_duration_arg)]
    pub progress_interval: Duration,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
