use std::path::PathBuf;
use std::time::Duration;

use crate::args::{HttpMethod, OutputFormat, PositiveUsize, RunArgs, Threshold};
use crate::checks::Check;
use crate::error::ConfigError;
use crate::target::{self, ValidatedTarget};

/// What the scheduler runs: how many VUs, for how long, against what.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub virtual_users: PositiveUsize,
    pub duration: Duration,
    pub target: ValidatedTarget,
}

/// How each iteration's request is built and checked.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub expected_status: u16,
    pub body_contains: Option<String>,
    pub max_latency: Option<Duration>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub insecure: bool,
}

impl RequestConfig {
    /// Checks in reporting order: status first, then the optional ones.
    #[must_use]
    pub fn checks(&self) -> Vec<Check> {
        let mut checks = vec![Check::status_is(self.expected_status)];
        if let Some(fragment) = self.body_contains.as_deref() {
            checks.push(Check::body_contains(fragment));
        }
        if let Some(limit) = self.max_latency {
            checks.push(Check::latency_below(limit));
        }
        checks
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub threshold: Threshold,
    pub output_format: OutputFormat,
    pub summary_export: Option<PathBuf>,
}

/// Fully validated run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario: ScenarioConfig,
    pub request: RequestConfig,
    pub report: ReportConfig,
    pub progress_interval: Duration,
    pub verbose: bool,
    pub no_color: bool,
}

impl RunConfig {
    /// Validate merged arguments. This is the only place the target is
    /// resolved; nothing downstream reads the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTarget`] when no URI was supplied, or
    /// the resolver's error when it is invalid.
    pub fn resolve(args: RunArgs) -> Result<Self, ConfigError> {
        let raw_target = args.uri.as_deref().ok_or(ConfigError::MissingTarget)?;
        let target = target::resolve(raw_target)?;

        Ok(Self {
            scenario: ScenarioConfig {
                virtual_users: args.virtual_users,
                duration: args.duration,
                target,
            },
            request: RequestConfig {
                method: args.method,
                headers: args.headers,
                body: args.data,
                expected_status: args.expected_status,
                body_contains: args.body_contains,
                max_latency: args.max_latency,
                request_timeout: args.request_timeout,
                connect_timeout: args.connect_timeout,
                insecure: args.insecure,
            },
            report: ReportConfig {
                threshold: args.threshold,
                output_format: args.output_format,
                summary_export: args.summary_export.map(PathBuf::from),
            },
            progress_interval: args.progress_interval,
            verbose: args.verbose,
            no_color: args.no_color,
        })
    }
}
