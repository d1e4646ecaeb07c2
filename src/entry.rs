use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{debug, error, warn};

use crate::args::{RunArgs, TARGET_ENV};
use crate::config::{RunConfig, apply_config, load_config};
use crate::error::AppResult;
use crate::report;
use crate::scenario::{HttpScenario, HttpScenarioOptions, build_client};
use crate::scheduler::Scheduler;
use crate::system::logger::init_logging;
use crate::system::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["loadcheck.toml", "loadcheck.json"];

pub(crate) fn run() -> AppResult<ExitCode> {
    let (args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(ExitCode::SUCCESS),
    };

    init_logging(args.verbose, args.no_color);

    let config = resolve_config(args, &matches).inspect_err(|err| {
        error!("{}", err);
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(config))
}

fn parse_args() -> AppResult<Option<(RunArgs, ArgMatches)>> {
    let mut cmd = RunArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = RunArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// A bare invocation with no target anywhere prints help instead of failing.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    std::env::var_os(TARGET_ENV).is_none() && !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn resolve_config(mut args: RunArgs, matches: &ArgMatches) -> AppResult<RunConfig> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    Ok(RunConfig::resolve(args)?)
}

async fn run_async(config: RunConfig) -> AppResult<ExitCode> {
    let (shutdown_tx, _) = shutdown_channel();
    // Built before the signal task so an early Ctrl-C is not lost.
    let scheduler = Scheduler::new(config.scenario.clone(), shutdown_tx.clone())
        .with_progress_interval(Some(config.progress_interval));
    let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
    drop(shutdown_tx);

    let request = &config.request;
    let client = build_client(
        request.request_timeout,
        request.connect_timeout,
        request.insecure,
    )?;
    let scenario = HttpScenario::new(
        client,
        config.scenario.target.clone(),
        HttpScenarioOptions {
            method: request.method,
            headers: request.headers.clone(),
            body: request.body.clone(),
            checks: request.checks(),
        },
    )?;

    debug!(
        method = request.method.as_str(),
        checks = scenario.checks().len(),
        "Scenario ready"
    );

    let summary = scheduler.start(Arc::new(scenario)).await?;
    signal_task.await?;

    let verdict = report::report(&summary, &config.report).await?;
    if !verdict.passed {
        let failed: Vec<&str> = report::failed_checks(&summary).collect();
        warn!(
            failed_checks = %failed.join(", "),
            "Check pass rate below threshold"
        );
    }
    Ok(ExitCode::from(verdict.exit_code()))
}
