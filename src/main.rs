use std::process;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use log::warn;

use bulkprop::adapters::{FileLockManager, ZfsCli};
use bulkprop::api::errors::{exit_code_for, ErrorId};
use bulkprop::api::{Controller, RunControl};
use bulkprop::cli::Cli;
use bulkprop::logging::{AuditRecorder, AuditSink, FactsEmitter, FileAuditLog, LogSink};
use bulkprop::policy::Policy;
use bulkprop::types::{MutationRequest, RunOptions};

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn drive<E: FactsEmitter, A: AuditSink>(
    facts: E,
    audit: A,
    recorder: Option<Box<dyn AuditRecorder>>,
    cli: &Cli,
    policy: Policy,
    request: &MutationRequest,
    opts: &RunOptions,
) -> i32 {
    let control = RunControl::with_budget(policy.run_timeout);
    if let Err(e) = control.install() {
        warn!("signal handler not installed: {e}");
    }

    let zfs = ZfsCli::new(cli.zfs_bin.clone());
    let mut api = Controller::new(facts, audit, policy, Box::new(zfs.clone()), Box::new(zfs.clone()))
        .with_control(control);
    if !cli.no_validate {
        api = api.with_validator(Box::new(zfs));
    }
    if let Some(rec) = recorder {
        api = api.with_recorder(rec);
    }
    if cli.lock {
        api = api.with_lock_manager(Box::new(FileLockManager::new(cli.lock_path.clone())));
    }

    let report = api.run(request, opts);
    let line = report.summary_line();
    if report.failure().is_some() {
        eprintln!("bulkprop: {line}");
    } else {
        println!("{line}");
    }
    if let Some(e) = &report.audit_error {
        eprintln!("bulkprop: {e}; the changes above were applied but are not recorded");
    }
    report.exit_code()
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let cli = match Cli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
                _ => exit_code_for(ErrorId::E_USAGE),
            };
            let _ = e.print();
            process::exit(code);
        }
    };
    init_logging(cli.debug);

    let request = match cli.request() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("bulkprop: {e}");
            eprintln!("usage: bulkprop [OPTIONS] PROPERTY=VALUE PATTERN (see --help)");
            process::exit(e.exit_code());
        }
    };
    let policy = cli.policy();
    let env_token = std::env::var(&policy.token_env).ok();
    let opts = cli.options(&argv, env_token, &policy);

    let code = match &cli.log {
        Some(path) => {
            let sink = FileAuditLog::new(path.clone(), opts.debug);
            let recorder: Box<dyn AuditRecorder> = Box::new(sink.clone());
            drive(sink.clone(), sink, Some(recorder), &cli, policy, &request, &opts)
        }
        None => drive(LogSink, LogSink, None, &cli, policy, &request, &opts),
    };
    process::exit(code);
}
