pub mod compare;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod session;
pub mod stats;

use clap::{error::ErrorKind, CommandFactory, Parser};
use compare::{compare, Verdict};
use config::{load_config, CliOverrides};
use discovery::discover_traces;
use errors::TracecheckError;
use logging::append_run_log;
use report::ReportEmitter;
use runtime::ProductionRuntime;
use serde_json::json;
use session::SessionRunner;

#[derive(Debug, Clone, Parser)]
#[command(name = "tracecheck")]
#[command(about = "Replay recorded shell sessions against a candidate and a reference implementation and compare their output")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    /// Directory searched recursively for trace files
    #[arg(long)]
    pub traces: Option<std::path::PathBuf>,
    /// Replay driver fed each trace
    #[arg(long)]
    pub driver: Option<std::path::PathBuf>,
    /// Implementation under test
    #[arg(long)]
    pub candidate: Option<std::path::PathBuf>,
    /// Trusted implementation
    #[arg(long)]
    pub reference: Option<std::path::PathBuf>,
    /// Print discovered trace files without running any session
    #[arg(long, default_value_t = false)]
    pub list_only: bool,
    /// Print allocation-size histograms instead of checking conformance
    #[arg(long, default_value_t = false)]
    pub stats_only: bool,
}

pub fn run() -> Result<i32, TracecheckError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| TracecheckError::Io(e.to_string()))?;
    logging::init_run_logger(cwd.join(".cache/tracecheck/run.jsonl"));
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, TracecheckError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(TracecheckError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        traces: cli.traces.clone(),
        driver: cli.driver.clone(),
        candidate: cli.candidate.clone(),
        reference: cli.reference.clone(),
    };
    let config = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    if cli.stats_only {
        stats::run_stats(&config.traces.root, runtime.terminal.as_ref())?;
        append_run_log(
            "info",
            "stats.completed",
            json!({ "root": config.traces.root.display().to_string() }),
        );
        return Ok(0);
    }

    let traces = discover_traces(&config.traces.root)?;
    append_run_log(
        "info",
        "discovery.completed",
        json!({
            "root": config.traces.root.display().to_string(),
            "count": traces.len()
        }),
    );

    if cli.list_only {
        for trace in &traces {
            runtime.terminal.write_line(&trace.name)?;
        }
        return Ok(0);
    }

    let session = SessionRunner::new(runtime.process_runner.as_ref(), &config.harness.driver);
    let emitter = ReportEmitter::new(runtime.terminal.as_ref());

    for trace in &traces {
        // the two sessions run one after the other, each blocking to exit
        let captured = session
            .capture(&trace.path, &config.harness.candidate)
            .and_then(|candidate| {
                let reference = session.capture(&trace.path, &config.harness.reference)?;
                Ok((candidate, reference))
            });
        let (candidate, reference) = match captured {
            Ok(pair) => pair,
            Err(error) => {
                // one trace's fault never stops the rest of the run
                append_run_log(
                    "error",
                    "session.fault",
                    json!({ "trace": trace.name, "error": error.to_string() }),
                );
                emitter.emit_fault(&trace.name, &error)?;
                continue;
            }
        };

        let comparison = compare(&candidate, &reference);
        append_run_log(
            "info",
            "compare.verdict",
            json!({
                "trace": trace.name,
                "pass": comparison.verdict == Verdict::Pass,
                "candidate_lines": candidate.len(),
                "reference_lines": reference.len()
            }),
        );
        emitter.emit(&trace.name, &comparison)?;
    }

    Ok(0)
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    let mut buffer = Vec::new();
    cmd.write_long_help(&mut buffer).expect("write help to vec");
    String::from_utf8(buffer).expect("utf8")
}
