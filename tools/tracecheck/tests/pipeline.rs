use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use tracecheck::errors::TracecheckError;
use tracecheck::runtime::{FakeProcessRunner, FakeTerminal, ProductionFileSystem, ProductionRuntime};

fn args(traces_dir: &Path) -> Vec<OsString> {
    [
        "tracecheck",
        "--traces",
        &traces_dir.display().to_string(),
        "--driver",
        "/lab/sdriver.pl",
        "--candidate",
        "/lab/tsh",
        "--reference",
        "/lab/tshref",
    ]
    .iter()
    .map(OsString::from)
    .collect()
}

fn fake_runtime() -> (ProductionRuntime, FakeProcessRunner, FakeTerminal) {
    let process = FakeProcessRunner::default();
    let terminal = FakeTerminal::default();
    let runtime = ProductionRuntime {
        file_system: Arc::new(ProductionFileSystem),
        process_runner: Arc::new(process.clone()),
        terminal: Arc::new(terminal.clone()),
    };
    (runtime, process, terminal)
}

#[test]
fn help_names_every_flag() {
    let help = tracecheck::render_help();
    for flag in ["--traces", "--driver", "--candidate", "--reference"] {
        assert!(help.contains(flag), "help must mention {flag}");
    }
}

#[test]
fn identical_outputs_pass_without_length_advisory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace01.txt"), "").expect("trace");

    let (runtime, process, terminal) = fake_runtime();
    let session = "tsh> ./myspin 1 &\n[1] (1234) ./myspin 1 &\ntsh> quit\n";
    process.push_stdout(session); // candidate
    process.push_stdout(session); // reference

    let code = tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime)
        .expect("run");
    assert_eq!(code, 0);
    let written = terminal.written_lines();
    assert_eq!(written, vec!["trace01.txt pass".to_string()]);
    assert!(!written.iter().any(|line| line.contains("differ in length")));
}

#[test]
fn sessions_run_candidate_then_reference_through_the_driver() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace01.txt"), "").expect("trace");

    let (runtime, process, _terminal) = fake_runtime();
    process.push_stdout("tsh> quit\n");
    process.push_stdout("tsh> quit\n");

    tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime).expect("run");

    let requests = process.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].args[1].contains("'/lab/sdriver.pl' -t"));
    assert!(requests[0].args[1].ends_with("-s '/lab/tsh' 2>&1"));
    assert!(requests[1].args[1].ends_with("-s '/lab/tshref' 2>&1"));
}

#[test]
fn divergence_is_reported_with_position_and_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace05.txt"), "").expect("trace");

    let (runtime, process, terminal) = fake_runtime();
    process.push_stdout("tsh> jobs\n[1] (11) Running ./myspin\ntsh> quit\n");
    process.push_stdout("tsh> jobs\n[1] (99) Stopped ./myspin\ntsh> quit\n");

    let code = tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime)
        .expect("run");
    assert_eq!(code, 0);
    assert_eq!(
        terminal.written_lines(),
        vec![
            "different result at trace05.txt(1)".to_string(),
            "+ candidate: [1] (11) Running ./myspin".to_string(),
            "+ reference: [1] (99) Stopped ./myspin".to_string(),
        ]
    );
}

#[test]
fn masked_identifiers_do_not_diverge() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace07.txt"), "").expect("trace");

    let (runtime, process, terminal) = fake_runtime();
    process.push_stdout("Job [1] (111) terminated by signal 2\n");
    process.push_stdout("Job [1] (222) terminated by signal 2\n");

    tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime).expect("run");
    assert_eq!(terminal.written_lines(), vec!["trace07.txt pass".to_string()]);
}

#[test]
fn spawn_fault_isolates_one_trace_and_the_run_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace01.txt"), "").expect("t1");
    std::fs::write(dir.path().join("trace02.txt"), "").expect("t2");

    let (runtime, process, terminal) = fake_runtime();
    // trace01: candidate session fails to launch
    process.push_response(Err(TracecheckError::Process("launch failed".to_string())));
    // trace02: both sessions succeed
    process.push_stdout("tsh> quit\n");
    process.push_stdout("tsh> quit\n");

    let code = tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime)
        .expect("run");
    assert_eq!(code, 0);
    let written = terminal.written_lines();
    assert!(written[0].starts_with("error running trace01.txt:"));
    assert_eq!(written[1], "trace02.txt pass");
}

#[test]
fn length_advisory_is_emitted_before_the_verdict() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace03.txt"), "").expect("trace");

    let (runtime, process, terminal) = fake_runtime();
    process.push_stdout("tsh> quit\n");
    process.push_stdout("tsh> quit\nMonitor exiting\n");

    tracecheck::run_with_runtime(&args(dir.path()), Path::new("/work"), &runtime).expect("run");
    let written = terminal.written_lines();
    assert_eq!(
        written[0],
        "outputs differ in length for trace03.txt: candidate=1 reference=2"
    );
    assert_eq!(written[1], "trace03.txt pass");
}

#[test]
fn list_only_prints_discovered_traces_without_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("trace02.txt"), "").expect("t2");
    std::fs::write(dir.path().join("trace01.txt"), "").expect("t1");

    let (runtime, process, terminal) = fake_runtime();
    let mut cli_args = args(dir.path());
    cli_args.push(OsString::from("--list-only"));

    tracecheck::run_with_runtime(&cli_args, Path::new("/work"), &runtime).expect("run");
    assert_eq!(
        terminal.written_lines(),
        vec!["trace01.txt".to_string(), "trace02.txt".to_string()]
    );
    assert!(process.requests().is_empty());
}
