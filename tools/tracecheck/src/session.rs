use crate::errors::TracecheckError;
use crate::runtime::{ProcessRequest, ProcessRunner};
use std::path::{Path, PathBuf};

/// Replays one trace through the external driver and captures the driven
/// program's combined output stream as lines.
pub struct SessionRunner<'a> {
    runner: &'a dyn ProcessRunner,
    driver: PathBuf,
}

impl<'a> SessionRunner<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, driver: impl AsRef<Path>) -> Self {
        Self {
            runner,
            driver: driver.as_ref().to_path_buf(),
        }
    }

    /// Run `<driver> -t <trace> -s <shell>` and return its combined
    /// stdout/stderr split into lines (terminators stripped, empty lines
    /// preserved). Blocks until the driver and the driven program exit; any
    /// timeout policy belongs to the driver. Launch failure propagates as a
    /// process error.
    pub fn capture(
        &self,
        trace: &Path,
        shell: &Path,
    ) -> Result<Vec<String>, TracecheckError> {
        // The driver runs under `sh -c` with stderr folded into stdout so
        // the two streams keep their interleaving.
        let command_line = format!(
            "{} -t {} -s {} 2>&1",
            shell_quote(&self.driver.display().to_string()),
            shell_quote(&trace.display().to_string()),
            shell_quote(&shell.display().to_string()),
        );
        let output = self.runner.run(ProcessRequest {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), command_line],
            cwd: None,
        })?;
        Ok(split_lines(&output.stdout))
    }
}

/// Split captured text into lines, stripping `\n` and `\r\n` terminators and
/// keeping interior empty lines. A trailing terminator does not produce a
/// final empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.lines().map(|line| line.to_string()).collect()
}

/// Single-quote `value` for `sh -c`, escaping embedded single quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::{split_lines, SessionRunner};
    use crate::errors::TracecheckError;
    use crate::runtime::FakeProcessRunner;
    use std::path::Path;

    #[test]
    fn invokes_driver_through_sh_with_merged_streams() {
        let runner = FakeProcessRunner::default();
        runner.push_stdout("tsh> quit\n");
        let session = SessionRunner::new(&runner, Path::new("/lab/sdriver.pl"));

        let lines = session
            .capture(Path::new("/lab/trace01.txt"), Path::new("/lab/tsh"))
            .expect("capture");
        assert_eq!(lines, vec!["tsh> quit".to_string()]);

        let requests = runner.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].program, "/bin/sh");
        assert_eq!(requests[0].args[0], "-c");
        assert_eq!(
            requests[0].args[1],
            "'/lab/sdriver.pl' -t '/lab/trace01.txt' -s '/lab/tsh' 2>&1"
        );
    }

    #[test]
    fn preserves_interior_empty_lines() {
        assert_eq!(
            split_lines("a\n\nb\n"),
            vec!["a".to_string(), String::new(), "b".to_string()]
        );
    }

    #[test]
    fn strips_carriage_returns() {
        assert_eq!(
            split_lines("a\r\nb"),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn spawn_fault_propagates() {
        let runner = FakeProcessRunner::default();
        runner.push_response(Err(TracecheckError::Process("launch failed".to_string())));
        let session = SessionRunner::new(&runner, Path::new("./sdriver.pl"));

        let error = session
            .capture(Path::new("trace01.txt"), Path::new("./tsh"))
            .expect_err("must propagate");
        assert!(matches!(error, TracecheckError::Process(_)));
    }

    #[test]
    fn quotes_paths_with_spaces() {
        let runner = FakeProcessRunner::default();
        runner.push_stdout("");
        let session = SessionRunner::new(&runner, Path::new("/my lab/sdriver.pl"));
        session
            .capture(Path::new("/my lab/trace01.txt"), Path::new("/my lab/tsh"))
            .expect("capture");
        assert_eq!(
            runner.requests()[0].args[1],
            "'/my lab/sdriver.pl' -t '/my lab/trace01.txt' -s '/my lab/tsh' 2>&1"
        );
    }
}
