use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::errors::RevbenchError;
use crate::types::{Revision, shell_escape_single_quote};

/// Exit status and captured output of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub command: String,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Turn a non-zero exit status into `CommandFailed`.
    pub fn check(&self) -> Result<(), RevbenchError> {
        if self.success() {
            Ok(())
        } else {
            Err(RevbenchError::CommandFailed {
                command: self.command.clone(),
                code: self.status.code(),
            })
        }
    }
}

/// Performs the two external steps of a run.
///
/// `Err` is reserved for failing to launch the command at all; an
/// unsuccessful exit is reported through the returned outcome.
pub trait Runner {
    fn checkout(&mut self, revision: &Revision) -> std::io::Result<CommandOutcome>;
    fn run_benchmark(&mut self) -> std::io::Result<CommandOutcome>;
}

/// Runs the checkout and benchmark commands through `<shell> -c`.
///
/// Child output is echoed to stderr as it arrives (unless disabled with
/// [`ShellRunner::echo_output`]) and captured for the outcome.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    checkout: String,
    command: String,
    workdir: Option<PathBuf>,
    echo: bool,
}

impl ShellRunner {
    pub fn new(shell: &str, checkout: &str, command: &str, workdir: Option<&Path>) -> Self {
        ShellRunner {
            shell: shell.to_string(),
            checkout: checkout.to_string(),
            command: command.to_string(),
            workdir: workdir.map(Path::to_path_buf),
            echo: true,
        }
    }

    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The full checkout command line for `revision`.
    pub fn checkout_command(&self, revision: &Revision) -> String {
        format!("{} {}", self.checkout, shell_escape_single_quote(&revision.id))
    }

    fn run_shell(&self, command_line: &str) -> std::io::Result<CommandOutcome> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command_line);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();
        let echo = self.echo;

        // Both pipes are drained concurrently so neither can fill up and block the child.
        let (stdout, stderr) = std::thread::scope(|scope| {
            let out = scope.spawn(move || tee(child_stdout, echo));
            let err = scope.spawn(move || tee(child_stderr, echo));
            (join_tee(out.join()), join_tee(err.join()))
        });
        let status = child.wait()?;

        Ok(CommandOutcome {
            command: command_line.to_string(),
            status,
            stdout: stdout?,
            stderr: stderr?,
        })
    }
}

/// Copy `source` to our stderr chunk by chunk while collecting it.
fn tee<R: Read>(source: Option<R>, echo: bool) -> std::io::Result<String> {
    let Some(mut source) = source else {
        return Ok(String::new());
    };

    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        if echo {
            let mut err = std::io::stderr().lock();
            // Echo is best effort; a closed stderr must not fail the run.
            let _ = err.write_all(&buf[..n]).and_then(|()| err.flush());
        }
        captured.extend_from_slice(&buf[..n]);
    }
    Ok(String::from_utf8_lossy(&captured).into_owned())
}

fn join_tee(
    joined: std::thread::Result<std::io::Result<String>>,
) -> std::io::Result<String> {
    joined.unwrap_or_else(|_| Err(std::io::Error::other("output reader thread panicked")))
}

impl Runner for ShellRunner {
    fn checkout(&mut self, revision: &Revision) -> std::io::Result<CommandOutcome> {
        let command_line = self.checkout_command(revision);
        self.run_shell(&command_line)
    }

    fn run_benchmark(&mut self) -> std::io::Result<CommandOutcome> {
        self.run_shell(&self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(id: &str) -> Revision {
        Revision {
            id: id.to_string(),
            label: "L".to_string(),
        }
    }

    #[test]
    fn checkout_command_quotes_revision() {
        let runner = ShellRunner::new("sh", "git checkout", "true", None);
        assert_eq!(
            runner.checkout_command(&revision("1915d542d4f9")),
            "git checkout '1915d542d4f9'"
        );
        assert_eq!(
            runner.checkout_command(&revision("a'b")),
            "git checkout 'a'\\''b'"
        );
    }

    #[test]
    fn captures_output_and_status() {
        let mut runner = ShellRunner::new("sh", "echo", "echo out; echo err >&2; exit 3", None)
            .echo_output(false);

        let outcome = runner.run_benchmark().unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.status.code(), Some(3));
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");

        let err = outcome.check().unwrap_err();
        assert!(matches!(err, RevbenchError::CommandFailed { code: Some(3), .. }));
    }

    #[test]
    fn checkout_receives_revision_id() {
        let mut runner = ShellRunner::new("sh", "echo", "true", None);
        let outcome = runner.checkout(&revision("7ee1ac77")).unwrap();
        assert!(outcome.check().is_ok());
        assert_eq!(outcome.stdout, "7ee1ac77\n");
    }

    #[test]
    fn runs_in_workdir() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut runner = ShellRunner::new("sh", "true", "echo 5 > samples.txt", Some(tmp.path()));

        assert!(runner.run_benchmark().unwrap().success());
        let written = std::fs::read_to_string(tmp.path().join("samples.txt")).unwrap();
        assert_eq!(written, "5\n");
    }

    #[test]
    fn large_output_on_both_streams_is_fully_captured() {
        let mut runner = ShellRunner::new(
            "sh",
            "true",
            "i=0; while [ $i -lt 20000 ]; do echo line$i; echo err$i >&2; i=$((i+1)); done",
            None,
        )
        .echo_output(false);

        let outcome = runner.run_benchmark().unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.lines().count(), 20000);
        assert_eq!(outcome.stderr.lines().count(), 20000);
        assert!(outcome.stdout.ends_with("line19999\n"));
    }

    #[test]
    fn echoed_output_is_still_captured() {
        let mut runner = ShellRunner::new("sh", "true", "echo progress", None);
        let outcome = runner.run_benchmark().unwrap();
        assert_eq!(outcome.stdout, "progress\n");
    }

    #[test]
    fn missing_shell_is_io_error() {
        let mut runner = ShellRunner::new("/nonexistent/shell", "true", "true", None);
        assert!(runner.run_benchmark().is_err());
    }
}
