//! Subprocess-backed Python sandbox.
//!
//! The fragment runs in a fresh interpreter (`-I -u -c PRELUDE CODE`). The
//! prelude compiles the fragment, then strips `import`, `open`, `exec`,
//! `eval`, and `compile` from builtins before running it. `input()` is
//! rewired to print a marker line on stdout and read the reply from stdin,
//! which lets the host answer prompts through an [`InputHandler`].
//!
//! Output is capped at `max_output_bytes` per stream and the whole run at
//! `timeout_secs` of wall-clock time.

use std::io::{BufRead, BufReader, Read, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{ConfigResult, SandboxConfig};

use super::error::SandboxError;
use super::{ExecutionOutcome, InputHandler, Sandbox};

/// Prefix of the line the prelude prints when the program calls `input()`.
const INPUT_MARKER: &str = "\x1e__input__\x1f";

const PRELUDE: &str = r#"
import sys, builtins
_source = sys.argv[1]
_stdout = sys.stdout
_exec = exec

def _input(prompt=""):
    _stdout.write("\x1e__input__\x1f" + str(prompt).replace("\n", " ") + "\n")
    _stdout.flush()
    line = sys.stdin.readline()
    if not line:
        raise EOFError("no input available")
    return line.rstrip("\n")

def _blocked_import(name, *args, **kwargs):
    raise ImportError("import of '%s' is not allowed" % name)

_code = compile(_source, "<generated>", "exec")
builtins.input = _input
for _name in ("open", "exec", "eval", "compile", "breakpoint", "exit", "quit"):
    builtins.__dict__.pop(_name, None)
builtins.__import__ = _blocked_import
_exec(_code, {"__name__": "__main__", "__builtins__": builtins})
"#;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs fragments with an external Python 3 interpreter.
#[derive(Debug, Clone, Default)]
pub struct PythonSandbox {
    config: SandboxConfig,
}

impl PythonSandbox {
    pub fn new(config: SandboxConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    fn spawn(&self, code: &str, interactive: bool) -> Result<Child, SandboxError> {
        Command::new(&self.config.interpreter)
            .arg("-I")
            .arg("-u")
            .arg("-c")
            .arg(PRELUDE)
            .arg(code)
            .stdin(if interactive {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SandboxError::Spawn {
                interpreter: self.config.interpreter.clone(),
                source: e,
            })
    }
}

impl Sandbox for PythonSandbox {
    fn execute(&self, code: &str, input: Option<&mut InputHandler<'_>>) -> ExecutionOutcome {
        let started = Instant::now();
        let mut child = match self.spawn(code, input.is_some()) {
            Ok(child) => child,
            Err(e) => return ExecutionOutcome::failed(e.to_string(), started.elapsed()),
        };

        let limit = self.config.max_output_bytes;
        let deadline = started + self.config.timeout();
        let stdin = child.stdin.take();
        let (events, stdout_reader) = match child.stdout.take() {
            Some(stdout) => spawn_line_reader(stdout),
            None => {
                kill(&mut child);
                return ExecutionOutcome::failed("interpreter stdout unavailable", started.elapsed());
            }
        };
        let stderr_reader = child.stderr.take().map(|stderr| spawn_capped_reader(stderr, limit));

        let mut session = Session {
            stdin,
            input,
            stdout: Capped::new(limit),
        };
        let failure = session.pump(&events, deadline, self.config.timeout_secs);

        let status = match &failure {
            Some(_) => {
                kill(&mut child);
                None
            }
            None => wait_until(&mut child, deadline),
        };
        let failure = match (failure, &status) {
            (Some(e), _) => Some(e),
            (None, None) => {
                kill(&mut child);
                Some(SandboxError::Timeout {
                    seconds: self.config.timeout_secs,
                })
            }
            (None, Some(_)) => None,
        };

        drop(session.stdin.take());
        let _ = stdout_reader.join();
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .map(Capped::finish)
            .unwrap_or_default();
        let stdout = session.stdout.finish();
        let execution_time = started.elapsed();

        let (success, error_message) = match (failure, status) {
            (Some(e), _) => {
                warn!(error = %e, elapsed_ms = execution_time.as_millis() as u64, "sandbox run stopped");
                (false, e.to_string())
            }
            (None, Some(Ok(status))) if status.success() => (true, String::new()),
            (None, Some(Ok(status))) => (false, exit_message(&stderr, status.code())),
            (None, Some(Err(e))) => (false, e.to_string()),
            (None, None) => (false, "interpreter ended without status".to_string()),
        };
        debug!(
            success,
            elapsed_ms = execution_time.as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "sandbox run finished"
        );
        ExecutionOutcome {
            success,
            stdout,
            stderr,
            error_message,
            execution_time,
        }
    }
}

enum Event {
    Line(Vec<u8>),
    Eof,
}

/// Per-run state on the host side of the pipes.
struct Session<'h, 'a> {
    stdin: Option<ChildStdin>,
    input: Option<&'h mut InputHandler<'a>>,
    stdout: Capped,
}

impl Session<'_, '_> {
    /// Relay stdout until EOF, answering input prompts. Returns the reason
    /// the run must be stopped, if any.
    fn pump(
        &mut self,
        events: &mpsc::Receiver<Event>,
        deadline: Instant,
        timeout_secs: f64,
    ) -> Option<SandboxError> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match events.recv_timeout(remaining) {
                Ok(Event::Line(line)) => {
                    let text = String::from_utf8_lossy(&line);
                    // The marker follows whatever partial line the program
                    // printed before calling input().
                    match text.find(INPUT_MARKER) {
                        Some(at) => {
                            self.stdout.push(text[..at].as_bytes());
                            let prompt = text[at + INPUT_MARKER.len()..]
                                .trim_end_matches(['\n', '\r'])
                                .to_string();
                            if let Err(e) = self.answer(&prompt) {
                                return Some(e);
                            }
                        }
                        None => self.stdout.push(&line),
                    }
                }
                Ok(Event::Eof) | Err(RecvTimeoutError::Disconnected) => return None,
                Err(RecvTimeoutError::Timeout) => {
                    return Some(SandboxError::Timeout {
                        seconds: timeout_secs,
                    });
                }
            }
        }
    }

    fn answer(&mut self, prompt: &str) -> Result<(), SandboxError> {
        let Some(handler) = self.input.as_deref_mut() else {
            return Ok(());
        };
        // Echo the prompt so captured output reads like a terminal session.
        self.stdout.push(prompt.as_bytes());
        let reply = match catch_unwind(AssertUnwindSafe(|| handler(prompt))) {
            Ok(Ok(reply)) => reply,
            Ok(Err(message)) => return Err(SandboxError::InputHandler { message }),
            Err(_) => return Err(SandboxError::InputHandlerPanicked),
        };
        self.stdout.push(format!("{reply}\n").as_bytes());
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(());
        };
        let line = format!("{}\n", reply.replace('\n', " "));
        stdin
            .write_all(line.as_bytes())
            .and_then(|()| stdin.flush())
            .map_err(|e| SandboxError::Io {
                context: "sending input to the program",
                source: e,
            })
    }
}

/// Byte buffer that stops growing at `limit` and remembers it was cut.
struct Capped {
    buf: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl Capped {
    fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            truncated: false,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        let room = self.limit.saturating_sub(self.buf.len());
        if bytes.len() > room {
            self.buf.extend_from_slice(&bytes[..room]);
            self.truncated = true;
        } else {
            self.buf.extend_from_slice(bytes);
        }
    }

    fn finish(self) -> String {
        let mut text = String::from_utf8_lossy(&self.buf).into_owned();
        if self.truncated {
            text.push_str("\n... [output truncated]");
        }
        text
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
) -> (mpsc::Receiver<Event>, thread::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
            }
        }
        let _ = tx.send(Event::Eof);
    });
    (rx, handle)
}

/// Drain `stream` to EOF, keeping at most `limit` bytes.
fn spawn_capped_reader<R: Read + Send + 'static>(
    stream: R,
    limit: usize,
) -> thread::JoinHandle<Capped> {
    thread::spawn(move || {
        let mut capped = Capped::new(limit);
        let mut reader = BufReader::new(stream);
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => capped.push(&chunk[..n]),
            }
        }
        capped
    })
}

/// Poll for exit until `deadline`. `None` means the deadline passed.
fn wait_until(
    child: &mut Child,
    deadline: Instant,
) -> Option<std::io::Result<std::process::ExitStatus>> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(Ok(status)),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Some(Err(e)),
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// The exception line of a traceback, or the exit status.
fn exit_message(stderr: &str, code: Option<i32>) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match code {
            Some(code) => format!("process exited with status {code}"),
            None => "process was terminated by a signal".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_available() -> bool {
        Command::new("python3")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    macro_rules! require_python {
        () => {
            if !python_available() {
                eprintln!("python3 not found, skipping");
                return;
            }
        };
    }

    fn sandbox() -> PythonSandbox {
        PythonSandbox::new(SandboxConfig {
            timeout_secs: 10.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn runs_and_captures_stdout() {
        require_python!();
        let outcome = sandbox().execute("result = 5 + 3\nprint(result)", None);
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.stdout, "8\n");
        assert!(outcome.error_message.is_empty());
    }

    #[test]
    fn runtime_error_is_reported() {
        require_python!();
        let outcome = sandbox().execute("result = 10 / 0", None);
        assert!(!outcome.success);
        assert_eq!(outcome.error_message, "ZeroDivisionError: division by zero");
        assert!(outcome.stderr.contains("Traceback"));
    }

    #[test]
    fn syntax_error_is_reported() {
        require_python!();
        let outcome = sandbox().execute("x = (", None);
        assert!(!outcome.success);
        assert!(outcome.error_message.starts_with("SyntaxError"));
    }

    #[test]
    fn dangerous_builtins_are_gone() {
        require_python!();
        let outcome = sandbox().execute("import os", None);
        assert!(!outcome.success);
        assert!(outcome.error_message.contains("ImportError"));

        let outcome = sandbox().execute("open('x.txt')", None);
        assert!(!outcome.success);
        assert!(outcome.error_message.contains("NameError"));

        let outcome = sandbox().execute("eval('1')", None);
        assert!(!outcome.success);
    }

    #[test]
    fn input_goes_through_handler() {
        require_python!();
        let mut prompts = Vec::new();
        let mut handler = |prompt: &str| {
            prompts.push(prompt.to_string());
            Ok("Ada".to_string())
        };
        let outcome = sandbox().execute("name = input('Name? ')\nprint('hi ' + name)", Some(&mut handler));
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(prompts, ["Name? "]);
        assert!(outcome.stdout.ends_with("hi Ada\n"));
    }

    #[test]
    fn input_after_partial_line() {
        require_python!();
        let mut calls = 0;
        let mut handler = |prompt: &str| {
            calls += 1;
            assert_eq!(prompt, "Name: ");
            Ok("Ada".to_string())
        };
        let outcome = sandbox().execute(
            "print('Hi', end=' ')\nname = input('Name: ')\nprint(name)",
            Some(&mut handler),
        );
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(calls, 1);
        assert_eq!(outcome.stdout, "Hi Name: Ada\nAda\n");
        assert!(!outcome.stdout.contains(INPUT_MARKER));
    }

    #[test]
    fn input_without_handler_fails() {
        require_python!();
        let outcome = sandbox().execute("input('x')", None);
        assert!(!outcome.success);
        assert!(outcome.error_message.contains("EOFError"));
    }

    #[test]
    fn handler_error_stops_the_run() {
        require_python!();
        let mut handler = |_: &str| Err("cancelled".to_string());
        let outcome = sandbox().execute("input('x')\nprint('after')", Some(&mut handler));
        assert!(!outcome.success);
        assert_eq!(outcome.error_message, "input handler failed: cancelled");
        assert!(!outcome.stdout.contains("after"));
    }

    #[test]
    fn handler_panic_is_contained() {
        require_python!();
        let mut handler = |_: &str| -> Result<String, String> { panic!("boom") };
        let outcome = sandbox().execute("input('x')", Some(&mut handler));
        assert!(!outcome.success);
        assert_eq!(outcome.error_message, "input handler panicked");
    }

    #[test]
    fn timeout_kills_the_run() {
        require_python!();
        let sandbox = PythonSandbox::new(SandboxConfig {
            timeout_secs: 0.5,
            ..Default::default()
        })
        .unwrap();
        let outcome = sandbox.execute("while True:\n    pass", None);
        assert!(!outcome.success);
        assert_eq!(outcome.error_message, "execution timed out after 0.5s");
        assert!(outcome.execution_time < Duration::from_secs(5));
    }

    #[test]
    fn output_is_capped() {
        require_python!();
        let sandbox = PythonSandbox::new(SandboxConfig {
            max_output_bytes: 10,
            timeout_secs: 10.0,
            ..Default::default()
        })
        .unwrap();
        let outcome = sandbox.execute("for _ in range(100):\n    print('xxxxxxxx')", None);
        assert!(outcome.success);
        assert!(outcome.stdout.starts_with("xxxxxxxx\nx"));
        assert!(outcome.stdout.ends_with("[output truncated]"));
    }

    #[test]
    fn missing_interpreter_is_a_failed_outcome() {
        let sandbox = PythonSandbox::new(SandboxConfig {
            interpreter: "definitely-not-a-python-binary".into(),
            ..Default::default()
        })
        .unwrap();
        let outcome = sandbox.execute("print(1)", None);
        assert!(!outcome.success);
        assert!(outcome.error_message.starts_with("failed to start interpreter"));
    }

    #[test]
    fn exit_message_prefers_last_stderr_line() {
        assert_eq!(exit_message("a\nValueError: bad\n\n", Some(1)), "ValueError: bad");
        assert_eq!(exit_message("", Some(2)), "process exited with status 2");
    }
}
