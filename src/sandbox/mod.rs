//! Execution of generated fragments.
//!
//! The translator never runs code. Callers that want to run a fragment go
//! through a [`Sandbox`], which returns an [`ExecutionOutcome`] rather than
//! an error: spawn failures, timeouts, and Python exceptions all come back as
//! `success == false` with a message.

pub mod error;
pub mod python;

use std::time::Duration;

use serde::Serialize;

pub use error::{SandboxError, SandboxResult};
pub use python::PythonSandbox;

/// Answers an `input()` prompt. An `Err` aborts the run.
pub type InputHandler<'a> = dyn FnMut(&str) -> Result<String, String> + 'a;

/// Runs a fragment and reports what happened.
pub trait Sandbox {
    fn execute(&self, code: &str, input: Option<&mut InputHandler<'_>>) -> ExecutionOutcome;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Empty on success.
    pub error_message: String,
    pub execution_time: Duration,
}

impl ExecutionOutcome {
    pub fn failed(message: impl Into<String>, execution_time: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error_message: message.into(),
            execution_time,
        }
    }

    /// User-facing text: output, then error details, then timing.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if !self.stdout.is_empty() {
            out.push_str("Output:\n");
            out.push_str(self.stdout.trim_end());
            out.push('\n');
        }
        if self.success {
            if self.stdout.is_empty() {
                out.push_str("Program ran successfully with no output.\n");
            }
        } else {
            out.push_str(&format!("Error: {}\n", self.error_message));
            let stderr = self.stderr.trim_end();
            if !stderr.is_empty() {
                out.push_str("Details:\n");
                out.push_str(stderr);
                out.push('\n');
            }
        }
        out.push_str(&format!(
            "Execution time: {:.3}s",
            self.execution_time.as_secs_f64()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_summary() {
        let outcome = ExecutionOutcome {
            success: true,
            stdout: "8\n".into(),
            stderr: String::new(),
            error_message: String::new(),
            execution_time: Duration::from_millis(12),
        };
        assert_eq!(outcome.summary(), "Output:\n8\nExecution time: 0.012s");
    }

    #[test]
    fn silent_success_summary() {
        let outcome = ExecutionOutcome {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            error_message: String::new(),
            execution_time: Duration::ZERO,
        };
        assert_eq!(
            outcome.summary(),
            "Program ran successfully with no output.\nExecution time: 0.000s"
        );
    }

    #[test]
    fn failure_summary() {
        let mut outcome = ExecutionOutcome::failed(
            "ZeroDivisionError: division by zero",
            Duration::from_millis(5),
        );
        outcome.stderr = "Traceback ...\nZeroDivisionError: division by zero\n".into();
        let summary = outcome.summary();
        assert!(summary.starts_with("Error: ZeroDivisionError: division by zero\nDetails:\n"));
        assert!(summary.ends_with("Execution time: 0.005s"));
    }
}
