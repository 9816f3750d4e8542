//! Structured execution of verification commands.
//!
//! Command templates are split into an argv before placeholder substitution,
//! and the result is executed directly rather than through a shell. Matched
//! secrets therefore land in individual arguments and can never be
//! interpreted by a command interpreter.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::registry::{DC_PLACEHOLDER, TOKEN_PLACEHOLDER};

/// How often the child process is polled while waiting for it to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors that can occur while building or running a verification command.
///
/// All of these are non-fatal to the overall run: the verifier degrades the
/// affected token's outcome to invalid and moves on.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command template contained no tokens after splitting.
    #[error("verification command template is empty")]
    EmptyCommand,

    /// The command template contained an unterminated quoted section.
    #[error("unclosed quote in verification command template")]
    UnclosedQuote,

    /// The command could not be launched (e.g. program not found).
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        /// The program that could not be started.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child process failed.
    #[error("failed to wait for '{program}': {source}")]
    Wait {
        /// The program being waited on.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command did not exit before the configured deadline.
    #[error("verification command timed out after {0:?}")]
    Timeout(Duration),
}

/// Captured result of a completed verification command.
#[derive(Debug)]
pub struct ExecOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Captured standard output, lossily decoded as UTF-8.
    pub stdout: String,
}

/// A verification command ready to execute: a program and its arguments,
/// with all placeholders already substituted.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Builds an invocation from a command template.
    ///
    /// The template is split into argv tokens first; `$token$` (and `$dc$`,
    /// when a datacenter is supplied) are then substituted within each token.
    pub fn from_template(template: &str, token: &str, datacenter: Option<&str>) -> Result<Self, ExecError> {
        let mut argv = split_template(template)?;

        for arg in &mut argv {
            *arg = arg.replace(TOKEN_PLACEHOLDER, token);
            if let Some(dc) = datacenter {
                *arg = arg.replace(DC_PLACEHOLDER, dc);
            }
        }

        let mut parts = argv.into_iter();
        let program = parts.next().ok_or(ExecError::EmptyCommand)?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The substituted arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command, capturing stdout, and kills it at the deadline.
    ///
    /// The child is polled rather than waited on so the deadline can be
    /// enforced without platform-specific APIs. Stdout is drained on a
    /// separate thread to keep the pipe from filling while we poll.
    pub fn run(&self, timeout: Duration) -> Result<ExecOutput, ExecError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout_handle = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExecError::Timeout(timeout));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    return Err(ExecError::Wait {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        };

        let stdout = stdout_handle
            .and_then(|handle| handle.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default();

        Ok(ExecOutput {
            success: status.success(),
            stdout,
        })
    }
}

/// Splits a command template into argv tokens, honouring single and double
/// quotes. Backslashes are not treated specially; the templates this tool
/// consumes are simple curl command lines.
fn split_template(template: &str) -> Result<Vec<String>, ExecError> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in template.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        argv.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(ExecError::UnclosedQuote);
    }
    if in_token {
        argv.push(current);
    }
    if argv.is_empty() {
        return Err(ExecError::EmptyCommand);
    }

    Ok(argv)
}
