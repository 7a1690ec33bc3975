//! Subprocess plumbing for external tools

use crate::errors::FileError;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Captured output of one completed (or timed-out) tool run.
#[derive(Debug, Clone)]
pub struct ExternalToolResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when killed by signal or timeout
    pub return_code: Option<i32>,
    pub timed_out: bool,
}

impl ExternalToolResult {
    fn completed(stdout: String, stderr: String, return_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            return_code,
            timed_out: false,
        }
    }

    fn timeout() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: true,
        }
    }
}

/// Run an external tool with captured output.
///
/// `stdin_data` is fed to the child on a separate thread so a tool that
/// reads everything before writing cannot deadlock against us. Spawn
/// failures map into the error taxonomy: a missing binary is
/// `ToolUnavailable`, anything else `ToolFailure`. A timeout of 0 waits
/// forever.
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout_secs: u64,
    stdin_data: Option<&str>,
) -> Result<ExternalToolResult, FileError> {
    let (program, args) = match cmd.split_first() {
        Some(split) => split,
        None => return Err(FileError::tool_failure(tool_name, "empty command")),
    };

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FileError::tool_unavailable(tool_name)
        } else {
            FileError::tool_failure(tool_name, format!("failed to spawn: {}", e))
        }
    })?;

    if let Some(data) = stdin_data {
        if let Some(mut stdin) = child.stdin.take() {
            let data = data.to_string();
            thread::spawn(move || {
                let _ = stdin.write_all(data.as_bytes());
            });
        }
    }

    if timeout_secs > 0 {
        run_with_timeout(child, tool_name, timeout_secs)
    } else {
        run_without_timeout(child, tool_name)
    }
}

fn run_without_timeout(child: Child, tool_name: &str) -> Result<ExternalToolResult, FileError> {
    let output = child
        .wait_with_output()
        .map_err(|e| FileError::tool_failure(tool_name, format!("failed to wait: {}", e)))?;
    Ok(ExternalToolResult::completed(
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    ))
}

/// Poll for completion, killing the child once the deadline passes. The
/// pipes are drained on threads the whole time so a chatty tool cannot
/// block on a full pipe while we wait.
fn run_with_timeout(
    mut child: Child,
    tool_name: &str,
    timeout_secs: u64,
) -> Result<ExternalToolResult, FileError> {
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(ExternalToolResult::completed(
                    join_pipe_reader(stdout_reader),
                    join_pipe_reader(stderr_reader),
                    status.code(),
                ));
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", tool_name, timeout_secs);
                    return Ok(ExternalToolResult::timeout());
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return Err(FileError::tool_failure(
                    tool_name,
                    format!("failed to wait: {}", e),
                ));
            }
        }
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    })
}

fn join_pipe_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Probe for a tool on PATH via its `--version` flag.
pub fn is_tool_installed(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
