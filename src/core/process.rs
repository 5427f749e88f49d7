use crate::domain::model::{ToolInvocation, ToolOutput};
use crate::domain::ports::ToolRunner;
use crate::utils::error::{PackagerError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Spawns tools as child processes and streams their output into the log.
///
/// stdout and stderr are read concurrently so lines appear in the order the
/// tool writes them, the same as a merged stream.
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        tracing::debug!("Running {}", invocation.command_line());

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PackagerError::ToolNotFoundError {
                    tool: invocation.tool.clone(),
                    path: invocation.program.clone(),
                },
                _ => PackagerError::fs("spawning", &invocation.program, e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| pipe_error(invocation))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_error(invocation))?;
        let mut out = BufReader::new(stdout).split(b'\n');
        let mut err = BufReader::new(stderr).split(b'\n');
        let (mut out_done, mut err_done) = (false, false);
        let mut lines = Vec::new();

        while !(out_done && err_done) {
            tokio::select! {
                segment = out.next_segment(), if !out_done => match segment? {
                    Some(bytes) => lines.push(emit_line(&invocation.tool, &bytes)),
                    None => out_done = true,
                },
                segment = err.next_segment(), if !err_done => match segment? {
                    Some(bytes) => lines.push(emit_line(&invocation.tool, &bytes)),
                    None => err_done = true,
                },
            }
        }

        let status = child.wait().await?;
        tracing::debug!("{} exited with {}", invocation.tool, status);

        Ok(ToolOutput {
            exit_code: status.code(),
            lines,
        })
    }
}

fn emit_line(tool: &str, bytes: &[u8]) -> String {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim_end_matches('\r').to_string();
    tracing::info!("[{}] {}", tool, line);
    line
}

fn pipe_error(invocation: &ToolInvocation) -> PackagerError {
    PackagerError::fs(
        "capturing output of",
        &invocation.program,
        std::io::Error::other("child pipe was not available"),
    )
}

/// Turn a finished tool run into an error unless it exited with status 0.
pub fn require_success(tool: &str, output: &ToolOutput) -> Result<()> {
    match output.exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(PackagerError::ToolFailedError {
            tool: tool.to_string(),
            code,
        }),
        None => Err(PackagerError::ToolTerminatedError {
            tool: tool.to_string(),
        }),
    }
}

/// Path of a JDK tool under `<java_home>/bin`, with `.exe` on Windows.
pub fn jdk_tool_path(java_home: &std::path::Path, tool: &str) -> std::path::PathBuf {
    java_home
        .join("bin")
        .join(format!("{}{}", tool, std::env::consts::EXE_SUFFIX))
}

/// Fail early with the expected location when a JDK tool is missing.
pub fn check_jdk_tool(java_home: &std::path::Path, tool: &str) -> Result<std::path::PathBuf> {
    let path = jdk_tool_path(java_home, tool);
    if path.is_file() {
        Ok(path)
    } else {
        Err(PackagerError::ToolNotFoundError {
            tool: tool.to_string(),
            path,
        })
    }
}
