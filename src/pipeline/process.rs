//! External program invocation shared by both stages.
//!
//! One child at a time: the caller awaits [`run_tool`] before starting the
//! next file. Stdout and stderr are captured in full; stdin is closed so a
//! tool that unexpectedly prompts fails fast instead of hanging the batch.

use crate::config::ExternalTool;
use crate::error::FileError;
use crate::output::ProcessOutput;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `tool` with its leading arguments followed by `args`, capturing output.
///
/// A non-zero exit is not an error here: it is returned in
/// [`ProcessOutput::success`] so the caller can display what the tool said.
/// With a `timeout`, the child is killed once it elapses.
pub async fn run_tool(
    tool: &ExternalTool,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<ProcessOutput, FileError> {
    let program = tool.display_name();
    debug!("Running {} {:?} {:?}", program, tool.leading_args(), args);

    let mut cmd = Command::new(tool.program());
    cmd.args(tool.leading_args())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => FileError::ToolNotFound {
            program: program.clone(),
        },
        _ => FileError::LaunchFailed {
            program: program.clone(),
            detail: e.to_string(),
        },
    })?;

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(res) => res,
            Err(_) => {
                warn!("{} exceeded {}s, killed", program, limit.as_secs());
                return Err(FileError::Timeout {
                    program,
                    secs: limit.as_secs(),
                });
            }
        },
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| FileError::LaunchFailed {
        program: program.clone(),
        detail: e.to_string(),
    })?;

    let result = ProcessOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    if result.success {
        debug!("{} finished in {}ms", program, result.duration_ms);
    } else {
        warn!(
            "{} exited with status {:?}: {}",
            program,
            result.exit_code,
            result.stderr.trim()
        );
    }

    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> (ExternalTool, Vec<OsString>) {
        (
            ExternalTool::new("/bin/sh").with_args(["-c", script, "sh"]),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let (tool, args) = sh("echo out; echo err >&2");
        let out = run_tool(&tool, &args, None).await.unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[tokio::test]
    async fn passes_arguments_after_leading_args() {
        let tool = ExternalTool::new("/bin/sh").with_args(["-c", "echo \"$1|$2\"", "sh"]);
        let args = vec![OsString::from("first"), OsString::from("second")];
        let out = run_tool(&tool, &args, None).await.unwrap();
        assert_eq!(out.stdout.trim(), "first|second");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_not_raised() {
        let (tool, args) = sh("echo broken >&2; exit 3");
        let out = run_tool(&tool, &args, None).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "broken");
    }

    #[tokio::test]
    async fn missing_program_is_tool_not_found() {
        let tool = ExternalTool::new("/definitely/not/installed/gs");
        let err = run_tool(&tool, &[], None).await.unwrap_err();
        assert_eq!(
            err,
            FileError::ToolNotFound {
                program: "/definitely/not/installed/gs".into()
            }
        );
    }

    #[tokio::test]
    async fn timeout_kills_child() {
        let (tool, args) = sh("sleep 30");
        let err = run_tool(&tool, &args, Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::Timeout { secs: 1, .. }));
    }
}
