// Shared process helpers

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::downloader::errors::DownloadError;

/// Run a command to completion, capturing stdout and stderr, killing the
/// child once the deadline passes.
pub async fn run_output_with_timeout(
    program: &Path,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = Command::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            DownloadError::Execution(format!("failed to start {}: {}", program.display(), e))
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        DownloadError::Execution(format!("failed to capture stdout from {}", program.display()))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        DownloadError::Execution(format!("failed to capture stderr from {}", program.display()))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status) => {
            let status = status.map_err(|e| {
                DownloadError::Execution(format!(
                    "failed to wait for {}: {}",
                    program.display(),
                    e
                ))
            })?;
            let stdout = stdout_task
                .await
                .map_err(|e| DownloadError::Execution(format!("stdout task failed: {}", e)))?
                .map_err(|e| DownloadError::Execution(format!("failed to read stdout: {}", e)))?;
            let stderr = stderr_task
                .await
                .map_err(|e| DownloadError::Execution(format!("stderr task failed: {}", e)))?
                .map_err(|e| DownloadError::Execution(format!("failed to read stderr: {}", e)))?;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::Transport(format!(
                "{} timed out after {}s",
                program.display(),
                timeout_secs
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_binary_is_an_execution_error() {
        let err = run_output_with_timeout(
            &PathBuf::from("/nonexistent/tool-that-is-not-there"),
            vec!["--version".to_string()],
            5,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DownloadError::Execution(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_of_a_real_command() {
        let output = run_output_with_timeout(
            &PathBuf::from("/bin/echo"),
            vec!["hello".to_string()],
            5,
        )
        .await
        .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }
}
