// Helper functions for spawning the extractor

use std::path::Path;
use std::process::{Output, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::errors::ExtractorError;

/// Run a command to completion, killing it after `timeout_secs`
pub async fn run_output_with_timeout(
    program: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, ExtractorError> {
    debug!(program = %program.display(), args = %args.join(" "), "spawning");

    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExtractorError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| ExtractorError::Parse("stdout was not captured".to_string()))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| ExtractorError::Parse("stderr was not captured".to_string()))?;

    // Drain both pipes while waiting so a chatty child cannot fill them and stall.
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
            let status = status?;
            let stdout = join_pipe(stdout_task).await?;
            let stderr = join_pipe(stderr_task).await?;
            Ok(Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ExtractorError::Timeout(timeout_secs))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, ExtractorError> {
    task.await
        .map_err(|e| ExtractorError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
        .map_err(ExtractorError::Io)
}

/// The tool's own error text from stderr.
///
/// Prefers `ERROR:` lines; falls back to the whole trimmed output, then to
/// the exit status.
pub fn error_text(stderr: &[u8], status: std::process::ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr);
    let errors: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    format!("yt-dlp exited with {}", status)
}
