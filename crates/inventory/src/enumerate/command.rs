//! External command execution
//!
//! Strategies that shell out go through [`CommandRunner`] so that tests can
//! feed captured tool output instead of spawning processes.

use common::{Error, Result};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default time allowed for a single external command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Default cap on captured stdout (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Runs an external program and returns its decoded stdout
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<String>> + Send;
}

/// Runs commands on the local host under a timeout and output cap
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
    max_output_bytes: usize,
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES)
    }
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }

    async fn capture(&self, program: &str, args: &[&str]) -> Result<Vec<u8>> {
        let failed = |reason: String| Error::ExternalCommand {
            program: program.to_string(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("spawn failed: {}", e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| failed("stdout not captured".to_string()))?;

        // One byte past the cap tells an oversized output apart from an exact fit
        let limit = self.max_output_bytes as u64 + 1;
        let mut buf = Vec::new();
        (&mut stdout)
            .take(limit)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| failed(format!("reading stdout failed: {}", e)))?;

        if buf.len() > self.max_output_bytes {
            return Err(failed(format!(
                "output exceeded {} bytes",
                self.max_output_bytes
            )));
        }

        let status = child
            .wait()
            .await
            .map_err(|e| failed(format!("wait failed: {}", e)))?;
        if !status.success() {
            return Err(failed(format!("exited with {}", status)));
        }

        Ok(buf)
    }
}

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("Running {} {:?}", program, args);
        let bytes = timeout(self.timeout, self.capture(program, args))
            .await
            .map_err(|_| Error::Timeout {
                program: program.to_string(),
                after: self.timeout,
            })??;
        Ok(decode_output(&bytes))
    }
}

/// Decode tool output into text
///
/// Handles UTF-16LE output with a byte-order mark (as written by `wmic` when
/// redirected) and strips a UTF-8 byte-order mark. Invalid sequences are
/// replaced rather than rejected.
pub fn decode_output(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
