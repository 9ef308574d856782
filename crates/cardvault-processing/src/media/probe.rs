//! ffprobe-backed container probe

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::traits::ContainerProbe;

/// Validate that a path doesn't contain shell metacharacters
fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Runs `ffprobe -show_format` and returns the `format` object.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
    timeout: Option<Duration>,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_path(&ffprobe_path)
            .context("Invalid ffprobe_path: contains dangerous characters")?;

        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }

    async fn run(&self, path: &Path) -> Result<std::process::Output> {
        let child = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| anyhow!("ffprobe timed out after {}s", limit.as_secs()))?,
            None => child.await,
        };

        output.map_err(|e| anyhow!("Failed to run ffprobe: {}", e))
    }
}

#[async_trait]
impl ContainerProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(service = "ffprobe", path = %path.display()))]
    async fn probe_format(&self, path: &Path) -> Result<JsonValue> {
        let output = self.run(path).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = %output.status, "ffprobe failed");
            return Err(anyhow!("ffprobe failed ({}): {}", output.status, stderr.trim()));
        }

        parse_format_section(&output.stdout)
    }
}

/// Pull the `format` object out of ffprobe's JSON output.
pub(crate) fn parse_format_section(stdout: &[u8]) -> Result<JsonValue> {
    let mut parsed: JsonValue =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    match parsed.get_mut("format").map(JsonValue::take) {
        Some(format @ JsonValue::Object(_)) => Ok(format),
        _ => Err(anyhow!("ffprobe output has no format section")),
    }
}
