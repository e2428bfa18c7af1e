//! FfmpegTranscoder - stream-copy trimming, remuxing and duration probing.

use crate::video::command::{run_tool, ToolError};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// Validate that an executable path doesn't contain shell metacharacters or dangerous sequences
fn validate_executable(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ' '))
    {
        return Err(anyhow!("Path contains unsafe characters: {}", path));
    }

    Ok(())
}

/// Parse ffprobe's bare `format=duration` output.
///
/// Only a finite, positive number counts; `N/A` and empty output yield `None`.
pub fn parse_probe_duration(stdout: &str) -> Option<f64> {
    let value = stdout.lines().next()?.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Trims, remuxes and probes media files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Extract `end - start` seconds starting at `start` without re-encoding.
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<(), ToolError>;

    /// Remux the whole input into `output` without re-encoding.
    async fn copy(&self, input: &Path, output: &Path) -> Result<(), ToolError>;

    /// Container duration in seconds, or `None` when it can't be determined.
    async fn probe_duration(&self, path: &Path) -> Option<f64>;
}

#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Result<Self> {
        validate_executable(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        validate_executable(&ffprobe_path).context("Invalid ffprobe_path")?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }

    fn trim_args(input: &Path, output: &Path, start_seconds: f64, duration: f64) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            start_seconds.to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-t".to_string(),
            duration.to_string(),
            // Stream copy: cuts land on the nearest preceding keyframe
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn copy_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    #[tracing::instrument(
        skip(self, input, output),
        fields(process.executable.name = %self.ffmpeg_path, ffmpeg.operation = "trim")
    )]
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<(), ToolError> {
        let args = Self::trim_args(input, output, start_seconds, end_seconds - start_seconds);
        run_tool(&self.ffmpeg_path, &args).await?;
        Ok(())
    }

    #[tracing::instrument(
        skip(self, input, output),
        fields(process.executable.name = %self.ffmpeg_path, ffmpeg.operation = "copy")
    )]
    async fn copy(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        run_tool(&self.ffmpeg_path, &Self::copy_args(input, output)).await?;
        Ok(())
    }

    #[tracing::instrument(
        skip(self, path),
        fields(process.executable.name = %self.ffprobe_path, ffmpeg.operation = "probe")
    )]
    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        match run_tool(&self.ffprobe_path, &Self::probe_args(path)).await {
            Ok(output) => {
                let duration = parse_probe_duration(&output.stdout);
                if duration.is_none() {
                    tracing::warn!(stdout = %output.stdout.trim(), "ffprobe returned no usable duration");
                }
                duration
            }
            Err(e) => {
                tracing::warn!(error = %e, "Duration probe failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new_rejects_dangerous_paths() {
        assert!(FfmpegTranscoder::new("ffmpeg".to_string(), "ffprobe".to_string()).is_ok());
        assert!(
            FfmpegTranscoder::new("/usr/bin/ffmpeg".to_string(), "/usr/bin/ffprobe".to_string())
                .is_ok()
        );
        assert!(FfmpegTranscoder::new("ffmpeg; rm -rf /".to_string(), "ffprobe".to_string()).is_err());
        assert!(FfmpegTranscoder::new("ffmpeg".to_string(), "$(whoami)".to_string()).is_err());
        assert!(FfmpegTranscoder::new("../ffmpeg".to_string(), "ffprobe".to_string()).is_err());
    }

    #[test]
    fn test_new_accepts_paths_with_spaces() {
        assert!(FfmpegTranscoder::new(
            "/opt/media tools/ffmpeg".to_string(),
            "/opt/media tools/ffprobe".to_string()
        )
        .is_ok());
    }

    #[test]
    fn test_parse_probe_duration() {
        assert_eq!(parse_probe_duration("8.032000\n"), Some(8.032));
        assert_eq!(parse_probe_duration("N/A\n"), None);
        assert_eq!(parse_probe_duration(""), None);
        assert_eq!(parse_probe_duration("0.000000"), None);
        assert_eq!(parse_probe_duration("-3"), None);
        assert_eq!(parse_probe_duration("inf"), None);
    }

    #[test]
    fn test_trim_args_use_stream_copy() {
        let args = FfmpegTranscoder::trim_args(
            &PathBuf::from("/tmp/raw/a.webm"),
            &PathBuf::from("/tmp/videos/a.webm"),
            2.0,
            8.0,
        );
        let joined = args.join(" ");
        assert_eq!(
            joined,
            "-hide_banner -loglevel error -y -ss 2 -i /tmp/raw/a.webm -t 8 -c copy /tmp/videos/a.webm"
        );
    }

    #[test]
    fn test_copy_args_have_no_time_bounds() {
        let args = FfmpegTranscoder::copy_args(
            &PathBuf::from("in.webm"),
            &PathBuf::from("out.webm"),
        );
        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-t".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.webm"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_maps_to_error() {
        let transcoder = FfmpegTranscoder::new("false".to_string(), "false".to_string()).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.webm");
        let output = dir.path().join("out.webm");

        assert!(transcoder.copy(&input, &output).await.is_err());
        assert!(transcoder.trim(&input, &output, 0.0, 1.0).await.is_err());
        assert_eq!(transcoder.probe_duration(&input).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_succeeding_tool_without_output() {
        // `true` exits 0 but never writes the output file or a duration
        let transcoder = FfmpegTranscoder::new("true".to_string(), "true".to_string()).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("out.webm");

        assert!(transcoder.copy(&dir.path().join("in.webm"), &output).await.is_ok());
        assert!(!output.exists());
        assert_eq!(transcoder.probe_duration(&output).await, None);
    }
}
