//! Transcoder double that copies bytes instead of running ffmpeg.

use async_trait::async_trait;
use clipshare_processing::{ToolError, Transcoder};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Trim { start: f64, end: f64 },
    Copy,
}

pub struct FakeTranscoder {
    probed_duration: Option<f64>,
    stall: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTranscoder {
    pub fn with_duration(probed_duration: Option<f64>) -> Self {
        Self {
            probed_duration,
            stall: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Writes its output, then hangs for `stall` before returning.
    pub fn stalling(stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            ..Self::with_duration(Some(8.0))
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn write_output(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        tokio::fs::copy(input, output)
            .await
            .map_err(|source| ToolError::Spawn {
                program: "fake-ffmpeg".to_string(),
                source,
            })?;
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(Call::Trim {
            start: start_seconds,
            end: end_seconds,
        });
        self.write_output(input, output).await
    }

    async fn copy(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(Call::Copy);
        self.write_output(input, output).await
    }

    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        self.probed_duration
    }
}
