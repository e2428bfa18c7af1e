//! Video processing module

pub mod command;
pub mod transcoder;
pub mod trim;

pub use command::{run_tool, ToolError, ToolOutput, DIAGNOSTIC_TAIL_CHARS};
pub use transcoder::{FfmpegTranscoder, Transcoder};
pub use trim::TrimRange;
