//! Clipshare Processing Library
//!
//! Media processing for uploaded recordings: trimming or remuxing with ffmpeg and
//! probing duration with ffprobe. Every external tool invocation goes through
//! [`video::run_tool`], which captures a bounded stderr tail for diagnostics.

#[cfg(feature = "video")]
pub mod video;

#[cfg(feature = "video")]
pub use video::{
    run_tool, FfmpegTranscoder, ToolError, ToolOutput, Transcoder, TrimRange,
    DIAGNOSTIC_TAIL_CHARS,
};
