//! Upload pipeline: multipart intake, trim/remux, publish, persist.

mod form;
mod pipeline;

pub use form::{is_video_upload, parse_time_field, read_upload_form, UploadForm};
pub use pipeline::UploadPipeline;
