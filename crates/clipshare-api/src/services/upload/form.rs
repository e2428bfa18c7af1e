use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use clipshare_core::models::VIDEO_EXTENSION;
use clipshare_core::AppError;

/// Fields of a `POST /videos` form.
#[derive(Debug)]
pub struct UploadForm {
    pub file: Bytes,
    pub filename: String,
    pub content_type: String,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

impl UploadForm {
    /// Reject empty files and anything that doesn't look like a video.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.file.is_empty() {
            return Err(AppError::MissingFile);
        }

        if !is_video_upload(&self.content_type, &self.filename) {
            return Err(AppError::InvalidType {
                content_type: self.content_type.clone(),
                filename: self.filename.clone(),
            });
        }

        Ok(())
    }
}

/// Lenient type check: a `video/*` MIME type or a `.webm` filename.
pub fn is_video_upload(content_type: &str, filename: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    let extension_matches = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
        .unwrap_or(false);

    mime.starts_with("video/") || extension_matches
}

/// Parse a decimal seconds field. Unparsable or non-finite values count as absent.
pub fn parse_time_field(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge {
            size: max_bytes.saturating_add(1),
            max: max_bytes,
        }
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the upload form, stopping as soon as the file exceeds `max_bytes`.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_bytes: u64,
) -> Result<UploadForm, AppError> {
    let mut file: Option<Bytes> = None;
    let mut filename = String::new();
    let mut content_type = String::new();
    let mut start_time = None;
    let mut end_time = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let mut buffer = BytesMut::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?
                {
                    let size = (buffer.len() + chunk.len()) as u64;
                    if size > max_bytes {
                        return Err(AppError::FileTooLarge {
                            size,
                            max: max_bytes,
                        });
                    }
                    buffer.extend_from_slice(&chunk);
                }
                file = Some(buffer.freeze());
            }
            "startTime" | "endTime" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                let value = parse_time_field(&text);
                if field_name == "startTime" {
                    start_time = value;
                } else {
                    end_time = value;
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(AppError::MissingFile)?;

    Ok(UploadForm {
        file,
        filename,
        content_type,
        start_time,
        end_time,
    })
}
