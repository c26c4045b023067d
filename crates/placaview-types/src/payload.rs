//! Image payloads accepted by the recognition endpoint

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};

/// Image to submit for recognition
#[derive(Debug, Clone, PartialEq)]
pub enum UploadPayload {
    /// Raw file sent as the `image` multipart field
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    /// Captured frame sent as the `image_base64` multipart field
    Frame { data_url: String },
}

impl UploadPayload {
    /// Read an image file from disk; the MIME type comes from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = ImageFormat::from_path(path)
            .map_err(|_| Error::InvalidInput(format!("not an image file: {}", path.display())))?;
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(UploadPayload::File {
            filename,
            content_type: format.to_mime_type().to_string(),
            bytes,
        })
    }

    /// Encode a captured frame as a PNG data URL
    pub fn from_frame(frame: &DynamicImage) -> Result<Self> {
        let mut png = Vec::new();
        frame.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(UploadPayload::Frame {
            data_url: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        })
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, UploadPayload::Frame { .. })
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            UploadPayload::File { filename, bytes, .. } => {
                format!("file {} ({} bytes)", filename, bytes.len())
            }
            UploadPayload::Frame { data_url } => format!("camera frame ({} chars)", data_url.len()),
        }
    }
}
