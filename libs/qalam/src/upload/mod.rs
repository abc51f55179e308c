use std::path::Path;

mod types;
pub use types::UploadType;

use crate::common::{QalamError, RawImage, Result};
use crate::process::{Pipeline, PipelineOutput};

pub fn get_upload_type(filename: &str) -> Result<UploadType> {
    let extension = Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| QalamError::Input("Invalid file extension".to_string()))?;

    match extension.to_lowercase().as_str() {
        "png" => Ok(UploadType::Png),
        "jpg" | "jpeg" => Ok(UploadType::Jpeg),
        "tif" | "tiff" => Ok(UploadType::Tiff),
        "bmp" => Ok(UploadType::Bmp),
        "gif" => Ok(UploadType::Gif),
        ext => Err(QalamError::Input(format!("Unsupported file extension: {}", ext))),
    }
}

/// Validates a caller-supplied file. A filename, when present, must be
/// non-empty and carry a supported extension, which then declares the
/// encoding. Without one the encoding is sniffed.
pub fn to_raw_image(filename: Option<&str>, bytes: Vec<u8>) -> Result<RawImage> {
    let format = match filename {
        Some("") => return Err(QalamError::Input("No selected file".to_string())),
        Some(name) => Some(get_upload_type(name)?.image_format()),
        None => None,
    };

    if bytes.is_empty() {
        return Err(QalamError::Input("Empty image file".to_string()));
    }

    Ok(match format {
        Some(format) => RawImage::new(bytes, Some(format)),
        None => RawImage::sniffed(bytes),
    })
}

pub async fn process_upload(
    pipeline: &Pipeline,
    filename: Option<&str>,
    bytes: Vec<u8>,
) -> Result<PipelineOutput> {
    let image = to_raw_image(filename, bytes)?;
    pipeline.run(image).await
}

pub async fn process_image_path(pipeline: &Pipeline, path: &Path) -> Result<PipelineOutput> {
    let filename = path
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| QalamError::Input(format!("Invalid file path: {}", path.display())))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| QalamError::Input(format!("Failed to read {}: {}", path.display(), e)))?;

    process_upload(pipeline, Some(filename), bytes).await
}
