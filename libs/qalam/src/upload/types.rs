use image::ImageFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadType {
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Gif,
}

impl UploadType {
    pub fn image_format(&self) -> ImageFormat {
        match self {
            UploadType::Png => ImageFormat::Png,
            UploadType::Jpeg => ImageFormat::Jpeg,
            UploadType::Tiff => ImageFormat::Tiff,
            UploadType::Bmp => ImageFormat::Bmp,
            UploadType::Gif => ImageFormat::Gif,
        }
    }
}
