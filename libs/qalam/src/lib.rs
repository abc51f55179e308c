pub mod common;
pub mod image2text;
pub mod image_utils;
pub mod process;
pub mod text;
pub mod upload;
