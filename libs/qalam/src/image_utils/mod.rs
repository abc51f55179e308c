mod types;
mod utils;

pub use types::{BinarizationStrategy, PreprocessConfig};
pub use utils::{binarize, binarize_adaptive, binarize_otsu, preprocess, sharpen, to_grayscale, upscale};
