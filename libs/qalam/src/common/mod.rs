mod error;
mod types;
mod utils;

pub use error::{QalamError, Result};
pub use types::{DecodedRaster, PreprocessedRaster, RawImage};
pub use utils::{init_logger, init_logger_exe};
