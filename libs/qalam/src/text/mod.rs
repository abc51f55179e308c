mod utils;

pub use utils::{clean, is_valid_token};
