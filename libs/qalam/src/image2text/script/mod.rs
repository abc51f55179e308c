mod types;
pub use types::{ScriptDetection, ScriptHint};

mod utils;
pub use utils::{detect, resolve_detection};
