mod types;
pub use types::ProcessorConfig;

mod utils;
pub use utils::{Pipeline, PipelineOutput, PipelineStage};
