// Public modules
pub mod defaults;
pub mod error;
pub mod format;
pub mod generator;
pub mod loader_template;
pub mod module;
pub mod naming;
pub mod params;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use generator::{generate, generate_with, GenerateOutput};
pub use params::{GenerateRequest, LoaderParams};
