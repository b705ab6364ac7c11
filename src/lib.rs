pub mod config;
pub mod cookie;
pub mod error;
pub mod http;
pub mod logger;
pub mod utils;
pub mod variable;
pub mod workflow;

// Re-export commonly used types
pub use error::{CurlwrapError, Result};
