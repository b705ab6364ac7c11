pub mod client;
pub mod command;
pub mod normalize;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::{CurlClient, Transport};
pub use command::{CommandBuilder, CurlCommand};
pub use request::RequestSpec;
pub use response::NormalizedResponse;
