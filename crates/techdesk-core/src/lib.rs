pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod maintenance;
pub mod prompts;
pub mod request;
pub mod secret;
pub mod session;

// Re-export common types
pub use client::{FragmentStream, ModelClient};
pub use error::{Result, TechdeskError};
pub use file::UploadedFile;
pub use maintenance::{MaintenanceItem, Priority};
