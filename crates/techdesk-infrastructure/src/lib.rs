pub mod config_service;
pub mod file_encoder;
pub mod logging;
pub mod paths;
pub mod secret_service;

pub use crate::config_service::ConfigService;
pub use crate::file_encoder::{encode_bytes, encode_file};
pub use crate::paths::TechdeskPaths;
pub use crate::secret_service::SecretServiceImpl;
