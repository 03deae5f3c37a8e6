pub mod config;
pub mod error;
pub mod types;

pub use config::HdskConfig;
pub use error::{HdskError, HdskResult};
pub use types::{HashAlgorithm, LogFormat};
