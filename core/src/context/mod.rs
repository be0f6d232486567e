mod config;
mod error;

pub use config::CountdownConfig;
pub use error::ConfigError;
