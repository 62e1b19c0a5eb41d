//! Configuration, paths, errors, and logging setup shared by the Hear Ye
//! client crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, Environment, DEFAULT_IDENTITY_ISSUER_URL, DEFAULT_LOCAL_API_URL, DEFAULT_LOG_LEVEL,
    DEFAULT_PRODUCTION_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
