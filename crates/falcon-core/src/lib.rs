pub mod config;
pub mod error;
pub mod types;

pub use config::FalconConfig;
pub use error::{FalconError, Result};
pub use types::*;
