pub mod config;
pub mod error;
pub mod json;

pub use config::{Config, Language};
pub use error::{AppError, AppResult, ErrorKind};
