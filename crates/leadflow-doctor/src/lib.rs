#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod script;

pub use cli::run_from_env;
pub use error::{DoctorError, Result};
