pub mod build;
pub mod config;
pub mod error;
pub mod git;
pub mod manifest;
pub mod notify;
pub mod pipeline;
pub mod prompt;
pub mod ui;

pub use error::{ReleaseError, Result};
