pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod metadata;
pub mod ui;

pub use error::{LineageError, Result};
pub use metadata::RepositoryMetadata;
