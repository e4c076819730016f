//! debuginfo-install - fetch the debuginfo a core dump needs
//!
//! Reads the build ids of the modules loaded in a core dump, looks for the
//! matching debuginfo files locally and installs the missing ones from the
//! debuginfo repositories into a cache directory.

pub mod acquire;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod context;
pub mod debuginfo;
pub mod error;
pub mod repo;
pub mod tools;
pub mod ui;

pub use error::{DebuginfoError, DebuginfoResult};
