//! Command line interface

pub mod args;
pub mod run;

pub use args::{env_verbosity, Cli, VERBOSITY_ENV};
pub use run::{build_context, default_tmpdir, execute, finish, interrupted, RunReport};
