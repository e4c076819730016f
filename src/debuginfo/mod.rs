//! Debuginfo identity and local lookup
//!
//! Turns a core dump into the set of build ids it references, maps each
//! build id to its place in the build-id debug store, and checks which of
//! those files are already available.

pub mod identity;
pub mod path;
pub mod resolve;

pub use identity::{extract, parse_unstrip_output, CoreModules, VDSO_MODULE};
pub use path::{BuildId, DebuginfoPath, BUILD_ID_DIR};
pub use resolve::LocalResolver;
