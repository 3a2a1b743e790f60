//! tspnp driver library.
//!
//! Orchestration around the resolution library: locating the install
//! manifest, scanning source files for import specifiers, and the pieces
//! the `tspnp` binary is built from.

pub mod discovery;
pub mod imports;

pub use discovery::find_manifest;
pub use imports::{scan_imports, ImportSpecifier};
