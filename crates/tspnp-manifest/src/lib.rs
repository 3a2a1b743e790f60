//! Plug'n'Play install manifest support.
//!
//! Packages installed under a Plug'n'Play scheme do not live in nested
//! `node_modules` trees; a single manifest file maps every package to its
//! on-disk location and records which dependencies each package may see.
//! This crate parses that manifest and answers the one question a resolver
//! needs: given a specifier and the file that imports it, where on disk
//! does the named package live?

pub mod builtins;
pub mod errors;
pub mod locator;
pub mod manifest;

pub use builtins::is_builtin_module;
pub use errors::LocatorError;
pub use locator::{LocatorOptions, ManifestLocator, PnpLocator};
pub use manifest::{PackageRecord, PnpManifest, MANIFEST_FILE_NAME};
