//! Locator error types.
//!
//! Every way a manifest-based package lookup can fail: the manifest itself
//! is missing or malformed, the issuing file belongs to no known package,
//! or the requested package is not visible from the issuer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to parse manifest at {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("File {issuer} is not owned by any package in the manifest")]
    IssuerNotOwned { issuer: PathBuf },

    #[error("Package '{name}' is not declared in the dependencies of '{issuer}'")]
    UndeclaredDependency { name: String, issuer: String },

    #[error("Package '{name}' ({reference}) is referenced but has no record in the manifest")]
    MissingPackage { name: String, reference: String },

    #[error("'{name}' is a built-in module with no install location")]
    BuiltinModule { name: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
