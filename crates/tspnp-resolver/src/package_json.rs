//! Package metadata (`package.json`).
//!
//! Only the fields entry-point selection reads are modeled. The `exports`
//! field is kept as raw JSON and the `"."` entry is extracted on demand;
//! conditional export trees beyond `types`/`default` are out of scope for
//! this resolver.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageJson {
    pub name: String,
    pub main: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
    pub module: Option<String>,
    pub exports: Option<serde_json::Value>,
}

/// The `"."` entry of the `exports` field, reduced to the two conditions
/// the resolver honors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageExports {
    pub types: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Error)]
pub enum PackageJsonError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl PackageJson {
    /// Load and parse a `package.json` file.
    pub fn load(path: &Path) -> Result<PackageJson, PackageJsonError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PackageJsonError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The declared types entry; "typings" is an alias for "types".
    pub fn types_entry(&self) -> Option<&str> {
        self.types.as_deref().or(self.typings.as_deref())
    }

    /// Extract the `"."` entry of `exports`.
    pub fn exports_entry(&self) -> PackageExports {
        let mut entry = PackageExports::default();

        let Some(exports) = &self.exports else {
            return entry;
        };

        // "exports": "./index.js"
        if let Some(default) = exports.as_str() {
            entry.default = Some(default.to_string());
            return entry;
        }

        let Some(dot) = exports.get(".") else {
            return entry;
        };

        // "exports": { ".": "./index.js" }
        if let Some(default) = dot.as_str() {
            entry.default = Some(default.to_string());
            return entry;
        }

        // "exports": { ".": { "types": "...", "default": "..." } }
        if let Some(types) = dot.get("types").and_then(|v| v.as_str()) {
            entry.types = Some(types.to_string());
        }
        if let Some(default) = dot.get("default").and_then(|v| v.as_str()) {
            entry.default = Some(default.to_string());
        }

        entry
    }
}
