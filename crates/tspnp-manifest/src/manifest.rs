//! Install manifest parsing.
//!
//! The manifest is a single JSON file (`.pnp.data.json`) written by the
//! package installer. It carries one record per installed package: the
//! package's name, its versioned reference, the directory it was installed
//! to (relative to the manifest), and the set of dependencies that package
//! is allowed to see. Lookup visibility is per-package: a package may only
//! resolve names its own record declares.
//!
//! ## Example .pnp.data.json
//!
//! ```json
//! {
//!   "version": 1,
//!   "root": "my-app",
//!   "packages": [
//!     {
//!       "name": "my-app",
//!       "reference": "workspace:.",
//!       "location": "./",
//!       "dependencies": { "lodash": "npm:4.17.21" }
//!     },
//!     {
//!       "name": "lodash",
//!       "reference": "npm:4.17.21",
//!       "location": "./.store/lodash-npm-4.17.21/node_modules/lodash/",
//!       "dependencies": {}
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::errors::LocatorError;

/// File name the installer writes next to the project root.
pub const MANIFEST_FILE_NAME: &str = ".pnp.data.json";

/// Parsed install manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PnpManifest {
    /// Manifest format version.
    pub version: u32,
    /// Name of the workspace root package.
    pub root: String,
    /// One record per installed package.
    pub packages: Vec<PackageRecord>,
}

/// A single installed package.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageRecord {
    pub name: String,
    /// Versioned reference, e.g. `npm:4.17.21` or `workspace:.`.
    pub reference: String,
    /// Install directory, relative to the manifest's directory.
    pub location: String,
    /// Dependencies visible to this package: name -> reference.
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
}

impl PnpManifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<PnpManifest, LocatorError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LocatorError::ManifestNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LocatorError::Io(e)
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse manifest content, reporting `path` in errors.
    pub fn parse(content: &str, path: &Path) -> Result<PnpManifest, LocatorError> {
        serde_json::from_str(content).map_err(|e| LocatorError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Find a record by name and reference.
    pub fn find(&self, name: &str, reference: &str) -> Option<&PackageRecord> {
        self.packages
            .iter()
            .find(|p| p.name == name && p.reference == reference)
    }

    /// The workspace root record, if the manifest names one that exists.
    pub fn root_record(&self) -> Option<&PackageRecord> {
        self.packages.iter().find(|p| p.name == self.root)
    }
}
