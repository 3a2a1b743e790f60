//! Resolution result types.
//!
//! Module resolution and type-reference-directive resolution share one
//! result shape: an optional resolved target plus the ordered list of every
//! location that was probed and missed. The list is what diagnostics render
//! when nothing resolves, so order is part of the contract and entries are
//! never deduplicated.

use std::path::{Path, PathBuf};

/// File extensions the resolver can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Ts,
    Tsx,
    Dts,
    Js,
    Jsx,
    Json,
}

impl Extension {
    /// Classify a resolved file name. `.d.ts` wins over `.ts`.
    pub fn of(path: &Path) -> Option<Extension> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") {
            Some(Extension::Dts)
        } else if name.ends_with(".ts") {
            Some(Extension::Ts)
        } else if name.ends_with(".tsx") {
            Some(Extension::Tsx)
        } else if name.ends_with(".js") {
            Some(Extension::Js)
        } else if name.ends_with(".jsx") {
            Some(Extension::Jsx)
        } else if name.ends_with(".json") {
            Some(Extension::Json)
        } else {
            None
        }
    }
}

/// A resolution target, independent of flavor.
pub trait Resolution {
    fn file_name(&self) -> &Path;
}

/// Successful module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolution {
    pub resolved_file_name: PathBuf,
    pub extension: Option<Extension>,
}

impl ModuleResolution {
    pub fn new(resolved_file_name: PathBuf) -> Self {
        let extension = Extension::of(&resolved_file_name);
        Self {
            resolved_file_name,
            extension,
        }
    }
}

impl Resolution for ModuleResolution {
    fn file_name(&self) -> &Path {
        &self.resolved_file_name
    }
}

/// Successful type-reference-directive resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReferenceResolution {
    pub resolved_file_name: PathBuf,
    /// True when found through the primary `@types` lookup.
    pub primary: bool,
}

impl Resolution for TypeReferenceResolution {
    fn file_name(&self) -> &Path {
        &self.resolved_file_name
    }
}

/// Outcome of one resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult<T> {
    pub resolved: Option<T>,
    /// Every location probed and missed, in probe order, across all
    /// attempts made for this request.
    pub failed_lookup_locations: Vec<PathBuf>,
}

impl<T> ResolutionResult<T> {
    pub fn found(resolved: T, failed_lookup_locations: Vec<PathBuf>) -> Self {
        Self {
            resolved: Some(resolved),
            failed_lookup_locations,
        }
    }

    pub fn not_found(failed_lookup_locations: Vec<PathBuf>) -> Self {
        Self {
            resolved: None,
            failed_lookup_locations,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_classification() {
        assert_eq!(Extension::of(Path::new("a/b/foo.ts")), Some(Extension::Ts));
        assert_eq!(Extension::of(Path::new("foo.d.ts")), Some(Extension::Dts));
        assert_eq!(Extension::of(Path::new("foo.jsx")), Some(Extension::Jsx));
        assert_eq!(Extension::of(Path::new("foo.mjs")), None);
        assert_eq!(Extension::of(Path::new("foo")), None);
    }

    #[test]
    fn test_module_resolution_derives_extension() {
        let r = ModuleResolution::new(PathBuf::from("/p/index.d.ts"));
        assert_eq!(r.extension, Some(Extension::Dts));
        assert_eq!(r.file_name(), Path::new("/p/index.d.ts"));
    }
}
