//! Manifest-based package location.
//!
//! `PnpLocator` answers `resolve_to_unqualified`: map a specifier and the
//! file importing it to the install directory of the named package, with
//! the sub-path (if any) re-appended. "Unqualified" means no extension
//! probing or entry-point selection has happened yet; that stays the
//! resolver's job.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::builtins::is_builtin_module;
use crate::errors::LocatorError;
use crate::manifest::{PackageRecord, PnpManifest};

/// Options for a single lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorOptions {
    /// When set, a built-in module name that the issuer does not explicitly
    /// depend on is reported as `LocatorError::BuiltinModule` instead of
    /// `UndeclaredDependency`.
    pub consider_builtins: bool,
}

/// Capability interface for manifest-based package location.
///
/// Obtained once by the orchestration layer and injected into the resolver;
/// a resolver holding `None` simply degrades to conventional behavior.
pub trait ManifestLocator {
    /// Resolve `specifier` as seen from `issuing_file` to an on-disk path.
    ///
    /// The specifier may carry a sub-path (`lodash/fp`); the bare package
    /// name is looked up in the manifest and the sub-path is joined onto
    /// the package's install directory.
    fn resolve_to_unqualified(
        &self,
        specifier: &str,
        issuing_file: &Path,
        opts: LocatorOptions,
    ) -> Result<PathBuf, LocatorError>;
}

/// Locator backed by a parsed `.pnp.data.json` manifest.
#[derive(Debug)]
pub struct PnpLocator {
    /// Directory containing the manifest; locations resolve against it.
    manifest_dir: PathBuf,
    manifest: PnpManifest,
    /// Absolute install directory per package, same order as the records.
    locations: Vec<PathBuf>,
    /// (name, reference) -> index into `manifest.packages`.
    by_key: HashMap<(String, String), usize>,
}

impl PnpLocator {
    /// Load the manifest at `manifest_path` and build a locator from it.
    pub fn load(manifest_path: &Path) -> Result<PnpLocator, LocatorError> {
        let manifest = PnpManifest::load(manifest_path)?;
        let manifest_dir = manifest_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Ok(Self::from_manifest(manifest, manifest_dir))
    }

    /// Build a locator from an already-parsed manifest.
    pub fn from_manifest(manifest: PnpManifest, manifest_dir: PathBuf) -> PnpLocator {
        let locations = manifest
            .packages
            .iter()
            .map(|p| normalize(&manifest_dir.join(&p.location)))
            .collect();

        let by_key = manifest
            .packages
            .iter()
            .enumerate()
            .map(|(i, p)| ((p.name.clone(), p.reference.clone()), i))
            .collect();

        PnpLocator {
            manifest_dir,
            manifest,
            locations,
            by_key,
        }
    }

    pub fn manifest(&self) -> &PnpManifest {
        &self.manifest
    }

    /// Find the package owning `file`: the record whose install directory
    /// is the longest prefix of the file's path.
    fn find_owning_package(&self, file: &Path) -> Option<&PackageRecord> {
        let file = normalize(file);
        let mut best: Option<(usize, usize)> = None;

        for (i, location) in self.locations.iter().enumerate() {
            if file.starts_with(location) {
                let depth = location.components().count();
                if best.map_or(true, |(_, d)| depth > d) {
                    best = Some((i, depth));
                }
            }
        }

        best.map(|(i, _)| &self.manifest.packages[i])
    }

    fn record_location(&self, record: &PackageRecord) -> PathBuf {
        normalize(&self.manifest_dir.join(&record.location))
    }
}

impl ManifestLocator for PnpLocator {
    fn resolve_to_unqualified(
        &self,
        specifier: &str,
        issuing_file: &Path,
        opts: LocatorOptions,
    ) -> Result<PathBuf, LocatorError> {
        let (name, subpath) = split_specifier(specifier);

        let issuer = self.find_owning_package(issuing_file).ok_or_else(|| {
            LocatorError::IssuerNotOwned {
                issuer: issuing_file.to_path_buf(),
            }
        })?;

        // Self-reference: a package may import itself by name.
        let target = if name == issuer.name {
            issuer
        } else if let Some(reference) = issuer.dependencies.get(name) {
            self.by_key
                .get(&(name.to_string(), reference.clone()))
                .map(|&i| &self.manifest.packages[i])
                .ok_or_else(|| LocatorError::MissingPackage {
                    name: name.to_string(),
                    reference: reference.clone(),
                })?
        } else if opts.consider_builtins && is_builtin_module(name) {
            return Err(LocatorError::BuiltinModule {
                name: name.to_string(),
            });
        } else {
            return Err(LocatorError::UndeclaredDependency {
                name: name.to_string(),
                issuer: issuer.name.clone(),
            });
        };

        let mut resolved = self.record_location(target);
        if let Some(sub) = subpath {
            resolved.push(sub);
        }

        tracing::debug!(
            specifier,
            issuer = %issuer.name,
            target = %target.name,
            resolved = %resolved.display(),
            "located package via manifest"
        );

        Ok(resolved)
    }
}

/// Split a specifier into package name and sub-path.
///
/// Examples:
/// - "lodash" -> ("lodash", None)
/// - "lodash/fp" -> ("lodash", Some("fp"))
/// - "@types/node" -> ("@types/node", None)
/// - "@types/node/fs" -> ("@types/node", Some("fs"))
fn split_specifier(specifier: &str) -> (&str, Option<&str>) {
    if let Some(rest) = specifier.strip_prefix('@') {
        // Scoped: the name spans up to the second slash.
        if let Some(scope_len) = rest.find('/') {
            let after_scope = &rest[scope_len + 1..];
            if let Some(name_len) = after_scope.find('/') {
                let split = 1 + scope_len + 1 + name_len;
                return (&specifier[..split], Some(&specifier[split + 1..]));
            }
        }
        return (specifier, None);
    }

    match specifier.find('/') {
        Some(pos) => (&specifier[..pos], Some(&specifier[pos + 1..])),
        None => (specifier, None),
    }
}

/// Strip `.` components and a trailing separator so prefix comparisons see
/// the same shape on both sides.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
