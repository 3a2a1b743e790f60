//! Conventional node-style resolution.
//!
//! Implements the module resolution the type checker expects from a nested
//! `node_modules` layout: relative and absolute requests with extension
//! probing and `index.*` fallback, bare requests through a `node_modules`
//! walk with `package.json` entry selection, and type-reference directives
//! through `@types`. Every probe that misses is recorded, in probe order,
//! so diagnostics can show exactly where a failed lookup searched.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::host::ResolutionHost;
use crate::package_json::PackageJson;
use crate::result::{ModuleResolution, ResolutionResult, TypeReferenceResolution};
use crate::specifier::{parse_specifier, types_package_name};

/// Extensions probed for module requests, in preference order.
const EXTENSIONS: [&str; 5] = ["ts", "tsx", "d.ts", "js", "jsx"];

/// Extensions probed for declaration entries.
const DECLARATION_EXTENSIONS: [&str; 2] = ["d.ts", "ts"];

/// Conventional resolver over an injected host filesystem.
pub struct NodeResolver<H> {
    host: H,
}

impl<H: ResolutionHost> NodeResolver<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Resolve an import specifier from `issuing_file`.
    pub fn resolve_module_name(
        &self,
        specifier: &str,
        issuing_file: &Path,
    ) -> ResolutionResult<ModuleResolution> {
        let mut failed = Vec::new();

        // A trailing separator requests directory resolution; the bare-file
        // probes are skipped for the trimmed path.
        let directory_import =
            specifier.ends_with('/') || specifier.ends_with(MAIN_SEPARATOR);

        let resolved = if specifier.starts_with("./") || specifier.starts_with("../") {
            issuing_file.parent().and_then(|dir| {
                self.load_as_file_or_directory(&dir.join(specifier), directory_import, &mut failed)
            })
        } else if specifier.starts_with('/') || Path::new(specifier).is_absolute() {
            self.load_as_file_or_directory(Path::new(specifier), directory_import, &mut failed)
        } else {
            self.load_from_node_modules(specifier, issuing_file, directory_import, &mut failed)
        };

        match resolved {
            Some(path) => {
                tracing::debug!(specifier, resolved = %path.display(), "module resolved");
                ResolutionResult::found(ModuleResolution::new(path), failed)
            }
            None => ResolutionResult::not_found(failed),
        }
    }

    /// Resolve a type-reference directive (`/// <reference types="..." />`)
    /// from `issuing_file`.
    ///
    /// The primary lookup goes through `node_modules/@types`; the secondary
    /// lookup accepts a declaration entry from the package itself.
    pub fn resolve_type_reference_directive(
        &self,
        name: &str,
        issuing_file: &Path,
    ) -> ResolutionResult<TypeReferenceResolution> {
        let mut failed = Vec::new();

        // Path-like directives (a resolver overlay may re-root a directive
        // at an on-disk location) load a declaration entry directly.
        if name.starts_with('/')
            || name.starts_with("./")
            || name.starts_with("../")
            || Path::new(name).is_absolute()
        {
            let directory_import = name.ends_with('/') || name.ends_with(MAIN_SEPARATOR);
            let target = Path::new(name);
            let resolved = if directory_import {
                self.load_declaration_entry(target, &mut failed)
            } else {
                self.load_as_declaration_file(target, &mut failed)
                    .or_else(|| self.load_declaration_entry(target, &mut failed))
            };
            return match resolved {
                Some(file) => ResolutionResult::found(
                    TypeReferenceResolution {
                        resolved_file_name: file,
                        primary: false,
                    },
                    failed,
                ),
                None => ResolutionResult::not_found(failed),
            };
        }

        let Some(start) = issuing_file.parent() else {
            return ResolutionResult::not_found(failed);
        };

        let types_name = types_package_name(name);
        for dir in start.ancestors() {
            let types_dir = dir.join("node_modules").join("@types").join(&types_name);
            if self.host.directory_exists(&types_dir) {
                if let Some(file) = self.load_declaration_entry(&types_dir, &mut failed) {
                    return ResolutionResult::found(
                        TypeReferenceResolution {
                            resolved_file_name: file,
                            primary: true,
                        },
                        failed,
                    );
                }
            } else {
                failed.push(types_dir);
            }
        }

        for dir in start.ancestors() {
            let package_dir = dir.join("node_modules").join(name);
            if self.host.directory_exists(&package_dir) {
                if let Some(file) = self.load_declaration_entry(&package_dir, &mut failed) {
                    return ResolutionResult::found(
                        TypeReferenceResolution {
                            resolved_file_name: file,
                            primary: false,
                        },
                        failed,
                    );
                }
            } else {
                failed.push(package_dir);
            }
        }

        ResolutionResult::not_found(failed)
    }

    /// Probe a path as a file first, then as a directory.
    fn load_as_file_or_directory(
        &self,
        target: &Path,
        directory_only: bool,
        failed: &mut Vec<PathBuf>,
    ) -> Option<PathBuf> {
        if !directory_only {
            if let Some(file) = self.load_as_file(target, failed) {
                return Some(file);
            }
        }
        self.load_as_directory(target, failed)
    }

    /// Try a path with each extension in order. An existing extension is
    /// substituted, so `./util.js` may resolve to `util.ts`.
    fn load_as_file(&self, target: &Path, failed: &mut Vec<PathBuf>) -> Option<PathBuf> {
        for ext in EXTENSIONS {
            let candidate = target.with_extension(ext);
            if self.host.file_exists(&candidate) {
                return Some(candidate);
            }
            failed.push(candidate);
        }
        None
    }

    /// Resolve a directory through its `package.json` entries, falling back
    /// to `index.*`.
    fn load_as_directory(&self, dir: &Path, failed: &mut Vec<PathBuf>) -> Option<PathBuf> {
        let package_json_path = dir.join("package.json");
        if self.host.file_exists(&package_json_path) {
            match PackageJson::load(&package_json_path) {
                Ok(pkg) => {
                    if let Some(file) = self.load_package_entries(dir, &pkg, failed) {
                        return Some(file);
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        path = %package_json_path.display(),
                        error = %e,
                        "ignoring unreadable package.json"
                    );
                }
            }
        }

        self.load_as_file(&dir.join("index"), failed)
    }

    /// Entry selection: `types`/`typings` > `module` > `main`, then the
    /// `exports` `"."` entry (`types` before `default`).
    fn load_package_entries(
        &self,
        dir: &Path,
        pkg: &PackageJson,
        failed: &mut Vec<PathBuf>,
    ) -> Option<PathBuf> {
        let exports = pkg.exports_entry();
        let entries = [
            pkg.types_entry(),
            pkg.module.as_deref(),
            pkg.main.as_deref(),
            exports.types.as_deref(),
            exports.default.as_deref(),
        ];

        for entry in entries.into_iter().flatten() {
            let target = dir.join(entry);
            if self.host.file_exists(&target) {
                return Some(target);
            }
            if let Some(file) = self.load_as_file(&target, failed) {
                return Some(file);
            }
        }

        None
    }

    /// Walk `node_modules` directories upward from the issuing file,
    /// probing the package itself and its `@types` counterpart at each
    /// level.
    fn load_from_node_modules(
        &self,
        specifier: &str,
        issuing_file: &Path,
        directory_import: bool,
        failed: &mut Vec<PathBuf>,
    ) -> Option<PathBuf> {
        let parsed = parse_specifier(specifier);
        if parsed.package_name.is_empty() {
            return None;
        }
        let subpath = parsed.remainder.trim_start_matches('/');
        let types_name = format!("@types/{}", types_package_name(parsed.package_name));

        let start = issuing_file.parent()?;
        for dir in start.ancestors() {
            let node_modules = dir.join("node_modules");
            if !self.host.directory_exists(&node_modules) {
                continue;
            }

            for name in [parsed.package_name, types_name.as_str()] {
                let package_dir = node_modules.join(name);
                if !self.host.directory_exists(&package_dir) {
                    failed.push(package_dir);
                    continue;
                }

                let loaded = if subpath.is_empty() {
                    self.load_as_directory(&package_dir, failed)
                } else {
                    self.load_as_file_or_directory(
                        &package_dir.join(subpath),
                        directory_import,
                        failed,
                    )
                };
                if loaded.is_some() {
                    return loaded;
                }
            }
        }

        None
    }

    /// Try a path with each declaration extension in order.
    fn load_as_declaration_file(
        &self,
        target: &Path,
        failed: &mut Vec<PathBuf>,
    ) -> Option<PathBuf> {
        for ext in DECLARATION_EXTENSIONS {
            let candidate = target.with_extension(ext);
            if self.host.file_exists(&candidate) {
                return Some(candidate);
            }
            failed.push(candidate);
        }
        None
    }

    /// Declaration entry for a `@types`-style package: the `types` field if
    /// declared, otherwise `index.d.ts`.
    fn load_declaration_entry(&self, dir: &Path, failed: &mut Vec<PathBuf>) -> Option<PathBuf> {
        let package_json_path = dir.join("package.json");
        if self.host.file_exists(&package_json_path) {
            if let Ok(pkg) = PackageJson::load(&package_json_path) {
                if let Some(types) = pkg.types_entry() {
                    let target = dir.join(types);
                    if self.host.file_exists(&target) {
                        return Some(target);
                    }
                    if let Some(file) = self.load_as_declaration_file(&target, failed) {
                        return Some(file);
                    }
                }
            }
        }

        let index = dir.join("index.d.ts");
        if self.host.file_exists(&index) {
            return Some(index);
        }
        failed.push(index);
        None
    }
}
