//! Manifest overlay over conventional resolution.
//!
//! Conventional resolution always runs first and a conventional success is
//! final. Only when it fails for a request that names a package does the
//! overlay consult the install manifest: once for the package itself and
//! once for its `@types/` counterpart, re-running conventional resolution
//! rooted at whatever location the manifest reports. Both candidates are
//! always attempted when the locator can place them, because the preference
//! step compares their outcomes; a `.ts` result wins over the candidate
//! order.

use std::ffi::OsString;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tspnp_manifest::{LocatorOptions, ManifestLocator};

use crate::host::ResolutionHost;
use crate::node::NodeResolver;
use crate::result::{
    ModuleResolution, Resolution, ResolutionResult, TypeReferenceResolution,
};
use crate::specifier::{parse_specifier, types_package_name};

/// Suffixes probed to decide whether a located path is a directory rather
/// than a file missing its extension. The empty suffix probes the location
/// itself.
const DIRECTORY_PROBE_SUFFIXES: [&str; 7] =
    ["", ".ts", ".tsx", ".d.ts", ".js", ".jsx", ".json"];

/// Results whose file name ends in this suffix are preferred; `.d.ts`
/// matches too.
const PRIMARY_EXTENSION: &str = ".ts";

/// Resolve `specifier` from `issuing_file`, falling back to the manifest
/// locator when conventional resolution fails.
///
/// `base_resolve` is the conventional resolver. It is re-invoked from
/// inside the overlay with manifest-located paths, so callers must pass the
/// underlying resolver here, never the overlaid one.
pub fn resolve_with_overlay<T, H, F>(
    specifier: &str,
    issuing_file: &Path,
    locator: Option<&dyn ManifestLocator>,
    host: &H,
    mut base_resolve: F,
) -> ResolutionResult<T>
where
    T: Resolution,
    H: ResolutionHost + ?Sized,
    F: FnMut(&str, &Path) -> ResolutionResult<T>,
{
    let base = base_resolve(specifier, issuing_file);
    if base.resolved.is_some() {
        return base;
    }
    let mut failed = base.failed_lookup_locations;

    let Some(locator) = locator else {
        return ResolutionResult::not_found(failed);
    };

    let parsed = parse_specifier(specifier);
    if parsed.package_name.is_empty() {
        return ResolutionResult::not_found(failed);
    }

    let regular = format!("{}{}", parsed.package_name, parsed.remainder);
    let types = format!(
        "@types/{}{}",
        types_package_name(parsed.package_name),
        parsed.remainder
    );

    let mut successes: Vec<T> = Vec::new();
    for candidate in [regular, types] {
        let unqualified = match locator.resolve_to_unqualified(
            &candidate,
            issuing_file,
            LocatorOptions {
                consider_builtins: false,
            },
        ) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(candidate = %candidate, error = %e, "manifest lookup failed for candidate");
                continue;
            }
        };

        // The location is a directory only when it exists as one and no
        // extension probe names an existing file; a trailing separator
        // then makes the conventional resolver treat it as a directory
        // import instead of a literal file name.
        let is_directory = host.directory_exists(&unqualified)
            && DIRECTORY_PROBE_SUFFIXES
                .iter()
                .all(|suffix| !host.file_exists(&append_suffix(&unqualified, suffix)));

        let mut location = unqualified.to_string_lossy().into_owned();
        if is_directory {
            location.push(MAIN_SEPARATOR);
        }

        let mut attempt = base_resolve(&location, issuing_file);
        failed.append(&mut attempt.failed_lookup_locations);
        if let Some(resolved) = attempt.resolved {
            successes.push(resolved);
        }
    }

    let preferred = successes
        .iter()
        .position(|r| {
            r.file_name()
                .to_string_lossy()
                .ends_with(PRIMARY_EXTENSION)
        })
        .or(if successes.is_empty() { None } else { Some(0) });

    match preferred {
        Some(index) => ResolutionResult::found(successes.remove(index), failed),
        None => ResolutionResult::not_found(failed),
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Drop-in replacement for the conventional resolver's entry points.
///
/// Construction takes the host and an optional locator; a resolver built
/// without a locator behaves exactly like the conventional one.
pub struct PnpResolver<H> {
    node: NodeResolver<H>,
    locator: Option<Box<dyn ManifestLocator>>,
}

impl<H: ResolutionHost> PnpResolver<H> {
    pub fn new(host: H, locator: Option<Box<dyn ManifestLocator>>) -> Self {
        Self {
            node: NodeResolver::new(host),
            locator,
        }
    }

    /// Resolve an import specifier.
    pub fn resolve_module_name(
        &self,
        specifier: &str,
        issuing_file: &Path,
    ) -> ResolutionResult<ModuleResolution> {
        resolve_with_overlay(
            specifier,
            issuing_file,
            self.locator.as_deref(),
            self.node.host(),
            |request, issuer| self.node.resolve_module_name(request, issuer),
        )
    }

    /// Resolve a type-reference directive name.
    pub fn resolve_type_reference_directive(
        &self,
        name: &str,
        issuing_file: &Path,
    ) -> ResolutionResult<TypeReferenceResolution> {
        resolve_with_overlay(
            name,
            issuing_file,
            self.locator.as_deref(),
            self.node.host(),
            |request, issuer| self.node.resolve_type_reference_directive(request, issuer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RealFs;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::TempDir;
    use tspnp_manifest::{LocatorError, PnpLocator, PnpManifest};

    /// Locator wrapper counting how often the manifest is consulted.
    struct CountingLocator<L> {
        inner: L,
        calls: Cell<usize>,
    }

    impl<L: ManifestLocator> CountingLocator<L> {
        fn new(inner: L) -> Self {
            Self {
                inner,
                calls: Cell::new(0),
            }
        }
    }

    impl<L: ManifestLocator> ManifestLocator for CountingLocator<L> {
        fn resolve_to_unqualified(
            &self,
            specifier: &str,
            issuing_file: &Path,
            opts: LocatorOptions,
        ) -> Result<PathBuf, LocatorError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.resolve_to_unqualified(specifier, issuing_file, opts)
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn locator_for(root: &Path, manifest_json: &str) -> PnpLocator {
        let manifest =
            PnpManifest::parse(manifest_json, &root.join(".pnp.data.json")).unwrap();
        PnpLocator::from_manifest(manifest, root.to_path_buf())
    }

    const LODASH_MANIFEST: &str = r#"{
        "version": 1,
        "root": "my-app",
        "packages": [
            {
                "name": "my-app",
                "reference": "workspace:.",
                "location": "./",
                "dependencies": { "lodash": "npm:4.17.21" }
            },
            {
                "name": "lodash",
                "reference": "npm:4.17.21",
                "location": "./.store/lodash-npm-4.17.21/node_modules/lodash/",
                "dependencies": {}
            }
        ]
    }"#;

    #[test]
    fn test_conventional_success_skips_locator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/util.ts", "export {};");
        write(root, "src/main.ts", "");

        let node = NodeResolver::new(RealFs);
        let locator = CountingLocator::new(locator_for(root, LODASH_MANIFEST));

        let result = resolve_with_overlay(
            "./util",
            &root.join("src/main.ts"),
            Some(&locator),
            &RealFs,
            |s, i| node.resolve_module_name(s, i),
        );

        assert!(result.resolved.unwrap().resolved_file_name.ends_with("src/util.ts"));
        assert_eq!(locator.calls.get(), 0);
    }

    #[test]
    fn test_relative_failure_returns_unchanged_without_locator_call() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");

        let node = NodeResolver::new(RealFs);
        let locator = CountingLocator::new(locator_for(root, LODASH_MANIFEST));
        let from = root.join("src/main.ts");

        let overlaid = resolve_with_overlay(
            "./missing",
            &from,
            Some(&locator),
            &RealFs,
            |s, i| node.resolve_module_name(s, i),
        );
        let plain = node.resolve_module_name("./missing", &from);

        assert!(overlaid.resolved.is_none());
        assert_eq!(overlaid.failed_lookup_locations, plain.failed_lookup_locations);
        assert_eq!(locator.calls.get(), 0);
    }

    #[test]
    fn test_lodash_resolves_through_store_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        write(
            root,
            ".store/lodash-npm-4.17.21/node_modules/lodash/index.js",
            "module.exports = {};",
        );

        let locator = locator_for(root, LODASH_MANIFEST);
        let resolver = PnpResolver::new(RealFs, Some(Box::new(locator)));

        let result = resolver.resolve_module_name("lodash", &root.join("src/main.ts"));
        let resolved = result.resolved.unwrap();
        assert!(resolved
            .resolved_file_name
            .ends_with(".store/lodash-npm-4.17.21/node_modules/lodash/index.js"));
    }

    #[test]
    fn test_directory_target_gets_trailing_separator_and_ts_preference() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        // Regular package resolves to a .js entry, the types counterpart to
        // a .d.ts entry; the .d.ts one must win.
        write(
            root,
            ".store/widgets/node_modules/@scope/widgets/index.js",
            "",
        );
        write(
            root,
            ".store/types-widgets/node_modules/@types/scope__widgets/index.d.ts",
            "",
        );

        let manifest = r#"{
            "version": 1,
            "root": "my-app",
            "packages": [
                {
                    "name": "my-app",
                    "reference": "workspace:.",
                    "location": "./",
                    "dependencies": {
                        "@scope/widgets": "npm:1.0.0",
                        "@types/scope__widgets": "npm:1.0.0"
                    }
                },
                {
                    "name": "@scope/widgets",
                    "reference": "npm:1.0.0",
                    "location": "./.store/widgets/node_modules/@scope/widgets/",
                    "dependencies": {}
                },
                {
                    "name": "@types/scope__widgets",
                    "reference": "npm:1.0.0",
                    "location": "./.store/types-widgets/node_modules/@types/scope__widgets/",
                    "dependencies": {}
                }
            ]
        }"#;

        let node = NodeResolver::new(RealFs);
        let locator = locator_for(root, manifest);
        let requests = RefCell::new(Vec::new());

        let result = resolve_with_overlay(
            "@scope/widgets",
            &root.join("src/main.ts"),
            Some(&locator),
            &RealFs,
            |s: &str, i: &Path| {
                requests.borrow_mut().push(s.to_string());
                node.resolve_module_name(s, i)
            },
        );

        // Both located candidates were re-resolved rooted at a directory,
        // so both re-invocations carry a trailing separator.
        let requests = requests.borrow();
        assert_eq!(requests.len(), 3);
        assert!(requests[1].ends_with(MAIN_SEPARATOR));
        assert!(requests[2].ends_with(MAIN_SEPARATOR));

        let resolved = result.resolved.unwrap();
        assert!(resolved
            .resolved_file_name
            .ends_with("@types/scope__widgets/index.d.ts"));
    }

    #[test]
    fn test_types_candidate_used_when_regular_is_undeclared() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        write(
            root,
            ".store/types-node/node_modules/@types/node/index.d.ts",
            "",
        );

        let manifest = r#"{
            "version": 1,
            "root": "my-app",
            "packages": [
                {
                    "name": "my-app",
                    "reference": "workspace:.",
                    "location": "./",
                    "dependencies": { "@types/node": "npm:20.0.0" }
                },
                {
                    "name": "@types/node",
                    "reference": "npm:20.0.0",
                    "location": "./.store/types-node/node_modules/@types/node/",
                    "dependencies": {}
                }
            ]
        }"#;

        let locator = locator_for(root, manifest);
        let resolver = PnpResolver::new(RealFs, Some(Box::new(locator)));

        let result = resolver.resolve_module_name("node", &root.join("src/main.ts"));
        assert!(result
            .resolved
            .unwrap()
            .resolved_file_name
            .ends_with("@types/node/index.d.ts"));
    }

    #[test]
    fn test_failed_lookups_concatenate_in_attempt_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        write(
            root,
            ".store/lodash-npm-4.17.21/node_modules/lodash/index.js",
            "",
        );
        // An empty node_modules directory gives the base attempt failures
        // of its own to accumulate ahead of the candidate attempts.
        fs::create_dir_all(root.join("node_modules")).unwrap();

        let node = NodeResolver::new(RealFs);
        let locator = locator_for(root, LODASH_MANIFEST);
        let from = root.join("src/main.ts");

        let base_only = node.resolve_module_name("lodash", &from);
        let overlaid = resolve_with_overlay(
            "lodash",
            &from,
            Some(&locator),
            &RealFs,
            |s, i| node.resolve_module_name(s, i),
        );

        // The overlaid failure list starts with the base attempt's list,
        // then the locator candidate's probes, in order.
        assert!(overlaid.resolved.is_some());
        assert!(overlaid.failed_lookup_locations.len() > base_only.failed_lookup_locations.len());
        assert_eq!(
            &overlaid.failed_lookup_locations[..base_only.failed_lookup_locations.len()],
            &base_only.failed_lookup_locations[..]
        );
        let tail = &overlaid.failed_lookup_locations[base_only.failed_lookup_locations.len()..];
        assert!(tail
            .iter()
            .all(|p| p.starts_with(root.join(".store/lodash-npm-4.17.21"))));
    }

    #[test]
    fn test_idempotent_under_unchanged_state() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        write(
            root,
            ".store/lodash-npm-4.17.21/node_modules/lodash/index.js",
            "",
        );

        let locator = locator_for(root, LODASH_MANIFEST);
        let resolver = PnpResolver::new(RealFs, Some(Box::new(locator)));
        let from = root.join("src/main.ts");

        let first = resolver.resolve_module_name("lodash", &from);
        let second = resolver.resolve_module_name("lodash", &from);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_locator_degrades_to_conventional() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");

        let resolver = PnpResolver::new(RealFs, None);
        let result = resolver.resolve_module_name("lodash", &root.join("src/main.ts"));
        assert!(result.resolved.is_none());
    }

    #[test]
    fn test_type_reference_directive_through_manifest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "");
        write(
            root,
            ".store/types-node/node_modules/@types/node/index.d.ts",
            "",
        );

        let manifest = r#"{
            "version": 1,
            "root": "my-app",
            "packages": [
                {
                    "name": "my-app",
                    "reference": "workspace:.",
                    "location": "./",
                    "dependencies": { "@types/node": "npm:20.0.0" }
                },
                {
                    "name": "@types/node",
                    "reference": "npm:20.0.0",
                    "location": "./.store/types-node/node_modules/@types/node/",
                    "dependencies": {}
                }
            ]
        }"#;

        let locator = locator_for(root, manifest);
        let resolver = PnpResolver::new(RealFs, Some(Box::new(locator)));

        let result =
            resolver.resolve_type_reference_directive("node", &root.join("src/main.ts"));
        let resolved = result.resolved.unwrap();
        assert!(resolved
            .resolved_file_name
            .ends_with("@types/node/index.d.ts"));
    }
}
