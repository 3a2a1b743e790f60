//! Module resolution for a TypeScript-style compiler, with Plug'n'Play
//! manifest fallback.
//!
//! The conventional resolver walks `node_modules` directories the way the
//! type checker expects. The overlay wraps it: when conventional resolution
//! fails for a bare package specifier, the install manifest is consulted to
//! locate the package on disk, and conventional resolution is re-run rooted
//! at that location, once for the package itself and once for its
//! `@types/` counterpart. Callers that construct a resolver without a
//! locator get plain conventional behavior.

pub mod host;
pub mod node;
pub mod overlay;
pub mod package_json;
pub mod result;
pub mod specifier;

pub use host::{RealFs, ResolutionHost};
pub use node::NodeResolver;
pub use overlay::{resolve_with_overlay, PnpResolver};
pub use package_json::{PackageExports, PackageJson, PackageJsonError};
pub use result::{
    Extension, ModuleResolution, Resolution, ResolutionResult, TypeReferenceResolution,
};
pub use specifier::{parse_specifier, types_package_name, ParsedSpecifier};
