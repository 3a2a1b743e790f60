//! Install manifest discovery.
//!
//! The manifest lives next to the project root; discovery walks parent
//! directories from a starting point until one contains it. Absence is not
//! an error here: the resolver simply degrades to conventional behavior.

use std::path::{Path, PathBuf};

use tspnp_manifest::MANIFEST_FILE_NAME;
use tspnp_resolver::ResolutionHost;

/// Find the nearest install manifest at or above `start`.
pub fn find_manifest<H: ResolutionHost>(host: &H, start: &Path) -> Option<PathBuf> {
    for directory in start.ancestors() {
        let candidate = directory.join(MANIFEST_FILE_NAME);
        if host.file_exists(&candidate) {
            return Some(candidate);
        }
    }
    None
}
