//! Host filesystem abstraction.
//!
//! Every existence probe the resolver makes goes through this trait, so the
//! compiler embedding the resolver can route probes through its own virtual
//! file system.

use std::path::Path;

/// Existence probes supplied by the host environment.
pub trait ResolutionHost {
    fn file_exists(&self, path: &Path) -> bool;
    fn directory_exists(&self, path: &Path) -> bool;
}

/// Host backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl ResolutionHost for RealFs {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

impl<H: ResolutionHost + ?Sized> ResolutionHost for &H {
    fn file_exists(&self, path: &Path) -> bool {
        (**self).file_exists(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        (**self).directory_exists(path)
    }
}
