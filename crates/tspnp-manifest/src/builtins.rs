//! Built-in module names.
//!
//! These names never map to an install location; a resolver either handles
//! them itself or treats them as shadowed when a package declares a
//! dependency with the same name.

/// Check if a name refers to a built-in runtime module.
pub fn is_builtin_module(name: &str) -> bool {
    matches!(
        name,
        "fs" | "path" | "http" | "https" | "os" | "process" | "events"
            | "url" | "crypto" | "util" | "stream" | "buffer"
            | "child_process" | "net" | "tls" | "dns" | "querystring"
            | "assert" | "zlib"
    )
}
