//! Package specifier decomposition.
//!
//! Splits a request string into an optional loader-prefix chain, a package
//! name, and a remainder sub-path. Relative and absolute requests have no
//! package name. Decomposition never fails; components that are absent come
//! back empty.

/// A decomposed request string.
///
/// Examples:
/// - "lodash/fp" -> (None, "lodash", "/fp")
/// - "@scope/pkg/deep" -> (None, "@scope/pkg", "/deep")
/// - "!thread-loader!./worker" -> (Some("!thread-loader!"), "", "./worker")
/// - "./sibling" -> (None, "", "./sibling")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSpecifier<'a> {
    /// Leading `!`-delimited loader chain, including the trailing `!`.
    pub loader_prefixes: Option<&'a str>,
    /// Scoped or unscoped package name; empty for relative/absolute
    /// requests.
    pub package_name: &'a str,
    /// Everything after the package name, leading `/` included.
    pub remainder: &'a str,
}

/// Decompose a request string.
pub fn parse_specifier(specifier: &str) -> ParsedSpecifier<'_> {
    // A loader chain is a leading '!' running through the last '!' in the
    // string; a lone leading '!' with no closing '!' is not a chain.
    let (loader_prefixes, rest) = if specifier.starts_with('!') {
        match specifier.rfind('!') {
            Some(last) if last > 0 => (Some(&specifier[..=last]), &specifier[last + 1..]),
            _ => (None, specifier),
        }
    } else {
        (None, specifier)
    };

    let package_end = package_name_len(rest);

    ParsedSpecifier {
        loader_prefixes,
        package_name: &rest[..package_end],
        remainder: &rest[package_end..],
    }
}

/// Length of the package-name component at the start of `rest`, zero when
/// the request is relative or absolute.
fn package_name_len(rest: &str) -> usize {
    if rest.is_empty() || is_relative_or_absolute(rest) {
        return 0;
    }

    if rest.starts_with('@') {
        if let Some(scope_slash) = rest.find('/') {
            let after_scope = &rest[scope_slash + 1..];
            let name_len = after_scope.find('/').unwrap_or(after_scope.len());
            if name_len > 0 {
                return scope_slash + 1 + name_len;
            }
            // "@scope/" with an empty name segment: the scope alone is the
            // package name and the slash belongs to the remainder.
            return scope_slash;
        }
        return rest.len();
    }

    rest.find('/').unwrap_or(rest.len())
}

fn is_relative_or_absolute(rest: &str) -> bool {
    rest.starts_with('/') || rest.starts_with("./") || rest.starts_with("../")
}

/// The `@types` counterpart of a package name: scoped names drop the `@`
/// and turn `/` into `__`; unscoped names pass through unchanged.
///
/// `@scope/name` -> `scope__name`, so the types package is
/// `@types/scope__name`.
pub fn types_package_name(package_name: &str) -> String {
    match package_name.strip_prefix('@') {
        Some(scoped) => scoped.replace('/', "__"),
        None => package_name.to_string(),
    }
}
