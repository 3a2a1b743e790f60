//! Import specifier extraction.
//!
//! A simplified line-based scanner that pulls import/export/require
//! specifiers out of TypeScript source together with their byte spans, so
//! diagnostics can point at the exact string. This is not a parser; it
//! covers the common forms:
//!
//! - `import x from '...'` / `export { y } from '...'`
//! - `import '...'` (side-effect imports)
//! - `import('...')` (dynamic imports)
//! - `require('...')`

/// One specifier found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub specifier: String,
    /// Byte offset of the specifier text (quotes excluded).
    pub start: usize,
    /// Byte offset one past the specifier text.
    pub end: usize,
}

/// Scan source text for import specifiers.
pub fn scan_imports(source: &str) -> Vec<ImportSpecifier> {
    let mut found = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        scan_line(line, offset, &mut found);
        offset += line.len();
    }
    found
}

fn scan_line(line: &str, base: usize, out: &mut Vec<ImportSpecifier>) {
    // Line comments end the scannable region of the line.
    let code = match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    };
    if code.trim_start().starts_with('*') {
        return;
    }

    let bytes = code.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' || b == b'"' {
            let Some(len) = code[i + 1..].find(b as char) else {
                return;
            };
            let inner = &code[i + 1..i + 1 + len];
            if !inner.is_empty() && is_import_context(code[..i].trim_end()) {
                out.push(ImportSpecifier {
                    specifier: inner.to_string(),
                    start: base + i + 1,
                    end: base + i + 1 + len,
                });
            }
            i += len + 2;
        } else {
            i += 1;
        }
    }
}

/// A quoted string names a module when the token before it is one of the
/// import forms.
fn is_import_context(before: &str) -> bool {
    before.ends_with("from")
        || before.ends_with("import")
        || before.ends_with("import(")
        || before.ends_with("require(")
}
