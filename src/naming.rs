//! Output naming for packaged images.
//!
//! Every output is re-encoded as PNG, so the source extension is swapped for
//! [`OUTPUT_EXTENSION`]. Directory components are kept verbatim: a dot in a
//! directory name is not an extension.
//!
//! - `"a/b.c.png"` → `"a/b.c.png"` (only the last extension is stripped)
//! - `"sprites/hero.jpg"` → `"sprites/hero.png"`
//! - `"a.b/c"` → `"a.b/c.png"` (no extension; the dot belongs to the directory)

/// Extension of every packaged output, without the dot.
pub const OUTPUT_EXTENSION: &str = "png";

/// Strip the file extension from a relative path, if it has one.
///
/// The last `.` only counts when it comes after the last path separator
/// (`/` or `\`).
pub fn strip_extension(path: &str) -> &str {
    let last_sep = path.rfind(['/', '\\']);
    match path.rfind('.') {
        Some(dot) if last_sep.is_none_or(|sep| dot > sep) => &path[..dot],
        _ => path,
    }
}

/// Output name for a source relative path.
pub fn output_name(path: &str) -> String {
    format!("{}.{}", strip_extension(path), OUTPUT_EXTENSION)
}
