//! Lexical path arithmetic for map `sources` entries.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

/// `path` expressed relative to the directory `base`. Both are cleaned
/// first; the result uses `..` to climb out of `base` when needed.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = path.clean();
    let base = base.clean();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let shared = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for part in &base_parts[shared..] {
        if !matches!(part, Component::CurDir) {
            out.push("..");
        }
    }
    for part in &path_parts[shared..] {
        out.push(part.as_os_str());
    }
    out
}

/// Render a path for a map's `sources` array: forward slashes only.
pub fn to_source_entry(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a `sources` entry against the map's directory and `sourceRoot`.
pub fn resolve_source(map_dir: &Path, source_root: Option<&str>, source: &str) -> PathBuf {
    let mut base = map_dir.to_path_buf();
    if let Some(root) = source_root.filter(|root| !root.is_empty()) {
        base.push(root);
    }
    base.join(source).clean()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_and_nested_paths() {
        assert_eq!(
            relative_path(Path::new("/out/lib/a.ts"), Path::new("/out/lib")),
            PathBuf::from("a.ts")
        );
        assert_eq!(
            relative_path(Path::new("/src/lib/a.ts"), Path::new("/out/lib")),
            PathBuf::from("../../src/lib/a.ts")
        );
    }

    #[test]
    fn source_root_is_applied_before_the_entry() {
        assert_eq!(
            resolve_source(Path::new("/out"), Some("../src"), "a.ts"),
            PathBuf::from("/src/a.ts")
        );
        assert_eq!(resolve_source(Path::new("/out"), Some(""), "a.ts"), PathBuf::from("/out/a.ts"));
    }

    #[test]
    fn source_entries_use_forward_slashes() {
        let path: PathBuf = ["..", "src", "a.ts"].iter().collect();
        assert_eq!(to_source_entry(&path), "../src/a.ts");
    }
}
