//! Module specifier resolution.
//!
//! Only relative specifiers name project files. Bare specifiers and anything
//! that lands outside the source root are external. Resolution is purely
//! lexical plus existence checks through the [`SourceProvider`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::provider::SourceProvider;
use crate::registry::FileId;

/// Resolution order used when a specifier has no usable extension.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".d.ts", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
];

/// ESM output extensions written in TypeScript imports and the source
/// extensions they stand for.
const OUTPUT_TO_SOURCE: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx", ".d.ts"]),
    (".jsx", &[".tsx"]),
    (".mjs", &[".mts", ".d.mts"]),
    (".cjs", &[".cts", ".d.cts"]),
];

/// Where an import specifier points, at file granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file inside the source root.
    Local(PathBuf),
    /// A package, or a file outside the source root.
    External,
    /// A relative specifier that matched no file.
    Unresolved(PathBuf),
}

/// Where an import specifier points once files are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTarget {
    Project(FileId),
    External,
}

/// Resolves relative specifiers against the importing file.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into().clean(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Replace the extension search order. Entries may omit the leading dot.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref();
                if ext.starts_with('.') {
                    ext.to_string()
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        if !extensions.is_empty() {
            self.extensions = extensions;
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(
        &self,
        specifier: &str,
        from: &Path,
        provider: &dyn SourceProvider,
    ) -> Resolution {
        if !is_relative(specifier) {
            return Resolution::External;
        }

        let base = from.parent().unwrap_or(Path::new(""));
        let candidate = base.join(specifier).clean();
        if !candidate.starts_with(&self.root) {
            return Resolution::External;
        }

        match self.find_file(&candidate, provider) {
            Some(found) => Resolution::Local(found),
            None => Resolution::Unresolved(candidate),
        }
    }

    fn find_file(&self, candidate: &Path, provider: &dyn SourceProvider) -> Option<PathBuf> {
        if provider.is_file(candidate) && has_known_extension(candidate, &self.extensions) {
            return Some(candidate.to_path_buf());
        }

        if let Some(found) = try_source_for_output(candidate, provider) {
            return Some(found);
        }

        if let Some(found) = self.try_extensions(candidate, provider) {
            return Some(found);
        }

        self.try_index_files(candidate, provider)
    }

    fn try_extensions(&self, base: &Path, provider: &dyn SourceProvider) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| append_extension(base, ext))
            .find(|path| provider.is_file(path))
    }

    fn try_index_files(&self, dir: &Path, provider: &dyn SourceProvider) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("index{ext}")))
            .find(|path| provider.is_file(path))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn has_known_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// `./util.js` in TypeScript source refers to `./util.ts`.
fn try_source_for_output(candidate: &Path, provider: &dyn SourceProvider) -> Option<PathBuf> {
    let name = candidate.to_str()?;
    for (output, sources) in OUTPUT_TO_SOURCE {
        let Some(stem) = name.strip_suffix(output) else {
            continue;
        };
        for source in *sources {
            let path = PathBuf::from(format!("{stem}{source}"));
            if provider.is_file(&path) {
                return Some(path);
            }
        }
    }
    None
}

fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = base.as_os_str().to_os_string();
    raw.push(ext);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn provider() -> MemoryProvider {
        MemoryProvider::new()
            .with_file("/src/index.ts", "")
            .with_file("/src/util.ts", "")
            .with_file("/src/user.service.ts", "")
            .with_file("/src/lib/index.tsx", "")
            .with_file("/src/types.d.ts", "")
            .with_file("/outside/other.ts", "")
    }

    #[test]
    fn bare_specifiers_are_external() {
        let resolver = ModuleResolver::new("/src");
        let result = resolver.resolve("react", Path::new("/src/index.ts"), &provider());
        assert_eq!(result, Resolution::External);
    }

    #[test]
    fn tries_extensions_without_replacing_dotted_stems() {
        let resolver = ModuleResolver::new("/src");
        let p = provider();
        assert_eq!(
            resolver.resolve("./util", Path::new("/src/index.ts"), &p),
            Resolution::Local(PathBuf::from("/src/util.ts"))
        );
        assert_eq!(
            resolver.resolve("./user.service", Path::new("/src/index.ts"), &p),
            Resolution::Local(PathBuf::from("/src/user.service.ts"))
        );
    }

    #[test]
    fn maps_js_output_extension_to_source() {
        let resolver = ModuleResolver::new("/src");
        assert_eq!(
            resolver.resolve("./util.js", Path::new("/src/index.ts"), &provider()),
            Resolution::Local(PathBuf::from("/src/util.ts"))
        );
    }

    #[test]
    fn resolves_directory_index_and_declaration_files() {
        let resolver = ModuleResolver::new("/src");
        let p = provider();
        assert_eq!(
            resolver.resolve("./lib", Path::new("/src/index.ts"), &p),
            Resolution::Local(PathBuf::from("/src/lib/index.tsx"))
        );
        assert_eq!(
            resolver.resolve("../types", Path::new("/src/lib/index.tsx"), &p),
            Resolution::Local(PathBuf::from("/src/types.d.ts"))
        );
    }

    #[test]
    fn paths_outside_root_are_external() {
        let resolver = ModuleResolver::new("/src");
        assert_eq!(
            resolver.resolve("../outside/other", Path::new("/src/index.ts"), &provider()),
            Resolution::External
        );
    }

    #[test]
    fn missing_relative_file_is_unresolved() {
        let resolver = ModuleResolver::new("/src");
        assert_eq!(
            resolver.resolve("./missing", Path::new("/src/index.ts"), &provider()),
            Resolution::Unresolved(PathBuf::from("/src/missing"))
        );
    }

    #[test]
    fn custom_extension_order_accepts_bare_names() {
        let p = MemoryProvider::new()
            .with_file("/src/a.js", "")
            .with_file("/src/a.ts", "");
        let resolver = ModuleResolver::new("/src").with_extensions(["js", "ts"]);
        assert_eq!(
            resolver.resolve("./a", Path::new("/src/index.ts"), &p),
            Resolution::Local(PathBuf::from("/src/a.js"))
        );
    }
}
