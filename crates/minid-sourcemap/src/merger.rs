//! Composition of chained source maps.
//!
//! For every map reached from the output tree, each `sources` entry that is
//! itself a generated file with a map of its own is replaced by that map's
//! sources: every token is looked up in the upstream map at its original
//! position and re-pointed at the upstream original. Chains are resolved
//! recursively with memoisation; a cycle stops composition at the map that
//! closes it.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};
use walkdir::WalkDir;

use crate::error::{MergeError, Result};
use crate::link::mapping_url;
use crate::paths::{relative_path, resolve_source, to_source_entry};

/// Outcome of one [`SourceMapMerger::merge`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Files matching the extension filter.
    pub scanned: usize,
    /// Distinct maps reached.
    pub maps: usize,
    /// Maps written back with composed mappings.
    pub rewritten: usize,
}

#[derive(Debug)]
struct Resolved {
    map: SourceMap,
    /// Absolute path of every entry in `map`'s `sources`.
    sources: Vec<PathBuf>,
    changed: bool,
}

/// Walks an output tree and composes every chained source map it finds.
#[derive(Debug)]
pub struct SourceMapMerger {
    extensions: Vec<String>,
    recursive: bool,
    resolved: FxHashMap<PathBuf, Rc<Resolved>>,
    visiting: FxHashSet<PathBuf>,
    written: FxHashSet<PathBuf>,
}

impl SourceMapMerger {
    /// `extensions` are file-name suffixes such as `.js`, `.d.ts` or `.map`;
    /// a leading dot is added when missing.
    pub fn new<I, S>(extensions: I, recursive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
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
        Self {
            extensions,
            recursive,
            resolved: FxHashMap::default(),
            visiting: FxHashSet::default(),
            written: FxHashSet::default(),
        }
    }

    #[tracing::instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn merge(&mut self, root: impl AsRef<Path>) -> Result<MergeSummary> {
        let root = root.as_ref().clean();
        if !root.is_dir() {
            return Err(MergeError::NotADirectory(root));
        }

        let mut summary = MergeSummary::default();
        let mut walker = WalkDir::new(&root).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        for entry in walker.into_iter().filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }
            summary.scanned += 1;

            let Some(map_path) = self.map_for(entry.path())? else {
                continue;
            };
            if !map_path.is_file() {
                tracing::warn!(
                    file = %entry.path().display(),
                    map = %map_path.display(),
                    "linked source map does not exist"
                );
                continue;
            }

            let resolved = self.resolve(&map_path)?;
            if resolved.changed && self.written.insert(map_path.clone()) {
                fs::write(&map_path, resolved.map.to_json_string())
                    .map_err(|err| MergeError::io(&map_path, err))?;
                tracing::debug!(map = %map_path.display(), "composed source map written");
            }
        }

        summary.maps = self.resolved.len();
        summary.rewritten = self.written.len();
        tracing::info!(
            scanned = summary.scanned,
            maps = summary.maps,
            rewritten = summary.rewritten,
            "source maps merged"
        );
        Ok(summary)
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// The map describing `file`: the file itself for `.map`, otherwise its
    /// `sourceMappingURL` target.
    fn map_for(&self, file: &Path) -> Result<Option<PathBuf>> {
        if is_map_file(file) {
            return Ok(Some(file.clean()));
        }
        let content = fs::read_to_string(file).map_err(|err| MergeError::io(file, err))?;
        Ok(linked_map(file, &content))
    }

    fn resolve(&mut self, map_path: &Path) -> Result<Rc<Resolved>> {
        if let Some(done) = self.resolved.get(map_path) {
            return Ok(Rc::clone(done));
        }
        let (map, sources) = load_map(map_path)?;
        if !self.visiting.insert(map_path.to_path_buf()) {
            tracing::warn!(map = %map_path.display(), "source map chain cycle, composition stopped");
            return Ok(Rc::new(Resolved {
                map,
                sources,
                changed: false,
            }));
        }

        let mut upstream: Vec<Option<Rc<Resolved>>> = Vec::with_capacity(sources.len());
        for source in &sources {
            upstream.push(self.upstream_of(source)?);
        }

        let resolved = if upstream.iter().all(Option::is_none) {
            Resolved {
                map,
                sources,
                changed: false,
            }
        } else {
            let dir = map_path.parent().unwrap_or(Path::new("")).to_path_buf();
            compose(&dir, &map, &sources, &upstream)
        };

        self.visiting.remove(map_path);
        let resolved = Rc::new(resolved);
        self.resolved
            .insert(map_path.to_path_buf(), Rc::clone(&resolved));
        Ok(resolved)
    }

    fn upstream_of(&mut self, source: &Path) -> Result<Option<Rc<Resolved>>> {
        if !source.is_file() {
            return Ok(None);
        }
        let Ok(content) = fs::read_to_string(source) else {
            return Ok(None);
        };
        match linked_map(source, &content) {
            Some(map) if map.is_file() => self.resolve(&map).map(Some),
            _ => Ok(None),
        }
    }
}

fn is_map_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "map")
}

fn linked_map(file: &Path, content: &str) -> Option<PathBuf> {
    let url = mapping_url(content)?;
    let dir = file.parent().unwrap_or(Path::new(""));
    Some(dir.join(url).clean())
}

fn load_map(path: &Path) -> Result<(SourceMap, Vec<PathBuf>)> {
    let json = fs::read_to_string(path).map_err(|err| MergeError::io(path, err))?;
    let invalid = |message: String| MergeError::InvalidMap {
        path: path.to_path_buf(),
        message,
    };

    let raw: serde_json::Value = serde_json::from_str(&json).map_err(|err| invalid(err.to_string()))?;
    let source_root = raw.get("sourceRoot").and_then(|root| root.as_str());
    let map = SourceMap::from_json_string(&json).map_err(|err| invalid(format!("{err:?}")))?;

    let dir = path.parent().unwrap_or(Path::new(""));
    let sources = map
        .get_sources()
        .map(|source| resolve_source(dir, source_root, &source.to_string()))
        .collect();
    Ok((map, sources))
}

/// Re-point every token of `map` whose source has an upstream map.
fn compose(
    dir: &Path,
    map: &SourceMap,
    sources: &[PathBuf],
    upstream: &[Option<Rc<Resolved>>],
) -> Resolved {
    let mut builder = SourceMapBuilder::default();
    if let Some(file) = map.get_file() {
        builder.set_file(&file.to_string());
    }

    let mut source_ids: IndexMap<PathBuf, u32> = IndexMap::new();
    let mut source_id = |builder: &mut SourceMapBuilder, path: &Path, content: Option<String>| -> u32 {
        if let Some(&id) = source_ids.get(path) {
            return id;
        }
        let entry = to_source_entry(&relative_path(path, dir));
        let id = builder.set_source_and_content(&entry, content.as_deref().unwrap_or_default());
        source_ids.insert(path.to_path_buf(), id);
        id
    };

    let tables: Vec<_> = upstream
        .iter()
        .map(|up| up.as_ref().map(|up| up.map.generate_lookup_table()))
        .collect();

    let mut kept = 0usize;
    let mut dropped = 0usize;
    for token in map.get_tokens() {
        let name = token
            .get_name_id()
            .and_then(|id| map.get_name(id))
            .map(|name| name.to_string());
        let Some(src) = token.get_source_id() else {
            builder.add_token(
                token.get_dst_line(),
                token.get_dst_col(),
                token.get_src_line(),
                token.get_src_col(),
                None,
                None,
            );
            continue;
        };
        let index = src as usize;

        match (upstream.get(index).and_then(Option::as_ref), tables.get(index).and_then(Option::as_ref)) {
            (Some(up), Some(table)) => {
                let Some(original) = up.map.lookup_token(table, token.get_src_line(), token.get_src_col()) else {
                    dropped += 1;
                    continue;
                };
                let Some(up_src) = original.get_source_id() else {
                    dropped += 1;
                    continue;
                };
                let Some(up_path) = up.sources.get(up_src as usize) else {
                    dropped += 1;
                    continue;
                };
                let content = up.map.get_source_content(up_src).map(|c| c.to_string());
                let new_src = source_id(&mut builder, up_path, content);
                let up_name = original
                    .get_name_id()
                    .and_then(|id| up.map.get_name(id))
                    .map(|name| name.to_string());
                let name_id = up_name.or(name).map(|name| builder.add_name(&name));
                builder.add_token(
                    token.get_dst_line(),
                    token.get_dst_col(),
                    original.get_src_line(),
                    original.get_src_col(),
                    Some(new_src),
                    name_id,
                );
                kept += 1;
            }
            _ => {
                let Some(path) = sources.get(index) else {
                    continue;
                };
                let content = map.get_source_content(src).map(|c| c.to_string());
                let new_src = source_id(&mut builder, path, content);
                let name_id = name.map(|name| builder.add_name(&name));
                builder.add_token(
                    token.get_dst_line(),
                    token.get_dst_col(),
                    token.get_src_line(),
                    token.get_src_col(),
                    Some(new_src),
                    name_id,
                );
                kept += 1;
            }
        }
    }
    tracing::trace!(kept, dropped, "tokens composed");

    Resolved {
        map: builder.into_sourcemap(),
        sources: source_ids.into_keys().collect(),
        changed: true,
    }
}
