//! Applying a rename plan to one file.
//!
//! The buffer is split at ascending substitution offsets; everything between
//! substitutions is copied unchanged. When a source map is requested, one
//! token per substitution maps the generated position back to the original
//! position and name. Columns are UTF-16 code units, as source map v3
//! consumers expect.

use std::path::Path;

use minid_sourcemap::append_mapping_url;
use minid_sourcemap::paths::{relative_path, to_source_entry};
use oxc_sourcemap::SourceMapBuilder;

use crate::plan::Substitution;

/// A rewritten file and its optional map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub content: String,
    /// Source map JSON.
    pub map: Option<String>,
}

/// Splice `substitutions` into `source`. Substitutions must be sorted by
/// offset and must not overlap.
pub fn apply(source: &str, substitutions: &[Substitution]) -> String {
    let grown: usize = substitutions.iter().map(|s| s.replacement.len()).sum();
    let mut out = String::with_capacity(source.len() + grown);
    let mut cursor = 0usize;
    for substitution in substitutions {
        let start = substitution.offset as usize;
        if start < cursor || substitution.end() > source.len() {
            tracing::warn!(offset = start, "substitution out of order or out of bounds, skipped");
            continue;
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&substitution.replacement);
        cursor = substitution.end();
    }
    out.push_str(&source[cursor..]);
    out
}

/// Line starts of a buffer, for offset to (line, UTF-16 column) lookups.
struct LineIndex<'s> {
    source: &'s str,
    starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    fn new(source: &'s str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let start = self.starts[line];
        let column = self.source[start..offset].encode_utf16().count();
        (line as u32, column as u32)
    }
}

fn utf16_len(text: &str) -> i64 {
    text.encode_utf16().count() as i64
}

/// Rewrite one file.
///
/// With `map_output` set to the path the rewritten file is written to, a
/// source map is produced whose `sources` entry is `source_path` relative to
/// the output's directory, and a `sourceMappingURL` comment naming
/// `<file>.map` is appended to the content.
pub fn emit_file(
    source: &str,
    substitutions: &[Substitution],
    source_path: &Path,
    map_output: Option<&Path>,
) -> EmittedFile {
    let mut content = apply(source, substitutions);
    let Some(output) = map_output else {
        return EmittedFile { content, map: None };
    };

    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_dir = output.parent().unwrap_or(Path::new(""));

    let mut builder = SourceMapBuilder::default();
    builder.set_file(&file_name);
    let source_entry = to_source_entry(&relative_path(source_path, out_dir));
    let source_id = builder.set_source_and_content(&source_entry, source);

    let lines = LineIndex::new(source);
    let mut current_line = u32::MAX;
    let mut delta = 0i64;
    for substitution in substitutions {
        let start = substitution.offset as usize;
        let Some(original) = source.get(start..substitution.end()) else {
            continue;
        };
        let (line, column) = lines.position(start);
        if line != current_line {
            current_line = line;
            delta = 0;
        }
        let generated = (i64::from(column) - delta).max(0) as u32;
        let name_id = builder.add_name(original);
        builder.add_token(line, generated, line, column, Some(source_id), Some(name_id));
        delta += utf16_len(original) - utf16_len(&substitution.replacement);
    }

    let map = builder.into_sourcemap().to_json_string();
    append_mapping_url(&mut content, &format!("{file_name}.map"));
    EmittedFile {
        content,
        map: Some(map),
    }
}
