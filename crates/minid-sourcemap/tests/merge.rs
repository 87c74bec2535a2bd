//! Merging chained maps on disk.

use std::fs;
use std::path::Path;

use minid_sourcemap::{MergeError, SourceMapMerger};
use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use tempfile::TempDir;

fn write_map(path: &Path, file: &str, source: &str, tokens: &[(u32, u32, u32, u32, Option<&str>)]) {
    let mut builder = SourceMapBuilder::default();
    builder.set_file(file);
    let src = builder.set_source_and_content(source, "");
    for &(dst_line, dst_col, src_line, src_col, name) in tokens {
        let name = name.map(|name| builder.add_name(name));
        builder.add_token(dst_line, dst_col, src_line, src_col, Some(src), name);
    }
    fs::write(path, builder.into_sourcemap().to_json_string()).unwrap();
}

fn chain(root: &Path) {
    fs::write(root.join("orig.ts"), "// header\n\n    const alpha: number = 1;\n").unwrap();
    fs::write(root.join("mid.js"), "const alpha = 1;\n//# sourceMappingURL=mid.js.map\n").unwrap();
    write_map(
        &root.join("mid.js.map"),
        "mid.js",
        "orig.ts",
        &[(0, 0, 2, 4, None), (0, 6, 2, 10, Some("alpha"))],
    );
    fs::write(root.join("out.js"), "const a = 1;\n//# sourceMappingURL=out.js.map\n").unwrap();
    write_map(
        &root.join("out.js.map"),
        "out.js",
        "mid.js",
        &[(0, 0, 0, 0, None), (0, 6, 0, 6, Some("alpha"))],
    );
}

#[test]
fn composes_a_two_level_chain() {
    let temp = TempDir::new().unwrap();
    chain(temp.path());

    let summary = SourceMapMerger::new(["js"], false).merge(temp.path()).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.rewritten, 1);

    let json = fs::read_to_string(temp.path().join("out.js.map")).unwrap();
    let map = SourceMap::from_json_string(&json).unwrap();
    let sources: Vec<String> = map.get_sources().map(|s| s.to_string()).collect();
    assert_eq!(sources, vec!["orig.ts".to_string()]);

    let renamed = map
        .get_tokens()
        .find(|token| token.get_dst_col() == 6)
        .expect("token for the renamed identifier");
    assert_eq!(renamed.get_src_line(), 2);
    assert_eq!(renamed.get_src_col(), 10);
    let name = renamed.get_name_id().and_then(|id| map.get_name(id)).map(|n| n.to_string());
    assert_eq!(name.as_deref(), Some("alpha"));
}

#[test]
fn maps_without_upstream_are_left_alone() {
    let temp = TempDir::new().unwrap();
    chain(temp.path());
    let before = fs::read_to_string(temp.path().join("mid.js.map")).unwrap();

    SourceMapMerger::new([".map"], false).merge(temp.path()).unwrap();

    let after = fs::read_to_string(temp.path().join("mid.js.map")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn recursion_is_opt_in() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("nested");
    fs::create_dir_all(&nested).unwrap();
    chain(&nested);

    let flat = SourceMapMerger::new([".js"], false).merge(temp.path()).unwrap();
    assert_eq!(flat.scanned, 0);

    let deep = SourceMapMerger::new([".js"], true).merge(temp.path()).unwrap();
    assert_eq!(deep.scanned, 2);
    assert_eq!(deep.rewritten, 1);
}

#[test]
fn self_referencing_chains_terminate() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("loop.js"), "x();\n//# sourceMappingURL=loop.js.map\n").unwrap();
    write_map(&temp.path().join("loop.js.map"), "loop.js", "loop.js", &[(0, 0, 0, 0, None)]);

    let summary = SourceMapMerger::new([".js"], false).merge(temp.path());
    assert!(summary.is_ok());
}

#[test]
fn missing_root_is_reported() {
    let temp = TempDir::new().unwrap();
    let err = SourceMapMerger::new([".js"], false)
        .merge(temp.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, MergeError::NotADirectory(_)));
}
