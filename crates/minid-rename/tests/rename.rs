//! End-to-end renaming of projects on disk.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use minid_graph::oxc::{Allocator, Parser, SourceType};
use minid_graph::{FileId, MemoryProvider, NativeProvider, RefFlags};
use minid_rename::{analyze, run, run_with, MemorySink, RenameOptions};
use oxc_sourcemap::SourceMap;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

fn project(root: &Path) {
    write(
        root,
        "src/index.ts",
        "import { computeTotal } from './math';\nimport { Basket } from './basket';\n\nexport interface Receipt { total: number; lines: number }\n\nexport function checkout(basket: Basket): Receipt {\n  const subtotal = computeTotal(basket.prices());\n  return { total: subtotal, lines: basket.prices().length };\n}\n",
    );
    write(
        root,
        "src/math.ts",
        "export function computeTotal(values: number[]): number {\n  let accumulator = 0;\n  for (const value of values) accumulator += value;\n  return accumulator;\n}\n",
    );
    write(
        root,
        "src/basket.ts",
        "export class Basket {\n  private ledger: number[] = [];\n  add(price: number) { this.ledger.push(price) }\n  prices(): number[] { return this.ledger }\n}\n",
    );
    write(root, "src/globals.d.ts", "declare const RELEASE: string;\n");
}

fn options(root: &Path) -> RenameOptions {
    RenameOptions::new(root.join("src"), root.join("out"), ["index.ts"]).with_obfuscate(true)
}

fn parses(path: &str, source: &str) -> bool {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap();
    Parser::new(&allocator, source, source_type).parse().errors.is_empty()
}

#[test]
fn mirrors_the_project_and_keeps_the_surface() {
    let temp = TempDir::new().unwrap();
    project(temp.path());

    let report = run(&options(temp.path())).unwrap();
    assert_eq!(report.files_rewritten, 3);
    assert_eq!(report.files_copied, 1);
    assert!(report.occurrences_substituted > 0);

    let out = temp.path().join("out");
    let index = read(&out, "index.ts");
    assert!(index.contains("export function checkout(basket: Basket): Receipt"));
    assert!(index.contains("total:"));
    assert!(!index.contains("subtotal"));

    let math = read(&out, "math.ts");
    assert!(!math.contains("accumulator"));
    assert!(parses("math.ts", &math));

    let basket = read(&out, "basket.ts");
    assert!(basket.contains("prices()"));
    assert!(basket.contains("add("));
    assert!(!basket.contains("ledger"));

    assert_eq!(read(&out, "globals.d.ts"), "declare const RELEASE: string;\n");
}

#[test]
fn scenario_a_imported_function_is_renamed_consistently() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/impl.ts", "export function funcA(n: number): number { return n * 2 }\n");
    write(
        root,
        "src/index.ts",
        "import { funcA } from './impl';\nexport function caller(v: number): number { return funcA(v) + funcA(1) }\n",
    );

    run(&options(root)).unwrap();
    let out = root.join("out");
    let implementation = read(&out, "impl.ts");
    let index = read(&out, "index.ts");
    assert!(!implementation.contains("funcA"));
    assert!(!index.contains("funcA"));
    assert!(index.contains("export function caller("));

    let renamed = implementation
        .strip_prefix("export function ")
        .and_then(|rest| rest.split('(').next())
        .unwrap()
        .to_string();
    assert!(index.starts_with(&format!("import {{ {renamed} }} from './impl';")));
    assert_eq!(index.matches(&format!("{renamed}(")).count(), 2);
}

#[test]
fn runs_are_byte_identical() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    project(first.path());
    project(second.path());

    run(&options(first.path()).with_source_map(true)).unwrap();
    run(&options(second.path()).with_source_map(true)).unwrap();

    for file in ["index.ts", "math.ts", "basket.ts", "index.ts.map"] {
        assert_eq!(
            read(&first.path().join("out"), file),
            read(&second.path().join("out"), file),
            "{file} differs between runs"
        );
    }
}

#[test]
fn text_outside_substitutions_is_unchanged() {
    let temp = TempDir::new().unwrap();
    project(temp.path());
    let opts = options(temp.path());
    let analysis = analyze(&opts, &NativeProvider).unwrap();

    for file in analysis.project.registry.rewritable() {
        let output = minid_rename::apply(&file.source, analysis.plan.for_file(file.id));
        assert!(parses(&file.relative.to_string_lossy(), &output));

        let mut cursor_in = 0usize;
        let mut cursor_out = 0usize;
        for substitution in analysis.plan.for_file(file.id) {
            let start = substitution.offset as usize;
            let gap = &file.source[cursor_in..start];
            assert_eq!(&output[cursor_out..cursor_out + gap.len()], gap);
            cursor_out += gap.len() + substitution.replacement.len();
            cursor_in = substitution.end();
        }
        assert_eq!(&output[cursor_out..], &file.source[cursor_in..]);
    }
}

#[test]
fn names_never_collide_within_a_file_or_across_members() {
    let temp = TempDir::new().unwrap();
    project(temp.path());
    let analysis = analyze(&options(temp.path()), &NativeProvider).unwrap();
    let graph = &analysis.graph;

    let mut per_file: HashMap<FileId, HashMap<String, (usize, bool)>> = HashMap::new();
    let mut members: HashMap<String, usize> = HashMap::new();
    for root in graph.roots() {
        let node = graph.node(root);
        let renamed = analysis.allocation.name_of(root);
        let name = renamed
            .map(str::to_string)
            .unwrap_or_else(|| node.name.trim_start_matches('#').to_string());
        let files: HashSet<FileId> = node.occurrences.iter().map(|o| o.key.file).collect();
        for file in files {
            let entry = per_file.entry(file).or_default().entry(name.clone()).or_default();
            entry.0 += 1;
            entry.1 |= renamed.is_some();
        }
        if node.flags.contains(RefFlags::SIGNATURE) && renamed.is_some() {
            *members.entry(name).or_default() += 1;
        }
    }

    for (file, names) in per_file {
        for (name, (count, renamed)) in names {
            if renamed {
                assert_eq!(count, 1, "{name} is used by {count} classes in {file}");
            }
        }
    }
    for (name, count) in members {
        assert_eq!(count, 1, "member name {name} allocated {count} times");
    }
}

#[test]
fn scenario_d_source_map_columns_track_the_line_delta() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/index.ts",
        "const internalValue = 40;\nexport const answer: number = internalValue + internalValue;\n",
    );

    run(&options(root).with_source_map(true)).unwrap();
    let out = root.join("out");
    let content = read(&out, "index.ts");
    assert_eq!(
        content,
        "const a = 40;\nexport const answer: number = a + a;\n//# sourceMappingURL=index.ts.map\n"
    );

    let map = SourceMap::from_json_string(&read(&out, "index.ts.map")).unwrap();
    let tokens: Vec<(u32, u32, u32, u32, Option<String>)> = map
        .get_tokens()
        .map(|t| {
            let name = t.get_name_id().and_then(|id| map.get_name(id)).map(|n| n.to_string());
            (t.get_dst_line(), t.get_dst_col(), t.get_src_line(), t.get_src_col(), name)
        })
        .collect();
    let name = Some("internalValue".to_string());
    assert_eq!(
        tokens,
        vec![
            (0, 6, 0, 6, name.clone()),
            (1, 30, 1, 30, name.clone()),
            (1, 34, 1, 46, name),
        ]
    );
    let sources: Vec<String> = map.get_sources().map(|s| s.to_string()).collect();
    assert_eq!(sources, vec!["../src/index.ts".to_string()]);
}

#[test]
fn lexical_mode_shares_names_between_same_spelled_locals() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/a.ts", "export function first(): number { const counter = 1; return counter }\n");
    write(
        root,
        "src/index.ts",
        "import { first } from './a';\nexport function second(): number { const counter = first(); return counter }\n",
    );
    let opts = RenameOptions::new(root.join("src"), root.join("out"), ["index.ts"]);
    let report = run(&opts).unwrap();
    assert_eq!(report.classes_renamed, 2);

    let out = root.join("out");
    assert!(read(&out, "a.ts").contains("const a = 1; return a"));
    assert!(read(&out, "index.ts").contains("const a = b(); return a"));
}

/// Rename an in-memory project rooted at `/src` with `index.ts` as interface.
fn rename_in_memory(files: &[(&str, &str)], obfuscate: bool) -> MemorySink {
    let mut provider = MemoryProvider::new();
    for (path, source) in files {
        provider.insert(*path, *source);
    }
    let options = RenameOptions::new("/src", "/out", ["index.ts"]).with_obfuscate(obfuscate);
    let mut sink = MemorySink::new();
    run_with(&options, &provider, &mut sink).unwrap();
    sink
}

fn rewritten(sink: &MemorySink, relative: &str) -> String {
    sink.get(relative).unwrap().content.clone()
}

#[test]
fn members_of_runtime_values_keep_their_names() {
    let source = "class Route { pathname = ''; hostname = '' }\nconst current = new Route();\nexport function describe(s: string): string {\n  const u = new URL(s);\n  return u.pathname + u.hostname + current.pathname;\n}\n";
    for obfuscate in [false, true] {
        let out = rewritten(&rename_in_memory(&[("/src/index.ts", source)], obfuscate), "index.ts");
        assert!(out.contains("class "), "{out}");
        assert!(out.contains("{ pathname = ''; hostname = '' }"), "{out}");
        assert!(out.contains(" = new URL(s);"), "{out}");
        assert_eq!(out.matches(".pathname").count(), 2, "{out}");
        assert_eq!(out.matches(".hostname").count(), 1, "{out}");
        assert!(!out.contains("current"), "{out}");
    }
}

#[test]
fn members_of_lib_typed_parameters_keep_their_names() {
    let source = "class Keys { shiftKey = false; repeats = 0 }\nconst keys = new Keys();\nfunction onKey(e: KeyboardEvent): boolean { return e.shiftKey || keys.shiftKey || keys.repeats > 1 }\nexport function install(): void { window.onkeydown = onKey }\n";
    for obfuscate in [false, true] {
        let out = rewritten(&rename_in_memory(&[("/src/index.ts", source)], obfuscate), "index.ts");
        assert!(out.contains(": KeyboardEvent): boolean { return "), "{out}");
        assert_eq!(out.matches("shiftKey").count(), 3, "{out}");
        assert!(!out.contains("repeats"), "{out}");
        assert!(!out.contains("onKey"), "{out}");
    }
}

#[test]
fn members_of_externally_typed_parameters_keep_their_names() {
    let source = "import type { Server } from 'http';\nclass Gate { listening = false; opened = 0 }\nconst gate = new Gate();\nfunction up(s: Server): boolean { return s.listening && gate.listening && gate.opened > 0 }\nexport function check(server: Server): boolean { return up(server) }\n";
    for obfuscate in [false, true] {
        let out = rewritten(&rename_in_memory(&[("/src/index.ts", source)], obfuscate), "index.ts");
        assert!(out.starts_with("import type { Server } from 'http';\n"), "{out}");
        assert_eq!(out.matches("listening").count(), 3, "{out}");
        assert!(!out.contains("gate"), "{out}");
        assert!(!out.contains("opened"), "{out}");
    }
}

#[test]
fn lib_side_accesses_are_byte_identical_when_a_project_class_shares_the_spelling() {
    let source = "class Toggle { altKey = false; priority = 0; weight = 1 }\nconst toggle = new Toggle();\ndocument.addEventListener('keyup', (event) => { toggle.altKey = event.altKey });\nconst init: RequestInit = { priority: 'high' };\nexport function total(): number { return toggle.weight + (init.priority === 'high' ? 1 : 0) }\n";
    let out = rewritten(&rename_in_memory(&[("/src/index.ts", source)], true), "index.ts");
    assert!(out.contains("document.addEventListener('keyup', ("), "{out}");
    assert!(out.contains(".altKey = "), "{out}");
    assert!(out.contains(".altKey });"), "{out}");
    assert!(out.contains(": RequestInit = { priority: 'high' };"), "{out}");
    assert!(out.contains("altKey = false; priority = 0;"), "{out}");
    assert!(!out.contains("weight"), "{out}");
}

#[test]
fn default_and_namespace_import_bindings_keep_their_names() {
    let sink = rename_in_memory(
        &[
            (
                "/src/index.ts",
                "import * as shapes from './shapes';\nimport Canvas from './canvas';\nexport function paint(): number { return shapes.area(2) + new Canvas().size }\n",
            ),
            ("/src/shapes.ts", "export function area(side: number): number { return side * side }\n"),
            ("/src/canvas.ts", "export default class Canvas { size = 1 }\n"),
        ],
        true,
    );
    let index = rewritten(&sink, "index.ts");
    assert!(index.starts_with("import * as shapes from './shapes';\nimport Canvas from './canvas';\n"), "{index}");
    assert!(index.contains(" + new Canvas().size"), "{index}");

    let area = rewritten(&sink, "shapes.ts")
        .strip_prefix("export function ")
        .and_then(|rest| rest.split('(').next())
        .unwrap()
        .to_string();
    assert!(index.contains(&format!("return shapes.{area}(2)")), "{index}");
}
