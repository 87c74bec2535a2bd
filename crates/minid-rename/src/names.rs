//! Candidate name generation.
//!
//! Names are drawn from a bijective numbering over [`ALPHABET`]. Ordinary
//! names start with a lower-case letter, `$` or `_`; JSX component names
//! start with an upper-case letter so they keep rendering as components.
//! Every later character uses the full alphabet, and shorter names always
//! come first.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

pub const ALPHABET: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyz$_ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const ORDINARY_FIRST: std::ops::Range<usize> = 10..38;
const COMPONENT_FIRST: std::ops::Range<usize> = 38..64;

/// Which first-character subsequence a name is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass {
    Ordinary,
    Component,
}

impl NameClass {
    fn first_chars(self) -> &'static [u8] {
        match self {
            Self::Ordinary => &ALPHABET[ORDINARY_FIRST],
            Self::Component => &ALPHABET[COMPONENT_FIRST],
        }
    }
}

/// The `n`th candidate of `class`.
pub fn candidate(n: u64, class: NameClass) -> String {
    let first = class.first_chars();
    let base = first.len() as u64;
    let mut out = String::with_capacity(4);
    out.push(first[(n % base) as usize] as char);

    let mut rest = n / base;
    while rest > 0 {
        rest -= 1;
        out.push(ALPHABET[(rest % 64) as usize] as char);
        rest /= 64;
    }
    out
}

/// Infinite candidate sequence for `class`.
pub fn candidates(class: NameClass) -> impl Iterator<Item = String> {
    (0u64..).map(move |n| candidate(n, class))
}

const RESERVED: &[&str] = &[
    // ECMAScript keywords and literals
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
    // Strict mode and contextual keywords
    "await", "yield", "let", "static", "implements", "interface", "package", "private",
    "protected", "public", "as", "async", "from", "get", "of", "set", "target", "meta",
    // Restricted or well-known globals
    "arguments", "eval", "undefined", "NaN", "Infinity", "globalThis", "require", "module",
    "exports",
    // TypeScript
    "abstract", "any", "asserts", "bigint", "boolean", "declare", "infer", "is", "keyof",
    "namespace", "never", "number", "object", "readonly", "satisfies", "string", "symbol",
    "type", "unique", "unknown", "accessor", "out", "override", "global", "constructor",
];

static RESERVED_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| RESERVED.iter().copied().collect());

pub fn is_reserved(name: &str) -> bool {
    RESERVED_SET.contains(name)
}
