//! Per-file syntactic and semantic index.
//!
//! Each file is parsed in its own arena and lowered into a [`FileIndex`]:
//! an owned record of declarations, symbol occurrences, imports, exports and
//! member accesses. Nothing in here borrows from the AST, so the arena is
//! dropped as soon as the file has been indexed.

mod collect;
pub mod lib_members;

use std::fmt;
use std::path::Path;

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::oxc::{Allocator, Parser, SemanticBuilder, SourceType};
use crate::registry::FileId;
use crate::{GraphError, Result};

pub use collect::Collector;

/// Identity of one identifier occurrence: the file and the byte offset of
/// its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccurrenceKey {
    pub file: FileId,
    pub offset: u32,
}

impl OccurrenceKey {
    pub fn new(file: FileId, offset: u32) -> Self {
        Self { file, offset }
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.offset)
    }
}

/// What kind of entity a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Variable,
    Function,
    Class,
    Parameter,
    Interface,
    TypeAlias,
    TypeParameter,
    Enum,
    EnumMember,
    Namespace,
    /// Class property, method, accessor or constructor parameter property.
    Member,
    /// Interface or type-literal property/method signature.
    Signature,
    Import,
    /// Anonymous `export default <expr>`; never renamed, only traced.
    DefaultExport,
}

impl DeclKind {
    /// Named types keep their spelling unconditionally.
    pub fn is_type_name(self) -> bool {
        matches!(self, Self::Interface | Self::TypeAlias | Self::TypeParameter)
    }

    /// Structural member names share one project-wide namespace.
    pub fn is_member(self) -> bool {
        matches!(self, Self::Member | Self::Signature | Self::EnumMember)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DeclFlags: u16 {
        const EXPORTED       = 1 << 0;
        const DEFAULT_EXPORT = 1 << 1;
        /// `declare` or inside an ambient context.
        const AMBIENT        = 1 << 2;
        /// `private` modifier or `#name`.
        const PRIVATE        = 1 << 3;
        const TOP_LEVEL      = 1 << 4;
        /// Exported from a namespace body, so also reachable as `NS.name`.
        const MEMBER_ALIAS   = 1 << 5;
        /// Extends or implements something outside the project.
        const EXTERNAL_BASE  = 1 << 6;
        const FIXED          = 1 << 7;
        /// `#name` private member.
        const HASH_PRIVATE   = 1 << 8;
    }
}

/// A reference from one declaration to something its shape depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeEdge {
    /// A symbol of the same file, by local index.
    Symbol(u32),
    /// A declaration nested in this one (parameter, type-literal member).
    Nested(OccurrenceKey),
    /// A member name reached through a qualified access.
    MemberName(String),
}

/// One identifier-bearing declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub key: OccurrenceKey,
    pub name: String,
    pub kind: DeclKind,
    pub flags: DeclFlags,
    /// Local symbol index, when semantic analysis bound one.
    pub symbol: Option<u32>,
    pub members: Vec<OccurrenceKey>,
    /// Local symbols named in `extends`/`implements`.
    pub heritage: Vec<u32>,
    pub edges: Vec<TypeEdge>,
    /// Where the bound value comes from: roots of the type annotation and
    /// initializer, or of a function's return type and returned values.
    #[serde(default)]
    pub origins: Vec<MemberRoot>,
}

impl Declaration {
    pub fn is_private(&self) -> bool {
        self.flags.contains(DeclFlags::PRIVATE)
    }
}

/// A semantic symbol and every offset where it is spelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub occurrences: Vec<u32>,
    pub declarations: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportedName {
    /// `import { name }` or `import { name as local }`. `key` is the
    /// imported token; it equals the local key when not aliased and is
    /// `None` for string-literal names.
    Named { name: String, key: Option<OccurrenceKey> },
    Default,
    Namespace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBinding {
    pub local: OccurrenceKey,
    pub symbol: Option<u32>,
    pub imported: ImportedName,
    pub specifier: String,
    pub type_only: bool,
}

impl ImportBinding {
    pub fn is_aliased(&self) -> bool {
        match &self.imported {
            ImportedName::Named { key, .. } => *key != Some(self.local),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportTarget {
    /// A binding of this file.
    Local { symbol: u32, local_key: OccurrenceKey },
    /// An anonymous default export, traced through a pseudo declaration.
    Declaration(OccurrenceKey),
    /// `export { imported as name } from "specifier"`; `imported` is `*`
    /// for `export * as name`.
    ReExport {
        specifier: String,
        imported: String,
        local_key: Option<OccurrenceKey>,
    },
    /// `export * from "specifier"`.
    Star { specifier: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Exported name; `None` only for `export *`.
    pub name: Option<String>,
    /// Token spelling the exported name, when it is an identifier.
    pub name_key: Option<OccurrenceKey>,
    pub target: ExportTarget,
}

/// What a member access is rooted at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRoot {
    /// An unresolved global such as `document` or `JSON`, or a package
    /// named by an `import("pkg")` type.
    Global(String),
    /// A local symbol.
    Symbol(u32),
    /// `this`, literals, calls on unknown values.
    Other,
}

/// A member name used as a property access, object key or destructuring key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUse {
    pub key: OccurrenceKey,
    pub name: String,
    pub root: MemberRoot,
    /// The object is exactly the root identifier (`ns.name`).
    pub direct: bool,
}

/// Owned index of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIndex {
    pub file: FileId,
    pub is_module: bool,
    pub declarations: Vec<Declaration>,
    pub symbols: Vec<SymbolEntry>,
    pub imports: Vec<ImportBinding>,
    pub exports: Vec<ExportEntry>,
    pub member_uses: Vec<MemberUse>,
    /// Names that appear as string keys or string literal types.
    pub fixed_member_names: FxHashSet<String>,
    /// Offsets of capitalised JSX tag identifiers.
    pub jsx_tags: Vec<OccurrenceKey>,
    /// Global names referenced without a declaration in scope.
    pub unresolved: FxHashSet<String>,
    /// Static module specifiers, in source order.
    pub specifiers: Vec<String>,
    /// Modules reached through `import()` or `import("x").T` types.
    pub dynamic_imports: Vec<String>,
    #[serde(skip)]
    decl_by_key: FxHashMap<u32, u32>,
}

impl FileIndex {
    pub(crate) fn new(file: FileId) -> Self {
        Self {
            file,
            is_module: false,
            declarations: Vec::new(),
            symbols: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            member_uses: Vec::new(),
            fixed_member_names: FxHashSet::default(),
            jsx_tags: Vec::new(),
            unresolved: FxHashSet::default(),
            specifiers: Vec::new(),
            dynamic_imports: Vec::new(),
            decl_by_key: FxHashMap::default(),
        }
    }

    pub fn declaration_at(&self, offset: u32) -> Option<&Declaration> {
        self.decl_by_key
            .get(&offset)
            .map(|&idx| &self.declarations[idx as usize])
    }

    pub fn key(&self, offset: u32) -> OccurrenceKey {
        OccurrenceKey::new(self.file, offset)
    }

    pub fn import_by_local(&self, key: OccurrenceKey) -> Option<&ImportBinding> {
        self.imports.iter().find(|import| import.local == key)
    }

    pub fn import_of_symbol(&self, symbol: u32) -> Option<&ImportBinding> {
        self.imports
            .iter()
            .find(|import| import.symbol == Some(symbol))
    }

    pub(crate) fn push_declaration(&mut self, decl: Declaration) -> u32 {
        let idx = self.declarations.len() as u32;
        self.decl_by_key.insert(decl.key.offset, idx);
        self.declarations.push(decl);
        idx
    }

    pub(crate) fn decl_index(&self, offset: u32) -> Option<u32> {
        self.decl_by_key.get(&offset).copied()
    }
}

/// Parse `source` and lower it into a [`FileIndex`].
#[tracing::instrument(level = "trace", skip(source), fields(path = %path.display()))]
pub fn index_file(file: FileId, path: &Path, source: &str) -> Result<FileIndex> {
    let source_type =
        SourceType::from_path(path).map_err(|_| GraphError::UnsupportedFile(path.to_path_buf()))?;

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GraphError::Syntax {
            path: path.to_path_buf(),
            message,
        });
    }

    let semantic = SemanticBuilder::new().build(&parsed.program).semantic;
    let collector = Collector::new(file, source, semantic.scoping());
    collector
        .run(&parsed.program)
        .map_err(|construct| GraphError::Unsupported {
            path: path.to_path_buf(),
            construct,
        })
}
