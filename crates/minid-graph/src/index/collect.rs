//! AST visitor that lowers one parsed file into a [`FileIndex`].
//!
//! Symbol identity comes from `oxc_semantic`; everything the semantic model
//! does not know about (member names, export lists, type reachability) is
//! gathered here while walking the tree.
//!
//! Two stacks drive attribution:
//!
//! - **owners**: the declaration whose public shape the current subtree
//!   contributes to. Function bodies push a barrier, except that `return`
//!   expressions of functions without a declared return type are attributed
//!   back to the function.
//! - **containers**: the declaration that owns member declarations (classes,
//!   interfaces, enums, namespaces). Type literals push `None` so their
//!   members become nested edges of the current owner.

use oxc_ast::ast::{
    AccessorProperty, ArrowFunctionExpression, AssignmentTargetPropertyIdentifier,
    AssignmentTargetPropertyProperty, BindingIdentifier, BindingPattern, BindingPatternKind,
    BindingProperty, CallExpression, ChainElement, Class, ClassType, ComputedMemberExpression,
    Declaration as AstDeclaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, FormalParameter, Function,
    FunctionBody, FunctionType, IdentifierReference, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, JSXAttributeItem, JSXAttributeName,
    JSXClosingElement, JSXElementName, JSXMemberExpression, JSXMemberExpressionObject,
    JSXOpeningElement, MethodDefinition, MethodDefinitionKind, ModuleExportName, NewExpression,
    ObjectProperty, PrivateFieldExpression, PrivateInExpression, Program, PropertyDefinition,
    PropertyKey, ReturnStatement, Statement, StaticMemberExpression, TSAccessibility,
    TSEnumDeclaration, TSEnumMember, TSEnumMemberName, TSExportAssignment, TSGlobalDeclaration,
    TSImportEqualsDeclaration,
    TSImportType, TSInterfaceDeclaration, TSLiteral, TSLiteralType, TSMethodSignature,
    TSModuleDeclaration, TSModuleDeclarationName, TSModuleReference, TSPropertySignature,
    TSQualifiedName, TSType, TSTypeAliasDeclaration, TSTypeLiteral, TSTypeName, TSTypeParameter,
    VariableDeclaration, VariableDeclarator, WithStatement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::{ScopeFlags, Scoping, SymbolFlags, SymbolId};
use oxc_span::GetSpan;
use rustc_hash::FxHashMap;

use super::{
    DeclFlags, DeclKind, Declaration, ExportEntry, ExportTarget, FileIndex, ImportBinding,
    ImportedName, MemberRoot, MemberUse, OccurrenceKey, SymbolEntry, TypeEdge,
};
use crate::registry::FileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Decl(u32),
    Barrier,
}

/// What a `return` inside the current function body feeds.
#[derive(Debug, Clone, Copy)]
struct ReturnSlot {
    /// Owner of unannotated return values.
    owner: Option<Owner>,
    /// Declaration whose value the function produces.
    value_of: Option<u32>,
    annotated: bool,
}

/// Built-in generic types whose own members are all runtime names; values
/// typed with them are described by their type arguments.
const CONTAINER_TYPES: &[&str] = &[
    "Array", "ReadonlyArray", "Promise", "PromiseLike", "Awaited", "Partial",
    "Required", "Readonly", "Record", "Pick", "Omit", "NonNullable", "Map",
    "ReadonlyMap", "Set", "ReadonlySet",
];

/// Walks one program and produces its [`FileIndex`].
pub struct Collector<'s> {
    scoping: &'s Scoping,
    source: &'s str,
    index: FileIndex,
    symbol_ids: FxHashMap<SymbolId, u32>,
    decl_of_symbol: FxHashMap<u32, u32>,
    owners: Vec<Owner>,
    returns: Vec<ReturnSlot>,
    /// Variable whose initializer is the function about to be visited.
    init_target: Option<u32>,
    /// Literal root for the next function body, when it is a returned value.
    body_root: Option<MemberRoot>,
    containers: Vec<Option<u32>>,
    literal_roots: Vec<MemberRoot>,
    pattern_roots: Vec<(MemberRoot, bool)>,
    ambient_depth: u32,
    namespace_depth: u32,
    exported_symbols: Vec<u32>,
    unsupported: Option<String>,
}

impl<'s> Collector<'s> {
    pub fn new(file: FileId, source: &'s str, scoping: &'s Scoping) -> Self {
        Self {
            scoping,
            source,
            index: FileIndex::new(file),
            symbol_ids: FxHashMap::default(),
            decl_of_symbol: FxHashMap::default(),
            owners: Vec::new(),
            returns: Vec::new(),
            init_target: None,
            body_root: None,
            containers: Vec::new(),
            literal_roots: Vec::new(),
            pattern_roots: Vec::new(),
            ambient_depth: 0,
            namespace_depth: 0,
            exported_symbols: Vec::new(),
            unsupported: None,
        }
    }

    /// Index `program`. The error carries a description of the first
    /// construct that cannot be renamed safely.
    pub fn run(mut self, program: &Program<'_>) -> Result<FileIndex, String> {
        self.index.is_module = program.body.iter().any(is_module_statement);
        self.visit_program(program);
        if let Some(construct) = self.unsupported.take() {
            return Err(construct);
        }
        self.finish();
        Ok(self.index)
    }

    fn finish(&mut self) {
        for sym in std::mem::take(&mut self.exported_symbols) {
            let decls = self.index.symbols[sym as usize].declarations.clone();
            for decl in decls {
                self.index.declarations[decl as usize].flags |= DeclFlags::EXPORTED;
            }
        }

        // Enum members are not always bound as symbols; attach orphaned
        // references with the same spelling.
        for sym in 0..self.index.symbols.len() {
            if !self.index.symbols[sym].declarations.is_empty() {
                continue;
            }
            let name = self.index.symbols[sym].name.clone();
            let orphan = self.index.declarations.iter().position(|decl| {
                decl.kind == DeclKind::EnumMember && decl.symbol.is_none() && decl.name == name
            });
            if let Some(decl) = orphan {
                let offset = self.index.declarations[decl].key.offset;
                self.index.declarations[decl].symbol = Some(sym as u32);
                let entry = &mut self.index.symbols[sym];
                entry.declarations.push(decl as u32);
                if !entry.occurrences.contains(&offset) {
                    entry.occurrences.push(offset);
                }
            }
        }

        let unresolved = &self.index.unresolved;
        for decl in &mut self.index.declarations {
            if decl.kind == DeclKind::EnumMember && unresolved.contains(&decl.name) {
                decl.flags |= DeclFlags::FIXED;
            }
        }

        for entry in &mut self.index.symbols {
            entry.occurrences.sort_unstable();
            entry.occurrences.dedup();
        }
    }

    fn key(&self, offset: u32) -> OccurrenceKey {
        self.index.key(offset)
    }

    fn symbol_index(&mut self, id: SymbolId, name: &str) -> u32 {
        if let Some(&idx) = self.symbol_ids.get(&id) {
            return idx;
        }
        let idx = self.index.symbols.len() as u32;
        self.index.symbols.push(SymbolEntry {
            name: name.to_string(),
            ..SymbolEntry::default()
        });
        self.symbol_ids.insert(id, idx);
        idx
    }

    fn reference_symbol(&mut self, ident: &IdentifierReference<'_>) -> Option<u32> {
        let reference = ident.reference_id.get()?;
        let symbol = self.scoping.get_reference(reference).symbol_id()?;
        Some(self.symbol_index(symbol, &ident.name))
    }

    /// Get or create the declaration bound by `ident`. The first call for a
    /// symbol decides its kind.
    fn declare(&mut self, ident: &BindingIdentifier<'_>, hint: Option<DeclKind>) -> Option<u32> {
        let symbol_id = ident.symbol_id.get()?;
        let sym = self.symbol_index(symbol_id, &ident.name);
        if let Some(&decl) = self.decl_of_symbol.get(&sym) {
            return Some(decl);
        }
        if let Some(existing) = self.index.decl_index(ident.span.start) {
            return Some(existing);
        }

        let kind = hint.unwrap_or_else(|| kind_from_flags(self.scoping.symbol_flags(symbol_id)));
        let mut flags = DeclFlags::empty();
        if self.scoping.symbol_scope_id(symbol_id) == self.scoping.root_scope_id() {
            flags |= DeclFlags::TOP_LEVEL;
        }
        if self.ambient_depth > 0 {
            flags |= DeclFlags::AMBIENT;
        }

        let decl = self.index.push_declaration(Declaration {
            key: self.key(ident.span.start),
            name: ident.name.to_string(),
            kind,
            flags,
            symbol: Some(sym),
            members: Vec::new(),
            heritage: Vec::new(),
            edges: Vec::new(),
            origins: Vec::new(),
        });
        self.index.symbols[sym as usize].declarations.push(decl);
        self.decl_of_symbol.insert(sym, decl);
        Some(decl)
    }

    /// Create a member declaration from a property key. Computed keys and
    /// numeric keys are not members; string keys pin their name instead.
    fn declare_member(
        &mut self,
        key: &PropertyKey<'_>,
        computed: bool,
        kind: DeclKind,
        mut flags: DeclFlags,
    ) -> Option<u32> {
        if computed {
            if let Some(name) = string_key(key) {
                self.index.fixed_member_names.insert(name);
            }
            return None;
        }
        let (offset, name) = match key {
            PropertyKey::StaticIdentifier(id) => (id.span.start, id.name.to_string()),
            PropertyKey::PrivateIdentifier(id) => {
                flags |= DeclFlags::PRIVATE | DeclFlags::HASH_PRIVATE;
                (id.span.start, format!("#{}", id.name))
            }
            PropertyKey::StringLiteral(lit) => {
                self.index.fixed_member_names.insert(lit.value.to_string());
                return None;
            }
            _ => return None,
        };
        if let Some(existing) = self.index.decl_index(offset) {
            return Some(existing);
        }
        if self.ambient_depth > 0 {
            flags |= DeclFlags::AMBIENT;
        }

        let key = self.key(offset);
        let decl = self.index.push_declaration(Declaration {
            key,
            name,
            kind,
            flags,
            symbol: None,
            members: Vec::new(),
            heritage: Vec::new(),
            edges: Vec::new(),
            origins: Vec::new(),
        });
        self.attach_member(key);
        Some(decl)
    }

    fn attach_member(&mut self, key: OccurrenceKey) {
        match self.containers.last().copied().flatten() {
            Some(container) => self.index.declarations[container as usize].members.push(key),
            None => self.add_edge(TypeEdge::Nested(key)),
        }
    }

    fn owner(&self) -> Owner {
        self.owners.last().copied().unwrap_or(Owner::Barrier)
    }

    fn add_edge(&mut self, edge: TypeEdge) {
        if let Owner::Decl(decl) = self.owner() {
            let edges = &mut self.index.declarations[decl as usize].edges;
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    fn set_flags(&mut self, decl: u32, flags: DeclFlags) {
        self.index.declarations[decl as usize].flags |= flags;
    }

    fn push_member_use(&mut self, offset: u32, name: &str, root: MemberRoot, direct: bool) {
        self.index.member_uses.push(MemberUse {
            key: self.key(offset),
            name: name.to_string(),
            root,
            direct,
        });
    }

    fn resolve_root(&mut self, ident: &IdentifierReference<'_>) -> MemberRoot {
        match self.reference_symbol(ident) {
            Some(sym) => MemberRoot::Symbol(sym),
            None => MemberRoot::Global(ident.name.to_string()),
        }
    }

    /// Follow calls, member accesses and type assertions down to the
    /// leftmost value.
    fn root_of(&mut self, expr: &Expression<'_>) -> MemberRoot {
        let mut current = expr;
        loop {
            current = match current {
                Expression::Identifier(ident) => return self.resolve_root(ident),
                Expression::CallExpression(call) => &call.callee,
                Expression::NewExpression(new) => &new.callee,
                Expression::ParenthesizedExpression(inner) => &inner.expression,
                Expression::AwaitExpression(inner) => &inner.argument,
                Expression::TSAsExpression(inner) => &inner.expression,
                Expression::TSSatisfiesExpression(inner) => &inner.expression,
                Expression::TSNonNullExpression(inner) => &inner.expression,
                Expression::ChainExpression(chain) => match &chain.expression {
                    ChainElement::CallExpression(call) => &call.callee,
                    ChainElement::TSNonNullExpression(inner) => &inner.expression,
                    element => match element.as_member_expression() {
                        Some(member) => member.object(),
                        None => return MemberRoot::Other,
                    },
                },
                other => match other.as_member_expression() {
                    Some(member) => member.object(),
                    None => return MemberRoot::Other,
                },
            };
        }
    }

    fn type_name_root(&mut self, name: &TSTypeName<'_>) -> MemberRoot {
        match name {
            TSTypeName::IdentifierReference(ident) => self.resolve_root(ident),
            TSTypeName::QualifiedName(qualified) => self.type_name_root(&qualified.left),
            _ => MemberRoot::Other,
        }
    }

    /// Roots named by a type annotation. Unions, arrays and built-in
    /// containers contribute their constituents.
    fn type_roots(&mut self, ty: &TSType<'_>, out: &mut Vec<MemberRoot>) {
        match ty {
            TSType::TSTypeReference(reference) => {
                let root = self.type_name_root(&reference.type_name);
                let container =
                    matches!(&root, MemberRoot::Global(name) if CONTAINER_TYPES.contains(&name.as_str()));
                match &reference.type_arguments {
                    Some(arguments) if container => {
                        for argument in &arguments.params {
                            self.type_roots(argument, out);
                        }
                    }
                    _ => out.push(root),
                }
            }
            TSType::TSUnionType(union) => {
                for member in &union.types {
                    self.type_roots(member, out);
                }
            }
            TSType::TSIntersectionType(intersection) => {
                for member in &intersection.types {
                    self.type_roots(member, out);
                }
            }
            TSType::TSArrayType(array) => self.type_roots(&array.element_type, out),
            TSType::TSTypeOperatorType(operator) => self.type_roots(&operator.type_annotation, out),
            TSType::TSParenthesizedType(inner) => self.type_roots(&inner.type_annotation, out),
            TSType::TSIndexedAccessType(access) => self.type_roots(&access.object_type, out),
            TSType::TSTypeQuery(query) => {
                if let Some(name) = query.expr_name.as_ts_type_name() {
                    out.push(self.type_name_root(name));
                }
            }
            TSType::TSImportType(import) => {
                let text = self
                    .source
                    .get(import.span.start as usize..import.span.end as usize)
                    .unwrap_or_default();
                if let Some(specifier) = quoted_specifier(text).filter(|s| !s.starts_with('.')) {
                    out.push(MemberRoot::Global(specifier.to_string()));
                }
            }
            _ => {}
        }
    }

    fn annotation_roots(&mut self, pattern: &BindingPattern<'_>) -> Vec<MemberRoot> {
        let annotation = match &pattern.kind {
            BindingPatternKind::AssignmentPattern(assignment) if pattern.type_annotation.is_none() => {
                &assignment.left.type_annotation
            }
            _ => &pattern.type_annotation,
        };
        let mut roots = Vec::new();
        if let Some(annotation) = annotation {
            self.type_roots(&annotation.type_annotation, &mut roots);
        }
        roots
    }

    /// Roots of the value `expr` evaluates to. Type assertions name the
    /// asserted type; function values are described by what they return.
    fn value_roots(&mut self, expr: &Expression<'_>, out: &mut Vec<MemberRoot>) {
        match expr {
            Expression::TSAsExpression(inner) => self.type_roots(&inner.type_annotation, out),
            Expression::TSTypeAssertion(inner) => self.type_roots(&inner.type_annotation, out),
            Expression::ParenthesizedExpression(inner) => self.value_roots(&inner.expression, out),
            Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => {}
            other => out.push(self.root_of(other)),
        }
    }

    fn add_origins(&mut self, decl: u32, roots: Vec<MemberRoot>) {
        let origins = &mut self.index.declarations[decl as usize].origins;
        for root in roots {
            if root != MemberRoot::Other && !origins.contains(&root) {
                origins.push(root);
            }
        }
    }

    fn symbol_root(&self, decl: u32) -> MemberRoot {
        match self.index.declarations[decl as usize].symbol {
            Some(symbol) => MemberRoot::Symbol(symbol),
            None => MemberRoot::Other,
        }
    }

    /// Root describing the argument slots of a callee. Functions and
    /// classes of this file declare their own parameter types.
    fn slot_root(&self, callee: MemberRoot) -> MemberRoot {
        if let MemberRoot::Symbol(symbol) = callee {
            let declared_here = self.decl_of_symbol.get(&symbol).is_some_and(|&decl| {
                matches!(
                    self.index.declarations[decl as usize].kind,
                    DeclKind::Function | DeclKind::Class
                )
            });
            if declared_here {
                return MemberRoot::Other;
            }
        }
        callee
    }

    /// Root of the slot a function expression is passed into, for
    /// parameters that carry no annotation of their own.
    fn contextual_root(&self) -> MemberRoot {
        self.literal_roots.last().cloned().unwrap_or(MemberRoot::Other)
    }

    fn record_heritage_expression(&mut self, decl: u32, expr: &Expression<'_>) {
        let base = match expr {
            Expression::Identifier(ident) => self.reference_symbol(ident),
            _ => None,
        };
        self.record_heritage(decl, base);
    }

    fn record_heritage_type_name(&mut self, decl: u32, name: &TSTypeName<'_>) {
        let base = match name {
            TSTypeName::IdentifierReference(ident) => self.reference_symbol(ident),
            _ => None,
        };
        self.record_heritage(decl, base);
    }

    fn record_heritage(&mut self, decl: u32, base: Option<u32>) {
        match base {
            Some(sym) => self.index.declarations[decl as usize].heritage.push(sym),
            None => self.set_flags(decl, DeclFlags::EXTERNAL_BASE),
        }
    }

    fn add_import(
        &mut self,
        local: &BindingIdentifier<'_>,
        imported: ImportedName,
        specifier: &str,
        type_only: bool,
    ) {
        let decl = self.declare(local, Some(DeclKind::Import));
        let symbol = decl.and_then(|decl| self.index.declarations[decl as usize].symbol);
        self.index.imports.push(ImportBinding {
            local: self.key(local.span.start),
            symbol,
            imported,
            specifier: specifier.to_string(),
            type_only,
        });
    }

    fn module_export_key(&self, name: &ModuleExportName<'_>) -> Option<OccurrenceKey> {
        match name {
            ModuleExportName::StringLiteral(_) => None,
            other => Some(self.key(other.span().start)),
        }
    }

    fn export_local(&mut self, symbol: u32, local_key: OccurrenceKey, name: String, name_key: Option<OccurrenceKey>) {
        self.exported_symbols.push(symbol);
        self.index.exports.push(ExportEntry {
            name: Some(name),
            name_key,
            target: ExportTarget::Local { symbol, local_key },
        });
    }

    /// `export default <expr>` and `export = <expr>`.
    fn export_default_expression(&mut self, start: u32, expr: &Expression<'_>) {
        if let Expression::Identifier(ident) = expr {
            if let Some(symbol) = self.reference_symbol(ident) {
                let local_key = self.key(ident.span.start);
                self.export_local(symbol, local_key, "default".to_string(), None);
                self.visit_expression(expr);
                return;
            }
        }

        let key = self.key(start);
        let decl = self.index.push_declaration(Declaration {
            key,
            name: "default".to_string(),
            kind: DeclKind::DefaultExport,
            flags: DeclFlags::EXPORTED | DeclFlags::DEFAULT_EXPORT | DeclFlags::FIXED,
            symbol: None,
            members: Vec::new(),
            heritage: Vec::new(),
            edges: Vec::new(),
            origins: Vec::new(),
        });
        self.index.exports.push(ExportEntry {
            name: Some("default".to_string()),
            name_key: None,
            target: ExportTarget::Declaration(key),
        });
        self.owners.push(Owner::Decl(decl));
        self.visit_expression(expr);
        self.owners.pop();
    }

    fn push_specifier(&mut self, specifier: &str) {
        self.index.specifiers.push(specifier.to_string());
    }

    fn push_dynamic_import(&mut self, specifier: &str) {
        self.push_specifier(specifier);
        self.index.dynamic_imports.push(specifier.to_string());
    }

    fn jsx_element_name(&mut self, name: &JSXElementName<'_>) -> MemberRoot {
        match name {
            JSXElementName::IdentifierReference(ident) => {
                let key = self.key(ident.span.start);
                if !self.index.jsx_tags.contains(&key) {
                    self.index.jsx_tags.push(key);
                }
                self.resolve_root(ident)
            }
            JSXElementName::Identifier(ident) => MemberRoot::Global(ident.name.to_string()),
            JSXElementName::MemberExpression(member) => {
                self.jsx_member(member);
                MemberRoot::Other
            }
            _ => MemberRoot::Other,
        }
    }

    fn jsx_member(&mut self, member: &JSXMemberExpression<'_>) {
        let (root, direct) = match &member.object {
            JSXMemberExpressionObject::IdentifierReference(ident) => (self.resolve_root(ident), true),
            JSXMemberExpressionObject::MemberExpression(inner) => {
                self.jsx_member(inner);
                (MemberRoot::Other, false)
            }
            _ => (MemberRoot::Other, false),
        };
        self.push_member_use(member.property.span.start, &member.property.name, root, direct);
    }
}

impl<'a> Visit<'a> for Collector<'_> {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        if let Some(symbol_id) = it.symbol_id.get() {
            let sym = self.symbol_index(symbol_id, &it.name);
            self.index.symbols[sym as usize].occurrences.push(it.span.start);
            self.declare(it, None);
        }
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        match self.reference_symbol(it) {
            Some(sym) => {
                self.index.symbols[sym as usize].occurrences.push(it.span.start);
                self.add_edge(TypeEdge::Symbol(sym));
            }
            None => {
                self.index.unresolved.insert(it.name.to_string());
            }
        }
    }

    fn visit_with_statement(&mut self, it: &WithStatement<'a>) {
        self.unsupported
            .get_or_insert_with(|| format!("`with` statement at offset {}", it.span.start));
        walk::walk_with_statement(self, it);
    }

    fn visit_function(&mut self, it: &Function<'a>, _flags: ScopeFlags) {
        let init_target = self.init_target.take();
        if it.declare {
            self.ambient_depth += 1;
        }
        let own = it
            .id
            .as_ref()
            .and_then(|id| self.declare(id, Some(DeclKind::Function)));
        let is_expression = matches!(it.r#type, FunctionType::FunctionExpression);
        let value_of = if is_expression { init_target.or(own) } else { own };
        let owner = match (own, self.owner()) {
            (Some(decl), _) if !is_expression => Owner::Decl(decl),
            (_, top @ Owner::Decl(_)) => top,
            (Some(decl), _) => Owner::Decl(decl),
            _ => Owner::Barrier,
        };

        if let Some(id) = &it.id {
            self.visit_binding_identifier(id);
        }
        self.owners.push(owner);
        if let Some(type_parameters) = &it.type_parameters {
            self.visit_ts_type_parameter_declaration(type_parameters);
        }
        if let Some(this_param) = &it.this_param {
            self.visit_ts_this_parameter(this_param);
        }
        self.visit_formal_parameters(&it.params);
        if let Some(return_type) = &it.return_type {
            if let Some(decl) = value_of {
                let mut roots = Vec::new();
                self.type_roots(&return_type.type_annotation, &mut roots);
                self.add_origins(decl, roots);
            }
            self.visit_ts_type_annotation(return_type);
        }
        if let Some(body) = &it.body {
            self.returns.push(ReturnSlot {
                owner: it.return_type.is_none().then_some(owner),
                value_of,
                annotated: it.return_type.is_some(),
            });
            self.owners.push(Owner::Barrier);
            self.visit_function_body(body);
            self.owners.pop();
            self.returns.pop();
        }
        self.owners.pop();

        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        let value_of = self.init_target.take();
        let owner = self.owner();
        self.owners.push(owner);
        if let Some(type_parameters) = &it.type_parameters {
            self.visit_ts_type_parameter_declaration(type_parameters);
        }
        self.visit_formal_parameters(&it.params);
        if let Some(return_type) = &it.return_type {
            if let Some(decl) = value_of {
                let mut roots = Vec::new();
                self.type_roots(&return_type.type_annotation, &mut roots);
                self.add_origins(decl, roots);
            }
            self.visit_ts_type_annotation(return_type);
        }

        let inferred = it.return_type.is_none();
        let slot = ReturnSlot {
            owner: None,
            value_of,
            annotated: !inferred,
        };
        if it.expression {
            if let (Some(decl), Some(body)) = (value_of, it.get_expression()) {
                if inferred {
                    let mut roots = Vec::new();
                    self.value_roots(body, &mut roots);
                    self.add_origins(decl, roots);
                }
            }
            self.owners.push(if inferred { owner } else { Owner::Barrier });
            self.returns.push(slot);
        } else {
            self.owners.push(Owner::Barrier);
            self.returns.push(ReturnSlot {
                owner: inferred.then_some(owner),
                ..slot
            });
        }
        if let Some(decl) = value_of.filter(|_| it.expression && !inferred) {
            self.body_root = Some(self.symbol_root(decl));
        }
        self.visit_function_body(&it.body);
        self.returns.pop();
        self.owners.pop();
        self.owners.pop();
    }

    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        let root = self.body_root.take().unwrap_or(MemberRoot::Other);
        self.literal_roots.push(root);
        self.pattern_roots.push((MemberRoot::Other, false));
        walk::walk_function_body(self, it);
        self.pattern_roots.pop();
        self.literal_roots.pop();
    }

    fn visit_return_statement(&mut self, it: &ReturnStatement<'a>) {
        let slot = self.returns.last().copied();
        let mut literal_root = None;
        if let (Some(slot), Some(argument)) = (slot, &it.argument) {
            if let Some(decl) = slot.value_of {
                if slot.annotated {
                    literal_root = Some(self.symbol_root(decl));
                } else {
                    let mut roots = Vec::new();
                    self.value_roots(argument, &mut roots);
                    self.add_origins(decl, roots);
                }
            }
        }

        if let Some(root) = &literal_root {
            self.literal_roots.push(root.clone());
        }
        match slot.and_then(|slot| slot.owner) {
            Some(owner) => {
                self.owners.push(owner);
                walk::walk_return_statement(self, it);
                self.owners.pop();
            }
            None => walk::walk_return_statement(self, it),
        }
        if literal_root.is_some() {
            self.literal_roots.pop();
        }
    }

    fn visit_formal_parameter(&mut self, it: &FormalParameter<'a>) {
        let is_property = it.accessibility.is_some() || it.readonly || it.r#override;
        let mut bindings = Vec::new();
        collect_bindings(&it.pattern, &mut bindings);

        let mut declared = Vec::new();
        for ident in &bindings {
            let kind = if is_property {
                DeclKind::Member
            } else {
                DeclKind::Parameter
            };
            let Some(decl) = self.declare(ident, Some(kind)) else {
                continue;
            };
            let key = self.index.declarations[decl as usize].key;
            if is_property {
                if it.accessibility == Some(TSAccessibility::Private) {
                    self.set_flags(decl, DeclFlags::PRIVATE);
                }
                self.attach_member(key);
            } else {
                self.add_edge(TypeEdge::Nested(key));
            }
            declared.push(decl);
        }

        let mut origins = self.annotation_roots(&it.pattern);
        if origins.is_empty() {
            if let BindingPatternKind::AssignmentPattern(assignment) = &it.pattern.kind {
                self.value_roots(&assignment.right, &mut origins);
            }
            origins.push(self.contextual_root());
        }
        if let [single] = declared.as_slice() {
            self.add_origins(*single, origins.clone());
        }

        let owner = match declared.as_slice() {
            [single] => Owner::Decl(*single),
            _ => self.owner(),
        };
        self.owners.push(owner);
        self.pattern_roots.push((primary_root(&origins), false));
        walk::walk_formal_parameter(self, it);
        self.pattern_roots.pop();
        self.owners.pop();
    }

    fn visit_variable_declaration(&mut self, it: &VariableDeclaration<'a>) {
        if it.declare {
            self.ambient_depth += 1;
        }
        walk::walk_variable_declaration(self, it);
        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        let own = match &it.id.kind {
            BindingPatternKind::BindingIdentifier(ident) => self.declare(ident, None),
            _ => None,
        };
        let owner = own.map(Owner::Decl).unwrap_or(Owner::Barrier);

        let mut origins = self.annotation_roots(&it.id);
        let mut direct = false;
        if let Some(init) = it.init.as_ref().filter(|_| origins.is_empty()) {
            self.value_roots(init, &mut origins);
            direct = matches!(init, Expression::Identifier(_));
        }
        let pattern_root = (primary_root(&origins), direct);
        if let Some(decl) = own {
            self.add_origins(decl, origins);
        }

        self.owners.push(owner);
        self.pattern_roots.push(pattern_root);
        self.visit_binding_pattern(&it.id);
        self.pattern_roots.pop();
        if let Some(init) = &it.init {
            let init_owner = if it.id.type_annotation.is_some() {
                Owner::Barrier
            } else {
                owner
            };
            let literal_root = own.map(|decl| self.symbol_root(decl));
            if is_function_value(init) {
                self.init_target = own;
            }
            self.owners.push(init_owner);
            if let Some(root) = &literal_root {
                self.literal_roots.push(root.clone());
            }
            self.visit_expression(init);
            if literal_root.is_some() {
                self.literal_roots.pop();
            }
            self.owners.pop();
            self.init_target = None;
        }
        self.owners.pop();
    }

    fn visit_binding_property(&mut self, it: &BindingProperty<'a>) {
        let (root, direct) = self
            .pattern_roots
            .last()
            .cloned()
            .unwrap_or((MemberRoot::Other, false));
        if !it.computed {
            match &it.key {
                PropertyKey::StaticIdentifier(key) => {
                    self.push_member_use(key.span.start, &key.name, root.clone(), direct);
                }
                PropertyKey::StringLiteral(lit) => {
                    self.index.fixed_member_names.insert(lit.value.to_string());
                }
                _ => {}
            }
        }
        self.pattern_roots.push((root, false));
        walk::walk_binding_property(self, it);
        self.pattern_roots.pop();
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        self.push_member_use(it.binding.span.start, &it.binding.name, MemberRoot::Other, false);
        walk::walk_assignment_target_property_identifier(self, it);
    }

    fn visit_assignment_target_property_property(
        &mut self,
        it: &AssignmentTargetPropertyProperty<'a>,
    ) {
        if !it.computed {
            if let PropertyKey::StaticIdentifier(key) = &it.name {
                self.push_member_use(key.span.start, &key.name, MemberRoot::Other, false);
            }
        }
        walk::walk_assignment_target_property_property(self, it);
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        if it.declare {
            self.ambient_depth += 1;
        }
        let own = it
            .id
            .as_ref()
            .and_then(|id| self.declare(id, Some(DeclKind::Class)));
        let is_expression = matches!(it.r#type, ClassType::ClassExpression);
        let owner = match (own, self.owner()) {
            (Some(decl), _) if !is_expression => Owner::Decl(decl),
            (_, top @ Owner::Decl(_)) => top,
            (Some(decl), _) => Owner::Decl(decl),
            _ => Owner::Barrier,
        };
        let container = match owner {
            Owner::Decl(decl) => own.or(Some(decl)),
            Owner::Barrier => own,
        };

        if let Some(decl) = container {
            if let Some(super_class) = &it.super_class {
                self.record_heritage_expression(decl, super_class);
            }
            for implemented in &it.implements {
                self.record_heritage_type_name(decl, &implemented.expression);
            }
        }

        self.owners.push(owner);
        self.containers.push(container);
        walk::walk_class(self, it);
        self.containers.pop();
        self.owners.pop();

        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_method_definition(&mut self, it: &MethodDefinition<'a>) {
        let owner = if it.kind == MethodDefinitionKind::Constructor {
            self.owner()
        } else {
            let flags = accessibility_flags(it.accessibility);
            self.declare_member(&it.key, it.computed, DeclKind::Member, flags)
                .map(Owner::Decl)
                .unwrap_or(Owner::Barrier)
        };
        self.owners.push(owner);
        walk::walk_method_definition(self, it);
        self.owners.pop();
    }

    fn visit_property_definition(&mut self, it: &PropertyDefinition<'a>) {
        let mut flags = accessibility_flags(it.accessibility);
        if it.declare {
            flags |= DeclFlags::AMBIENT;
        }
        let owner = self
            .declare_member(&it.key, it.computed, DeclKind::Member, flags)
            .map(Owner::Decl)
            .unwrap_or(Owner::Barrier);

        for decorator in &it.decorators {
            self.visit_decorator(decorator);
        }
        if it.computed {
            self.visit_property_key(&it.key);
        }
        self.owners.push(owner);
        if let Some(annotation) = &it.type_annotation {
            self.visit_ts_type_annotation(annotation);
        }
        if let Some(value) = &it.value {
            let value_owner = if it.type_annotation.is_some() {
                Owner::Barrier
            } else {
                owner
            };
            self.owners.push(value_owner);
            self.visit_expression(value);
            self.owners.pop();
        }
        self.owners.pop();
    }

    fn visit_accessor_property(&mut self, it: &AccessorProperty<'a>) {
        let flags = accessibility_flags(it.accessibility);
        let owner = self
            .declare_member(&it.key, it.computed, DeclKind::Member, flags)
            .map(Owner::Decl)
            .unwrap_or(Owner::Barrier);
        self.owners.push(owner);
        walk::walk_accessor_property(self, it);
        self.owners.pop();
    }

    fn visit_ts_property_signature(&mut self, it: &TSPropertySignature<'a>) {
        let owner = self
            .declare_member(&it.key, it.computed, DeclKind::Signature, DeclFlags::empty())
            .map(Owner::Decl)
            .unwrap_or(Owner::Barrier);
        self.owners.push(owner);
        walk::walk_ts_property_signature(self, it);
        self.owners.pop();
    }

    fn visit_ts_method_signature(&mut self, it: &TSMethodSignature<'a>) {
        let owner = self
            .declare_member(&it.key, it.computed, DeclKind::Signature, DeclFlags::empty())
            .map(Owner::Decl)
            .unwrap_or(Owner::Barrier);
        self.owners.push(owner);
        walk::walk_ts_method_signature(self, it);
        self.owners.pop();
    }

    fn visit_ts_type_literal(&mut self, it: &TSTypeLiteral<'a>) {
        self.containers.push(None);
        walk::walk_ts_type_literal(self, it);
        self.containers.pop();
    }

    fn visit_ts_interface_declaration(&mut self, it: &TSInterfaceDeclaration<'a>) {
        if it.declare {
            self.ambient_depth += 1;
        }
        let own = self.declare(&it.id, Some(DeclKind::Interface));
        if let Some(decl) = own {
            for heritage in &it.extends {
                self.record_heritage_expression(decl, &heritage.expression);
            }
        }
        self.owners.push(own.map(Owner::Decl).unwrap_or(Owner::Barrier));
        self.containers.push(own);
        walk::walk_ts_interface_declaration(self, it);
        self.containers.pop();
        self.owners.pop();
        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_ts_type_alias_declaration(&mut self, it: &TSTypeAliasDeclaration<'a>) {
        if it.declare {
            self.ambient_depth += 1;
        }
        let own = self.declare(&it.id, Some(DeclKind::TypeAlias));
        if let Some(decl) = own {
            let mut roots = Vec::new();
            self.type_roots(&it.type_annotation, &mut roots);
            self.add_origins(decl, roots);
        }
        self.owners.push(own.map(Owner::Decl).unwrap_or(Owner::Barrier));
        walk::walk_ts_type_alias_declaration(self, it);
        self.owners.pop();
        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_ts_type_parameter(&mut self, it: &TSTypeParameter<'a>) {
        let own = self.declare(&it.name, Some(DeclKind::TypeParameter));
        if let (Some(decl), Some(constraint)) = (own, &it.constraint) {
            let mut roots = Vec::new();
            self.type_roots(constraint, &mut roots);
            self.add_origins(decl, roots);
        }
        walk::walk_ts_type_parameter(self, it);
    }

    fn visit_ts_enum_declaration(&mut self, it: &TSEnumDeclaration<'a>) {
        if it.declare {
            self.ambient_depth += 1;
        }
        let own = self.declare(&it.id, Some(DeclKind::Enum));
        self.owners.push(own.map(Owner::Decl).unwrap_or(Owner::Barrier));
        self.containers.push(own);
        walk::walk_ts_enum_declaration(self, it);
        self.containers.pop();
        self.owners.pop();
        if it.declare {
            self.ambient_depth -= 1;
        }
    }

    fn visit_ts_enum_member(&mut self, it: &TSEnumMember<'a>) {
        let member = match &it.id {
            TSEnumMemberName::Identifier(id) => self.declare_enum_member(id.span.start, &id.name),
            TSEnumMemberName::String(lit) => {
                self.index.fixed_member_names.insert(lit.value.to_string());
                None
            }
            _ => None,
        };
        self.owners
            .push(member.map(Owner::Decl).unwrap_or(Owner::Barrier));
        walk::walk_ts_enum_member(self, it);
        self.owners.pop();
    }

    fn visit_ts_module_declaration(&mut self, it: &TSModuleDeclaration<'a>) {
        let ambient = it.declare || matches!(it.id, TSModuleDeclarationName::StringLiteral(_));
        if ambient {
            self.ambient_depth += 1;
        }
        let own = match &it.id {
            TSModuleDeclarationName::Identifier(id) => self.declare(id, Some(DeclKind::Namespace)),
            TSModuleDeclarationName::StringLiteral(_) => None,
        };
        self.owners.push(own.map(Owner::Decl).unwrap_or(Owner::Barrier));
        self.containers.push(own);
        self.namespace_depth += 1;
        walk::walk_ts_module_declaration(self, it);
        self.namespace_depth -= 1;
        self.containers.pop();
        self.owners.pop();
        if ambient {
            self.ambient_depth -= 1;
        }
    }

    fn visit_ts_global_declaration(&mut self, it: &TSGlobalDeclaration<'a>) {
        self.ambient_depth += 1;
        walk::walk_ts_global_declaration(self, it);
        self.ambient_depth -= 1;
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let specifier = it.source.value.to_string();
        self.push_specifier(&specifier);
        let type_only = it.import_kind.is_type();

        if let Some(specifiers) = &it.specifiers {
            for spec in specifiers {
                match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(named) => {
                        let imported = ImportedName::Named {
                            name: named.imported.name().to_string(),
                            key: self.module_export_key(&named.imported),
                        };
                        let type_only = type_only || named.import_kind.is_type();
                        self.add_import(&named.local, imported, &specifier, type_only);
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => {
                        self.add_import(&default.local, ImportedName::Default, &specifier, type_only);
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => {
                        self.add_import(
                            &namespace.local,
                            ImportedName::Namespace,
                            &specifier,
                            type_only,
                        );
                    }
                }
            }
        }
        walk::walk_import_declaration(self, it);
    }

    fn visit_ts_import_equals_declaration(&mut self, it: &TSImportEqualsDeclaration<'a>) {
        match &it.module_reference {
            TSModuleReference::ExternalModuleReference(external) => {
                let specifier = external.expression.value.to_string();
                self.push_specifier(&specifier);
                self.add_import(&it.id, ImportedName::Namespace, &specifier, it.import_kind.is_type());
            }
            _ => {
                self.declare(&it.id, Some(DeclKind::Variable));
            }
        }
        walk::walk_ts_import_equals_declaration(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &it.source {
            self.push_dynamic_import(&lit.value);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_ts_import_type(&mut self, it: &TSImportType<'a>) {
        let text = self
            .source
            .get(it.span.start as usize..it.span.end as usize)
            .unwrap_or_default();
        if let Some(specifier) = quoted_specifier(text) {
            self.push_dynamic_import(specifier);
        }
        walk::walk_ts_import_type(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if self.namespace_depth > 0 {
            if let Some(declaration) = &it.declaration {
                for (ident, hint) in declaration_bindings(declaration) {
                    if let Some(decl) = self.declare(ident, hint) {
                        self.set_flags(decl, DeclFlags::MEMBER_ALIAS | DeclFlags::EXPORTED);
                        let key = self.index.declarations[decl as usize].key;
                        self.attach_member(key);
                    }
                }
            }
            walk::walk_export_named_declaration(self, it);
            return;
        }

        if let Some(source) = &it.source {
            let specifier = source.value.to_string();
            self.push_specifier(&specifier);
            for spec in &it.specifiers {
                let local_key = self.module_export_key(&spec.local);
                let name_key = self.module_export_key(&spec.exported);
                self.index.exports.push(ExportEntry {
                    name: Some(spec.exported.name().to_string()),
                    name_key,
                    target: ExportTarget::ReExport {
                        specifier: specifier.clone(),
                        imported: spec.local.name().to_string(),
                        local_key,
                    },
                });
            }
            return;
        }

        if let Some(declaration) = &it.declaration {
            for (ident, hint) in declaration_bindings(declaration) {
                let Some(decl) = self.declare(ident, hint) else {
                    continue;
                };
                let Some(symbol) = self.index.declarations[decl as usize].symbol else {
                    continue;
                };
                let key = self.key(ident.span.start);
                self.export_local(symbol, key, ident.name.to_string(), Some(key));
            }
        }

        for spec in &it.specifiers {
            let ModuleExportName::IdentifierReference(local) = &spec.local else {
                continue;
            };
            let Some(symbol) = self.reference_symbol(local) else {
                continue;
            };
            let local_key = self.key(local.span.start);
            let name_key = self.module_export_key(&spec.exported);
            self.export_local(symbol, local_key, spec.exported.name().to_string(), name_key);
        }

        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_default_declaration(&mut self, it: &ExportDefaultDeclaration<'a>) {
        let named = match &it.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(function) => function
                .id
                .as_ref()
                .map(|id| (id, DeclKind::Function)),
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                class.id.as_ref().map(|id| (id, DeclKind::Class))
            }
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
                Some((&interface.id, DeclKind::Interface))
            }
            _ => None,
        };

        if let Some((ident, kind)) = named {
            if let Some(decl) = self.declare(ident, Some(kind)) {
                self.set_flags(decl, DeclFlags::DEFAULT_EXPORT);
                if let Some(symbol) = self.index.declarations[decl as usize].symbol {
                    let key = self.key(ident.span.start);
                    self.export_local(symbol, key, "default".to_string(), None);
                }
            }
            walk::walk_export_default_declaration(self, it);
            return;
        }

        match &it.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                let decl = self.anonymous_default(it.span.start);
                self.owners.push(Owner::Decl(decl));
                self.visit_function(function, ScopeFlags::Function);
                self.owners.pop();
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                let decl = self.anonymous_default(it.span.start);
                self.owners.push(Owner::Decl(decl));
                self.visit_class(class);
                self.owners.pop();
            }
            kind => {
                if let Some(expr) = kind.as_expression() {
                    self.export_default_expression(it.span.start, expr);
                } else {
                    walk::walk_export_default_declaration(self, it);
                }
            }
        }
    }

    fn visit_ts_export_assignment(&mut self, it: &TSExportAssignment<'a>) {
        self.export_default_expression(it.span.start, &it.expression);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        let specifier = it.source.value.to_string();
        self.push_specifier(&specifier);
        let entry = match &it.exported {
            Some(exported) => ExportEntry {
                name: Some(exported.name().to_string()),
                name_key: self.module_export_key(exported),
                target: ExportTarget::ReExport {
                    specifier,
                    imported: "*".to_string(),
                    local_key: None,
                },
            },
            None => ExportEntry {
                name: None,
                name_key: None,
                target: ExportTarget::Star { specifier },
            },
        };
        self.index.exports.push(entry);
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        let root = self.root_of(&it.object);
        let direct = matches!(it.object, Expression::Identifier(_));
        self.push_member_use(it.property.span.start, &it.property.name, root, direct);
        walk::walk_static_member_expression(self, it);
    }

    fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
        if let Expression::StringLiteral(lit) = &it.expression {
            self.index.fixed_member_names.insert(lit.value.to_string());
        }
        walk::walk_computed_member_expression(self, it);
    }

    fn visit_private_field_expression(&mut self, it: &PrivateFieldExpression<'a>) {
        let name = format!("#{}", it.field.name);
        self.push_member_use(it.field.span.start, &name, MemberRoot::Other, false);
        walk::walk_private_field_expression(self, it);
    }

    fn visit_private_in_expression(&mut self, it: &PrivateInExpression<'a>) {
        let name = format!("#{}", it.left.name);
        self.push_member_use(it.left.span.start, &name, MemberRoot::Other, false);
        walk::walk_private_in_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if !it.computed {
            match &it.key {
                PropertyKey::StaticIdentifier(key) => {
                    let root = self.literal_roots.last().cloned().unwrap_or(MemberRoot::Other);
                    self.push_member_use(key.span.start, &key.name, root, false);
                    self.add_edge(TypeEdge::MemberName(key.name.to_string()));
                }
                PropertyKey::StringLiteral(lit) => {
                    self.index.fixed_member_names.insert(lit.value.to_string());
                }
                _ => {}
            }
        } else if let Some(name) = string_key(&it.key) {
            self.index.fixed_member_names.insert(name);
        }
        walk::walk_object_property(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee {
            if callee.name == "eval" && self.reference_symbol(callee).is_none() {
                self.unsupported
                    .get_or_insert_with(|| format!("direct `eval` call at offset {}", it.span.start));
            }
            if callee.name == "require" && it.arguments.len() == 1 {
                if let Some(Expression::StringLiteral(lit)) = it.arguments[0].as_expression() {
                    self.push_dynamic_import(&lit.value);
                }
            }
        }
        let callee = self.root_of(&it.callee);
        let root = self.slot_root(callee);
        self.literal_roots.push(root);
        walk::walk_call_expression(self, it);
        self.literal_roots.pop();
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        let callee = self.root_of(&it.callee);
        let root = self.slot_root(callee);
        self.literal_roots.push(root);
        walk::walk_new_expression(self, it);
        self.literal_roots.pop();
    }

    fn visit_ts_qualified_name(&mut self, it: &TSQualifiedName<'a>) {
        let direct = matches!(it.left, TSTypeName::IdentifierReference(_));
        let root = self.type_name_root(&it.left);
        self.push_member_use(it.right.span.start, &it.right.name, root, direct);
        self.add_edge(TypeEdge::MemberName(it.right.name.to_string()));
        walk::walk_ts_qualified_name(self, it);
    }

    fn visit_ts_literal_type(&mut self, it: &TSLiteralType<'a>) {
        if let TSLiteral::StringLiteral(lit) = &it.literal {
            self.index.fixed_member_names.insert(lit.value.to_string());
        }
        walk::walk_ts_literal_type(self, it);
    }

    fn visit_jsx_opening_element(&mut self, it: &JSXOpeningElement<'a>) {
        let root = self.jsx_element_name(&it.name);
        for item in &it.attributes {
            let JSXAttributeItem::Attribute(attribute) = item else {
                continue;
            };
            if let JSXAttributeName::Identifier(name) = &attribute.name {
                if !name.name.contains('-') {
                    self.push_member_use(name.span.start, &name.name, root.clone(), false);
                }
            }
        }
        walk::walk_jsx_opening_element(self, it);
    }

    fn visit_jsx_closing_element(&mut self, it: &JSXClosingElement<'a>) {
        self.jsx_element_name(&it.name);
        walk::walk_jsx_closing_element(self, it);
    }
}

impl Collector<'_> {
    fn anonymous_default(&mut self, start: u32) -> u32 {
        let key = self.key(start);
        let decl = self.index.push_declaration(Declaration {
            key,
            name: "default".to_string(),
            kind: DeclKind::DefaultExport,
            flags: DeclFlags::EXPORTED | DeclFlags::DEFAULT_EXPORT | DeclFlags::FIXED,
            symbol: None,
            members: Vec::new(),
            heritage: Vec::new(),
            edges: Vec::new(),
            origins: Vec::new(),
        });
        self.index.exports.push(ExportEntry {
            name: Some("default".to_string()),
            name_key: None,
            target: ExportTarget::Declaration(key),
        });
        decl
    }

    fn declare_enum_member(&mut self, offset: u32, name: &str) -> Option<u32> {
        let key = self.key(offset);
        if let Some(existing) = self.index.decl_index(offset) {
            self.index.declarations[existing as usize].kind = DeclKind::EnumMember;
            self.attach_member(key);
            return Some(existing);
        }
        let mut flags = DeclFlags::empty();
        if self.ambient_depth > 0 {
            flags |= DeclFlags::AMBIENT;
        }
        let decl = self.index.push_declaration(Declaration {
            key,
            name: name.to_string(),
            kind: DeclKind::EnumMember,
            flags,
            symbol: None,
            members: Vec::new(),
            heritage: Vec::new(),
            edges: Vec::new(),
            origins: Vec::new(),
        });
        self.attach_member(key);
        Some(decl)
    }
}

fn is_module_statement(statement: &Statement<'_>) -> bool {
    matches!(
        statement,
        Statement::ImportDeclaration(_)
            | Statement::ExportAllDeclaration(_)
            | Statement::ExportDefaultDeclaration(_)
            | Statement::ExportNamedDeclaration(_)
            | Statement::TSExportAssignment(_)
            | Statement::TSImportEqualsDeclaration(_)
    )
}

fn kind_from_flags(flags: SymbolFlags) -> DeclKind {
    if flags.contains(SymbolFlags::Function) {
        DeclKind::Function
    } else if flags.contains(SymbolFlags::Class) {
        DeclKind::Class
    } else if flags.contains(SymbolFlags::Interface) {
        DeclKind::Interface
    } else if flags.contains(SymbolFlags::TypeAlias) {
        DeclKind::TypeAlias
    } else if flags.contains(SymbolFlags::TypeParameter) {
        DeclKind::TypeParameter
    } else if flags.contains(SymbolFlags::RegularEnum) || flags.contains(SymbolFlags::ConstEnum) {
        DeclKind::Enum
    } else if flags.contains(SymbolFlags::EnumMember) {
        DeclKind::EnumMember
    } else if flags.contains(SymbolFlags::NamespaceModule) || flags.contains(SymbolFlags::ValueModule) {
        DeclKind::Namespace
    } else if flags.contains(SymbolFlags::Import) {
        DeclKind::Import
    } else {
        DeclKind::Variable
    }
}

/// The root that best describes a value with the given origins: a global
/// first, then a local symbol.
fn primary_root(roots: &[MemberRoot]) -> MemberRoot {
    roots
        .iter()
        .find(|root| matches!(root, MemberRoot::Global(_)))
        .or_else(|| roots.iter().find(|root| matches!(root, MemberRoot::Symbol(_))))
        .cloned()
        .unwrap_or(MemberRoot::Other)
}

fn is_function_value(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => true,
        Expression::ParenthesizedExpression(inner) => is_function_value(&inner.expression),
        _ => false,
    }
}

fn accessibility_flags(accessibility: Option<TSAccessibility>) -> DeclFlags {
    if accessibility == Some(TSAccessibility::Private) {
        DeclFlags::PRIVATE
    } else {
        DeclFlags::empty()
    }
}

fn string_key(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn collect_bindings<'b, 'a>(pattern: &'b BindingPattern<'a>, out: &mut Vec<&'b BindingIdentifier<'a>>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => out.push(ident),
        BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                collect_bindings(&property.value, out);
            }
            if let Some(rest) = &object.rest {
                collect_bindings(&rest.argument, out);
            }
        }
        BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                collect_bindings(element, out);
            }
            if let Some(rest) = &array.rest {
                collect_bindings(&rest.argument, out);
            }
        }
        BindingPatternKind::AssignmentPattern(assignment) => collect_bindings(&assignment.left, out),
    }
}

/// Names bound by an exported declaration, with the kind each one declares.
fn declaration_bindings<'b, 'a>(
    declaration: &'b AstDeclaration<'a>,
) -> Vec<(&'b BindingIdentifier<'a>, Option<DeclKind>)> {
    let mut out = Vec::new();
    match declaration {
        AstDeclaration::VariableDeclaration(variable) => {
            let mut idents = Vec::new();
            for declarator in &variable.declarations {
                collect_bindings(&declarator.id, &mut idents);
            }
            out.extend(idents.into_iter().map(|ident| (ident, None)));
        }
        AstDeclaration::FunctionDeclaration(function) => {
            if let Some(id) = &function.id {
                out.push((id, Some(DeclKind::Function)));
            }
        }
        AstDeclaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                out.push((id, Some(DeclKind::Class)));
            }
        }
        AstDeclaration::TSTypeAliasDeclaration(alias) => out.push((&alias.id, Some(DeclKind::TypeAlias))),
        AstDeclaration::TSInterfaceDeclaration(interface) => {
            out.push((&interface.id, Some(DeclKind::Interface)));
        }
        AstDeclaration::TSEnumDeclaration(enumeration) => out.push((&enumeration.id, Some(DeclKind::Enum))),
        AstDeclaration::TSModuleDeclaration(module) => {
            if let TSModuleDeclarationName::Identifier(id) = &module.id {
                out.push((id, Some(DeclKind::Namespace)));
            }
        }
        AstDeclaration::TSImportEqualsDeclaration(import) => out.push((&import.id, None)),
        // Augments the global scope; binds nothing in this module.
        AstDeclaration::TSGlobalDeclaration(_) => {}
    }
    out
}

/// First quoted string in `import("./x").T`.
fn quoted_specifier(text: &str) -> Option<&str> {
    let start = text.find(['"', '\''])?;
    let quote = text[start..].chars().next()?;
    let rest = &text[start + 1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::quoted_specifier;

    #[test]
    fn extracts_import_type_specifier() {
        assert_eq!(quoted_specifier("import(\"./types\").Foo"), Some("./types"));
        assert_eq!(quoted_specifier("import('./a')"), Some("./a"));
        assert_eq!(quoted_specifier("import(x)"), None);
    }
}
