//! Symbol table implementation for name resolution
//!
//! Scopes form a tree stored in a vector and addressed by [`ScopeId`].
//! Resolution walks from the current scope up through its parents, so a
//! symbol is never visible from a sibling scope.

use rustc_hash::FxHashMap;

use crate::parser::token::Span;
use crate::parser::types::Type;

/// Symbol kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `let` binding or loop variable
    Variable,
    /// `const` binding
    Constant,
    /// Function declaration or builtin
    Function,
    /// Function parameter
    Parameter,
    /// Class or enum declaration
    Class,
    /// Name bound by `import`
    Module,
}

impl SymbolKind {
    /// Declarations are visible inside nested functions; bindings with a
    /// stack slot are not.
    pub fn is_declaration(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Class | SymbolKind::Module)
    }
}

/// Symbol flags for additional metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFlags {
    /// Is this a const binding?
    pub is_const: bool,
    /// Bound by a `for` loop; cannot be reassigned
    pub is_readonly: bool,
    /// Is this an async function?
    pub is_async: bool,
    /// Is this a coop (generator) function?
    pub is_coop: bool,
}

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub flags: SymbolFlags,
    /// Scope where this symbol was defined
    pub scope_id: ScopeId,
    /// Source location of the declaration
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            flags: SymbolFlags::default(),
            scope_id: ScopeId(0),
            span,
        }
    }

    pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Only variables and parameters can be assigned, and only when not const.
    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable | SymbolKind::Parameter)
            && !self.flags.is_const
            && !self.flags.is_readonly
    }
}

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Scope kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Class,
    Loop,
}

/// Scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Parent scope (None for global scope)
    pub parent: Option<ScopeId>,
    pub symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            kind,
            parent,
            symbols: FxHashMap::default(),
        }
    }
}

/// Symbol table with scope tree
pub struct SymbolTable {
    /// All scopes (indexed by ScopeId)
    scopes: Vec<Scope>,
    current_scope: ScopeId,
}

impl SymbolTable {
    /// Create a new symbol table with an empty global scope
    pub fn new() -> Self {
        let global_scope = Scope::new(ScopeId(0), ScopeKind::Global, None);

        SymbolTable {
            scopes: vec![global_scope],
            current_scope: ScopeId(0),
        }
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Push a new scope as a child of the current scope and make it current.
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let scope = Scope::new(id, kind, Some(self.current_scope));
        self.scopes.push(scope);
        self.current_scope = id;
        id
    }

    /// Pop the current scope, returning to its parent.
    ///
    /// Does nothing if already at global scope.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope.0 as usize].parent {
            self.current_scope = parent;
        }
    }

    /// Define a symbol in the current scope
    ///
    /// Returns an error if a symbol with the same name already exists in this scope.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), DuplicateSymbolError> {
        self.define_in_scope(self.current_scope, symbol)
    }

    /// Define a symbol in a specific scope
    pub fn define_in_scope(
        &mut self,
        scope_id: ScopeId,
        mut symbol: Symbol,
    ) -> Result<(), DuplicateSymbolError> {
        let scope = &mut self.scopes[scope_id.0 as usize];

        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(DuplicateSymbolError {
                name: symbol.name.clone(),
                original: existing.span,
                duplicate: symbol.span,
            });
        }

        symbol.scope_id = scope_id;
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolve a symbol by name, walking up the scope chain
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.resolve_from_scope(name, self.current_scope)
    }

    /// Resolve a symbol by name from a specific scope, walking up the scope chain.
    ///
    /// Function scopes are opaque: past a function boundary only globals
    /// and declarations (functions, classes, imports) are visible, since a
    /// function's frame holds no slots of its enclosing function.
    pub fn resolve_from_scope(&self, name: &str, mut scope_id: ScopeId) -> Option<&Symbol> {
        let mut crossed_function = false;
        loop {
            let scope = self.scopes.get(scope_id.0 as usize)?;

            if let Some(symbol) = scope.symbols.get(name) {
                if !crossed_function
                    || scope.kind == ScopeKind::Global
                    || symbol.kind.is_declaration()
                {
                    return Some(symbol);
                }
            }

            if scope.kind == ScopeKind::Function {
                crossed_function = true;
            }
            scope_id = scope.parent?;
        }
    }

    /// Look a name up in the current scope only.
    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        self.current().symbols.get(name)
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.current_scope.0 as usize]
    }

    pub fn current_scope_id(&self) -> ScopeId {
        self.current_scope
    }

    pub fn get_scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn global_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    /// Update the type of a symbol in a specific scope
    ///
    /// Returns true if the symbol was found and updated.
    pub fn update_type(&mut self, scope_id: ScopeId, name: &str, new_ty: Type) -> bool {
        if let Some(scope) = self.scopes.get_mut(scope_id.0 as usize) {
            if let Some(symbol) = scope.symbols.get_mut(name) {
                symbol.ty = new_ty;
                return true;
            }
        }
        false
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Error indicating a duplicate symbol definition
#[derive(Debug, Clone)]
pub struct DuplicateSymbolError {
    pub name: String,
    /// Location of original definition
    pub original: Span,
    /// Location of duplicate definition
    pub duplicate: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, ty: Type) -> Symbol {
        Symbol::new(name, SymbolKind::Variable, ty, Span::new(0, 1, 1, 1))
    }

    #[test]
    fn test_symbol_table_new() {
        let table = SymbolTable::new();
        assert_eq!(table.current_scope_id(), ScopeId(0));
        assert_eq!(table.current().kind, ScopeKind::Global);
    }

    #[test]
    fn test_push_pop_scope() {
        let mut table = SymbolTable::new();

        let func_scope = table.push_scope(ScopeKind::Function);
        assert_eq!(func_scope, ScopeId(1));
        assert_eq!(table.current().kind, ScopeKind::Function);

        let block_scope = table.push_scope(ScopeKind::Block);
        assert_eq!(block_scope, ScopeId(2));

        table.pop_scope();
        assert_eq!(table.current_scope_id(), ScopeId(1));

        table.pop_scope();
        table.pop_scope();
        assert_eq!(table.current_scope_id(), ScopeId(0));
    }

    #[test]
    fn test_resolve_in_parent_scope() {
        let mut table = SymbolTable::new();
        table.define(variable("x", Type::INT)).unwrap();

        table.push_scope(ScopeKind::Block);
        let resolved = table.resolve("x").unwrap();
        assert_eq!(resolved.ty, Type::INT);
        assert_eq!(resolved.scope_id, ScopeId(0));
        assert!(table.resolve_local("x").is_none());
    }

    #[test]
    fn test_shadowing_and_siblings() {
        let mut table = SymbolTable::new();
        table.define(variable("x", Type::INT)).unwrap();

        table.push_scope(ScopeKind::Block);
        table.define(variable("x", Type::STRING)).unwrap();
        table.define(variable("y", Type::BOOL)).unwrap();
        assert_eq!(table.resolve("x").unwrap().ty, Type::STRING);
        table.pop_scope();

        table.push_scope(ScopeKind::Block);
        assert_eq!(table.resolve("x").unwrap().ty, Type::INT);
        assert!(table.resolve("y").is_none());
    }

    #[test]
    fn test_function_scopes_hide_enclosing_locals() {
        let mut table = SymbolTable::new();
        table.define(variable("k", Type::INT)).unwrap();

        table.push_scope(ScopeKind::Function);
        table.define(variable("k", Type::STRING)).unwrap();
        table.define(variable("local", Type::BOOL)).unwrap();
        table
            .define(Symbol::new("helper", SymbolKind::Function, Type::ANY, Span::default()))
            .unwrap();

        table.push_scope(ScopeKind::Block);
        assert_eq!(table.resolve("local").unwrap().ty, Type::BOOL);

        table.push_scope(ScopeKind::Function);
        // The outer function's locals are skipped in favor of the global.
        assert!(table.resolve("local").is_none());
        assert_eq!(table.resolve("k").unwrap().ty, Type::INT);
        assert!(table.resolve("helper").is_some());
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut table = SymbolTable::new();
        table.define(variable("x", Type::INT)).unwrap();

        let err = table.define(variable("x", Type::FLOAT)).unwrap_err();
        assert_eq!(err.name, "x");
    }

    #[test]
    fn test_mutability() {
        let var = variable("x", Type::INT);
        assert!(var.is_mutable());

        let constant = Symbol::new("PI", SymbolKind::Constant, Type::FLOAT, Span::default())
            .with_flags(SymbolFlags {
                is_const: true,
                ..SymbolFlags::default()
            });
        assert!(!constant.is_mutable());

        let func = Symbol::new("f", SymbolKind::Function, Type::ANY, Span::default());
        assert!(!func.is_mutable());
    }
}
