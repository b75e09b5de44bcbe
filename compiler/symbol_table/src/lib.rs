//! The table of declared symbols.
//!
//! Symbols are allocated in an arena and addressed by stable [indices](SymbolIndex).
//! The first symbol is the root scope which contains the global declarations of every file
//! of the compilation unit in declaration order.
//!
//! A scope is a symbol that owns an ordered list of children. The body of a procedure or of
//! a struct is represented by a scope that directly follows the declaring symbol among its
//! siblings.

use ast::{SymbolIndex, TypeInfo};
use joinery::JoinableIterator;
use span::Span;
use std::{
    fmt,
    ops::{Index, IndexMut},
};
use utility::Atom;


pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub const ROOT: SymbolIndex = SymbolIndex::new(0);

    fn new() -> Self {
        Self {
            symbols: vec![Symbol {
                name: Atom::EMPTY,
                kind: Kind::SCOPE,
                type_: None,
                span: Span::default(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> &Symbol {
        &self[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Look up a global declaration by its exact name.
    ///
    /// Globals are visible regardless of the order of declaration.
    pub fn lookup_global(&self, name: Atom) -> Option<SymbolIndex> {
        self.root()
            .children
            .iter()
            .copied()
            .find(|&child| !self[child].is_scope() && self[child].name == name)
    }

    /// The scope of the body of the given procedure or struct.
    ///
    /// It is the sibling immediately following the symbol.
    pub fn body_scope(&self, symbol: SymbolIndex) -> Option<SymbolIndex> {
        let siblings = &self[self[symbol].parent?].children;
        let position = siblings.iter().position(|&sibling| sibling == symbol)?;
        let scope = *siblings.get(position + 1)?;

        self[scope].is_scope().then_some(scope)
    }

    fn format(&self, index: SymbolIndex, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = &self[index];
        write!(f, "{}{index:?}", " ".repeat(depth * 4))?;

        if !symbol.is_scope() {
            write!(f, " {}", symbol.name)?;
        }
        if let Some(type_) = &symbol.type_ {
            write!(f, ": {type_}")?;
        }
        writeln!(f, " [{}]", symbol.kind)?;

        for &child in &symbol.children {
            self.format(child, depth + 1, f)?;
        }

        Ok(())
    }
}

impl Index<SymbolIndex> for SymbolTable {
    type Output = Symbol;

    fn index(&self, index: SymbolIndex) -> &Self::Output {
        &self.symbols[index.value()]
    }
}

impl IndexMut<SymbolIndex> for SymbolTable {
    fn index_mut(&mut self, index: SymbolIndex) -> &mut Self::Output {
        &mut self.symbols[index.value()]
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format(Self::ROOT, 0, f)
    }
}

/// A named and typed declaration or a scope.
pub struct Symbol {
    pub name: Atom,
    pub kind: Kind,
    /// The type of the declaration.
    ///
    /// It is absent for scopes and for bindings whose type is yet to be inferred.
    pub type_: Option<TypeInfo>,
    pub span: Span,
    pub parent: Option<SymbolIndex>,
    pub children: Vec<SymbolIndex>,
}

impl Symbol {
    pub fn is_scope(&self) -> bool {
        self.kind.contains(Kind::SCOPE)
    }

    pub fn is_struct(&self) -> bool {
        self.kind.contains(Kind::STRUCT)
    }

    pub fn is_global(&self) -> bool {
        self.kind.contains(Kind::GLOBAL)
    }
}

bitflags::bitflags! {
    /// The kind of a symbol.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Kind: u8 {
        const GLOBAL = 1 << 0;
        const LOCAL = 1 << 1;
        const SCOPE = 1 << 2;
        const STRUCT = 1 << 3;
        const PROCEDURE = 1 << 4;
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self
            .iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect();

        write!(f, "{}", names.iter().join_with(", "))
    }
}

/// The builder of a symbol table.
///
/// It keeps track of the scopes that are currently open, the innermost one last.
pub struct Builder {
    table: SymbolTable,
    scopes: Vec<SymbolIndex>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            scopes: vec![SymbolTable::ROOT],
        }
    }

    fn current_scope(&self) -> SymbolIndex {
        self.scopes.last().copied().unwrap_or(SymbolTable::ROOT)
    }

    /// Whether the symbols added next are global.
    pub fn is_in_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Append a symbol to the current scope.
    ///
    /// It is marked as either global or local depending on the depth of the scope.
    pub fn add_symbol(
        &mut self,
        name: Atom,
        kind: Kind,
        type_: Option<TypeInfo>,
        span: Span,
    ) -> SymbolIndex {
        let locality = if self.is_in_global_scope() {
            Kind::GLOBAL
        } else {
            Kind::LOCAL
        };
        let parent = self.current_scope();
        let index = SymbolIndex::new(self.table.symbols.len() as u32);

        self.table.symbols.push(Symbol {
            name,
            kind: kind | locality,
            type_,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.table[parent].children.push(index);

        index
    }

    /// Append a scope to the current scope and enter it.
    pub fn open_scope(&mut self, span: Span) -> SymbolIndex {
        let scope = self.add_symbol(Atom::EMPTY, Kind::SCOPE, None, span);
        self.scopes.push(scope);
        scope
    }

    pub fn close_scope(&mut self) {
        assert!(
            !self.is_in_global_scope(),
            "attempt to close the global scope"
        );
        self.scopes.pop();
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn finish(self) -> SymbolTable {
        assert!(self.is_in_global_scope(), "a scope was left open");
        self.table
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
