//! Scope records stored in the [`SymbolTable`](super::SymbolTable) arena.

use rustc_hash::FxHashMap;
use smalltalk_core::Span;

use super::{ScopeId, SymbolId};

/// A lexical region owning named bindings.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The scope this one is nested in; `None` only for the global scope.
    pub enclosing: Option<ScopeId>,
    /// Symbols by name.
    pub(crate) by_name: FxHashMap<String, SymbolId>,
    /// Symbols in insertion order.
    pub(crate) symbols: Vec<SymbolId>,
    /// Where the scope was declared.
    pub span: Span,
    /// Kind-specific data.
    pub kind: ScopeKind,
}

impl Scope {
    pub(crate) fn new(enclosing: Option<ScopeId>, span: Span, kind: ScopeKind) -> Self {
        Self {
            enclosing,
            by_name: FxHashMap::default(),
            symbols: Vec::new(),
            span,
            kind,
        }
    }

    /// Look up a symbol declared directly in this scope.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Symbols declared directly in this scope, in insertion order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// Class data, if this is a class scope.
    pub fn as_class(&self) -> Option<&ClassScope> {
        match &self.kind {
            ScopeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Block data, if this is a method or block scope.
    pub fn as_block(&self) -> Option<&BlockScope> {
        match &self.kind {
            ScopeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub(crate) fn as_class_mut(&mut self) -> Option<&mut ClassScope> {
        match &mut self.kind {
            ScopeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub(crate) fn as_block_mut(&mut self) -> Option<&mut BlockScope> {
        match &mut self.kind {
            ScopeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Whether this scope is a method body (including `main` and primitives).
    pub fn is_method(&self) -> bool {
        matches!(
            &self.kind,
            ScopeKind::Block(BlockScope {
                kind: BlockKind::Method { .. },
                ..
            })
        )
    }
}

/// Kind-specific scope data.
#[derive(Debug, Clone)]
pub enum ScopeKind {
    /// The outermost scope; binds class names.
    Global,
    /// A class body.
    Class(ClassScope),
    /// A method body or a nested block literal.
    Block(BlockScope),
}

/// Fields, superclass link and method table of a class.
#[derive(Debug, Clone)]
pub struct ClassScope {
    /// Class name
    pub name: String,
    /// Superclass scope, linked by the definition pass
    pub superclass: Option<ScopeId>,
    /// Fields declared by this class, in declaration order
    pub fields: Vec<SymbolId>,
    /// Instance-side methods by selector
    pub methods: FxHashMap<String, ScopeId>,
    /// Class-side methods by selector
    pub class_methods: FxHashMap<String, ScopeId>,
    /// All methods in declaration order
    pub method_order: Vec<ScopeId>,
}

impl ClassScope {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            superclass: None,
            fields: Vec::new(),
            methods: FxHashMap::default(),
            class_methods: FxHashMap::default(),
            method_order: Vec::new(),
        }
    }
}

/// Arguments, temporaries and nesting data of a method or block.
#[derive(Debug, Clone)]
pub struct BlockScope {
    /// Method or nested block
    pub kind: BlockKind,
    /// Parameters, in declaration order
    pub args: Vec<SymbolId>,
    /// Temporaries, in declaration order
    pub locals: Vec<SymbolId>,
    /// Slot in the owning method's nested-block table (0 for methods)
    pub index: u32,
    /// Blocks declared inside this scope, directly or transitively
    pub nested_blocks: u32,
}

impl BlockScope {
    pub(crate) fn new(kind: BlockKind, index: u32) -> Self {
        Self {
            kind,
            args: Vec::new(),
            locals: Vec::new(),
            index,
            nested_blocks: 0,
        }
    }

    /// Number of parameters.
    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// Number of temporaries.
    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }
}

/// Distinguishes method bodies from nested blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A method (or the synthetic `main`).
    Method {
        /// The selector it is installed under
        selector: String,
        /// Whether it lives on the class side
        is_class_method: bool,
        /// VM primitive implementing it, if any
        primitive: Option<String>,
    },
    /// A block literal inside a method.
    Block,
}
