//! The scope/symbol arena and name resolution.

use rustc_hash::FxHashMap;
use smalltalk_core::{CompilationError, Span};

use super::scope::{BlockKind, BlockScope, ClassScope, Scope, ScopeKind};
use super::{ScopeId, Symbol, SymbolId, SymbolKind};

type Result<T> = std::result::Result<T, CompilationError>;

/// Outcome of resolving a name from a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The binding found
    pub symbol: SymbolId,
    /// Enclosing-scope hops from the lookup scope to the declaring scope
    pub delta: u32,
}

/// All scopes and symbols of one compilation.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    classes: FxHashMap<String, ScopeId>,
    globals: ScopeId,
}

impl SymbolTable {
    /// Create a table holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, Span::default(), ScopeKind::Global)],
            symbols: Vec::new(),
            classes: FxHashMap::default(),
            globals: ScopeId(0),
        }
    }

    /// The global scope.
    pub fn globals(&self) -> ScopeId {
        self.globals
    }

    /// Get a scope by id.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Get a symbol by id.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Number of scopes, including the global scope.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Class scopes in definition order.
    pub fn classes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.scope(self.globals)
            .symbols()
            .iter()
            .filter_map(|&sym| self.class_named(&self.symbol(sym).name))
    }

    /// Find a class scope by name.
    pub fn class_named(&self, name: &str) -> Option<ScopeId> {
        self.classes.get(name).copied()
    }

    // =========================================================================
    // Definition
    // =========================================================================

    fn push_scope(&mut self, enclosing: Option<ScopeId>, span: Span, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(enclosing, span, kind));
        id
    }

    fn add_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        index: u32,
        span: Span,
    ) -> Result<SymbolId> {
        if self.scope(scope).get(name).is_some() {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                scope: self.qualified_name(scope),
                span,
            });
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            scope,
            index,
        });
        let record = &mut self.scopes[scope.index()];
        record.by_name.insert(name.to_string(), id);
        record.symbols.push(id);
        Ok(id)
    }

    fn class_mut(&mut self, class: ScopeId, span: Span) -> Result<&mut ClassScope> {
        self.scopes[class.index()]
            .as_class_mut()
            .ok_or(CompilationError::MissingScope {
                node: "class",
                span,
            })
    }

    fn block_mut(&mut self, block: ScopeId, span: Span) -> Result<&mut BlockScope> {
        self.scopes[block.index()]
            .as_block_mut()
            .ok_or(CompilationError::MissingScope {
                node: "block",
                span,
            })
    }

    /// Define a class in the global scope.
    pub fn define_class(&mut self, name: &str, span: Span) -> Result<ScopeId> {
        let index = self.scope(self.globals).symbols().len() as u32;
        self.add_symbol(self.globals, name, SymbolKind::Class, index, span)?;
        let id = self.push_scope(
            Some(self.globals),
            span,
            ScopeKind::Class(ClassScope::new(name.to_string())),
        );
        self.classes.insert(name.to_string(), id);
        Ok(id)
    }

    /// Link `class` to its superclass, rejecting inheritance cycles.
    pub fn set_superclass(&mut self, class: ScopeId, superclass: ScopeId, span: Span) -> Result<()> {
        if class == superclass || self.superclasses(superclass).any(|s| s == class) {
            let name = self
                .scope(class)
                .as_class()
                .map(|c| c.name.clone())
                .unwrap_or_default();
            return Err(CompilationError::CircularInheritance { name, span });
        }
        if self.scope(superclass).as_class().is_none() {
            return Err(CompilationError::MissingScope {
                node: "superclass",
                span,
            });
        }
        self.class_mut(class, span)?.superclass = Some(superclass);
        Ok(())
    }

    /// Define an instance variable of `class`.
    pub fn define_field(&mut self, class: ScopeId, name: &str, span: Span) -> Result<SymbolId> {
        let index = self.class_mut(class, span)?.fields.len() as u32;
        let id = self.add_symbol(class, name, SymbolKind::Field, index, span)?;
        self.class_mut(class, span)?.fields.push(id);
        Ok(id)
    }

    /// Define a method of `class` and return its body scope.
    pub fn define_method(
        &mut self,
        class: ScopeId,
        selector: &str,
        is_class_method: bool,
        primitive: Option<&str>,
        span: Span,
    ) -> Result<ScopeId> {
        let exists = {
            let record = self.class_mut(class, span)?;
            let table = if is_class_method {
                &record.class_methods
            } else {
                &record.methods
            };
            table.contains_key(selector)
        };
        if exists {
            return Err(CompilationError::DuplicateDefinition {
                name: selector.to_string(),
                scope: self.qualified_name(class),
                span,
            });
        }

        let kind = BlockKind::Method {
            selector: selector.to_string(),
            is_class_method,
            primitive: primitive.map(str::to_string),
        };
        let id = self.push_scope(Some(class), span, ScopeKind::Block(BlockScope::new(kind, 0)));

        let record = self.class_mut(class, span)?;
        if is_class_method {
            record.class_methods.insert(selector.to_string(), id);
        } else {
            record.methods.insert(selector.to_string(), id);
        }
        record.method_order.push(id);
        Ok(id)
    }

    /// Define a block literal nested in `enclosing` (a method or block).
    ///
    /// The new block takes the next free slot of the owning method's
    /// nested-block table, and every scope from `enclosing` up to that method
    /// counts one more nested block.
    pub fn define_block(&mut self, enclosing: ScopeId, span: Span) -> Result<ScopeId> {
        let method = self
            .enclosing_method(enclosing)
            .ok_or(CompilationError::MissingScope {
                node: "method",
                span,
            })?;
        let index = self.block_mut(method, span)?.nested_blocks;

        let mut current = Some(enclosing);
        while let Some(id) = current {
            self.block_mut(id, span)?.nested_blocks += 1;
            if id == method {
                break;
            }
            current = self.scope(id).enclosing;
        }

        Ok(self.push_scope(
            Some(enclosing),
            span,
            ScopeKind::Block(BlockScope::new(BlockKind::Block, index)),
        ))
    }

    /// Define a parameter of a method or block.
    pub fn define_arg(&mut self, block: ScopeId, name: &str, span: Span) -> Result<SymbolId> {
        let index = self.block_mut(block, span)?.args.len() as u32;
        let id = self.add_symbol(block, name, SymbolKind::Argument, index, span)?;
        self.block_mut(block, span)?.args.push(id);
        Ok(id)
    }

    /// Define a temporary of a method or block.
    pub fn define_local(&mut self, block: ScopeId, name: &str, span: Span) -> Result<SymbolId> {
        let index = self.block_mut(block, span)?.locals.len() as u32;
        let id = self.add_symbol(block, name, SymbolKind::Local, index, span)?;
        self.block_mut(block, span)?.locals.push(id);
        Ok(id)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Look `name` up in `scope` only; class scopes also search inherited fields.
    fn lookup_in(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let record = self.scope(scope);
        if let Some(symbol) = record.get(name) {
            return Some(symbol);
        }
        if record.as_class().is_some() {
            return self
                .superclasses(scope)
                .find_map(|class| self.scope(class).get(name));
        }
        None
    }

    /// Resolve `name` starting at `from` and walking enclosing scopes outward.
    pub fn resolve(&self, name: &str, from: ScopeId) -> Option<Resolution> {
        let mut current = Some(from);
        let mut delta = 0;
        while let Some(scope) = current {
            if let Some(symbol) = self.lookup_in(scope, name) {
                return Some(Resolution { symbol, delta });
            }
            current = self.scope(scope).enclosing;
            delta += 1;
        }
        None
    }

    /// Number of enclosing-scope hops from `from` to the scope binding `name`.
    pub fn scope_delta(&self, name: &str, from: ScopeId) -> Option<u32> {
        self.resolve(name, from).map(|r| r.delta)
    }

    /// Superclass chain of `class`, nearest first, excluding `class` itself.
    pub fn superclasses(&self, class: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(self.superclass_of(class), |&c| self.superclass_of(c))
    }

    fn superclass_of(&self, class: ScopeId) -> Option<ScopeId> {
        self.scope(class).as_class().and_then(|c| c.superclass)
    }

    fn own_field_count(&self, class: ScopeId) -> u32 {
        self.scope(class)
            .as_class()
            .map_or(0, |c| c.fields.len() as u32)
    }

    /// Fields `class` inherits from its whole superclass chain.
    pub fn inherited_field_count(&self, class: ScopeId) -> u32 {
        self.superclasses(class)
            .map(|c| self.own_field_count(c))
            .sum()
    }

    /// Total instance size of `class`: inherited plus own fields.
    pub fn num_fields(&self, class: ScopeId) -> u32 {
        self.inherited_field_count(class) + self.own_field_count(class)
    }

    /// Field names in object layout order: inherited first, root class first.
    pub fn field_names(&self, class: ScopeId) -> Vec<String> {
        let mut chain: Vec<ScopeId> = self.superclasses(class).collect();
        chain.reverse();
        chain.push(class);
        chain
            .into_iter()
            .filter_map(|c| self.scope(c).as_class())
            .flat_map(|c| c.fields.iter().map(|&f| self.symbol(f).name.clone()))
            .collect()
    }

    /// Object-layout offset of a field visible from `class`.
    ///
    /// The offset counts every field of the superclass chain before the
    /// declaring class's own fields.
    pub fn field_offset(&self, class: ScopeId, name: &str) -> Option<u32> {
        std::iter::once(class)
            .chain(self.superclasses(class))
            .find_map(|owner| {
                let symbol = self.scope(owner).get(name)?;
                let symbol = self.symbol(symbol);
                (symbol.kind == SymbolKind::Field)
                    .then(|| self.inherited_field_count(owner) + symbol.index)
            })
    }

    /// Activation slot of an argument or temporary: arguments first, then
    /// temporaries, each in declaration order.
    pub fn local_index(&self, symbol: SymbolId) -> Option<u32> {
        let symbol = self.symbol(symbol);
        match symbol.kind {
            SymbolKind::Argument => Some(symbol.index),
            SymbolKind::Local => {
                let block = self.scope(symbol.scope).as_block()?;
                Some(block.args.len() as u32 + symbol.index)
            }
            SymbolKind::Field | SymbolKind::Class => None,
        }
    }

    /// The innermost method scope containing `scope` (inclusive).
    pub fn enclosing_method(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id).is_method() {
                return Some(id);
            }
            current = self.scope(id).enclosing;
        }
        None
    }

    /// The class scope containing `scope` (inclusive).
    pub fn enclosing_class(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id).as_class().is_some() {
                return Some(id);
            }
            current = self.scope(id).enclosing;
        }
        None
    }

    /// Human-readable name of a scope, e.g. `Point>>x:y:` or `Point>>do:[block 1]`.
    pub fn qualified_name(&self, scope: ScopeId) -> String {
        let record = self.scope(scope);
        match &record.kind {
            ScopeKind::Global => "<global>".to_string(),
            ScopeKind::Class(class) => class.name.clone(),
            ScopeKind::Block(block) => match &block.kind {
                BlockKind::Method {
                    selector,
                    is_class_method,
                    ..
                } => {
                    let class = record
                        .enclosing
                        .map(|c| self.qualified_name(c))
                        .unwrap_or_default();
                    let side = if *is_class_method { " class" } else { "" };
                    format!("{class}{side}>>{selector}")
                }
                BlockKind::Block => {
                    let method = self
                        .enclosing_method(scope)
                        .map(|m| self.qualified_name(m))
                        .unwrap_or_default();
                    format!("{method}[block {}]", block.index)
                }
            },
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
