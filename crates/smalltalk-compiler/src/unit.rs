//! Compiled unit model.
//!
//! The output of code generation: one [`CompiledClass`] per class, holding
//! its literal pool and a [`CompiledBlock`] per method. A method's
//! `blocks` table holds every block literal nested anywhere inside it, in
//! the order the `block` instruction indexes them.

use smalltalk_ast::{BlockKind, ScopeId, SymbolTable};

use crate::bytecode::{Instruction, disassemble};

/// Compiled code for one method or block.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledBlock {
    /// Selector for methods, `selector-blockN` for nested blocks
    pub name: String,
    /// Diagnostic name such as `Point>>x:y:` or `Point>>do:[block 0]`
    pub qualified_name: String,
    /// Name of the class owning the code
    pub class_name: String,
    pub num_args: usize,
    pub num_locals: usize,
    /// Whether the owning method is on the class side
    pub is_class_method: bool,
    /// VM primitive name; primitive methods carry no bytecode
    pub primitive: Option<String>,
    pub bytecode: Vec<u8>,
    /// Nested blocks of a method, indexed by `block` operands.
    /// Always empty for the blocks themselves.
    pub blocks: Vec<CompiledBlock>,
}

impl CompiledBlock {
    /// Create an empty unit carrying the metadata of `scope`.
    pub(crate) fn for_scope(table: &SymbolTable, scope: ScopeId, class_name: &str) -> Self {
        let data = table.scope(scope).as_block();
        let (name, is_class_method, primitive) = match data.map(|b| &b.kind) {
            Some(BlockKind::Method {
                selector,
                is_class_method,
                primitive,
            }) => (selector.clone(), *is_class_method, primitive.clone()),
            Some(BlockKind::Block) => {
                let method = table.enclosing_method(scope);
                let (selector, is_class_method) = match method
                    .and_then(|m| table.scope(m).as_block())
                    .map(|b| &b.kind)
                {
                    Some(BlockKind::Method {
                        selector,
                        is_class_method,
                        ..
                    }) => (selector.as_str(), *is_class_method),
                    _ => ("", false),
                };
                let index = data.map_or(0, |b| b.index);
                (format!("{selector}-block{index}"), is_class_method, None)
            }
            None => (String::new(), false, None),
        };

        Self {
            name,
            qualified_name: table.qualified_name(scope),
            class_name: class_name.to_string(),
            num_args: data.map_or(0, |b| b.num_args()),
            num_locals: data.map_or(0, |b| b.num_locals()),
            is_class_method,
            primitive,
            bytecode: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Check if the VM implements this method natively.
    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    /// Decode the bytecode.
    pub fn instructions(&self) -> Vec<Instruction> {
        Instruction::decode_all(&self.bytecode)
    }

    /// Listing of this unit and its nested blocks against the class literals.
    pub fn disassemble(&self, literals: &[String]) -> String {
        let mut out = format!("{}:\n", self.qualified_name);
        if let Some(primitive) = &self.primitive {
            out.push_str(&format!("  <primitive: {primitive}>\n"));
        }
        out.push_str(&disassemble(&self.bytecode, literals));
        for block in &self.blocks {
            out.push_str(&block.disassemble(literals));
        }
        out
    }
}

/// Compiled code and layout of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClass {
    pub name: String,
    pub superclass: Option<String>,
    /// Instance variable names in layout order, inherited first
    pub fields: Vec<String>,
    /// Literal pool shared by every method of the class
    pub literals: Vec<String>,
    /// Instance and class-side methods in definition order
    pub methods: Vec<CompiledBlock>,
    /// Code of the class body itself
    pub body: Vec<u8>,
}

impl CompiledClass {
    /// Find an instance-side method.
    pub fn method(&self, selector: &str) -> Option<&CompiledBlock> {
        self.methods
            .iter()
            .find(|m| !m.is_class_method && m.name == selector)
    }

    /// Find a class-side method.
    pub fn class_method(&self, selector: &str) -> Option<&CompiledBlock> {
        self.methods
            .iter()
            .find(|m| m.is_class_method && m.name == selector)
    }

    /// Look up a literal by index.
    pub fn literal(&self, index: u16) -> Option<&str> {
        self.literals.get(index as usize).map(String::as_str)
    }

    /// Listing of every method of the class.
    pub fn disassemble(&self) -> String {
        self.methods
            .iter()
            .map(|m| m.disassemble(&self.literals))
            .collect()
    }
}

/// Every class compiled from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledProgram {
    pub classes: Vec<CompiledClass>,
}

impl CompiledProgram {
    /// Find a class by name.
    pub fn class(&self, name: &str) -> Option<&CompiledClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// The compiled top-level statements, if the file had any.
    pub fn main(&self) -> Option<&CompiledBlock> {
        self.class(smalltalk_ast::MAIN_CLASS)?
            .method(smalltalk_ast::MAIN_SELECTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smalltalk_core::Span;

    #[test]
    fn method_metadata_comes_from_scope() {
        let mut table = SymbolTable::new();
        let class = table.define_class("Point", Span::default()).unwrap();
        let method = table
            .define_method(class, "x:y:", false, None, Span::default())
            .unwrap();
        table.define_arg(method, "ax", Span::default()).unwrap();
        table.define_arg(method, "ay", Span::default()).unwrap();
        table.define_local(method, "t", Span::default()).unwrap();
        let block = table.define_block(method, Span::default()).unwrap();

        let unit = CompiledBlock::for_scope(&table, method, "Point");
        assert_eq!(unit.name, "x:y:");
        assert_eq!(unit.qualified_name, "Point>>x:y:");
        assert_eq!((unit.num_args, unit.num_locals), (2, 1));
        assert!(!unit.is_primitive());

        let unit = CompiledBlock::for_scope(&table, block, "Point");
        assert_eq!(unit.name, "x:y:-block0");
        assert_eq!(unit.qualified_name, "Point>>x:y:[block 0]");
        assert_eq!((unit.num_args, unit.num_locals), (0, 0));
    }

    #[test]
    fn class_side_lookup() {
        let mut table = SymbolTable::new();
        let class = table.define_class("Point", Span::default()).unwrap();
        let new = table
            .define_method(class, "new", true, None, Span::default())
            .unwrap();
        let x = table
            .define_method(class, "x", false, None, Span::default())
            .unwrap();

        let compiled = CompiledClass {
            name: "Point".into(),
            superclass: None,
            fields: vec![],
            literals: vec![],
            methods: vec![
                CompiledBlock::for_scope(&table, new, "Point"),
                CompiledBlock::for_scope(&table, x, "Point"),
            ],
            body: vec![],
        };
        assert!(compiled.class_method("new").is_some());
        assert!(compiled.method("new").is_none());
        assert!(compiled.method("x").is_some());
    }
}
