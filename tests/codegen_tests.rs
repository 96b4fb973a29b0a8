//! End-to-end tests: build a syntax tree, define it, generate code.
//!
//! These tests check whole programs through `Compiler::compile`, the way a
//! front end would drive it.

use smalltalk::prelude::*;
use smalltalk::{Span, ast::File};

fn compile_ok(file: &File<'_>) -> CompiledProgram {
    let result = Compiler::compile(file, CodegenOptions::default());
    assert!(result.is_success(), "errors: {:?}", result.errors);
    result.program
}

fn code(unit: &CompiledBlock) -> Code {
    unit.instructions().into_iter().collect()
}

// =============================================================================
// Whole classes
// =============================================================================

#[test]
fn counter_class() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // init  count := 0
    let init = b.unary_method("init", b.body(&[], &[b.stmt(b.assign("count", b.number("0")))]));
    // increment  count := count + 1. ^count
    let increment = b.unary_method(
        "increment",
        b.body(
            &[],
            &[
                b.stmt(b.assign("count", b.binary(b.name("count"), &[("+", b.number("1"))]))),
                b.ret(b.name("count")),
            ],
        ),
    );
    // Counter class >> new  ^super new init
    let new = b
        .unary_method(
            "new",
            b.body(&[], &[b.ret(b.unary(b.unary(b.super_ref(), "new"), "init"))]),
        )
        .class_side();
    let file = b.file(
        vec![
            b.class("Object", None, &[], vec![]),
            b.class("Counter", Some("Object"), &["count"], vec![init, increment, new]),
        ],
        None,
    );

    let program = compile_ok(&file);
    let counter = program.class("Counter").unwrap();
    assert_eq!(counter.fields, vec!["count"]);

    code(counter.method("increment").unwrap()).assert_opcodes(&[
        OpCode::PushField,
        OpCode::PushInt,
        OpCode::Send,
        OpCode::StoreField,
        OpCode::Pop,
        OpCode::PushField,
        OpCode::Return,
        OpCode::Pop,
        OpCode::PushSelf,
        OpCode::Return,
    ]);

    let new = counter.class_method("new").unwrap();
    code(new).assert_opcodes(&[
        OpCode::PushSelf,
        OpCode::SendSuper,
        OpCode::Send,
        OpCode::Return,
        OpCode::Pop,
        OpCode::PushSelf,
        OpCode::Return,
    ]);
    let ins = new.instructions();
    let Instruction::SendSuper { argc: 0, selector } = ins[1] else {
        panic!("expected send_super, got {}", ins[1]);
    };
    assert_eq!(counter.literal(selector), Some("new"));
}

#[test]
fn collection_iteration_with_blocks() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // sum  | total | total := 0. items do: [:each | total := total + each]. ^total
    let loop_body = b.block(
        &["each"],
        &[],
        &[b.stmt(b.assign("total", b.binary(b.name("total"), &[("+", b.name("each"))])))],
    );
    let sum = b.unary_method(
        "sum",
        b.body(
            &["total"],
            &[
                b.stmt(b.assign("total", b.number("0"))),
                b.stmt(b.keyword(b.name("items"), &[("do:", loop_body)])),
                b.ret(b.name("total")),
            ],
        ),
    );
    let file = b.file(vec![b.class("Bag", None, &["items"], vec![sum])], None);

    let program = compile_ok(&file);
    let bag = program.class("Bag").unwrap();
    let sum = bag.method("sum").unwrap();

    assert_eq!(sum.blocks.len(), 1);
    assert_eq!(sum.num_locals, 1);
    assert_eq!(
        sum.blocks[0].instructions(),
        vec![
            Instruction::PushLocal { delta: 1, slot: 0 },
            Instruction::PushLocal { delta: 0, slot: 0 },
            Instruction::Send { argc: 1, selector: 0 },
            Instruction::StoreLocal { delta: 1, slot: 0 },
            Instruction::BlockReturn,
        ]
    );
    assert_eq!(bag.literals, vec!["+", "do:"]);
    assert!(sum.instructions().contains(&Instruction::Block { index: 0 }));
}

#[test]
fn top_level_statements() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = b.main(b.body(
        &["a"],
        &[
            b.stmt(b.assign("a", b.array(&[b.number("1"), b.number("2.5"), b.char('z')]))),
            b.stmt(b.keyword(b.name("Transcript"), &[("show:", b.name("a"))])),
        ],
    ));
    let file = b.file(vec![], Some(main));

    let program = compile_ok(&file);
    let main = program.main().unwrap();
    assert_eq!(
        main.instructions(),
        vec![
            Instruction::PushInt(1),
            Instruction::PushFloat(2.5),
            Instruction::PushChar { literal: 0 },
            Instruction::PushArray { count: 3 },
            Instruction::StoreLocal { delta: 0, slot: 0 },
            Instruction::Pop,
            Instruction::PushGlobal { literal: 1 },
            Instruction::PushLocal { delta: 0, slot: 0 },
            Instruction::Send { argc: 1, selector: 2 },
            Instruction::Pop,
            Instruction::PushSelf,
            Instruction::Return,
        ]
    );
    assert_eq!(
        program.class("MainClass").unwrap().literals,
        vec!["$z", "Transcript", "show:"]
    );
}

#[test]
fn empty_file_compiles_to_nothing() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let file = b.file(vec![], None);

    let program = compile_ok(&file);
    assert!(program.classes.is_empty());
    assert!(program.main().is_none());
}

// =============================================================================
// Debug info and listings
// =============================================================================

#[test]
fn debug_info_and_disassembly() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    b.at(5, 3);
    let method = b.method(
        b.keyword_pattern(&[("at:", "i"), ("put:", "v")]),
        b.body(&[], &[b.stmt(b.assign("slot", b.name("v")))]),
    );
    let file = b.file(vec![b.class("Cell", None, &["slot"], vec![method])], None);

    let options = CodegenOptions::default()
        .with_debug_info(true)
        .with_file_name("cell.st");
    let result = Compiler::compile(&file, options);
    assert!(result.is_success());

    let cell = result.program.class("Cell").unwrap();
    let put = cell.method("at:put:").unwrap();
    assert_eq!(
        put.instructions()[2],
        Instruction::Dbg {
            file: 0,
            line: 5,
            col: 3
        }
    );

    let listing = cell.disassemble();
    assert!(listing.starts_with("Cell>>at:put:\n"));
    assert!(listing.contains("push_local 0, 1"));
    assert!(listing.contains("store_field 0"));
    assert!(listing.contains("dbg #0, 5:3 'cell.st'"));
}

#[test]
fn primitive_listing() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let prim = b.primitive_method(b.unary_pattern("class"), "Object_Class");
    let file = b.file(vec![b.class("Object", None, &[], vec![prim])], None);

    let program = compile_ok(&file);
    let object = program.class("Object").unwrap();
    assert_eq!(
        object.disassemble(),
        "Object>>class:\n  <primitive: Object_Class>\n"
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn definition_errors_stop_compilation() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    b.at(2, 0);
    let file = b.file(
        vec![
            b.class("Fine", None, &[], vec![]),
            b.class("Orphan", Some("Nobody"), &[], vec![]),
        ],
        None,
    );

    let result = Compiler::compile(&file, CodegenOptions::default());
    assert!(!result.is_success());
    assert!(result.program.classes.is_empty());
    assert_eq!(
        result.errors,
        vec![CompilationError::UnknownClass {
            name: "Nobody".into(),
            span: Span::new(2, 0, 1),
        }]
    );
}

#[test]
fn circular_inheritance_is_rejected() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let file = b.file(
        vec![
            b.class("A", Some("B"), &[], vec![]),
            b.class("B", Some("A"), &[], vec![]),
        ],
        None,
    );

    let result = Compiler::compile(&file, CodegenOptions::default());
    assert!(matches!(
        &result.errors[..],
        [CompilationError::CircularInheritance { .. }]
    ));
}

#[test]
fn duplicate_fields_are_rejected() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let file = b.file(vec![b.class("A", None, &["x", "x"], vec![])], None);

    let result = Compiler::compile(&file, CodegenOptions::default());
    assert_eq!(
        result.errors[0].to_string(),
        "at 1:0: 'x' is already defined in A"
    );
}

#[test]
fn generation_errors_keep_other_classes() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let bad = b.unary_method("bad", b.body(&[], &[b.stmt(b.number("1e999"))]));
    let ok = b.unary_method("ok", b.body(&[], &[b.ret(b.true_lit())]));
    let main = b.main(b.body(&[], &[b.stmt(b.nil())]));
    let file = b.file(
        vec![b.class("Bad", None, &[], vec![bad]), b.class("Good", None, &[], vec![ok])],
        Some(main),
    );

    let result = Compiler::compile(&file, CodegenOptions::default());
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], CompilationError::InvalidLiteral { .. }));
    assert!(result.program.class("Good").is_some());
    assert!(result.program.main().is_some());
}
