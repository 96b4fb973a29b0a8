//! Performance benchmarks for definition and code generation.
//!
//! Programs are built directly with `AstBuilder`, so the numbers cover only
//! the symbol table pass and bytecode generation.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use smalltalk::ast::{Expr, File, MethodDef};
use smalltalk::prelude::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `x: ax y: ay  | t | t := ax + ay * 2. ^Point x: t y: (ay max: ax)`
fn arithmetic_method<'ast>(b: &AstBuilder<'ast>, selector: &str) -> MethodDef<'ast> {
    let sum = b.binary(b.name("ax"), &[("+", b.name("ay")), ("*", b.number("2"))]);
    let max = b.keyword(b.name("ay"), &[("max:", b.name("ax"))]);
    let body = b.body(
        &["t"],
        &[
            b.stmt(b.assign("t", sum)),
            b.stmt(b.assign("count", b.binary(b.name("count"), &[("+", b.number("1"))]))),
            b.ret(b.keyword(b.name("Point"), &[("x:", b.name("t")), ("y:", max)])),
        ],
    );
    let x = format!("{selector}x:");
    b.method(b.keyword_pattern(&[(x.as_str(), "ax"), ("y:", "ay")]), body)
}

/// A block nested `depth` levels deep, the innermost reading the method argument.
fn nested_block<'ast>(b: &AstBuilder<'ast>, depth: usize) -> Expr<'ast> {
    let mut expr = b.unary(b.name("n"), "printString");
    for _ in 0..depth {
        expr = b.block(&[], &[], &[b.stmt(expr)]);
    }
    expr
}

fn program<'ast>(b: &AstBuilder<'ast>, classes: usize, methods: usize) -> File<'ast> {
    let defs = (0..classes)
        .map(|c| {
            let methods = (0..methods)
                .map(|m| arithmetic_method(b, &format!("m{m}")))
                .collect();
            b.class(&format!("Class{c}"), None, &["count"], methods)
        })
        .collect();
    b.file(defs, None)
}

fn class_count_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("codegen/class_count");

    for classes in [1, 10, 100] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let file = program(&b, classes, 20);

        group.throughput(Throughput::Elements((classes * 20) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(classes), &file, |bench, file| {
            bench.iter(|| {
                let result = Compiler::compile(black_box(file), CodegenOptions::default());
                end_profiling_frame();
                black_box(result.program.classes.len())
            });
        });
    }

    group.finish();
}

fn block_depth_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("codegen/block_depth");

    for depth in [1, 8, 64] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let method = b.method(
            b.keyword_pattern(&[("run:", "n")]),
            b.body(&[], &[b.stmt(nested_block(&b, depth))]),
        );
        let file = b.file(vec![b.class("Nest", None, &[], vec![method])], None);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &file, |bench, file| {
            bench.iter(|| {
                let result = Compiler::compile(black_box(file), CodegenOptions::default());
                end_profiling_frame();
                black_box(result.is_success())
            });
        });
    }

    group.finish();
}

fn debug_info_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let file = program(&b, 10, 20);
    let options = CodegenOptions::default()
        .with_debug_info(true)
        .with_file_name("bench.st");

    c.bench_function("codegen/debug_info", |bench| {
        bench.iter(|| {
            let result = Compiler::compile(black_box(&file), options.clone());
            end_profiling_frame();
            black_box(result.program.classes.len())
        });
    });
}

criterion_group!(
    benches,
    class_count_benchmarks,
    block_depth_benchmarks,
    debug_info_benchmarks
);

criterion_main!(benches);
