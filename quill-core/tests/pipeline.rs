use pretty_assertions::assert_eq;
use quill_core::{
    compile_to_ast,
    language::{Declaration, Expression, Module, Statement, Type},
    visit::Visitor,
    BuildConfig, CompilationContext, CompileResult,
};
use quill_error::{error::CompileError, warning::Warning};
use rayon::prelude::*;
use std::sync::Arc;

fn compile_in(ctx: &CompilationContext, name: &str, src: &str) -> CompileResult<Module> {
    compile_to_ast(ctx, Arc::from(src), name, &BuildConfig::default())
}

fn compiled(ctx: &CompilationContext, name: &str, src: &str) -> Module {
    let res = compile_in(ctx, name, src);
    assert!(res.errors.is_empty(), "{:?}", res.errors);
    res.value.unwrap()
}

/// Counts the references left without a declaration.
#[derive(Default)]
struct Unresolved(Vec<String>);

impl Visitor for Unresolved {
    fn visit_reference(&mut self, reference: &quill_core::language::Reference) {
        if !reference.is_resolved() {
            self.0.push(reference.name.to_string());
        }
    }

    fn visit_function_call(&mut self, call: &quill_core::language::FunctionCallExpression) {
        self.visit_reference(&call.name);
        for arg in &call.arguments {
            self.visit_expression(arg);
        }
    }
}

#[test]
fn analysed_modules_have_no_unresolved_references() {
    let ctx = CompilationContext::new();
    let module = compiled(
        &ctx,
        "bank",
        "let rate = 3;
         class Account {
             var balance: Int = 0;
             fn init(start: Int) { this.balance = start; }
             fn deposit(amount: Int) { balance = balance + amount * rate; }
             fn total() -> Int { this.balance }
         }
         fn open() -> Int {
             let account = new Account(10);
             account.deposit(5);
             if account.total() > 20 { account.deposit(1); }
             account.total()
         }",
    );
    assert!(module.is_valid(), "{:?}", module.errors);
    let mut unresolved = Unresolved::default();
    unresolved.visit_module(&module);
    assert_eq!(unresolved.0, Vec::<String>::new());
}

#[test]
fn shadowing_picks_the_nearest_declaration() {
    let ctx = CompilationContext::new();
    let module = compiled(
        &ctx,
        "shadow",
        "let x = true;
         fn f(x: Int) -> Int {
             { let x = 'c'; }
             x
         }",
    );
    let f = &module.functions[0];
    assert_eq!(f.return_type, Type::Int32);
    let Some(Expression::Reference(reference)) = &f.trailing_expression else {
        panic!("expected a reference");
    };
    assert!(matches!(reference.resolved, Some(Declaration::Formal { .. })));
    let Statement::Block(block) = &f.statements[0] else {
        panic!("expected a block");
    };
    let Statement::VariableDeclaration(stmt) = &block.statements[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(stmt.variable.ty, Type::Char);
}

#[test]
fn builder_warnings_survive_the_pipeline() {
    let ctx = CompilationContext::new();
    let res = compile_in(
        &ctx,
        "warned",
        "let a = 1;
         let a = 2;
         @inline fn f() {}
         @fast fn g() {}",
    );
    assert!(res.errors.is_empty(), "{:?}", res.errors);
    let kinds: Vec<_> = res
        .warnings
        .iter()
        .map(|w| match w.warning_content {
            Warning::ShadowsOtherSymbol { .. } => "shadow",
            Warning::UnknownAttribute { .. } => "attribute",
            Warning::ConstructorOverridden { .. } => "constructor",
        })
        .collect();
    assert_eq!(kinds, vec!["shadow", "attribute"]);
}

#[test]
fn program_of_several_modules_compiles_in_import_order() {
    let ctx = CompilationContext::new();
    compiled(&ctx, "units", "let scale = 1000; fn kilo(n: Int) -> Int { n * scale }");
    compiled(
        &ctx,
        "distance",
        "import units;
         class Meters : Copy { var value: Int = 0; fn init(v: Int) { this.value = v; } }
         fn km(n: Int) -> Meters { new Meters(kilo(n)) }",
    );
    let app = compiled(
        &ctx,
        "app",
        "import distance;
         fn run() -> Int { let d = km(3); let e = d; e.value }",
    );
    assert!(app.is_valid(), "{:?}", app.errors);
    assert_eq!(ctx.registry().len(), 6);
    for name in ["units", "distance", "app"] {
        let published = ctx.registry().get(name);
        assert!(published.map_or(false, |module| module.is_valid()), "{name}");
    }
}

#[test]
fn contexts_are_independent_and_can_compile_in_parallel() {
    let results: Vec<_> = (0..16)
        .into_par_iter()
        .map(|i| {
            let ctx = CompilationContext::new();
            compiled(&ctx, "lib", &format!("fn value() -> Int {{ {i} * 2 }}"));
            let app = compiled(&ctx, "app", "import lib; fn run() { value() }");
            (i, app.functions[0].return_type.clone(), ctx.registry().len())
        })
        .collect();
    for (i, ty, len) in results {
        assert_eq!(ty, Type::Int32, "context {i}");
        assert_eq!(len, 4);
    }
}

#[test]
fn fatal_errors_stop_before_collecting() {
    let ctx = CompilationContext::new();
    let res = compile_in(&ctx, "broken", "var g = 1; fn f() -> Bool { 1 }");
    assert!(res.value.is_none());
    assert!(matches!(res.errors[..], [CompileError::TypeError(_)]));
    // Only the built module was published.
    assert_eq!(ctx.registry().len(), 1);
}
