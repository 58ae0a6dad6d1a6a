#[macro_use]
extern crate pest_derive;
#[macro_use]
pub mod error;

mod build_config;
pub mod context;
pub mod convert_parse_tree;
pub mod language;
mod parser;
pub mod pass_manager;
pub mod semantic_analysis;
pub mod visit;

pub use build_config::BuildConfig;
pub use context::{CompilationContext, ModuleId, ModuleRegistry};
pub use convert_parse_tree::convert_parse_tree;
pub use error::CompileResult;
pub use parser::{QuillParser, Rule};

use crate::{
    error::{err, ok},
    language::Module,
    pass_manager::{PassManager, PassManagerConfig},
};
use indexmap::IndexSet;
use pest::{error::InputLocation, iterators::Pair, Parser};
use quill_error::{error::CompileError, warning::CompileWarning};
use quill_types::Span;
use std::{hash::Hash, path::PathBuf, sync::Arc};

/// Parses `source` into the pest tree of a whole program.
pub fn parse_tree(source: &Arc<str>) -> Result<Pair<'_, Rule>, CompileError> {
    parse_tree_with_path(source, None)
}

fn parse_tree_with_path(
    source: &Arc<str>,
    path: Option<Arc<PathBuf>>,
) -> Result<Pair<'_, Rule>, CompileError> {
    let mut pairs = QuillParser::parse(Rule::program, source).map_err(|e| {
        let (start, end) = match e.location {
            InputLocation::Pos(pos) => (pos, pos),
            InputLocation::Span(span) => span,
        };
        CompileError::ParseFailure {
            span: Span::new(source.clone(), start, end, path.clone()).unwrap_or_else(Span::dummy),
            err: e.variant.message().to_string(),
        }
    })?;
    pairs
        .next()
        .ok_or_else(|| CompileError::Internal("parser returned no program", Span::dummy()))
}

/// Compiles the source of one module to its analysed AST.
///
/// The module is parsed, built, published under `module_name` and run through the
/// passes of `build_config`. If no pass fails fatally, the analysed module is
/// published again, replacing the built one for later lookups, and returned along
/// with every error the collecting passes recorded in [Module::errors].
///
/// Modules this one imports must have been compiled in `ctx` beforehand.
pub fn compile_to_ast(
    ctx: &CompilationContext,
    source: Arc<str>,
    module_name: &str,
    build_config: &BuildConfig,
) -> CompileResult<Module> {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let program = match parse_tree_with_path(&source, build_config.file_path.clone()) {
        Ok(program) => program,
        Err(e) => return deduped_err(warnings, vec![e]),
    };
    let mut module = check!(
        convert_parse_tree(ctx, program, module_name, source.clone(), Some(build_config)),
        return deduped_err(warnings, errors),
        warnings,
        errors
    );

    let config = PassManagerConfig {
        to_run: build_config.passes.clone(),
        print_passes: build_config.print_passes,
    };
    check!(
        PassManager::with_default_passes().run(ctx, &mut module, &config),
        return deduped_err(warnings, errors),
        warnings,
        errors
    );

    if build_config.print_ast {
        tracing::info!("{module}");
    }
    let id = ctx.registry().publish(module.clone());
    tracing::debug!(
        "analysed module \"{}\" as {:?} with {} error(s)",
        module.name,
        id,
        module.errors.len()
    );

    ok(module, dedup_unsorted(warnings), dedup_unsorted(errors))
}

fn deduped_err<T>(warnings: Vec<CompileWarning>, errors: Vec<CompileError>) -> CompileResult<T> {
    err(dedup_unsorted(warnings), dedup_unsorted(errors))
}

/// Removes duplicates while keeping the first occurrence of each item in place.
fn dedup_unsorted<T: Hash + Eq>(data: Vec<T>) -> Vec<T> {
    data.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// Builds `src` as module `name` in `ctx`, without running any pass.
#[cfg(test)]
pub(crate) fn parse_module_in(ctx: &CompilationContext, name: &str, src: &str) -> Module {
    let source: Arc<str> = Arc::from(src);
    let program = match parse_tree(&source) {
        Ok(program) => program,
        Err(e) => panic!("{e}"),
    };
    let res = convert_parse_tree(ctx, program, name, source.clone(), None);
    assert!(res.errors.is_empty(), "{:?}", res.errors);
    res.value.unwrap()
}

#[cfg(test)]
pub(crate) fn parse_module(src: &str) -> Module {
    parse_module_in(&CompilationContext::new(), "test", src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::*;
    use pretty_assertions::assert_eq;
    use quill_error::type_error::TypeError;

    fn compile_in(ctx: &CompilationContext, name: &str, src: &str) -> CompileResult<Module> {
        compile_to_ast(ctx, Arc::from(src), name, &BuildConfig::default())
    }

    fn compile(src: &str) -> CompileResult<Module> {
        compile_in(&CompilationContext::new(), "test", src)
    }

    fn analysed(src: &str) -> Module {
        let res = compile(src);
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        res.value.unwrap()
    }

    #[test]
    fn syntax_errors_are_reported_with_a_position() {
        let res = compile("fn f( {");
        assert!(res.value.is_none());
        match &res.errors[..] {
            [CompileError::ParseFailure { span, .. }] => assert!(!span.is_dummy()),
            other => panic!("unexpected errors {other:?}"),
        }
    }

    #[test]
    fn inferred_types_flow_through_functions_and_globals() {
        let module = analysed(
            "let total = double(21);
             fn double(x: Int) { x * 2 }
             fn describe() { \"n\" }",
        );
        assert_eq!(module.variables[0].ty, Type::Int32);
        assert_eq!(module.functions[0].return_type, Type::Int32);
        assert_eq!(module.functions[1].return_type, Type::String);
    }

    #[test]
    fn every_reference_is_resolved_after_analysis() {
        let module = analysed(
            "class Point {
                var x: Int = 0;
                fn init(x: Int) { this.x = x; }
                fn get() -> Int { this.x }
            }
            fn f(a: Int) -> Int {
                let p = new Point(a);
                let b = p.get() + a;
                b
            }",
        );
        let f = &module.functions[0];
        let Some(Expression::Reference(reference)) = &f.trailing_expression else {
            panic!("expected a reference");
        };
        assert!(matches!(
            reference.resolved,
            Some(Declaration::Local { ref ty, .. }) if *ty == Type::Int32
        ));
        let Statement::VariableDeclaration(stmt) = &f.statements[0] else {
            panic!("expected a declaration");
        };
        assert!(matches!(
            stmt.variable.ty,
            Type::Clazz(ref clazz) if clazz.name.as_str() == "Point"
        ));
    }

    #[test]
    fn type_check_is_idempotent() {
        let ctx = CompilationContext::new();
        let mut module = parse_module_in(
            &ctx,
            "test",
            "let a = 2;
             fn f(x: Int) { let y = x + a; y < 3 }
             fn g() { f(1); }",
        );
        assert!(semantic_analysis::type_check_module(&ctx, &mut module).is_ok());
        let once = module.clone();
        assert!(semantic_analysis::type_check_module(&ctx, &mut module).is_ok());
        assert_eq!(module, once);
        assert_eq!(module.functions[0].return_type, Type::Bool);
    }

    #[test]
    fn guards_must_be_bool() {
        let res = compile("fn f(x: Int) { if x { g(); } }");
        assert!(res.value.is_none());
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::MismatchedType { .. })]
        ));
    }

    #[test]
    fn initializer_must_match_declared_type() {
        let res = compile("let a: String = 3;");
        match &res.errors[..] {
            [CompileError::TypeError(TypeError::MismatchedType { expected, received, .. })] => {
                assert_eq!(expected, "String");
                assert_eq!(received, "Int");
            }
            other => panic!("unexpected errors {other:?}"),
        }
    }

    #[test]
    fn arithmetic_needs_numbers_and_logic_needs_bools() {
        let res = compile("let a = true + false;");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::InvalidOperandType { .. })]
        ));
        let res = compile("let a = 1 && 2;");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::InvalidOperandType { .. })]
        ));
        let res = compile("let a = 1 + 2.0;");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::MismatchedType { .. })]
        ));
    }

    #[test]
    fn calls_are_checked_against_the_signature() {
        let res = compile("fn f(a: Int) {} fn g() { f(1, 2); }");
        assert!(matches!(
            res.errors[..],
            [CompileError::ArgumentCountMismatch { expected: 1, received: 2, .. }]
        ));
        let res = compile("fn f(a: Int) {} fn g() { f(true); }");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::MismatchedType { .. })]
        ));
        let res = compile("fn g() { missing(); }");
        assert!(matches!(res.errors[..], [CompileError::UnresolvedFunction { .. }]));
    }

    #[test]
    fn declared_return_type_needs_a_value() {
        let res = compile("fn f() -> Int { }");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::MissingReturnValue { .. })]
        ));
    }

    #[test]
    fn unknown_type_names_are_fatal() {
        let res = compile("fn f(p: Nowhere) {}");
        assert!(matches!(
            res.errors[..],
            [CompileError::TypeError(TypeError::UnknownTypeName { .. })]
        ));
    }

    #[test]
    fn members_are_looked_up_on_the_class() {
        let res = compile("class P {} fn f(p: P) { p.go(); }");
        assert!(matches!(res.errors[..], [CompileError::MethodNotFound { .. }]));
        let res = compile("class P {} fn f(p: P) -> Int { p.x }");
        assert!(matches!(res.errors[..], [CompileError::FieldNotFound { .. }]));
    }

    #[test]
    fn folding_runs_after_type_checking() {
        let module = analysed("let a = 6 * 7; fn f(x: Int) -> Int { (x + 5) + 3 }");
        assert_eq!(module.variables[0].initial_expression.as_ref().unwrap().to_string(), "42");
        assert_eq!(
            module.functions[0].trailing_expression.as_ref().unwrap().to_string(),
            "x + 8"
        );
    }

    #[test]
    fn constant_division_by_zero_is_fatal() {
        let res = compile("let a = 10 / (5 - 5);");
        assert!(res.value.is_none());
        assert!(matches!(res.errors[..], [CompileError::DivisionByZero { .. }]));
    }

    #[test]
    fn semantic_errors_are_collected_in_order() {
        let res = compile(
            "var counter = 0;
             class Box { var v: Int = 0; }
             fn f(n: Int) {
                 let fixed = 1;
                 fixed = 2;
                 n = 3;
                 let a = new Box();
                 let b = a;
             }",
        );
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        let module = res.value.unwrap();
        assert!(!module.is_valid());
        let kinds: Vec<_> = module
            .errors
            .iter()
            .map(|e| match e {
                CompileError::GlobalMustBeConstant { .. } => "global",
                CompileError::AssignmentToConstant { .. } => "constant",
                CompileError::AliasedClassInstance { .. } => "alias",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["global", "constant", "constant", "alias"]);
    }

    #[test]
    fn copy_classes_may_be_assigned() {
        let module = analysed(
            "class V : Copy { var v: Int = 0; }
             fn f() { let a = new V(); let b = a; }",
        );
        assert!(module.is_valid(), "{:?}", module.errors);
    }

    #[test]
    fn trait_requirements_are_checked() {
        let module = analysed(
            "trait Shape { fn area() -> Int; fn name() -> String; }
             class Square : Shape, Missing { fn area() -> Int { 4 } }",
        );
        let messages = module.error_messages();
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &module.errors[0],
            CompileError::MissingTraitMethods { missing, .. }
                if missing == &vec!["name".to_string()]
        ));
        assert!(matches!(module.errors[1], CompileError::UnknownTrait { .. }));
    }

    #[test]
    fn unknown_names_are_collected() {
        let module = analysed("fn f() { let a = b + 1; g(c); } fn g(x: Int) {}");
        let unknown: Vec<_> = module
            .errors
            .iter()
            .filter_map(|e| match e {
                CompileError::UnknownVariable { var_name, .. } => Some(var_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(unknown, vec!["b", "c"]);
        assert_eq!(module.errors.len(), 2);
    }

    #[test]
    fn reassigning_an_unknown_name_is_fatal() {
        let res = compile("fn f() { c = 1; }");
        assert!(res.value.is_none());
        assert!(matches!(res.errors[..], [CompileError::UnknownVariable { .. }]));
    }

    #[test]
    fn analysed_module_replaces_the_built_one_in_the_registry() {
        let ctx = CompilationContext::new();
        let res = compile_in(&ctx, "lib", "fn answer() { 42 }");
        assert!(res.is_ok());
        assert_eq!(ctx.registry().len(), 2);
        let published = ctx.registry().get("lib").unwrap();
        assert_eq!(published.functions[0].return_type, Type::Int32);
    }

    #[test]
    fn imported_modules_are_visible_to_later_modules() {
        let ctx = CompilationContext::new();
        let geometry = "class Point { var x: Int = 0; } fn origin() { new Point() }";
        assert!(compile_in(&ctx, "geometry", geometry).is_ok());
        let module = {
            let res = compile_in(
                &ctx,
                "app",
                "import geometry;
                 fn run() -> Int { let p: Point = origin(); p.x }",
            );
            assert!(res.errors.is_empty(), "{:?}", res.errors);
            res.value.unwrap()
        };
        assert!(module.is_valid(), "{:?}", module.errors);
        let res = compile_in(&ctx, "other", "fn run() { origin() }");
        assert!(matches!(res.errors[..], [CompileError::UnresolvedFunction { .. }]));
    }

    #[test]
    fn without_const_folding_skips_the_fold_pass() {
        let res = compile_to_ast(
            &CompilationContext::new(),
            Arc::from("let a = 1 + 2;"),
            "test",
            &BuildConfig::default().without_const_folding(),
        );
        let module = res.value.unwrap();
        let init = module.variables[0].initial_expression.as_ref().unwrap();
        assert_eq!(init.to_string(), "1 + 2");
    }

    #[test]
    fn methods_named_main_are_callable_from_their_class() {
        let module = analysed("class A { fn main() {} fn run() { main(); } }");
        assert!(module.is_valid(), "{:?}", module.errors);
        assert_eq!(module.clazzes[0].methods[0].name.as_str(), "__quill_main");
    }

    #[test]
    fn main_can_be_passed_as_a_value() {
        let module = analysed(
            "fn apply(f: (Void -> Void)) { f(); }
             fn main() {}
             fn run() { apply(main); }",
        );
        assert!(module.is_valid(), "{:?}", module.errors);
    }

    #[test]
    fn this_refers_to_the_enclosing_class_when_names_repeat() {
        let module = analysed(
            "class P { var x: Int = 0; fn get() -> Int { this.x } }
             class P { var y: Bool = true; fn get() -> Bool { this.y } }",
        );
        assert!(module.is_valid(), "{:?}", module.errors);
        assert_eq!(module.clazzes[0].methods[0].return_type, Type::Int32);
        assert_eq!(module.clazzes[1].methods[0].return_type, Type::Bool);
    }

    #[test]
    fn only_mutable_globals_are_errors() {
        let module = analysed("var a = 7;");
        assert!(!module.errors.is_empty());
        let module = analysed("let a = 7; let b = a * 2; let c = \"c\";");
        assert_eq!(module.errors, vec![]);
    }

    #[test]
    fn duplicate_warnings_are_reported_once() {
        let warnings = vec!["a", "b", "a", "c", "b"];
        assert_eq!(dedup_unsorted(warnings), vec!["a", "b", "c"]);
    }
}
