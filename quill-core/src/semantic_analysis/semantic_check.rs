//! Checks that collect every violation instead of stopping at the first one.
//!
//! The pass runs after type checking, so variable types are known, and reports:
//! globals that are not constants, class instances that would be aliased by a plain
//! `=`, assignments to constants, references to undeclared names, traits that do not
//! exist or are not fully implemented, and variables whose type could not be inferred.

use super::namespace::{self, ClazzScope, LocalScope, Scope};
use crate::{
    error::{ok, CompileResult},
    language::*,
    visit::{self, Visitor},
    CompilationContext,
};
use quill_error::{error::CompileError, type_error::TypeError};
use quill_types::{constants, Ident, Spanned};

/// Runs the checks over `module` and returns everything found as non-fatal errors.
pub fn semantic_check_module(ctx: &CompilationContext, module: &mut Module) -> CompileResult<()> {
    let module: &Module = module;
    let mut checker = SemanticChecker::new(ctx, module);
    checker.visit_module(module);
    ok((), vec![], checker.errors)
}

struct SemanticChecker<'a> {
    ctx: &'a CompilationContext,
    module: &'a Module,
    clazz: Option<usize>,
    in_constructor: bool,
    formals: Vec<Variable>,
    locals: LocalScope,
    errors: Vec<CompileError>,
}

impl<'a> SemanticChecker<'a> {
    fn new(ctx: &'a CompilationContext, module: &'a Module) -> Self {
        SemanticChecker {
            ctx,
            module,
            clazz: None,
            in_constructor: false,
            formals: vec![],
            locals: LocalScope::new(),
            errors: vec![],
        }
    }

    fn resolve(&self, name: &str) -> Option<Declaration> {
        let scope = Scope {
            module: self.module,
            clazz: self.clazz.and_then(|index| {
                self.module
                    .clazzes
                    .get(index)
                    .map(|clazz| ClazzScope { index, clazz })
            }),
            formals: &self.formals,
            locals: Some(&self.locals),
        };
        namespace::resolve(self.ctx, &scope, name)
    }

    fn check_inferred(&mut self, variable: &Variable) {
        if variable.ty.is_undetermined() {
            self.errors.push(
                TypeError::UnknownType {
                    span: variable.name.span(),
                }
                .into(),
            );
        }
    }

    /// `let target = source` or `target = source` where `source` holds a class instance
    /// copies the reference, which is only allowed for classes that implement `Copy`.
    /// Storing an instance in a field is not aliasing.
    fn check_aliasing(&mut self, target: &Ident, value: &Expression) {
        let Expression::Reference(source) = value else {
            return;
        };
        let Some(decl) = self.resolve(source.name.as_str()) else {
            return;
        };
        if !decl.is_variable() {
            return;
        }
        let Type::Clazz(clazz) = decl.ty() else {
            return;
        };
        let is_copy = namespace::with_clazz(self.ctx, self.module, &clazz, |_, found| {
            found.implements(constants::COPY_TRAIT_NAME)
        })
        .unwrap_or(false);
        if !is_copy {
            self.errors.push(CompileError::AliasedClassInstance {
                name: target.clone(),
                source_name: source.name.clone(),
                clazz_name: clazz.name.to_string(),
                span: value.span(),
            });
        }
    }

    fn check_traits(&mut self, clazz: &Clazz) {
        for trait_name in &clazz.traits {
            if trait_name.as_str() == constants::COPY_TRAIT_NAME {
                continue;
            }
            let scope = Scope::module_level(self.module);
            let Some(Declaration::Trait { module, index, .. }) =
                namespace::resolve(self.ctx, &scope, trait_name.as_str())
            else {
                self.errors.push(CompileError::UnknownTrait {
                    name: trait_name.clone(),
                    span: trait_name.span(),
                });
                continue;
            };
            let required = self.trait_method_names(&module, index);
            let missing: Vec<String> = required
                .into_iter()
                .filter(|name| {
                    namespace::last_named(&clazz.methods, name).is_none()
                        && !(name == constants::CONSTRUCTOR_NAME && clazz.constructor.is_some())
                })
                .collect();
            if !missing.is_empty() {
                self.errors.push(CompileError::MissingTraitMethods {
                    clazz_name: clazz.name.clone(),
                    trait_name: trait_name.clone(),
                    missing,
                    span: trait_name.span(),
                });
            }
        }
    }

    fn trait_method_names(&self, module: &Ident, index: usize) -> Vec<String> {
        let names = |found: &Module| {
            found
                .traits
                .get(index)
                .map(|t| t.methods.iter().map(|m| m.name.to_string()).collect())
                .unwrap_or_default()
        };
        if module == &self.module.name {
            names(self.module)
        } else {
            self.ctx
                .registry()
                .get(module.as_str())
                .map(|found| names(&found))
                .unwrap_or_default()
        }
    }
}

impl Visitor for SemanticChecker<'_> {
    fn visit_global_variable(&mut self, variable: &Variable) {
        if !variable.is_constant {
            self.errors.push(CompileError::GlobalMustBeConstant {
                name: variable.name.clone(),
                span: variable.span.clone(),
            });
        }
        self.check_inferred(variable);
        visit::walk_variable(self, variable);
    }

    fn visit_clazz(&mut self, clazz: &Clazz) {
        self.clazz = self
            .module
            .clazzes
            .iter()
            .position(|candidate| std::ptr::eq(candidate, clazz));
        self.check_traits(clazz);
        for field in &clazz.fields {
            self.visit_field(field);
        }
        if let Some(constructor) = &clazz.constructor {
            self.in_constructor = true;
            self.visit_function(constructor);
            self.in_constructor = false;
        }
        for method in &clazz.methods {
            self.visit_function(method);
        }
        self.clazz = None;
    }

    fn visit_field(&mut self, field: &Variable) {
        self.check_inferred(field);
        visit::walk_variable(self, field);
    }

    fn visit_function(&mut self, function: &Function) {
        self.formals = function.formals.clone();
        self.locals = LocalScope::new();
        visit::walk_function(self, function);
        self.formals.clear();
        self.locals = LocalScope::new();
    }

    fn visit_block(&mut self, block: &Block) {
        self.locals.push_frame();
        visit::walk_block(self, block);
        self.locals.pop_frame();
    }

    fn visit_variable_declaration(&mut self, stmt: &VariableDeclarationStatement) {
        let variable = &stmt.variable;
        visit::walk_variable(self, variable);
        if let Some(init) = &variable.initial_expression {
            self.check_aliasing(&variable.name, init);
        }
        self.check_inferred(variable);
        self.locals
            .declare(variable.name.clone(), variable.ty.clone(), variable.is_constant);
    }

    fn visit_variable_reassignment(&mut self, stmt: &VariableReassignmentStatement) {
        let name = &stmt.target.name;
        match self.resolve(name.as_str()) {
            None => self.errors.push(CompileError::UnknownVariable {
                var_name: name.clone(),
                span: name.span(),
            }),
            Some(decl) if !decl.is_mutable() => {
                self.errors.push(CompileError::AssignmentToConstant {
                    name: name.clone(),
                    span: stmt.span.clone(),
                })
            }
            Some(_) => (),
        }
        self.visit_expression(&stmt.expression);
        self.check_aliasing(name, &stmt.expression);
    }

    fn visit_field_setter(&mut self, stmt: &FieldSetterStatement) {
        self.visit_expression(&stmt.object);
        self.visit_expression(&stmt.expression);
        let on_this = matches!(
            &stmt.object,
            Expression::Reference(r) if r.name.as_str() == constants::THIS_KEYWORD
        );
        let initializing = self.in_constructor && on_this;
        if let Some(Declaration::Field(field)) = &stmt.field.resolved {
            if field.is_constant && !initializing {
                self.errors.push(CompileError::AssignmentToConstant {
                    name: field.name.clone(),
                    span: stmt.span.clone(),
                });
            }
        }
    }

    fn visit_reference(&mut self, reference: &Reference) {
        if self.resolve(reference.name.as_str()).is_none() {
            self.errors.push(CompileError::UnknownVariable {
                var_name: reference.name.clone(),
                span: reference.name.span(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_module, semantic_analysis::type_check_module};
    use pretty_assertions::assert_eq;

    fn errors(src: &str) -> Vec<CompileError> {
        let ctx = CompilationContext::new();
        let mut module = parse_module(src);
        let res = type_check_module(&ctx, &mut module);
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        semantic_check_module(&ctx, &mut module).errors
    }

    #[test]
    fn self_initialization_is_unknown_and_untyped() {
        let errors = errors("fn f() { let x = x; }");
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(matches!(
            &errors[0],
            CompileError::UnknownVariable { var_name, .. } if var_name.as_str() == "x"
        ));
        assert!(matches!(errors[1], CompileError::TypeError(TypeError::UnknownType { .. })));
    }

    #[test]
    fn constant_globals_are_accepted() {
        assert_eq!(errors("let a = 1; let b = a + 1; let c = true;"), vec![]);
    }

    #[test]
    fn storing_an_instance_in_a_field_is_not_aliasing() {
        let errors = errors(
            "class Acc { var v: Int = 0; }
             class Holder {
                 var acc: Acc = new Acc();
                 fn init(a: Acc) { this.acc = a; }
                 fn swap(b: Acc) { this.acc = b; }
             }",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn binding_an_instance_to_a_second_name_is_aliasing() {
        let errors = errors(
            "class Acc { var v: Int = 0; }
             fn f(a: Acc) { var b = new Acc(); b = a; }",
        );
        assert!(matches!(
            &errors[..],
            [CompileError::AliasedClassInstance { name, .. }] if name.as_str() == "b"
        ));
    }
}
