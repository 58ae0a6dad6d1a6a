//! Type inference and checking.
//!
//! Every reference in the module is resolved and annotated with its declaration, every
//! undetermined variable and return type is inferred from its initializer or trailing
//! expression, and every use of a value is checked against the type it is used as.
//! Items are inferred on demand: a use of a function or global declared further down
//! triggers its inference first. Running the pass twice yields the same module.

use super::namespace::{self, ClazzScope, LocalScope, Scope};
use crate::{
    error::{err, ok, CompileResult},
    language::*,
    CompilationContext,
};
use quill_error::{error::CompileError, type_error::TypeError};
use quill_types::{Ident, Span, Spanned};
use std::collections::{HashMap, HashSet};

/// Resolves and checks the types of `module` in place.
///
/// Every error of this pass is fatal. On failure the module is left untouched.
pub fn type_check_module(ctx: &CompilationContext, module: &mut Module) -> CompileResult<()> {
    let mut resolved = module.clone();
    if let Err(e) = resolve_declared_types(ctx, &mut resolved) {
        return err(vec![], vec![e]);
    }
    let checked = {
        let mut checker = TypeChecker::new(ctx, &resolved);
        match checker.check_module() {
            Ok(()) => checker.checked,
            Err(e) => return err(vec![], vec![e]),
        }
    };
    write_back(&mut resolved, checked);
    *module = resolved;
    ok((), vec![], vec![])
}

/// Replaces every class name written in a declared type by the class it names.
fn resolve_declared_types(
    ctx: &CompilationContext,
    module: &mut Module,
) -> Result<(), CompileError> {
    let resolver = TypeResolver::new(module);
    for variable in &mut module.variables {
        variable.ty = resolver.resolve(ctx, &variable.ty)?;
    }
    for function in &mut module.functions {
        resolver.resolve_function(ctx, function)?;
    }
    for clazz in &mut module.clazzes {
        for field in &mut clazz.fields {
            field.ty = resolver.resolve(ctx, &field.ty)?;
        }
        if let Some(constructor) = &mut clazz.constructor {
            resolver.resolve_function(ctx, constructor)?;
        }
        for method in &mut clazz.methods {
            resolver.resolve_function(ctx, method)?;
        }
    }
    for trait_decl in &mut module.traits {
        for method in &mut trait_decl.methods {
            for formal in &mut method.formals {
                formal.ty = resolver.resolve(ctx, &formal.ty)?;
            }
            method.return_type = resolver.resolve(ctx, &method.return_type)?;
        }
    }
    Ok(())
}

struct TypeResolver {
    module_name: Ident,
    clazzes: Vec<Ident>,
    imports: Vec<Import>,
}

impl TypeResolver {
    fn new(module: &Module) -> Self {
        TypeResolver {
            module_name: module.name.clone(),
            clazzes: module.clazzes.iter().map(|clazz| clazz.name.clone()).collect(),
            imports: module.imports.clone(),
        }
    }

    fn resolve_function(
        &self,
        ctx: &CompilationContext,
        function: &mut Function,
    ) -> Result<(), CompileError> {
        for formal in &mut function.formals {
            formal.ty = self.resolve(ctx, &formal.ty)?;
        }
        function.return_type = self.resolve(ctx, &function.return_type)?;
        Ok(())
    }

    fn resolve(&self, ctx: &CompilationContext, ty: &Type) -> Result<Type, CompileError> {
        match ty {
            Type::Custom(name) => self.clazz_type(ctx, name).map(Type::Clazz).ok_or_else(|| {
                TypeError::UnknownTypeName {
                    name: name.to_string(),
                    span: name.span(),
                }
                .into()
            }),
            Type::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|param| self.resolve(ctx, param))
                    .collect::<Result<_, _>>()?;
                Ok(Type::Function(FunctionType {
                    parameters,
                    return_type: Box::new(self.resolve(ctx, &function.return_type)?),
                }))
            }
            other => Ok(other.clone()),
        }
    }

    fn clazz_type(&self, ctx: &CompilationContext, name: &Ident) -> Option<ClazzType> {
        if let Some(index) = self.clazzes.iter().rposition(|clazz| clazz == name) {
            return Some(ClazzType {
                name: name.clone(),
                module: self.module_name.clone(),
                index,
            });
        }
        let found = namespace::search_imports(
            ctx,
            &self.module_name,
            &self.imports,
            &mut HashSet::new(),
            &|imported: &Module| {
                namespace::last_named(&imported.clazzes, name.as_str()).map(|index| {
                    Declaration::Clazz {
                        ty: namespace::clazz_type(
                            &imported.name,
                            index,
                            &imported.clazzes[index],
                        ),
                        index,
                    }
                })
            },
        );
        match found {
            Some(Declaration::Clazz { ty, .. }) => Some(ty),
            _ => None,
        }
    }
}

/// A module level item or class member whose type can be inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ItemKey {
    Function(usize),
    Global(usize),
    Field(usize, usize),
    Constructor(usize),
    Method(usize, usize),
}

enum Inference {
    InProgress,
    Done(Type),
}

enum CheckedItem {
    Function(Function),
    Variable(Variable),
}

/// The part of a scope that is fixed for a whole item: its class and its formals.
#[derive(Clone, Copy)]
struct ItemContext<'a> {
    clazz: Option<usize>,
    formals: &'a [Variable],
}

const MODULE_LEVEL: ItemContext<'static> = ItemContext {
    clazz: None,
    formals: &[],
};

struct TypeChecker<'a> {
    ctx: &'a CompilationContext,
    module: &'a Module,
    resolver: TypeResolver,
    inferred: HashMap<ItemKey, Inference>,
    checked: HashMap<ItemKey, CheckedItem>,
}

impl<'a> TypeChecker<'a> {
    fn new(ctx: &'a CompilationContext, module: &'a Module) -> Self {
        TypeChecker {
            ctx,
            module,
            resolver: TypeResolver::new(module),
            inferred: HashMap::new(),
            checked: HashMap::new(),
        }
    }

    /// Functions first, then globals, then classes. The first error stops the pass, so
    /// this order decides which one is reported.
    fn check_module(&mut self) -> Result<(), CompileError> {
        let module = self.module;
        for index in 0..module.functions.len() {
            self.item_type(ItemKey::Function(index))?;
        }
        for index in 0..module.variables.len() {
            self.item_type(ItemKey::Global(index))?;
        }
        for (clazz_index, clazz) in module.clazzes.iter().enumerate() {
            for index in 0..clazz.fields.len() {
                self.item_type(ItemKey::Field(clazz_index, index))?;
            }
            if clazz.constructor.is_some() {
                self.item_type(ItemKey::Constructor(clazz_index))?;
            }
            for index in 0..clazz.methods.len() {
                self.item_type(ItemKey::Method(clazz_index, index))?;
            }
        }
        Ok(())
    }

    /// The type of an item of this module, inferring it first if needed.
    ///
    /// An item whose inference depends on itself sees its declared type.
    fn item_type(&mut self, key: ItemKey) -> Result<Type, CompileError> {
        match self.inferred.get(&key) {
            Some(Inference::Done(ty)) => return Ok(ty.clone()),
            Some(Inference::InProgress) => return self.declared_type(key),
            None => (),
        }
        self.inferred.insert(key, Inference::InProgress);

        let module = self.module;
        let (ty, item) = match key {
            ItemKey::Function(index) => {
                let function = self.check_function(&module.functions[index], None)?;
                (Type::Function(function.signature()), CheckedItem::Function(function))
            }
            ItemKey::Global(index) => {
                let variable = self.check_variable(
                    MODULE_LEVEL,
                    &LocalScope::new(),
                    &module.variables[index],
                )?;
                (variable.ty.clone(), CheckedItem::Variable(variable))
            }
            ItemKey::Field(clazz, index) => {
                let cx = ItemContext {
                    clazz: Some(clazz),
                    formals: &[],
                };
                let field = &module.clazzes[clazz].fields[index];
                let variable = self.check_variable(cx, &LocalScope::new(), field)?;
                (variable.ty.clone(), CheckedItem::Variable(variable))
            }
            ItemKey::Constructor(clazz) => {
                let Some(constructor) = &module.clazzes[clazz].constructor else {
                    return Err(CompileError::Internal(
                        "constructor inferred for a class without one",
                        module.clazzes[clazz].span.clone(),
                    ));
                };
                let function = self.check_function(constructor, Some(clazz))?;
                (Type::Function(function.signature()), CheckedItem::Function(function))
            }
            ItemKey::Method(clazz, index) => {
                let method = &module.clazzes[clazz].methods[index];
                let function = self.check_function(method, Some(clazz))?;
                (Type::Function(function.signature()), CheckedItem::Function(function))
            }
        };

        self.inferred.insert(key, Inference::Done(ty.clone()));
        self.checked.insert(key, item);
        Ok(ty)
    }

    fn declared_type(&self, key: ItemKey) -> Result<Type, CompileError> {
        let module = self.module;
        let missing = || CompileError::Internal("item index out of range", Span::dummy());
        let ty = match key {
            ItemKey::Function(index) => {
                Type::Function(module.functions.get(index).ok_or_else(missing)?.signature())
            }
            ItemKey::Global(index) => module.variables.get(index).ok_or_else(missing)?.ty.clone(),
            ItemKey::Field(clazz, index) => {
                let clazz = module.clazzes.get(clazz).ok_or_else(missing)?;
                clazz.fields.get(index).ok_or_else(missing)?.ty.clone()
            }
            ItemKey::Constructor(clazz) => {
                let clazz = module.clazzes.get(clazz).ok_or_else(missing)?;
                Type::Function(clazz.constructor.as_ref().ok_or_else(missing)?.signature())
            }
            ItemKey::Method(clazz, index) => {
                let clazz = module.clazzes.get(clazz).ok_or_else(missing)?;
                Type::Function(clazz.methods.get(index).ok_or_else(missing)?.signature())
            }
        };
        Ok(ty)
    }

    /// The current type of whatever `decl` refers to.
    ///
    /// Items of this module may have been declared undetermined and are inferred here;
    /// everything else already carries its type.
    fn declaration_type(&mut self, decl: &Declaration) -> Result<Type, CompileError> {
        let current = &self.module.name;
        match decl {
            Declaration::Function(item) if &item.module == current => {
                self.item_type(ItemKey::Function(item.index))
            }
            Declaration::GlobalVariable(item) if &item.module == current => {
                self.item_type(ItemKey::Global(item.index))
            }
            Declaration::Field(member) if &member.clazz.module == current => {
                self.item_type(ItemKey::Field(member.clazz_index, member.index))
            }
            Declaration::Method(member) if &member.clazz.module == current => {
                self.item_type(ItemKey::Method(member.clazz_index, member.index))
            }
            other => Ok(other.ty()),
        }
    }

    fn scope<'s>(&self, cx: ItemContext<'s>, locals: &'s LocalScope) -> Scope<'s>
    where
        'a: 's,
    {
        Scope {
            module: self.module,
            clazz: cx.clazz.and_then(|index| {
                self.module
                    .clazzes
                    .get(index)
                    .map(|clazz| ClazzScope { index, clazz })
            }),
            formals: cx.formals,
            locals: Some(locals),
        }
    }

    fn resolve(&self, cx: ItemContext, locals: &LocalScope, name: &str) -> Option<Declaration> {
        namespace::resolve(self.ctx, &self.scope(cx, locals), name)
    }

    fn check_function(
        &mut self,
        function: &Function,
        clazz: Option<usize>,
    ) -> Result<Function, CompileError> {
        let cx = ItemContext {
            clazz,
            formals: &function.formals,
        };
        let mut locals = LocalScope::new();
        let mut checked = function.clone();
        checked.statements = Vec::with_capacity(function.statements.len());
        for statement in &function.statements {
            let statement = self.check_statement(cx, &mut locals, statement)?;
            checked.statements.push(statement);
        }

        match &function.trailing_expression {
            Some(expr) => {
                let (expr, ty) = self.check_expression(cx, &locals, expr)?;
                if function.return_type.is_undetermined() {
                    checked.return_type = ty;
                } else if !ty.is_compatible_with(&function.return_type) {
                    return Err(mismatch(
                        &function.return_type,
                        &ty,
                        format!("\"{}\" returns `{}`", function.name, expr),
                        expr.span(),
                    ));
                }
                checked.trailing_expression = Some(expr);
            }
            None => match &function.return_type {
                Type::Undetermined | Type::Void => checked.return_type = Type::Void,
                expected => {
                    return Err(TypeError::MissingReturnValue {
                        fn_name: function.name.to_string(),
                        expected: expected.to_string(),
                        span: function.span.clone(),
                    }
                    .into())
                }
            },
        }
        Ok(checked)
    }

    fn check_variable(
        &mut self,
        cx: ItemContext,
        locals: &LocalScope,
        variable: &Variable,
    ) -> Result<Variable, CompileError> {
        let mut checked = variable.clone();
        checked.ty = self.resolver.resolve(self.ctx, &variable.ty)?;
        if let Some(init) = &variable.initial_expression {
            let (init, ty) = self.check_expression(cx, locals, init)?;
            if checked.ty.is_undetermined() {
                checked.ty = ty;
            } else if !ty.is_compatible_with(&checked.ty) {
                return Err(mismatch(
                    &checked.ty,
                    &ty,
                    format!("\"{}\" is initialized with `{}`", variable.name, init),
                    init.span(),
                ));
            }
            checked.initial_expression = Some(init);
        }
        Ok(checked)
    }

    fn check_statement(
        &mut self,
        cx: ItemContext,
        locals: &mut LocalScope,
        statement: &Statement,
    ) -> Result<Statement, CompileError> {
        let checked = match statement {
            Statement::Block(block) => Statement::Block(self.check_block(cx, locals, block)?),
            Statement::If(stmt) => Statement::If(self.check_if(cx, locals, stmt)?),
            Statement::While(stmt) => Statement::While(WhileStatement {
                checked: self.check_checked_block(cx, locals, &stmt.checked)?,
                span: stmt.span.clone(),
            }),
            Statement::VariableDeclaration(stmt) => {
                let variable = self.check_variable(cx, locals, &stmt.variable)?;
                locals.declare(variable.name.clone(), variable.ty.clone(), variable.is_constant);
                Statement::VariableDeclaration(VariableDeclarationStatement { variable })
            }
            Statement::VariableReassignment(stmt) => {
                let name = &stmt.target.name;
                let decl = self
                    .resolve(cx, locals, name.as_str())
                    .filter(Declaration::is_variable)
                    .ok_or_else(|| CompileError::UnknownVariable {
                        var_name: name.clone(),
                        span: name.span(),
                    })?;
                let target_ty = self.declaration_type(&decl)?;
                let (expression, ty) = self.check_expression(cx, locals, &stmt.expression)?;
                if !ty.is_compatible_with(&target_ty) {
                    return Err(mismatch(
                        &target_ty,
                        &ty,
                        format!("\"{}\" is assigned `{}`", name, expression),
                        expression.span(),
                    ));
                }
                Statement::VariableReassignment(VariableReassignmentStatement {
                    target: Reference {
                        name: name.clone(),
                        resolved: Some(decl.with_type(target_ty)),
                    },
                    expression,
                    span: stmt.span.clone(),
                })
            }
            Statement::FunctionCall(stmt) => {
                let (call, _) = self.check_function_call(cx, locals, &stmt.call)?;
                Statement::FunctionCall(FunctionCallStatement { call })
            }
            Statement::MethodCall(stmt) => {
                let (call, _) = self.check_method_call(cx, locals, &stmt.call)?;
                Statement::MethodCall(MethodCallStatement { call })
            }
            Statement::FieldSetter(stmt) => {
                let (object, object_ty) = self.check_expression(cx, locals, &stmt.object)?;
                let (field, field_ty) = self.field(&object_ty, &stmt.field)?;
                let (expression, ty) = self.check_expression(cx, locals, &stmt.expression)?;
                if !ty.is_compatible_with(&field_ty) {
                    return Err(mismatch(
                        &field_ty,
                        &ty,
                        format!("field \"{}\" is assigned `{}`", field.name, expression),
                        expression.span(),
                    ));
                }
                Statement::FieldSetter(FieldSetterStatement {
                    object,
                    field,
                    expression,
                    span: stmt.span.clone(),
                })
            }
        };
        Ok(checked)
    }

    fn check_block(
        &mut self,
        cx: ItemContext,
        locals: &mut LocalScope,
        block: &Block,
    ) -> Result<Block, CompileError> {
        locals.push_frame();
        let mut statements = Vec::with_capacity(block.statements.len());
        for statement in &block.statements {
            statements.push(self.check_statement(cx, locals, statement)?);
        }
        locals.pop_frame();
        Ok(Block {
            statements,
            span: block.span.clone(),
        })
    }

    fn check_if(
        &mut self,
        cx: ItemContext,
        locals: &mut LocalScope,
        stmt: &IfStatement,
    ) -> Result<IfStatement, CompileError> {
        let checked = self.check_checked_block(cx, locals, &stmt.checked)?;
        let else_branch = match &stmt.else_branch {
            Some(branch) => Some(Box::new(self.check_if(cx, locals, branch)?)),
            None => None,
        };
        Ok(IfStatement {
            checked,
            else_branch,
            span: stmt.span.clone(),
        })
    }

    fn check_checked_block(
        &mut self,
        cx: ItemContext,
        locals: &mut LocalScope,
        checked: &CheckedBlock,
    ) -> Result<CheckedBlock, CompileError> {
        let (guard, ty) = self.check_expression(cx, locals, &checked.guard)?;
        if !ty.is_compatible_with(&Type::Bool) {
            return Err(mismatch(
                &Type::Bool,
                &ty,
                format!("the condition `{guard}` must be a Bool"),
                guard.span(),
            ));
        }
        Ok(CheckedBlock {
            guard,
            block: self.check_block(cx, locals, &checked.block)?,
        })
    }

    fn check_expression(
        &mut self,
        cx: ItemContext,
        locals: &LocalScope,
        expr: &Expression,
    ) -> Result<(Expression, Type), CompileError> {
        let checked = match expr {
            Expression::True { .. } | Expression::False { .. } => (expr.clone(), Type::Bool),
            Expression::IntegerLiteral { .. } => (expr.clone(), Type::Int32),
            Expression::FloatLiteral { width, .. } => (expr.clone(), width.ty()),
            Expression::StringLiteral { .. } => (expr.clone(), Type::String),
            Expression::CharLiteral { .. } => (expr.clone(), Type::Char),
            Expression::Reference(reference) => {
                match self.resolve(cx, locals, reference.name.as_str()) {
                    Some(decl) => {
                        let ty = self.declaration_type(&decl)?;
                        let reference = Reference {
                            name: reference.name.clone(),
                            resolved: Some(decl.with_type(ty.clone())),
                        };
                        (Expression::Reference(reference), ty)
                    }
                    // Reported by the semantic pass.
                    None => (
                        Expression::Reference(Reference::new(reference.name.clone())),
                        Type::Undetermined,
                    ),
                }
            }
            Expression::FunctionCall(call) => {
                let (call, ty) = self.check_function_call(cx, locals, call)?;
                (Expression::FunctionCall(call), ty)
            }
            Expression::MethodCall(call) => {
                let (call, ty) = self.check_method_call(cx, locals, call)?;
                (Expression::MethodCall(call), ty)
            }
            Expression::FieldGetter(getter) => {
                let (object, object_ty) = self.check_expression(cx, locals, &getter.object)?;
                let (field, ty) = self.field(&object_ty, &getter.field)?;
                let getter = FieldGetterExpression {
                    object: Box::new(object),
                    field,
                    span: getter.span.clone(),
                };
                (Expression::FieldGetter(getter), ty)
            }
            Expression::BinaryOperator(op) => {
                let (lhs, lhs_ty) = self.check_expression(cx, locals, &op.lhs)?;
                let (rhs, rhs_ty) = self.check_expression(cx, locals, &op.rhs)?;
                if !rhs_ty.is_compatible_with(&lhs_ty) {
                    return Err(mismatch(
                        &lhs_ty,
                        &rhs_ty,
                        format!("both operands of `{expr}` must have the same type"),
                        rhs.span(),
                    ));
                }
                let operand = if lhs_ty.is_undetermined() { rhs_ty } else { lhs_ty };
                if !op.operator.accepts(&operand) {
                    return Err(TypeError::InvalidOperandType {
                        op: op.operator.symbol().to_string(),
                        received: operand.to_string(),
                        expression: expr.to_string(),
                        span: op.span.clone(),
                    }
                    .into());
                }
                let ty = op.operator.result_type(&operand);
                let op = BinaryOperatorExpression {
                    operator: op.operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    span: op.span.clone(),
                };
                (Expression::BinaryOperator(op), ty)
            }
            Expression::ClazzInitializer(init) => {
                let name = &init.clazz.name;
                let decl = self.resolve(cx, locals, name.as_str());
                let Some(Declaration::Clazz { ty: clazz, index }) = decl.clone() else {
                    return Err(TypeError::UnknownTypeName {
                        name: name.to_string(),
                        span: name.span(),
                    }
                    .into());
                };
                let arguments = self.check_arguments(cx, locals, &init.arguments)?;
                let parameters = self.constructor_parameters(&clazz, index)?;
                check_call_arguments(name.as_str(), &parameters, &arguments, &init.span)?;
                let init = ClazzInitializerExpression {
                    clazz: Reference {
                        name: name.clone(),
                        resolved: decl,
                    },
                    arguments: arguments.into_iter().map(|(arg, _)| arg).collect(),
                    span: init.span.clone(),
                };
                (Expression::ClazzInitializer(init), Type::Clazz(clazz))
            }
        };
        Ok(checked)
    }

    fn check_arguments(
        &mut self,
        cx: ItemContext,
        locals: &LocalScope,
        arguments: &[Expression],
    ) -> Result<Vec<(Expression, Type)>, CompileError> {
        arguments
            .iter()
            .map(|arg| self.check_expression(cx, locals, arg))
            .collect()
    }

    fn check_function_call(
        &mut self,
        cx: ItemContext,
        locals: &LocalScope,
        call: &FunctionCallExpression,
    ) -> Result<(FunctionCallExpression, Type), CompileError> {
        let name = &call.name.name;
        let decl = self.find_function(cx, locals, name)?;
        let ty = self.declaration_type(&decl)?;
        let arguments = self.check_arguments(cx, locals, &call.arguments)?;
        let return_type = match &ty {
            Type::Function(signature) => {
                let parameters = &signature.parameters;
                check_call_arguments(name.as_str(), parameters, &arguments, &call.span)?;
                (*signature.return_type).clone()
            }
            Type::Undetermined => Type::Undetermined,
            _ => {
                return Err(CompileError::UnresolvedFunction {
                    name: name.clone(),
                    span: call.span.clone(),
                })
            }
        };
        let call = FunctionCallExpression {
            name: Reference {
                name: name.clone(),
                resolved: Some(decl.with_type(ty)),
            },
            arguments: arguments.into_iter().map(|(arg, _)| arg).collect(),
            span: call.span.clone(),
        };
        Ok((call, return_type))
    }

    /// The target of a call by name: a method of the enclosing class, a function of this
    /// module, a function of an imported module, or finally any value of function type.
    /// The first declaration with a matching name is taken at each step.
    fn find_function(
        &self,
        cx: ItemContext,
        locals: &LocalScope,
        name: &Ident,
    ) -> Result<Declaration, CompileError> {
        let module = self.module;
        if let Some(clazz_index) = cx.clazz {
            if let Some(clazz) = module.clazzes.get(clazz_index) {
                if let Some(index) = namespace::first_named(&clazz.methods, name.as_str()) {
                    let method = &clazz.methods[index];
                    return Ok(Declaration::Method(MemberDeclaration {
                        clazz: namespace::clazz_type(&module.name, clazz_index, clazz),
                        clazz_index,
                        index,
                        name: method.name.clone(),
                        ty: Type::Function(method.signature()),
                        is_constant: true,
                    }));
                }
            }
        }

        let first_function = |module: &Module| {
            namespace::first_named(&module.functions, name.as_str()).map(|index| {
                let function = &module.functions[index];
                Declaration::Function(ItemDeclaration {
                    module: module.name.clone(),
                    index,
                    name: function.name.clone(),
                    ty: Type::Function(function.signature()),
                    is_constant: true,
                })
            })
        };
        if let Some(decl) = first_function(module) {
            return Ok(decl);
        }
        let imported = namespace::search_imports(
            self.ctx,
            &module.name,
            &module.imports,
            &mut HashSet::new(),
            &first_function,
        );
        if let Some(decl) = imported {
            return Ok(decl);
        }

        match self.resolve(cx, locals, name.as_str()) {
            Some(decl)
                if decl.is_variable()
                    && matches!(decl.ty(), Type::Function(_) | Type::Undetermined) =>
            {
                Ok(decl)
            }
            _ => Err(CompileError::UnresolvedFunction {
                name: name.clone(),
                span: name.span(),
            }),
        }
    }

    fn check_method_call(
        &mut self,
        cx: ItemContext,
        locals: &LocalScope,
        call: &MethodCallExpression,
    ) -> Result<(MethodCallExpression, Type), CompileError> {
        let (object, object_ty) = self.check_expression(cx, locals, &call.object)?;
        let arguments = self.check_arguments(cx, locals, &call.arguments)?;
        let name = &call.method.name;
        let (method, return_type) = match &object_ty {
            Type::Undetermined => (Reference::new(name.clone()), Type::Undetermined),
            Type::Clazz(clazz) => {
                let decl = self
                    .member(clazz, name, namespace::method)
                    .ok_or_else(|| CompileError::MethodNotFound {
                        method_name: name.clone(),
                        type_name: object_ty.to_string(),
                        span: name.span(),
                    })?;
                let ty = self.declaration_type(&decl)?;
                let return_type = match &ty {
                    Type::Function(signature) => {
                        let parameters = &signature.parameters;
                        check_call_arguments(name.as_str(), parameters, &arguments, &call.span)?;
                        (*signature.return_type).clone()
                    }
                    _ => Type::Undetermined,
                };
                let method = Reference {
                    name: name.clone(),
                    resolved: Some(decl.with_type(ty)),
                };
                (method, return_type)
            }
            _ => {
                return Err(CompileError::MethodNotFound {
                    method_name: name.clone(),
                    type_name: object_ty.to_string(),
                    span: name.span(),
                })
            }
        };
        let call = MethodCallExpression {
            object: Box::new(object),
            method,
            arguments: arguments.into_iter().map(|(arg, _)| arg).collect(),
            span: call.span.clone(),
        };
        Ok((call, return_type))
    }

    /// Resolves `field` on a value of type `object_ty`.
    fn field(
        &mut self,
        object_ty: &Type,
        field: &Reference,
    ) -> Result<(Reference, Type), CompileError> {
        let name = &field.name;
        let not_found = || CompileError::FieldNotFound {
            field_name: name.clone(),
            type_name: object_ty.to_string(),
            span: name.span(),
        };
        match object_ty {
            Type::Undetermined => Ok((Reference::new(name.clone()), Type::Undetermined)),
            Type::Clazz(clazz) => {
                let decl = self.member(clazz, name, namespace::field).ok_or_else(not_found)?;
                let ty = self.declaration_type(&decl)?;
                let field = Reference {
                    name: name.clone(),
                    resolved: Some(decl.with_type(ty.clone())),
                };
                Ok((field, ty))
            }
            _ => Err(not_found()),
        }
    }

    fn member(
        &self,
        clazz: &ClazzType,
        name: &Ident,
        lookup: fn(&Ident, usize, &Clazz, &str) -> Option<Declaration>,
    ) -> Option<Declaration> {
        namespace::with_clazz(self.ctx, self.module, clazz, |index, found| {
            lookup(&clazz.module, index, found, name.as_str())
        })
        .flatten()
    }

    fn constructor_parameters(
        &mut self,
        clazz: &ClazzType,
        index: usize,
    ) -> Result<Vec<Type>, CompileError> {
        if clazz.module == self.module.name {
            let has_constructor = self
                .module
                .clazzes
                .get(index)
                .map_or(false, |clazz| clazz.constructor.is_some());
            if !has_constructor {
                return Ok(vec![]);
            }
            return match self.item_type(ItemKey::Constructor(index))? {
                Type::Function(signature) => Ok(signature.parameters),
                _ => Ok(vec![]),
            };
        }
        let parameters = namespace::with_clazz(self.ctx, self.module, clazz, |_, found| {
            found
                .constructor
                .as_ref()
                .map(|constructor| constructor.signature().parameters)
                .unwrap_or_default()
        });
        Ok(parameters.unwrap_or_default())
    }
}

fn mismatch(expected: &Type, received: &Type, help_text: String, span: Span) -> CompileError {
    TypeError::MismatchedType {
        expected: expected.to_string(),
        received: received.to_string(),
        help_text,
        span,
    }
    .into()
}

fn check_call_arguments(
    name: &str,
    parameters: &[Type],
    arguments: &[(Expression, Type)],
    span: &Span,
) -> Result<(), CompileError> {
    if parameters.len() != arguments.len() {
        return Err(CompileError::ArgumentCountMismatch {
            name: name.to_string(),
            expected: parameters.len(),
            received: arguments.len(),
            span: span.clone(),
        });
    }
    for ((arg, ty), param) in arguments.iter().zip(parameters) {
        if !ty.is_compatible_with(param) {
            return Err(mismatch(
                param,
                ty,
                format!("argument `{arg}` of \"{name}\""),
                arg.span(),
            ));
        }
    }
    Ok(())
}

fn write_back(module: &mut Module, checked: HashMap<ItemKey, CheckedItem>) {
    for (key, item) in checked {
        match (key, item) {
            (ItemKey::Function(index), CheckedItem::Function(function)) => {
                if let Some(slot) = module.functions.get_mut(index) {
                    *slot = function;
                }
            }
            (ItemKey::Global(index), CheckedItem::Variable(variable)) => {
                if let Some(slot) = module.variables.get_mut(index) {
                    *slot = variable;
                }
            }
            (ItemKey::Field(clazz, index), CheckedItem::Variable(variable)) => {
                let slot = module.clazzes.get_mut(clazz).and_then(|c| c.fields.get_mut(index));
                if let Some(slot) = slot {
                    *slot = variable;
                }
            }
            (ItemKey::Constructor(clazz), CheckedItem::Function(function)) => {
                if let Some(clazz) = module.clazzes.get_mut(clazz) {
                    clazz.constructor = Some(function);
                }
            }
            (ItemKey::Method(clazz, index), CheckedItem::Function(function)) => {
                let slot = module.clazzes.get_mut(clazz).and_then(|c| c.methods.get_mut(index));
                if let Some(slot) = slot {
                    *slot = function;
                }
            }
            _ => (),
        }
    }
}
