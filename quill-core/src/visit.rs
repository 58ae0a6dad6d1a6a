//! Traversal of the AST.
//!
//! [Visitor] is the read-only traversal used by analyses and backends; [VisitorMut] is
//! for passes that rewrite the tree in place. Every method has a default that continues
//! into the children through the matching `walk_*` function, so an implementation only
//! overrides the nodes it cares about and calls the `walk_*` function to keep descending.

use crate::language::*;

pub trait Visitor: Sized {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module)
    }

    fn visit_global_variable(&mut self, variable: &Variable) {
        walk_variable(self, variable)
    }

    fn visit_clazz(&mut self, clazz: &Clazz) {
        walk_clazz(self, clazz)
    }

    fn visit_field(&mut self, field: &Variable) {
        walk_variable(self, field)
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function)
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block)
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement)
    }

    fn visit_if(&mut self, stmt: &IfStatement) {
        walk_if(self, stmt)
    }

    fn visit_while(&mut self, stmt: &WhileStatement) {
        walk_while(self, stmt)
    }

    fn visit_variable_declaration(&mut self, stmt: &VariableDeclarationStatement) {
        walk_variable(self, &stmt.variable)
    }

    fn visit_variable_reassignment(&mut self, stmt: &VariableReassignmentStatement) {
        self.visit_reference(&stmt.target);
        self.visit_expression(&stmt.expression)
    }

    fn visit_function_call_statement(&mut self, stmt: &FunctionCallStatement) {
        self.visit_function_call(&stmt.call)
    }

    fn visit_method_call_statement(&mut self, stmt: &MethodCallStatement) {
        self.visit_method_call(&stmt.call)
    }

    fn visit_field_setter(&mut self, stmt: &FieldSetterStatement) {
        self.visit_expression(&stmt.object);
        self.visit_expression(&stmt.expression)
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr)
    }

    fn visit_bool_literal(&mut self, _value: bool) {}

    fn visit_integer_literal(&mut self, _value: i32) {}

    fn visit_float_literal(&mut self, _value: f64, _width: FloatWidth) {}

    fn visit_string_literal(&mut self, _value: &str) {}

    fn visit_char_literal(&mut self, _value: char) {}

    fn visit_reference(&mut self, _reference: &Reference) {}

    fn visit_function_call(&mut self, call: &FunctionCallExpression) {
        walk_arguments(self, &call.arguments)
    }

    fn visit_method_call(&mut self, call: &MethodCallExpression) {
        self.visit_expression(&call.object);
        walk_arguments(self, &call.arguments)
    }

    fn visit_field_getter(&mut self, getter: &FieldGetterExpression) {
        self.visit_expression(&getter.object)
    }

    fn visit_binary_operator(&mut self, op: &BinaryOperatorExpression) {
        self.visit_expression(&op.lhs);
        self.visit_expression(&op.rhs)
    }

    fn visit_clazz_initializer(&mut self, init: &ClazzInitializerExpression) {
        walk_arguments(self, &init.arguments)
    }
}

pub fn walk_module<V: Visitor>(visitor: &mut V, module: &Module) {
    for variable in &module.variables {
        visitor.visit_global_variable(variable);
    }
    for clazz in &module.clazzes {
        visitor.visit_clazz(clazz);
    }
    for function in &module.functions {
        visitor.visit_function(function);
    }
}

pub fn walk_variable<V: Visitor>(visitor: &mut V, variable: &Variable) {
    if let Some(init) = &variable.initial_expression {
        visitor.visit_expression(init);
    }
}

pub fn walk_clazz<V: Visitor>(visitor: &mut V, clazz: &Clazz) {
    for field in &clazz.fields {
        visitor.visit_field(field);
    }
    if let Some(constructor) = &clazz.constructor {
        visitor.visit_function(constructor);
    }
    for method in &clazz.methods {
        visitor.visit_function(method);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, function: &Function) {
    for statement in &function.statements {
        visitor.visit_statement(statement);
    }
    if let Some(expr) = &function.trailing_expression {
        visitor.visit_expression(expr);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Block(block) => visitor.visit_block(block),
        Statement::If(stmt) => visitor.visit_if(stmt),
        Statement::While(stmt) => visitor.visit_while(stmt),
        Statement::VariableDeclaration(stmt) => visitor.visit_variable_declaration(stmt),
        Statement::VariableReassignment(stmt) => visitor.visit_variable_reassignment(stmt),
        Statement::FunctionCall(stmt) => visitor.visit_function_call_statement(stmt),
        Statement::MethodCall(stmt) => visitor.visit_method_call_statement(stmt),
        Statement::FieldSetter(stmt) => visitor.visit_field_setter(stmt),
    }
}

pub fn walk_if<V: Visitor>(visitor: &mut V, stmt: &IfStatement) {
    visitor.visit_expression(&stmt.checked.guard);
    visitor.visit_block(&stmt.checked.block);
    if let Some(else_branch) = &stmt.else_branch {
        visitor.visit_if(else_branch);
    }
}

pub fn walk_while<V: Visitor>(visitor: &mut V, stmt: &WhileStatement) {
    visitor.visit_expression(&stmt.checked.guard);
    visitor.visit_block(&stmt.checked.block);
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::True { .. } => visitor.visit_bool_literal(true),
        Expression::False { .. } => visitor.visit_bool_literal(false),
        Expression::IntegerLiteral { value, .. } => visitor.visit_integer_literal(*value),
        Expression::FloatLiteral { value, width, .. } => {
            visitor.visit_float_literal(*value, *width)
        }
        Expression::StringLiteral { value, .. } => visitor.visit_string_literal(value),
        Expression::CharLiteral { value, .. } => visitor.visit_char_literal(*value),
        Expression::Reference(reference) => visitor.visit_reference(reference),
        Expression::FunctionCall(call) => visitor.visit_function_call(call),
        Expression::MethodCall(call) => visitor.visit_method_call(call),
        Expression::FieldGetter(getter) => visitor.visit_field_getter(getter),
        Expression::BinaryOperator(op) => visitor.visit_binary_operator(op),
        Expression::ClazzInitializer(init) => visitor.visit_clazz_initializer(init),
    }
}

fn walk_arguments<V: Visitor>(visitor: &mut V, arguments: &[Expression]) {
    for arg in arguments {
        visitor.visit_expression(arg);
    }
}

/// Traversal that may replace any expression it is handed, e.g. with a folded literal.
pub trait VisitorMut: Sized {
    fn visit_module_mut(&mut self, module: &mut Module) {
        walk_module_mut(self, module)
    }

    fn visit_variable_mut(&mut self, variable: &mut Variable) {
        if let Some(init) = &mut variable.initial_expression {
            self.visit_expression_mut(init);
        }
    }

    fn visit_clazz_mut(&mut self, clazz: &mut Clazz) {
        walk_clazz_mut(self, clazz)
    }

    fn visit_function_mut(&mut self, function: &mut Function) {
        walk_function_mut(self, function)
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        for statement in &mut block.statements {
            self.visit_statement_mut(statement);
        }
    }

    fn visit_statement_mut(&mut self, statement: &mut Statement) {
        walk_statement_mut(self, statement)
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr)
    }
}

pub fn walk_module_mut<V: VisitorMut>(visitor: &mut V, module: &mut Module) {
    for variable in &mut module.variables {
        visitor.visit_variable_mut(variable);
    }
    for clazz in &mut module.clazzes {
        visitor.visit_clazz_mut(clazz);
    }
    for function in &mut module.functions {
        visitor.visit_function_mut(function);
    }
}

pub fn walk_clazz_mut<V: VisitorMut>(visitor: &mut V, clazz: &mut Clazz) {
    for field in &mut clazz.fields {
        visitor.visit_variable_mut(field);
    }
    if let Some(constructor) = &mut clazz.constructor {
        visitor.visit_function_mut(constructor);
    }
    for method in &mut clazz.methods {
        visitor.visit_function_mut(method);
    }
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, function: &mut Function) {
    for statement in &mut function.statements {
        visitor.visit_statement_mut(statement);
    }
    if let Some(expr) = &mut function.trailing_expression {
        visitor.visit_expression_mut(expr);
    }
}

pub fn walk_statement_mut<V: VisitorMut>(visitor: &mut V, statement: &mut Statement) {
    match statement {
        Statement::Block(block) => visitor.visit_block_mut(block),
        Statement::If(stmt) => {
            let mut branch = Some(stmt);
            while let Some(current) = branch {
                visitor.visit_expression_mut(&mut current.checked.guard);
                visitor.visit_block_mut(&mut current.checked.block);
                branch = current.else_branch.as_deref_mut();
            }
        }
        Statement::While(stmt) => {
            visitor.visit_expression_mut(&mut stmt.checked.guard);
            visitor.visit_block_mut(&mut stmt.checked.block);
        }
        Statement::VariableDeclaration(stmt) => visitor.visit_variable_mut(&mut stmt.variable),
        Statement::VariableReassignment(stmt) => visitor.visit_expression_mut(&mut stmt.expression),
        Statement::FunctionCall(stmt) => {
            for arg in &mut stmt.call.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Statement::MethodCall(stmt) => {
            visitor.visit_expression_mut(&mut stmt.call.object);
            for arg in &mut stmt.call.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Statement::FieldSetter(stmt) => {
            visitor.visit_expression_mut(&mut stmt.object);
            visitor.visit_expression_mut(&mut stmt.expression);
        }
    }
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::True { .. }
        | Expression::False { .. }
        | Expression::IntegerLiteral { .. }
        | Expression::FloatLiteral { .. }
        | Expression::StringLiteral { .. }
        | Expression::CharLiteral { .. }
        | Expression::Reference(_) => (),
        Expression::FunctionCall(call) => {
            for arg in &mut call.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Expression::MethodCall(call) => {
            visitor.visit_expression_mut(&mut call.object);
            for arg in &mut call.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Expression::FieldGetter(getter) => visitor.visit_expression_mut(&mut getter.object),
        Expression::BinaryOperator(op) => {
            visitor.visit_expression_mut(&mut op.lhs);
            visitor.visit_expression_mut(&mut op.rhs);
        }
        Expression::ClazzInitializer(init) => {
            for arg in &mut init.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    #[derive(Default)]
    struct Counter {
        references: Vec<String>,
        calls: usize,
        integers: usize,
    }

    impl Visitor for Counter {
        fn visit_reference(&mut self, reference: &Reference) {
            self.references.push(reference.name.to_string());
        }

        fn visit_function_call(&mut self, call: &FunctionCallExpression) {
            self.calls += 1;
            walk_arguments(self, &call.arguments)
        }

        fn visit_integer_literal(&mut self, _value: i32) {
            self.integers += 1;
        }
    }

    #[test]
    fn visitor_reaches_nested_nodes() {
        let module = parse_module(
            "let g = 1;
             class P { var x: Int = 2; fn get() -> Int { this.x } }
             fn f(a: Int) -> Int {
                 if a > 3 { h(a); } else { while false { h(4); } }
                 a
             }",
        );
        let mut counter = Counter::default();
        counter.visit_module(&module);
        assert_eq!(counter.references, vec!["this", "a", "a", "a"]);
        assert_eq!(counter.calls, 2);
        assert_eq!(counter.integers, 4);
    }

    struct Negate;

    impl VisitorMut for Negate {
        fn visit_expression_mut(&mut self, expr: &mut Expression) {
            walk_expression_mut(self, expr);
            if let Expression::IntegerLiteral { value, .. } = expr {
                *value = -*value;
            }
        }
    }

    #[test]
    fn visitor_mut_rewrites_in_place() {
        let mut module = parse_module("fn f() -> Int { let a = 1 + g(2); 3 }");
        Negate.visit_module_mut(&mut module);
        let f = &module.functions[0];
        assert_eq!(f.statements[0].to_string(), "let a: Undetermined = -1 + g(-2);\n");
        assert_eq!(f.trailing_expression.as_ref().unwrap().to_string(), "-3");
    }
}
