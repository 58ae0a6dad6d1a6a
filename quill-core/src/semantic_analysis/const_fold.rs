//! Constant folding of integer arithmetic.
//!
//! Any `+ - * / %` whose operands are both integer literals is replaced by its value.
//! For the associative operators a literal is also merged into a nested operation of the
//! same operator that has a literal operand, so `(x + 5) + 3` becomes `x + 8`. Calls are
//! never replaced, only their arguments folded.

use crate::{
    error::{err, ok, CompileResult},
    language::{BinaryOperatorExpression, Expression, Module, Operator},
    visit::{walk_expression_mut, VisitorMut},
};
use quill_error::error::CompileError;
use quill_types::Span;

pub fn fold_module(module: &mut Module) -> CompileResult<()> {
    let mut folder = ConstantFolder::default();
    folder.visit_module_mut(module);
    if folder.errors.is_empty() {
        ok((), vec![], vec![])
    } else {
        err(vec![], folder.errors)
    }
}

#[derive(Default)]
struct ConstantFolder {
    errors: Vec<CompileError>,
}

impl VisitorMut for ConstantFolder {
    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
        match fold(expr) {
            Ok(Some(folded)) => *expr = folded,
            Ok(None) => (),
            Err(e) => self.errors.push(e),
        }
    }
}

/// The folded form of `expr`, whose operands have already been folded.
fn fold(expr: &Expression) -> Result<Option<Expression>, CompileError> {
    let Expression::BinaryOperator(op) = expr else {
        return Ok(None);
    };
    if !op.operator.is_arithmetic() {
        return Ok(None);
    }
    match (op.lhs.as_integer_literal(), op.rhs.as_integer_literal()) {
        (Some(lhs), Some(rhs)) => {
            let value = evaluate(op.operator, lhs, rhs).map_err(|kind| kind.into_error(op))?;
            Ok(Some(Expression::integer(value, op.span.clone())))
        }
        (Some(literal), None) => Ok(reassociate(op, literal, &op.rhs)),
        (None, Some(literal)) => Ok(reassociate(op, literal, &op.lhs)),
        (None, None) => Ok(None),
    }
}

/// Merges `literal` into `other` when `other` applies the same associative operator to
/// a literal. Gives up if the merged literal would overflow.
fn reassociate(
    outer: &BinaryOperatorExpression,
    literal: i32,
    other: &Expression,
) -> Option<Expression> {
    if !outer.operator.is_associative() {
        return None;
    }
    let Expression::BinaryOperator(inner) = other else {
        return None;
    };
    if inner.operator != outer.operator {
        return None;
    }
    let literals = (inner.lhs.as_integer_literal(), inner.rhs.as_integer_literal());
    let (inner_literal, rest) = match literals {
        (Some(value), None) => (value, &inner.rhs),
        (None, Some(value)) => (value, &inner.lhs),
        _ => return None,
    };
    let combined = evaluate(outer.operator, inner_literal, literal).ok()?;
    Some(Expression::BinaryOperator(BinaryOperatorExpression {
        operator: outer.operator,
        lhs: rest.clone(),
        rhs: Box::new(Expression::integer(combined, outer.span.clone())),
        span: outer.span.clone(),
    }))
}

enum FoldError {
    DivisionByZero,
    Overflow,
    NotArithmetic,
}

impl FoldError {
    fn into_error(self, op: &BinaryOperatorExpression) -> CompileError {
        let expression = Expression::BinaryOperator(op.clone()).to_string();
        let span = op.span.clone();
        match self {
            FoldError::DivisionByZero => CompileError::DivisionByZero { expression, span },
            FoldError::Overflow => CompileError::IntegerOverflow { expression, span },
            FoldError::NotArithmetic => {
                CompileError::Internal("folded a non-arithmetic operator", Span::dummy())
            }
        }
    }
}

fn evaluate(operator: Operator, lhs: i32, rhs: i32) -> Result<i32, FoldError> {
    let value = match operator {
        Operator::Add => lhs.checked_add(rhs),
        Operator::Subtract => lhs.checked_sub(rhs),
        Operator::Multiply => lhs.checked_mul(rhs),
        Operator::Divide | Operator::Modulo if rhs == 0 => return Err(FoldError::DivisionByZero),
        Operator::Divide => lhs.checked_div(rhs),
        Operator::Modulo => lhs.checked_rem(rhs),
        _ => return Err(FoldError::NotArithmetic),
    };
    value.ok_or(FoldError::Overflow)
}
