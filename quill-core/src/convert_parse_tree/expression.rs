use super::Converter;
use crate::{
    language::{
        BinaryOperatorExpression, ClazzInitializerExpression, Expression, FieldGetterExpression,
        FloatWidth, FunctionCallExpression, MethodCallExpression, Operator, Reference,
    },
    parser::{is_keyword, Rule},
};
use either::Either;
use pest::iterators::Pair;
use quill_error::{convert_parse_tree_error::ConvertParseTreeError, error::CompileError};
use quill_types::{Ident, Span, Spanned};

/// A binary operator as it appears between two operands.
#[derive(Debug, Clone)]
enum Op {
    Operator(Operator),
    /// ``a `name` b``, a call to `name` written infix.
    Infix(Ident),
}

impl Op {
    /// Infix calls bind tighter than any operator.
    fn precedence(&self) -> usize {
        match self {
            Op::Operator(op) => op.precedence(),
            Op::Infix(_) => 7,
        }
    }

    fn apply(self, lhs: Expression, rhs: Expression) -> Expression {
        let span = Span::join(lhs.span(), &rhs.span());
        match self {
            Op::Operator(operator) => Expression::BinaryOperator(BinaryOperatorExpression {
                operator,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            }),
            Op::Infix(name) => Expression::FunctionCall(FunctionCallExpression {
                name: Reference::new(name),
                arguments: vec![lhs, rhs],
                span,
            }),
        }
    }
}

impl Converter {
    pub(super) fn expression(&mut self, pair: Pair<Rule>) -> Result<Expression, CompileError> {
        let span = self.span(&pair);
        let mut expr_or_op_buf: Vec<Either<Op, Expression>> = vec![];
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::postfix_expression => {
                    expr_or_op_buf.push(Either::Right(self.postfix_expression(part)?));
                }
                Rule::operator => {
                    let op = Operator::from_symbol(part.as_str()).ok_or_else(|| {
                        ConvertParseTreeError::UnknownOperator {
                            op: part.as_str().to_string(),
                            span: self.span(&part),
                        }
                    })?;
                    expr_or_op_buf.push(Either::Left(Op::Operator(op)));
                }
                Rule::infix_call => {
                    let name = match part.clone().into_inner().next() {
                        Some(name) => self.ident(&name),
                        None => return Err(self.cannot_handle(&part)),
                    };
                    expr_or_op_buf.push(Either::Left(Op::Infix(name)));
                }
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        if expr_or_op_buf.len() == 1 {
            if let Some(Either::Right(expr)) = expr_or_op_buf.pop() {
                return Ok(expr);
            }
        }
        arrange_by_order_of_operations(expr_or_op_buf, span)
    }

    /// A primary expression followed by any number of `.field` and `.method(..)` accessors.
    pub(super) fn postfix_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<Expression, CompileError> {
        let mut parts = pair.clone().into_inner();
        let mut expr = match parts.next() {
            Some(primary) => self.primary(primary)?,
            None => return Err(self.cannot_handle(&pair)),
        };
        for accessor in parts {
            let accessor_span = self.span(&accessor);
            let span = Span::join(expr.span(), &accessor_span);
            let mut accessor_parts = accessor.clone().into_inner();
            let name = match accessor_parts.next() {
                Some(name) => Reference::new(self.ident(&name)),
                None => return Err(self.cannot_handle(&accessor)),
            };
            expr = match accessor.as_rule() {
                Rule::field_accessor => Expression::FieldGetter(FieldGetterExpression {
                    object: Box::new(expr),
                    field: name,
                    span,
                }),
                Rule::method_accessor => {
                    let arguments = match accessor_parts.next() {
                        Some(args) => self.argument_list(args)?,
                        None => vec![],
                    };
                    Expression::MethodCall(MethodCallExpression {
                        object: Box::new(expr),
                        method: name,
                        arguments,
                        span,
                    })
                }
                _ => return Err(self.cannot_handle(&accessor)),
            };
        }
        Ok(expr)
    }

    fn primary(&mut self, pair: Pair<Rule>) -> Result<Expression, CompileError> {
        let span = self.span(&pair);
        let expr = match pair.as_rule() {
            Rule::paren_expression => match pair.clone().into_inner().next() {
                Some(inner) => self.expression(inner)?,
                None => return Err(self.cannot_handle(&pair)),
            },
            Rule::clazz_initializer => {
                let mut parts = pair
                    .clone()
                    .into_inner()
                    .filter(|part| !is_keyword(part.as_rule()));
                let (clazz, arguments) = match (parts.next(), parts.next()) {
                    (Some(name), Some(args)) => {
                        (Reference::new(self.ident(&name)), self.argument_list(args)?)
                    }
                    _ => return Err(self.cannot_handle(&pair)),
                };
                Expression::ClazzInitializer(ClazzInitializerExpression {
                    clazz,
                    arguments,
                    span,
                })
            }
            Rule::function_call => {
                let mut parts = pair.clone().into_inner();
                let (name, arguments) = match (parts.next(), parts.next()) {
                    (Some(name), Some(args)) => (self.ident(&name), self.argument_list(args)?),
                    _ => return Err(self.cannot_handle(&pair)),
                };
                Expression::FunctionCall(FunctionCallExpression {
                    name: Reference::new(name),
                    arguments,
                    span,
                })
            }
            Rule::float_literal => {
                let mut parts = pair.clone().into_inner();
                let value = parts
                    .next()
                    .and_then(|digits| digits.as_str().parse::<f64>().ok())
                    .ok_or_else(|| ConvertParseTreeError::InvalidFloatLiteral {
                        span: span.clone(),
                    })?;
                let suffix = parts.next();
                let width = FloatWidth::from_suffix(suffix.as_ref().map(|suffix| suffix.as_str()));
                Expression::FloatLiteral { value, width, span }
            }
            Rule::integer_literal => {
                let value = pair
                    .as_str()
                    .parse::<i32>()
                    .map_err(|_| ConvertParseTreeError::IntLiteralOutOfRange {
                        span: span.clone(),
                    })?;
                Expression::IntegerLiteral { value, span }
            }
            Rule::string_literal => {
                let text = pair.as_str();
                let value = text
                    .strip_prefix('"')
                    .and_then(|text| text.strip_suffix('"'))
                    .unwrap_or(text)
                    .to_string();
                Expression::StringLiteral { value, span }
            }
            Rule::char_literal => {
                let text = pair.as_str();
                let content = text
                    .strip_prefix('\'')
                    .and_then(|text| text.strip_suffix('\''))
                    .unwrap_or(text);
                let mut chars = content.chars();
                let value = match (chars.next(), chars.next()) {
                    (Some(value), None) => value,
                    _ => return Err(ConvertParseTreeError::InvalidCharLiteral { span }.into()),
                };
                Expression::CharLiteral { value, span }
            }
            Rule::true_literal => Expression::True { span },
            Rule::false_literal => Expression::False { span },
            Rule::ident => Expression::Reference(Reference::new(self.ident(&pair))),
            _ => return Err(self.cannot_handle(&pair)),
        };
        Ok(expr)
    }

    fn argument_list(&mut self, pair: Pair<Rule>) -> Result<Vec<Expression>, CompileError> {
        pair.into_inner()
            .map(|argument| self.expression(argument))
            .collect()
    }
}

/// Builds the expression tree for `a op b op c ..` with the usual shunting-yard, all
/// operators being left-associative.
fn arrange_by_order_of_operations(
    expressions: Vec<Either<Op, Expression>>,
    debug_span: Span,
) -> Result<Expression, CompileError> {
    let mut expression_stack = Vec::new();
    let mut op_stack: Vec<Op> = Vec::new();

    for expr_or_op in expressions {
        match expr_or_op {
            Either::Left(op) => {
                while op_stack
                    .last()
                    .map(|top| top.precedence() >= op.precedence())
                    .unwrap_or(false)
                {
                    reduce(&mut expression_stack, &mut op_stack, &debug_span)?;
                }
                op_stack.push(op);
            }
            Either::Right(expr) => expression_stack.push(expr),
        }
    }
    while !op_stack.is_empty() {
        reduce(&mut expression_stack, &mut op_stack, &debug_span)?;
    }

    match (expression_stack.pop(), expression_stack.is_empty()) {
        (Some(expr), true) => Ok(expr),
        _ => Err(CompileError::Internal(
            "Expression stack not reduced to a single expression.",
            debug_span,
        )),
    }
}

fn reduce(
    expression_stack: &mut Vec<Expression>,
    op_stack: &mut Vec<Op>,
    debug_span: &Span,
) -> Result<(), CompileError> {
    let op = op_stack.pop().ok_or_else(|| {
        CompileError::Internal("Prematurely empty operator stack.", debug_span.clone())
    })?;
    let rhs = expression_stack.pop().ok_or_else(|| {
        CompileError::Internal(
            "Prematurely empty expression stack for right hand side.",
            debug_span.clone(),
        )
    })?;
    let lhs = expression_stack.pop().ok_or_else(|| {
        CompileError::Internal(
            "Prematurely empty expression stack for left hand side.",
            debug_span.clone(),
        )
    })?;
    expression_stack.push(op.apply(lhs, rhs));
    Ok(())
}
