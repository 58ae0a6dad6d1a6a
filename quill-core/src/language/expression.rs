use super::{Operator, Reference, Type};
use quill_types::{Span, Spanned};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    True {
        span: Span,
    },
    False {
        span: Span,
    },
    IntegerLiteral {
        value: i32,
        span: Span,
    },
    FloatLiteral {
        value: f64,
        width: FloatWidth,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
    CharLiteral {
        value: char,
        span: Span,
    },
    Reference(Reference),
    FunctionCall(FunctionCallExpression),
    MethodCall(MethodCallExpression),
    FieldGetter(FieldGetterExpression),
    BinaryOperator(BinaryOperatorExpression),
    ClazzInitializer(ClazzInitializerExpression),
}

/// The precision of a floating point literal, picked by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    /// `f`, or no suffix at all.
    Single,
    /// `d`
    Double,
    /// `q`
    Quad,
}

impl FloatWidth {
    pub fn from_suffix(suffix: Option<&str>) -> FloatWidth {
        match suffix {
            Some("d") => FloatWidth::Double,
            Some("q") => FloatWidth::Quad,
            _ => FloatWidth::Single,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            FloatWidth::Single => "f",
            FloatWidth::Double => "d",
            FloatWidth::Quad => "q",
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            FloatWidth::Single => Type::Float32,
            FloatWidth::Double => Type::Float64,
            FloatWidth::Quad => Type::Float128,
        }
    }
}

/// `name(arguments)`. An infix call ``a `name` b`` is built as one of these too.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallExpression {
    pub name: Reference,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// `object.method(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallExpression {
    pub object: Box<Expression>,
    pub method: Reference,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// `object.field`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGetterExpression {
    pub object: Box<Expression>,
    pub field: Reference,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorExpression {
    pub operator: Operator,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub span: Span,
}

/// `new Clazz(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct ClazzInitializerExpression {
    pub clazz: Reference,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

impl Expression {
    pub fn integer(value: i32, span: Span) -> Expression {
        Expression::IntegerLiteral { value, span }
    }

    pub fn as_integer_literal(&self) -> Option<i32> {
        match self {
            Expression::IntegerLiteral { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        use Expression::*;
        match self {
            True { span }
            | False { span }
            | IntegerLiteral { span, .. }
            | FloatLiteral { span, .. }
            | StringLiteral { span, .. }
            | CharLiteral { span, .. } => span.clone(),
            Reference(reference) => reference.span(),
            FunctionCall(call) => call.span.clone(),
            MethodCall(call) => call.span.clone(),
            FieldGetter(getter) => getter.span.clone(),
            BinaryOperator(op) => op.span.clone(),
            ClazzInitializer(init) => init.span.clone(),
        }
    }
}

struct Arguments<'a>(&'a [Expression]);

impl fmt::Display for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expression::*;
        match self {
            True { .. } => write!(f, "true"),
            False { .. } => write!(f, "false"),
            IntegerLiteral { value, .. } => write!(f, "{value}"),
            FloatLiteral { value, width, .. } => write!(f, "{value:?}{}", width.suffix()),
            StringLiteral { value, .. } => write!(f, "\"{value}\""),
            CharLiteral { value, .. } => write!(f, "'{value}'"),
            Reference(reference) => write!(f, "{reference}"),
            FunctionCall(call) => write!(f, "{}({})", call.name, Arguments(&call.arguments)),
            MethodCall(call) => write!(
                f,
                "{}.{}({})",
                call.object,
                call.method,
                Arguments(&call.arguments)
            ),
            FieldGetter(getter) => write!(f, "{}.{}", getter.object, getter.field),
            BinaryOperator(op) => write!(f, "{op}"),
            ClazzInitializer(init) => {
                write!(f, "new {}({})", init.clazz, Arguments(&init.arguments))
            }
        }
    }
}

impl fmt::Display for BinaryOperatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand(f: &mut fmt::Formatter<'_>, expr: &Expression) -> fmt::Result {
            match expr {
                Expression::BinaryOperator(_) => write!(f, "({expr})"),
                _ => write!(f, "{expr}"),
            }
        }
        operand(f, &self.lhs)?;
        write!(f, " {} ", self.operator)?;
        operand(f, &self.rhs)
    }
}
