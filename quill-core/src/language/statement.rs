use super::{Expression, FunctionCallExpression, MethodCallExpression, Reference, Variable};
use quill_types::{Span, Spanned};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(Block),
    If(IfStatement),
    While(WhileStatement),
    VariableDeclaration(VariableDeclarationStatement),
    VariableReassignment(VariableReassignmentStatement),
    FunctionCall(FunctionCallStatement),
    MethodCall(MethodCallStatement),
    FieldSetter(FieldSetterStatement),
}

/// `{ statements }`, opening a new local scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A block that only runs when its guard holds. Shared by `if` and `while`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedBlock {
    pub guard: Expression,
    pub block: Block,
}

/// `if guard { .. } else ..`
///
/// There is no separate else node: an `else { .. }` is an [IfStatement] whose guard is
/// [Expression::True].
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub checked: CheckedBlock,
    pub else_branch: Option<Box<IfStatement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub checked: CheckedBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationStatement {
    pub variable: Variable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableReassignmentStatement {
    pub target: Reference,
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallStatement {
    pub call: FunctionCallExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallStatement {
    pub call: MethodCallExpression,
}

/// `object.field = expression;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSetterStatement {
    pub object: Expression,
    pub field: Reference,
    pub expression: Expression,
    pub span: Span,
}

impl IfStatement {
    /// Builds the unconditional branch that stands in for `else { .. }`.
    pub fn else_block(block: Block) -> IfStatement {
        let span = block.span.clone();
        IfStatement {
            checked: CheckedBlock {
                guard: Expression::True { span: span.clone() },
                block,
            },
            else_branch: None,
            span,
        }
    }

    /// Iterates over this branch and every chained else branch, in order.
    pub fn branches(&self) -> impl Iterator<Item = &IfStatement> {
        std::iter::successors(Some(self), |branch| branch.else_branch.as_deref())
    }
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        use Statement::*;
        match self {
            Block(block) => block.span.clone(),
            If(stmt) => stmt.span.clone(),
            While(stmt) => stmt.span.clone(),
            VariableDeclaration(stmt) => stmt.variable.span.clone(),
            VariableReassignment(stmt) => stmt.span.clone(),
            FunctionCall(stmt) => stmt.call.span.clone(),
            MethodCall(stmt) => stmt.call.span.clone(),
            FieldSetter(stmt) => stmt.span.clone(),
        }
    }
}

const INDENT: &str = "    ";

pub(crate) fn write_block(f: &mut fmt::Formatter<'_>, block: &Block, depth: usize) -> fmt::Result {
    writeln!(f, "{{")?;
    for statement in &block.statements {
        write_statement(f, statement, depth + 1)?;
    }
    write!(f, "{}}}", INDENT.repeat(depth))
}

pub(crate) fn write_statement(
    f: &mut fmt::Formatter<'_>,
    statement: &Statement,
    depth: usize,
) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    write!(f, "{indent}")?;
    match statement {
        Statement::Block(block) => write_block(f, block, depth)?,
        Statement::If(stmt) => {
            for (i, branch) in stmt.branches().enumerate() {
                let is_else = i > 0 && matches!(branch.checked.guard, Expression::True { .. });
                match (i, is_else) {
                    (0, _) => write!(f, "if {} ", branch.checked.guard)?,
                    (_, true) => write!(f, " else ")?,
                    (_, false) => write!(f, " else if {} ", branch.checked.guard)?,
                }
                write_block(f, &branch.checked.block, depth)?;
            }
        }
        Statement::While(stmt) => {
            write!(f, "while {} ", stmt.checked.guard)?;
            write_block(f, &stmt.checked.block, depth)?;
        }
        Statement::VariableDeclaration(stmt) => write!(f, "{};", stmt.variable)?,
        Statement::VariableReassignment(stmt) => {
            write!(f, "{} = {};", stmt.target, stmt.expression)?
        }
        Statement::FunctionCall(stmt) => {
            write!(f, "{};", Expression::FunctionCall(stmt.call.clone()))?
        }
        Statement::MethodCall(stmt) => {
            write!(f, "{};", Expression::MethodCall(stmt.call.clone()))?
        }
        Statement::FieldSetter(stmt) => {
            write!(f, "{}.{} = {};", stmt.object, stmt.field, stmt.expression)?
        }
    }
    writeln!(f)
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}
