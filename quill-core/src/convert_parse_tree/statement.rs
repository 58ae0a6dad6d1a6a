use super::Converter;
use crate::{
    language::{
        Block, CheckedBlock, Expression, FieldGetterExpression, FieldSetterStatement,
        FunctionCallStatement, IfStatement, MethodCallStatement, Statement,
        VariableDeclarationStatement, VariableReassignmentStatement, WhileStatement,
    },
    parser::{is_keyword, Rule},
};
use pest::iterators::Pair;
use quill_error::{convert_parse_tree_error::ConvertParseTreeError, error::CompileError};
use quill_types::Spanned;

impl Converter {
    /// Flattens the right-recursive statement list into source order.
    pub(super) fn statement_list(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<Vec<Statement>, CompileError> {
        let mut statements = vec![];
        let mut next = Some(pair);
        while let Some(list) = next.take() {
            for part in list.into_inner() {
                match part.as_rule() {
                    Rule::statement_list => next = Some(part),
                    Rule::block_statement => statements.push(self.block_statement(part)?),
                    Rule::statement => statements.push(self.statement(part)?),
                    _ => return Err(self.cannot_handle(&part)),
                }
            }
        }
        Ok(statements)
    }

    fn block(&mut self, pair: Pair<Rule>) -> Result<Block, CompileError> {
        let span = self.span(&pair);
        let statements = match pair.into_inner().next() {
            Some(list) => self.statement_list(list)?,
            None => vec![],
        };
        Ok(Block { statements, span })
    }

    fn block_statement(&mut self, pair: Pair<Rule>) -> Result<Statement, CompileError> {
        let inner = match pair.clone().into_inner().next() {
            Some(inner) => inner,
            None => return Err(self.cannot_handle(&pair)),
        };
        match inner.as_rule() {
            Rule::if_statement => Ok(Statement::If(self.if_statement(inner)?)),
            Rule::while_statement => Ok(Statement::While(self.while_statement(inner)?)),
            Rule::block => Ok(Statement::Block(self.block(inner)?)),
            _ => Err(self.cannot_handle(&inner)),
        }
    }

    fn checked_block<'i>(
        &mut self,
        pair: Pair<'i, Rule>,
    ) -> Result<(CheckedBlock, Option<Pair<'i, Rule>>), CompileError> {
        let span = self.span(&pair);
        let mut parts = pair.into_inner().filter(|part| !is_keyword(part.as_rule()));
        let (guard, block) = match (parts.next(), parts.next()) {
            (Some(guard), Some(block)) => (self.expression(guard)?, self.block(block)?),
            _ => return Err(CompileError::Internal("Guarded block is missing a part.", span)),
        };
        Ok((CheckedBlock { guard, block }, parts.next()))
    }

    fn if_statement(&mut self, pair: Pair<Rule>) -> Result<IfStatement, CompileError> {
        let span = self.span(&pair);
        let (checked, else_clause) = self.checked_block(pair)?;
        let else_branch = match else_clause {
            Some(clause) => {
                let branch = clause
                    .clone()
                    .into_inner()
                    .find(|part| !is_keyword(part.as_rule()));
                match branch {
                    Some(branch) if branch.as_rule() == Rule::if_statement => {
                        Some(Box::new(self.if_statement(branch)?))
                    }
                    Some(branch) if branch.as_rule() == Rule::block => {
                        Some(Box::new(IfStatement::else_block(self.block(branch)?)))
                    }
                    _ => return Err(self.cannot_handle(&clause)),
                }
            }
            None => None,
        };
        Ok(IfStatement {
            checked,
            else_branch,
            span,
        })
    }

    fn while_statement(&mut self, pair: Pair<Rule>) -> Result<WhileStatement, CompileError> {
        let span = self.span(&pair);
        let (checked, rest) = self.checked_block(pair)?;
        if let Some(rest) = rest {
            return Err(self.cannot_handle(&rest));
        }
        Ok(WhileStatement { checked, span })
    }

    fn statement(&mut self, pair: Pair<Rule>) -> Result<Statement, CompileError> {
        let span = self.span(&pair);
        let inner = match pair.clone().into_inner().next() {
            Some(inner) => inner,
            None => return Err(self.cannot_handle(&pair)),
        };
        match inner.as_rule() {
            Rule::variable_declaration_statement => {
                let variable = self.variable_declaration_statement(inner)?;
                Ok(Statement::VariableDeclaration(VariableDeclarationStatement { variable }))
            }
            Rule::assignment_statement => {
                let mut parts = inner.clone().into_inner();
                let (target, expression) = match (parts.next(), parts.next()) {
                    (Some(target), Some(expr)) => {
                        (self.postfix_expression(target)?, self.expression(expr)?)
                    }
                    _ => return Err(self.cannot_handle(&inner)),
                };
                match target {
                    Expression::Reference(target) => {
                        Ok(Statement::VariableReassignment(VariableReassignmentStatement {
                            target,
                            expression,
                            span,
                        }))
                    }
                    Expression::FieldGetter(FieldGetterExpression { object, field, .. }) => {
                        Ok(Statement::FieldSetter(FieldSetterStatement {
                            object: *object,
                            field,
                            expression,
                            span,
                        }))
                    }
                    other => Err(ConvertParseTreeError::InvalidAssignmentTarget {
                        text: other.to_string(),
                        span: other.span(),
                    }
                    .into()),
                }
            }
            Rule::call_statement => {
                let call = match inner.clone().into_inner().next() {
                    Some(call) => self.postfix_expression(call)?,
                    None => return Err(self.cannot_handle(&inner)),
                };
                match call {
                    Expression::FunctionCall(call) => {
                        Ok(Statement::FunctionCall(FunctionCallStatement { call }))
                    }
                    Expression::MethodCall(call) => {
                        Ok(Statement::MethodCall(MethodCallStatement { call }))
                    }
                    other => Err(ConvertParseTreeError::ExpressionStatementNotCall {
                        text: other.to_string(),
                        span: other.span(),
                    }
                    .into()),
                }
            }
            _ => Err(self.cannot_handle(&inner)),
        }
    }
}
