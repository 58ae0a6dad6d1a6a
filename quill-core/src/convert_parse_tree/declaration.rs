use super::Converter;
use crate::{
    language::{
        Attribute, Clazz, Expression, Function, FunctionType, Import, Statement, Trait,
        TraitMethod, Type, Variable,
    },
    parser::{is_keyword, Rule},
};
use pest::iterators::Pair;
use quill_error::{error::CompileError, warning::Warning};
use quill_types::{constants, Spanned};
use std::collections::HashSet;

impl Converter {
    pub(super) fn import_declaration(&mut self, pair: Pair<Rule>) -> Result<Import, CompileError> {
        let span = self.span(&pair);
        let name = pair
            .into_inner()
            .find(|part| part.as_rule() == Rule::ident)
            .map(|part| self.raw_ident(&part))
            .ok_or(CompileError::Internal("Import without a module name.", span.clone()))?;
        Ok(Import { name, span })
    }

    pub(super) fn variable_declaration_statement(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<Variable, CompileError> {
        match pair.clone().into_inner().next() {
            Some(decl) if decl.as_rule() == Rule::variable_declaration => {
                self.variable_declaration(decl)
            }
            _ => Err(self.cannot_handle(&pair)),
        }
    }

    fn variable_declaration(&mut self, pair: Pair<Rule>) -> Result<Variable, CompileError> {
        let span = self.span(&pair);
        let mut is_constant = true;
        let mut name = None;
        let mut ty = Type::Undetermined;
        let mut initial_expression = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::mutability => {
                    is_constant = part
                        .into_inner()
                        .all(|keyword| keyword.as_rule() != Rule::var_keyword);
                }
                Rule::ident => name = Some(self.ident(&part)),
                Rule::type_annotation => ty = self.type_annotation(part)?,
                Rule::initializer => initial_expression = Some(self.initializer(part)?),
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        let name = name.ok_or(CompileError::Internal(
            "Variable declaration without a name.",
            span.clone(),
        ))?;
        Ok(Variable {
            ty,
            name,
            initial_expression,
            is_constant,
            span,
        })
    }

    fn type_annotation(&mut self, pair: Pair<Rule>) -> Result<Type, CompileError> {
        match pair.clone().into_inner().next() {
            Some(ty) => self.type_name(ty),
            None => Err(self.cannot_handle(&pair)),
        }
    }

    fn initializer(&mut self, pair: Pair<Rule>) -> Result<Expression, CompileError> {
        match pair.clone().into_inner().next() {
            Some(expr) => self.expression(expr),
            None => Err(self.cannot_handle(&pair)),
        }
    }

    pub(super) fn type_name(&mut self, pair: Pair<Rule>) -> Result<Type, CompileError> {
        let inner = match pair.clone().into_inner().next() {
            Some(inner) => inner,
            None => return Err(self.cannot_handle(&pair)),
        };
        match inner.as_rule() {
            Rule::ident => Ok(Type::from_name(self.ident(&inner))),
            Rule::function_type => {
                let mut types = inner
                    .into_inner()
                    .map(|part| self.type_name(part))
                    .collect::<Result<Vec<_>, _>>()?;
                let return_type = types.pop().unwrap_or(Type::Void);
                if types == [Type::Void] {
                    types.clear();
                }
                Ok(Type::Function(FunctionType {
                    parameters: types,
                    return_type: Box::new(return_type),
                }))
            }
            _ => Err(self.cannot_handle(&inner)),
        }
    }

    fn attribute(&mut self, pair: Pair<Rule>) -> Result<Attribute, CompileError> {
        let name = match pair.clone().into_inner().next() {
            Some(ident) => self.raw_ident(&ident),
            None => return Err(self.cannot_handle(&pair)),
        };
        if !constants::VALID_ATTRIBUTE_NAMES.contains(&name.as_str()) {
            self.warn(
                name.span(),
                Warning::UnknownAttribute {
                    attribute: name.clone(),
                },
            );
        }
        Ok(Attribute { name })
    }

    fn formal_list(&mut self, pair: Pair<Rule>) -> Result<Vec<Variable>, CompileError> {
        let mut formals = vec![];
        for formal in pair.into_inner() {
            let span = self.span(&formal);
            let mut parts = formal.into_inner();
            let (name, ty) = match (parts.next(), parts.next()) {
                (Some(name), Some(ty)) => (self.ident(&name), self.type_name(ty)?),
                _ => return Err(CompileError::Internal("Malformed formal parameter.", span)),
            };
            formals.push(Variable::formal(name, ty, span));
        }
        Ok(formals)
    }

    fn return_type(&mut self, pair: Pair<Rule>) -> Result<Type, CompileError> {
        match pair.clone().into_inner().next() {
            Some(ty) => self.type_name(ty),
            None => Err(self.cannot_handle(&pair)),
        }
    }

    pub(super) fn function_declaration(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<Function, CompileError> {
        let span = self.span(&pair);
        let mut attributes = vec![];
        let mut name = None;
        let mut formals = vec![];
        let mut return_type = Type::Undetermined;
        let mut statements = vec![];
        let mut trailing_expression = None;
        for part in pair.into_inner().filter(|part| !is_keyword(part.as_rule())) {
            match part.as_rule() {
                Rule::attribute => attributes.push(self.attribute(part)?),
                Rule::ident => name = Some(self.ident(&part)),
                Rule::formal_list => formals = self.formal_list(part)?,
                Rule::return_type => return_type = self.return_type(part)?,
                Rule::function_body => {
                    (statements, trailing_expression) = self.function_body(part)?;
                }
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        let name = name.ok_or(CompileError::Internal(
            "Function declaration without a name.",
            span.clone(),
        ))?;
        Ok(Function {
            attributes,
            return_type,
            name,
            formals,
            statements,
            trailing_expression,
            span,
        })
    }

    fn function_body(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<(Vec<Statement>, Option<Expression>), CompileError> {
        let mut statements = vec![];
        let mut trailing_expression = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::statement_list => statements = self.statement_list(part)?,
                Rule::expression => trailing_expression = Some(self.expression(part)?),
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        Ok((statements, trailing_expression))
    }

    pub(super) fn clazz_declaration(&mut self, pair: Pair<Rule>) -> Result<Clazz, CompileError> {
        let span = self.span(&pair);
        let mut name = None;
        let mut traits = vec![];
        let mut members = vec![];
        for part in pair.into_inner().filter(|part| !is_keyword(part.as_rule())) {
            match part.as_rule() {
                Rule::ident => name = Some(self.ident(&part)),
                Rule::trait_list => {
                    traits = part.into_inner().map(|name| self.ident(&name)).collect();
                }
                Rule::class_member => members.extend(part.into_inner()),
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        let name = name.ok_or(CompileError::Internal(
            "Class declaration without a name.",
            span.clone(),
        ))?;

        // Same sweep as at module level: fields first, then methods.
        let mut declared = HashSet::new();
        let mut fields = vec![];
        for member in members
            .iter()
            .filter(|member| member.as_rule() == Rule::variable_declaration_statement)
        {
            let field = self.variable_declaration_statement(member.clone())?;
            self.note_declared(&mut declared, &field.name);
            fields.push(field);
        }
        let mut methods = vec![];
        let mut constructor = None;
        for member in members
            .iter()
            .filter(|member| member.as_rule() == Rule::function_declaration)
        {
            let method = self.function_declaration(member.clone())?;
            if method.name.as_str() == constants::CONSTRUCTOR_NAME {
                if let Some(overridden) = constructor.replace(method) {
                    self.warn(
                        overridden.name.span(),
                        Warning::ConstructorOverridden {
                            clazz_name: name.clone(),
                        },
                    );
                }
                continue;
            }
            self.note_declared(&mut declared, &method.name);
            methods.push(method);
        }

        Ok(Clazz {
            name,
            fields,
            methods,
            constructor,
            traits,
            span,
        })
    }

    pub(super) fn trait_declaration(&mut self, pair: Pair<Rule>) -> Result<Trait, CompileError> {
        let span = self.span(&pair);
        let mut name = None;
        let mut methods = vec![];
        for part in pair.into_inner().filter(|part| !is_keyword(part.as_rule())) {
            match part.as_rule() {
                Rule::ident => name = Some(self.ident(&part)),
                Rule::trait_body => {
                    for signature in part.into_inner() {
                        methods.push(self.function_signature(signature)?);
                    }
                }
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        let name = name.ok_or(CompileError::Internal(
            "Trait declaration without a name.",
            span.clone(),
        ))?;
        Ok(Trait {
            name,
            methods,
            span,
        })
    }

    fn function_signature(&mut self, pair: Pair<Rule>) -> Result<TraitMethod, CompileError> {
        let span = self.span(&pair);
        let mut name = None;
        let mut formals = vec![];
        let mut return_type = Type::Void;
        for part in pair.into_inner().filter(|part| !is_keyword(part.as_rule())) {
            match part.as_rule() {
                Rule::ident => name = Some(self.ident(&part)),
                Rule::formal_list => formals = self.formal_list(part)?,
                Rule::return_type => return_type = self.return_type(part)?,
                _ => return Err(self.cannot_handle(&part)),
            }
        }
        let name = name.ok_or(CompileError::Internal(
            "Trait method without a name.",
            span.clone(),
        ))?;
        Ok(TraitMethod {
            name,
            formals,
            return_type,
            span,
        })
    }
}
