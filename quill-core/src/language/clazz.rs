use super::{function::write_function, Function, FunctionType, Type, Variable};
use quill_types::{Ident, Named, Span, Spanned};
use std::fmt;

/// A class: named fields and methods, an optional constructor and the traits it
/// claims to implement.
#[derive(Debug, Clone, PartialEq)]
pub struct Clazz {
    pub name: Ident,
    pub fields: Vec<Variable>,
    /// Every method except the constructor.
    pub methods: Vec<Function>,
    /// The method named `init`, if there is one.
    pub constructor: Option<Function>,
    pub traits: Vec<Ident>,
    pub span: Span,
}

impl Clazz {
    pub fn implements(&self, trait_name: &str) -> bool {
        self.traits.iter().any(|name| name.as_str() == trait_name)
    }
}

/// A method a trait requires, without a body.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitMethod {
    pub name: Ident,
    pub formals: Vec<Variable>,
    pub return_type: Type,
    pub span: Span,
}

impl TraitMethod {
    pub fn signature(&self) -> FunctionType {
        FunctionType {
            parameters: self.formals.iter().map(|formal| formal.ty.clone()).collect(),
            return_type: Box::new(self.return_type.clone()),
        }
    }
}

/// A named set of method signatures. A trait with no methods is a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    pub name: Ident,
    pub methods: Vec<TraitMethod>,
    pub span: Span,
}

impl Named for Clazz {
    fn name(&self) -> &Ident {
        &self.name
    }
}

impl Named for Trait {
    fn name(&self) -> &Ident {
        &self.name
    }
}

impl Spanned for Clazz {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl Spanned for Trait {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

pub(crate) fn write_clazz(f: &mut fmt::Formatter<'_>, clazz: &Clazz) -> fmt::Result {
    write!(f, "class {}", clazz.name)?;
    if !clazz.traits.is_empty() {
        let traits = clazz
            .traits
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, ": {traits}")?;
    }
    writeln!(f, " {{")?;
    for field in &clazz.fields {
        writeln!(f, "    {field};")?;
    }
    if let Some(constructor) = &clazz.constructor {
        write_function(f, constructor, 1)?;
    }
    for method in &clazz.methods {
        write_function(f, method, 1)?;
    }
    writeln!(f, "}}")
}

impl fmt::Display for Clazz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clazz(f, self)
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.methods.is_empty() {
            return writeln!(f, "trait {};", self.name);
        }
        writeln!(f, "trait {} {{", self.name)?;
        for method in &self.methods {
            writeln!(f, "    fn {}: {};", method.name, method.signature())?;
        }
        writeln!(f, "}}")
    }
}
