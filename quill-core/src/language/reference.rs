use super::{ClazzType, Type};
use quill_types::{Ident, Span, Spanned};
use std::fmt;

/// A name waiting to be resolved to the declaration it refers to.
///
/// The resolved target is filled in by the type pass. It depends on the scope chain
/// active at the use site, so the same name may resolve differently in two places.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Ident,
    pub resolved: Option<Declaration>,
}

impl Reference {
    pub fn new(name: Ident) -> Self {
        Reference {
            name,
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

impl Spanned for Reference {
    fn span(&self) -> Span {
        self.name.span()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A module level item, identified by its module and its position in that module.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDeclaration {
    pub module: Ident,
    pub index: usize,
    pub name: Ident,
    pub ty: Type,
    pub is_constant: bool,
}

/// A field or method, identified by its class and its position in that class.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDeclaration {
    pub clazz: ClazzType,
    pub clazz_index: usize,
    pub index: usize,
    pub name: Ident,
    pub ty: Type,
    pub is_constant: bool,
}

/// What a [Reference] resolved to.
///
/// Declarations are owned descriptions of their target, never pointers into the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Local {
        name: Ident,
        ty: Type,
        is_constant: bool,
    },
    Formal {
        name: Ident,
        ty: Type,
    },
    This(ClazzType),
    Field(MemberDeclaration),
    Method(MemberDeclaration),
    Function(ItemDeclaration),
    GlobalVariable(ItemDeclaration),
    Clazz {
        ty: ClazzType,
        index: usize,
    },
    Trait {
        module: Ident,
        index: usize,
        name: Ident,
    },
}

impl Declaration {
    pub fn name(&self) -> &Ident {
        use Declaration::*;
        match self {
            Local { name, .. } | Formal { name, .. } => name,
            This(clazz) => &clazz.name,
            Field(member) | Method(member) => &member.name,
            Function(item) | GlobalVariable(item) => &item.name,
            Clazz { ty, .. } => &ty.name,
            Trait { name, .. } => name,
        }
    }

    /// The type of the declaration when used as a value.
    pub fn ty(&self) -> Type {
        use Declaration::*;
        match self {
            Local { ty, .. } | Formal { ty, .. } => ty.clone(),
            This(clazz) => Type::Clazz(clazz.clone()),
            Field(member) | Method(member) => member.ty.clone(),
            Function(item) | GlobalVariable(item) => item.ty.clone(),
            Clazz { ty, .. } => Type::Clazz(ty.clone()),
            Trait { .. } => Type::Undetermined,
        }
    }

    /// The same declaration with its type replaced by `ty`.
    pub fn with_type(mut self, new_ty: Type) -> Declaration {
        use Declaration::*;
        match &mut self {
            Local { ty, .. } | Formal { ty, .. } => *ty = new_ty,
            Field(member) | Method(member) => member.ty = new_ty,
            Function(item) | GlobalVariable(item) => item.ty = new_ty,
            This(_) | Clazz { .. } | Trait { .. } => (),
        }
        self
    }

    /// Whether the declaration names a storage slot, as opposed to a function or type.
    pub fn is_variable(&self) -> bool {
        use Declaration::*;
        matches!(
            self,
            Local { .. } | Formal { .. } | This(_) | Field(_) | GlobalVariable(_)
        )
    }

    /// Whether the slot can be reassigned. Functions and types never can.
    pub fn is_mutable(&self) -> bool {
        use Declaration::*;
        match self {
            Local { is_constant, .. } => !is_constant,
            Field(member) => !member.is_constant,
            GlobalVariable(item) => !item.is_constant,
            _ => false,
        }
    }

    pub fn friendly_kind_str(&self) -> &'static str {
        use Declaration::*;
        match self {
            Local { .. } => "local variable",
            Formal { .. } => "parameter",
            This(_) => "class instance",
            Field(_) => "field",
            Method(_) => "method",
            Function(_) => "function",
            GlobalVariable(_) => "global variable",
            Clazz { .. } => "class",
            Trait { .. } => "trait",
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.friendly_kind_str(), self.name(), self.ty())
    }
}
