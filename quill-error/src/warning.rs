use core::fmt;

use quill_types::{Ident, Span, Spanned};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompileWarning {
    pub span: Span,
    pub warning_content: Warning,
}

impl Spanned for CompileWarning {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl CompileWarning {
    pub fn to_friendly_warning_string(&self) -> String {
        self.warning_content.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    ShadowsOtherSymbol { name: Ident },
    ConstructorOverridden { clazz_name: Ident },
    UnknownAttribute { attribute: Ident },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Warning::*;
        match self {
            ShadowsOtherSymbol { name } => write!(
                f,
                "This shadows another symbol in this scope with the same name \"{name}\"."
            ),
            ConstructorOverridden { clazz_name } => write!(
                f,
                "Class \"{clazz_name}\" declares more than one constructor. \
                 Only the last one is used."
            ),
            UnknownAttribute { attribute } => {
                write!(f, "Attribute \"{attribute}\" is not recognized and has no effect.")
            }
        }
    }
}
