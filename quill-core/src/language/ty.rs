use quill_types::Ident;
use std::fmt;

/// The type of a value, variable or function.
///
/// Primitive types compare by variant. Function types compare structurally and class
/// types nominally, by name and declaring module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Not yet inferred.
    Undetermined,
    Int32,
    Bool,
    Char,
    String,
    Float32,
    Float64,
    Float128,
    Void,
    Function(FunctionType),
    Clazz(ClazzType),
    /// A named type as written in the source, resolved to a class by the type pass.
    Custom(Ident),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub parameters: Vec<Type>,
    pub return_type: Box<Type>,
}

/// A class, identified by its module and its position among that module's classes.
/// Class names may repeat within a module, the position tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClazzType {
    pub name: Ident,
    pub module: Ident,
    pub index: usize,
}

impl Type {
    /// Maps a type name from the source to a primitive, or to [Type::Custom].
    pub fn from_name(name: Ident) -> Type {
        match name.as_str() {
            "Int" | "Int32" => Type::Int32,
            "Bool" => Type::Bool,
            "Char" => Type::Char,
            "String" => Type::String,
            "Float" | "Float32" => Type::Float32,
            "Double" | "Float64" => Type::Float64,
            "Float128" => Type::Float128,
            "Void" => Type::Void,
            _ => Type::Custom(name),
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, Type::Undetermined)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Int32 | Type::Float32 | Type::Float64 | Type::Float128
        )
    }

    /// Two types are compatible if they are equal or either one is still undetermined.
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        self.is_undetermined() || other.is_undetermined() || self == other
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Undetermined => write!(f, "Undetermined"),
            Type::Int32 => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::Char => write!(f, "Char"),
            Type::String => write!(f, "String"),
            Type::Float32 => write!(f, "Float32"),
            Type::Float64 => write!(f, "Float64"),
            Type::Float128 => write!(f, "Float128"),
            Type::Void => write!(f, "Void"),
            Type::Function(func) => write!(f, "{func}"),
            Type::Clazz(clazz) => write!(f, "{}", clazz.name),
            Type::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if self.parameters.is_empty() {
            write!(f, "{} -> ", Type::Void)?;
        }
        for param in &self.parameters {
            write!(f, "{param} -> ")?;
        }
        write!(f, "{})", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn func(parameters: Vec<Type>, return_type: Type) -> Type {
        Type::Function(FunctionType {
            parameters,
            return_type: Box::new(return_type),
        })
    }

    #[test]
    fn function_types_render_as_arrows() {
        assert_eq!(
            func(vec![Type::Int32, Type::Bool], Type::String).to_string(),
            "(Int -> Bool -> String)"
        );
        assert_eq!(func(vec![], Type::Float64).to_string(), "(Void -> Float64)");
        assert_eq!(
            func(vec![func(vec![Type::Int32], Type::Int32)], Type::Void).to_string(),
            "((Int -> Int) -> Void)"
        );
    }

    #[test]
    fn class_types_are_nominal() {
        let point = |module: &str, index: usize| {
            Type::Clazz(ClazzType {
                name: Ident::new_no_span("Point".into()),
                module: Ident::new_no_span(module.into()),
                index,
            })
        };
        assert_eq!(point("shapes", 0), point("shapes", 0));
        assert_ne!(point("shapes", 0), point("geometry", 0));
        assert_ne!(point("shapes", 0), point("shapes", 1));
    }

    #[test]
    fn undetermined_is_compatible_with_everything() {
        assert!(Type::Undetermined.is_compatible_with(&Type::Bool));
        assert!(Type::Char.is_compatible_with(&Type::Undetermined));
        assert!(!Type::Char.is_compatible_with(&Type::String));
    }
}
