use super::Type;
use std::fmt;

/// The fixed set of binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    And,
    Or,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulo,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThanOrEqual,
        Operator::And,
        Operator::Or,
    ];

    /// Looks an operator up by its symbol. Unknown symbols yield `None`.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(&self) -> &'static str {
        use Operator::*;
        match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Equal => "==",
            NotEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",
            LessThanOrEqual => "<=",
            GreaterThanOrEqual => ">=",
            And => "&&",
            Or => "||",
        }
    }

    /// Binding strength, higher binds tighter. All operators are left-associative.
    pub fn precedence(&self) -> usize {
        use Operator::*;
        match self {
            Multiply | Divide | Modulo => 6,
            Add | Subtract => 5,
            LessThan | GreaterThan | LessThanOrEqual | GreaterThanOrEqual => 4,
            Equal | NotEqual => 3,
            And => 2,
            Or => 1,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        use Operator::*;
        matches!(self, Add | Subtract | Multiply | Divide | Modulo)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// `a op (b op c) == (a op b) op c` and `a op b == b op a` for integers.
    pub fn is_associative(&self) -> bool {
        matches!(self, Operator::Add | Operator::Multiply)
    }

    /// The operand type this operator insists on, if any.
    pub fn operand_type(&self) -> Option<Type> {
        if self.is_logical() {
            Some(Type::Bool)
        } else {
            None
        }
    }

    /// The result of applying the operator to two operands of type `operand`.
    pub fn result_type(&self, operand: &Type) -> Type {
        if self.is_arithmetic() {
            operand.clone()
        } else {
            Type::Bool
        }
    }

    /// Whether values of type `ty` are valid operands.
    pub fn accepts(&self, ty: &Type) -> bool {
        if ty.is_undetermined() {
            return true;
        }
        match self.operand_type() {
            Some(expected) => *ty == expected,
            None if self.is_arithmetic() => ty.is_numeric(),
            None => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_over_symbols() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("<<"), None);
        assert_eq!(Operator::from_symbol(""), None);
    }

    #[test]
    fn comparisons_yield_bool() {
        assert_eq!(Operator::LessThan.result_type(&Type::Float64), Type::Bool);
        assert_eq!(Operator::Equal.result_type(&Type::String), Type::Bool);
        assert_eq!(Operator::Multiply.result_type(&Type::Float64), Type::Float64);
    }

    #[test]
    fn operand_requirements() {
        assert!(Operator::Add.accepts(&Type::Int32));
        assert!(!Operator::Add.accepts(&Type::String));
        assert!(Operator::And.accepts(&Type::Bool));
        assert!(!Operator::Or.accepts(&Type::Int32));
        assert!(Operator::Equal.accepts(&Type::Char));
    }
}
