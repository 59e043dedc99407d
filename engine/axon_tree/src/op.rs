//! Operator kinds.

use std::fmt;

/// Binary operators, one variant per operation-node family member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Numeric addition, string concatenation, byte concatenation.
    Add,
    /// Numeric subtraction.
    Subtract,
    /// Numeric multiplication.
    Multiply,
    /// Numeric division (integer division when both sides are Integer).
    Divide,
    /// Exponentiation.
    Power,
    /// Integer left shift.
    LeftShift,
    /// Integer arithmetic right shift.
    RightShift,
    /// Bitwise AND on integers, logical AND on booleans.
    And,
    /// Bitwise OR on integers, logical OR on booleans.
    Or,
    /// Bitwise XOR on integers, logical XOR on booleans.
    Xor,
    /// Equality.
    Equal,
    /// Inequality.
    NotEqual,
    /// Strict ordering.
    GreaterThan,
    /// Non-strict ordering.
    GreaterThanOrEqual,
    /// Strict ordering.
    LessThan,
    /// Non-strict ordering.
    LessThanOrEqual,
}

impl BinaryOp {
    /// Source-level symbol, used in diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "#",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
        }
    }

    /// Arithmetic family: `+ - * / ^` (shifts are classified apart
    /// because they constrain both operands to Integer).
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Power
        )
    }

    /// Shift family.
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::LeftShift | BinaryOp::RightShift)
    }

    /// Bitwise/logical family.
    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }

    /// Comparison family (always Boolean-valued).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
        )
    }

    /// Ordering comparisons — everything in the comparison family except
    /// equality and inequality. Booleans are not orderable.
    pub fn is_ordering(self) -> bool {
        self.is_comparison() && !matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation.
    Negate,
    /// Logical NOT on booleans, bitwise complement on integers.
    Not,
}

impl UnaryOp {
    /// Source-level symbol, used in diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
