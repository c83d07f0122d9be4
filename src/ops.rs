//! Whitelisted comparison and arithmetic operators.
//!
//! Every threshold test and per-die adjustment in the engine goes through the
//! two tables below; nothing is ever evaluated from text at runtime.

use crate::common::{Int, Value};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub const ALL: [Self; 6] = [Self::Lt, Self::Le, Self::Gt, Self::Ge, Self::Eq, Self::Ne];

    /// Looks up a comparator by its symbol. A bare `=` means equality.
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "=" | "==" => Self::Eq,
            "!=" => Self::Ne,
            _ => return None,
        })
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "=",
            Self::Ne => "!=",
        }
    }

    pub fn compare<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            _ => return None,
        })
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Applies the operator exactly. Division by zero is rejected when the
    /// expression is parsed, so `rhs` is never zero for `Div` here.
    pub fn apply(self, lhs: Value, rhs: Value) -> Value {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A comparison against a fixed integer threshold, e.g. `>=5`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Condition {
    pub op: CmpOp,
    pub threshold: Int,
}

impl Condition {
    pub const fn new(op: CmpOp, threshold: Int) -> Self {
        Self { op, threshold }
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.op.compare(value, &Value::from_integer(self.threshold))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::int;

    #[test]
    fn test_cmp_lookup() {
        assert_eq!(CmpOp::from_symbol("="), Some(CmpOp::Eq));
        assert_eq!(CmpOp::from_symbol("=="), Some(CmpOp::Eq));
        assert_eq!(CmpOp::from_symbol(">="), Some(CmpOp::Ge));
        assert_eq!(CmpOp::from_symbol("=>"), None);
        for op in CmpOp::ALL {
            assert_eq!(CmpOp::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_cmp_compare() {
        assert!(CmpOp::Lt.compare(&1, &2));
        assert!(!CmpOp::Lt.compare(&2, &2));
        assert!(CmpOp::Le.compare(&2, &2));
        assert!(CmpOp::Gt.compare(&3, &2));
        assert!(CmpOp::Ge.compare(&2, &2));
        assert!(CmpOp::Eq.compare(&2, &2));
        assert!(CmpOp::Ne.compare(&1, &2));
    }

    #[test]
    fn test_arith_apply() {
        assert_eq!(ArithOp::Add.apply(int(4), int(3)), int(7));
        assert_eq!(ArithOp::Sub.apply(int(4), int(6)), int(-2));
        assert_eq!(ArithOp::Mul.apply(int(4), int(3)), int(12));
        assert_eq!(ArithOp::Div.apply(int(5), int(2)), Value::new(5, 2));
        assert_eq!(ArithOp::from_symbol("%"), None);
    }

    #[test]
    fn test_condition() {
        let cond = Condition::new(CmpOp::Ge, 5);
        assert!(cond.matches(&int(5)));
        assert!(cond.matches(&Value::new(11, 2)));
        assert!(!cond.matches(&Value::new(9, 2)));
        assert_eq!(cond.to_string(), ">=5");
        assert_eq!(Condition::new(CmpOp::Eq, 1).to_string(), "=1");
    }
}
