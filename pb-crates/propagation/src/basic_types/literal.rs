use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Not;

use super::Variable;
use crate::containers::DenseKey;
use crate::pb_assert_moderate;

/// Literal codes occupy 31 bits so that a watch flag fits next to them; this is also the bound on
/// the number of terms in a single constraint.
pub const MAX_CONSTRAINT_SIZE: usize = (u32::MAX >> 1) as usize;

/// A variable or its negation, encoded as `2 * variable + is_positive`.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    code: u32,
}

impl Literal {
    pub fn new(variable: Variable, is_positive: bool) -> Literal {
        let code = variable.index() * 2 + (is_positive as u32);
        pb_assert_moderate!((code as usize) < MAX_CONSTRAINT_SIZE);
        Literal { code }
    }

    pub fn positive(variable: Variable) -> Literal {
        Literal::new(variable, true)
    }

    pub fn negative(variable: Variable) -> Literal {
        Literal::new(variable, false)
    }

    pub fn is_positive(&self) -> bool {
        (self.code & 1) == 1
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }

    pub fn variable(&self) -> Variable {
        Variable::new(self.code / 2)
    }

    pub fn to_u32(self) -> u32 {
        self.code
    }

    pub fn from_u32(code: u32) -> Literal {
        Literal { code }
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            code: self.code ^ 1,
        }
    }
}

impl DenseKey for Literal {
    fn to_position(self) -> usize {
        self.code as usize
    }

    fn from_position(position: usize) -> Self {
        Literal::from_u32(position as u32)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "~{}", self.variable())
        } else {
            write!(f, "{}", self.variable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_polarity_but_keeps_variable() {
        let literal = Literal::positive(Variable::new(7));

        assert!(literal.is_positive());
        assert!((!literal).is_negative());
        assert_eq!((!literal).variable(), Variable::new(7));
        assert_eq!(!!literal, literal);
    }

    #[test]
    fn literal_codes_are_dense_per_variable() {
        let variable = Variable::new(3);

        assert_eq!(Literal::negative(variable).to_u32(), 6);
        assert_eq!(Literal::positive(variable).to_u32(), 7);
        assert_eq!(Literal::from_u32(7), Literal::positive(variable));
    }

    #[test]
    fn display_marks_negative_literals() {
        let variable = Variable::new(2);

        assert_eq!(Literal::positive(variable).to_string(), "x2");
        assert_eq!(Literal::negative(variable).to_string(), "~x2");
    }
}
