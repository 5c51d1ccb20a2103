use std::fmt::Display;
use std::fmt::Formatter;

use crate::containers::DenseKey;

/// A 0/1 variable, identified by its index in the [`Assignments`](crate::engine::Assignments).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    index: u32,
}

impl Variable {
    pub const fn new(index: u32) -> Variable {
        Variable { index }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl DenseKey for Variable {
    fn to_position(self) -> usize {
        self.index as usize
    }

    fn from_position(position: usize) -> Self {
        Variable::new(position as u32)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.index)
    }
}
