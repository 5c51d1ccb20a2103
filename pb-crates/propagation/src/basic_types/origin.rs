use std::fmt::Display;
use std::fmt::Formatter;

/// Where a constraint came from.
///
/// Fits in four bits so that it can be packed into the
/// [`ConstraintHeader`](crate::constraints::ConstraintHeader).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Origin {
    #[default]
    Unknown = 0,
    Formula = 1,
    SymmetryBreak = 2,
    Learned = 3,
    BoundReformulation = 4,
    CoreGuided = 5,
    BottomUp = 6,
    GomoryCut = 7,
    Dual = 8,
    Farkas = 9,
    DetectedAtMostOne = 10,
    Reduced = 11,
    Equality = 12,
    Implication = 13,
}

impl Origin {
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(value: u8) -> Self {
        match value {
            1 => Origin::Formula,
            2 => Origin::SymmetryBreak,
            3 => Origin::Learned,
            4 => Origin::BoundReformulation,
            5 => Origin::CoreGuided,
            6 => Origin::BottomUp,
            7 => Origin::GomoryCut,
            8 => Origin::Dual,
            9 => Origin::Farkas,
            10 => Origin::DetectedAtMostOne,
            11 => Origin::Reduced,
            12 => Origin::Equality,
            13 => Origin::Implication,
            _ => Origin::Unknown,
        }
    }

    /// Whether the constraint was derived during search rather than given as input.
    pub fn is_learned(self) -> bool {
        !matches!(
            self,
            Origin::Unknown | Origin::Formula | Origin::SymmetryBreak
        )
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
