use crate::containers::DenseKey;

/// A handle to a slot of the [`ConstraintAllocator`](crate::engine::ConstraintAllocator).
///
/// Slots are reused after garbage collection; use the
/// [`ConstraintId`](crate::constraints::ConstraintId) of the header for a stable identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintReference {
    id: u32,
}

impl ConstraintReference {
    pub(crate) fn new(id: u32) -> ConstraintReference {
        ConstraintReference { id }
    }

    pub fn as_u32(&self) -> u32 {
        self.id
    }
}

impl DenseKey for ConstraintReference {
    fn to_position(self) -> usize {
        self.id as usize
    }

    fn from_position(position: usize) -> Self {
        ConstraintReference::new(position as u32)
    }
}
