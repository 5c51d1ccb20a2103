use crate::constraints::MAX_LBD;
use crate::math::WeightedWidth;

/// Options for the [`ConstraintPropagator`](super::ConstraintPropagator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatorOptions {
    /// The LBD that [`decay_constraint_qualities`] will not raise a constraint above.
    ///
    /// [`decay_constraint_qualities`]: super::ConstraintPropagator::decay_constraint_qualities
    pub lbd_cap: u32,
    /// The narrowest representation used for weighted constraints; [`WeightedWidth::Arbitrary`]
    /// forces arbitrary precision everywhere.
    pub minimum_width: WeightedWidth,
    /// The strength of constraints that are added without an explicit quality.
    pub initial_strength: f32,
}

impl Default for PropagatorOptions {
    fn default() -> Self {
        Self {
            lbd_cap: MAX_LBD,
            minimum_width: WeightedWidth::Bits32,
            initial_strength: 1.0,
        }
    }
}
