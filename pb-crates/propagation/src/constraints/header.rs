#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

use std::fmt::Display;
use std::fmt::Formatter;

use bitfield_struct::bitfield;

use crate::basic_types::Origin;
use crate::engine::PropagationStatistics;
use crate::pb_assert_moderate;

/// The cap on the LBD part of the priority of a constraint.
pub const MAX_LBD: u32 = 100_000;

/// A stable identity of a constraint; unlike a
/// [`ConstraintReference`](crate::basic_types::ConstraintReference) it is never reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub u64);

impl Display for ConstraintId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[bitfield(u8)]
#[derive(PartialEq, Eq)]
struct HeaderFlags {
    #[bits(4)]
    origin: Origin,
    seen: bool,
    marked_for_delete: bool,
    locked: bool,
    /// Padding
    #[bits(1)]
    __: u8,
}

/// Metadata shared by every kind of constraint.
///
/// The priority combines the quality of a constraint in a single float: the integer part is its
/// literal block distance (LBD, capped at [`MAX_LBD`]) and the fractional part is `1 - strength`.
/// Lower is better.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstraintHeader {
    id: ConstraintId,
    flags: HeaderFlags,
    priority: f32,
}

impl ConstraintHeader {
    pub fn new(id: ConstraintId, origin: Origin, lbd: u32, strength: f32) -> Self {
        pb_assert_moderate!(strength > 0.0 && strength <= 1.0);

        ConstraintHeader {
            id,
            flags: HeaderFlags::new().with_origin(origin),
            priority: pack_priority(lbd, 1.0 - strength),
        }
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn origin(&self) -> Origin {
        self.flags.origin()
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn lbd(&self) -> u32 {
        (self.priority.trunc() as u32).min(MAX_LBD)
    }

    pub fn strength(&self) -> f32 {
        1.0 - self.priority.fract()
    }

    /// Lowers the LBD to `new_lbd` if that is an improvement; the strength is untouched.
    pub fn decrease_quality(&mut self, new_lbd: u32) {
        let lbd = self.lbd().min(new_lbd);
        self.set_lbd(lbd);
    }

    /// Ages the constraint by increasing its LBD by `amount`, up to `cap`.
    pub fn decay_quality(&mut self, amount: u32, cap: u32) {
        let lbd = self.lbd().saturating_add(amount).min(cap);
        self.set_lbd(lbd);
    }

    fn set_lbd(&mut self, lbd: u32) {
        self.priority = pack_priority(lbd, self.priority.fract());
    }

    pub fn is_locked(&self) -> bool {
        self.flags.locked()
    }

    /// Locked constraints are never removed by the garbage collection of the host.
    pub fn lock(&mut self) {
        self.flags.set_locked(true)
    }

    pub fn is_seen(&self) -> bool {
        self.flags.seen()
    }

    pub fn mark_seen(&mut self) {
        self.flags.set_seen(true)
    }

    pub fn unmark_seen(&mut self) {
        self.flags.set_seen(false)
    }

    pub fn is_marked_for_delete(&self) -> bool {
        self.flags.marked_for_delete()
    }

    pub fn mark_for_delete(&mut self) {
        self.flags.set_marked_for_delete(true)
    }

    /// Counts the use of this constraint in a resolution step.
    pub fn record_provenance(&self, statistics: &mut PropagationStatistics) {
        statistics.provenance.record(self.origin());
    }
}

/// `lbd + weakness` for a `weakness` in `[0, 1)`. Near [`MAX_LBD`] an `f32` only has a few bits
/// left for the fraction; a sum that would round up to the next integer is replaced by the largest
/// value below it, so the integer part stays the LBD.
fn pack_priority(lbd: u32, weakness: f32) -> f32 {
    let whole = lbd.min(MAX_LBD) as f32;
    let priority = whole + weakness;
    if priority >= whole + 1.0 {
        f32::from_bits((whole + 1.0).to_bits() - 1)
    } else {
        priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(lbd: u32, strength: f32) -> ConstraintHeader {
        ConstraintHeader::new(ConstraintId(1), Origin::Learned, lbd, strength)
    }

    #[test]
    fn priority_packs_lbd_and_strength() {
        let header = header(7, 0.75);

        assert_eq!(header.lbd(), 7);
        assert!((header.strength() - 0.75).abs() < 1e-4);
        assert!((header.priority() - 7.25).abs() < 1e-4);
    }

    #[test]
    fn decreasing_quality_keeps_the_smaller_lbd_and_the_strength() {
        let mut header = header(5, 0.5);

        header.decrease_quality(3);
        assert_eq!(header.lbd(), 3);
        assert!((header.strength() - 0.5).abs() < 1e-4);

        header.decrease_quality(9);
        assert_eq!(header.lbd(), 3);
    }

    #[test]
    fn weak_constraints_near_the_maximum_lbd_keep_their_lbd() {
        let mut header = header(MAX_LBD, 0.001);

        assert_eq!(header.lbd(), MAX_LBD);
        assert!(header.strength() < 0.01);

        header.decrease_quality(MAX_LBD - 1);
        assert_eq!(header.lbd(), MAX_LBD - 1);
        header.decay_quality(5, MAX_LBD);
        assert_eq!(header.lbd(), MAX_LBD);
    }

    #[test]
    fn decaying_quality_is_capped() {
        let mut header = header(5, 1.0);

        header.decay_quality(3, 100);
        assert_eq!(header.lbd(), 8);

        header.decay_quality(1000, 100);
        assert_eq!(header.lbd(), 100);
        assert_eq!(header.strength(), 1.0);
    }

    #[test]
    fn lbd_never_exceeds_the_maximum() {
        let mut header = header(u32::MAX, 1.0);
        assert_eq!(header.lbd(), MAX_LBD);

        header.decay_quality(10, u32::MAX);
        assert_eq!(header.lbd(), MAX_LBD);
    }

    #[test]
    fn flags_do_not_interfere_with_the_origin() {
        let mut header = header(1, 1.0);

        header.mark_seen();
        header.lock();
        header.mark_for_delete();
        assert!(header.is_seen() && header.is_locked() && header.is_marked_for_delete());
        assert_eq!(header.origin(), Origin::Learned);

        header.unmark_seen();
        assert!(!header.is_seen());
        assert!(header.is_locked());
    }

    #[test]
    fn provenance_is_counted_per_origin() {
        let mut statistics = PropagationStatistics::default();

        header(1, 1.0).record_provenance(&mut statistics);

        assert_eq!(statistics.provenance.learned, 1);
        assert_eq!(statistics.provenance.resolve_steps, 1);
    }
}
