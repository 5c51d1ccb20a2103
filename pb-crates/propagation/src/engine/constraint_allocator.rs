use std::ops::Index;
use std::ops::IndexMut;

use crate::basic_types::ConstraintReference;
use crate::constraints::Constraint;
use crate::constraints::ConstraintId;
use crate::containers::KeyedVec;
use crate::pb_assert_advanced;
use crate::pb_assert_moderate;

/// Owns every constraint; a [`ConstraintReference`] is the index of a slot.
///
/// Freed slots are reused by later allocations, so a reference must not be used after the
/// constraint it pointed to has been freed.
#[derive(Debug, Default)]
pub struct ConstraintAllocator {
    slots: KeyedVec<ConstraintReference, Option<Constraint>>,
    free_references: Vec<ConstraintReference>,
    next_id: u64,
    bytes_in_use: usize,
}

impl ConstraintAllocator {
    /// Hands out a fresh identifier for the header of a constraint which is about to be allocated.
    pub fn next_id(&mut self) -> ConstraintId {
        self.next_id += 1;
        ConstraintId(self.next_id)
    }

    pub fn allocate(&mut self, constraint: Constraint) -> ConstraintReference {
        self.bytes_in_use += constraint.required_bytes();

        match self.free_references.pop() {
            Some(reference) => {
                pb_assert_moderate!(self.slots[reference].is_none());
                self.slots[reference] = Some(constraint);
                reference
            }
            None => self.slots.push(Some(constraint)),
        }
    }

    pub fn get(&self, reference: ConstraintReference) -> Option<&Constraint> {
        self.slots.get(reference)?.as_ref()
    }

    pub fn get_mut(&mut self, reference: ConstraintReference) -> Option<&mut Constraint> {
        self.slots.get_mut(reference)?.as_mut()
    }

    /// Releases the slot of `reference` and returns the constraint it held.
    pub fn free(&mut self, reference: ConstraintReference) -> Option<Constraint> {
        pb_assert_advanced!(
            !self.free_references.contains(&reference),
            "freeing {reference:?} twice"
        );
        let constraint = self.slots[reference].take()?;
        self.bytes_in_use -= constraint.required_bytes();
        self.free_references.push(reference);
        Some(constraint)
    }

    pub fn num_constraints(&self) -> usize {
        self.slots.len() - self.free_references.len()
    }

    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConstraintReference, &Constraint)> + '_ {
        self.slots
            .iter_with_keys()
            .filter_map(|(reference, slot)| Some((reference, slot.as_ref()?)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Constraint> + '_ {
        self.slots.iter_mut().flatten()
    }
}

impl Index<ConstraintReference> for ConstraintAllocator {
    type Output = Constraint;

    fn index(&self, reference: ConstraintReference) -> &Constraint {
        match &self.slots[reference] {
            Some(constraint) => constraint,
            None => panic!("{reference:?} refers to a freed constraint"),
        }
    }
}

impl IndexMut<ConstraintReference> for ConstraintAllocator {
    fn index_mut(&mut self, reference: ConstraintReference) -> &mut Constraint {
        match &mut self.slots[reference] {
            Some(constraint) => constraint,
            None => panic!("{reference:?} refers to a freed constraint"),
        }
    }
}
