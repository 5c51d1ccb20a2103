use crate::basic_types::Literal;
use crate::containers::DenseKey;

/// A set of literals with constant time insertion, membership and clearing proportional to the
/// number of members.
///
/// Membership is tracked by a position index into the dense member list, in the style of a sparse
/// set; the index grows on demand.
#[derive(Debug, Default, Clone)]
pub struct LiteralSet {
    members: Vec<Literal>,
    positions: Vec<u32>,
}

impl LiteralSet {
    pub fn insert(&mut self, literal: Literal) {
        if self.contains(literal) {
            return;
        }
        if literal.to_position() >= self.positions.len() {
            self.positions.resize(literal.to_position() + 1, u32::MAX);
        }
        self.positions[literal.to_position()] = self.members.len() as u32;
        self.members.push(literal);
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.positions
            .get(literal.to_position())
            .is_some_and(|&position| {
                (position as usize) < self.members.len()
                    && self.members[position as usize] == literal
            })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        for literal in self.members.drain(..) {
            self.positions[literal.to_position()] = u32::MAX;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.members.iter().copied()
    }
}

/// Hands out cleared [`LiteralSet`]s and keeps released ones around to reuse their buffers.
#[derive(Debug, Default)]
pub struct LiteralSetPool {
    available: Vec<LiteralSet>,
}

impl LiteralSetPool {
    pub fn take(&mut self) -> LiteralSet {
        self.available.pop().unwrap_or_default()
    }

    pub fn release(&mut self, mut set: LiteralSet) {
        set.clear();
        self.available.push(set);
    }

    pub fn num_available(&self) -> usize {
        self.available.len()
    }
}
