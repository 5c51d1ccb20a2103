use fnv::FnvHashMap;

use crate::basic_types::Literal;

/// Knowledge about equivalent literals and binary implications between literals, used to decide
/// whether a constraint can be simplified.
pub trait ImplicationOracle {
    /// Whether `literal` is the representative of its equivalence class.
    fn is_canonical(&self, literal: Literal) -> bool;

    fn has_implieds(&self, literal: Literal) -> bool;

    /// The literals that are known to be true whenever `literal` is true.
    fn implieds(&self, literal: Literal) -> &[Literal];
}

/// A hash-map based [`ImplicationOracle`].
#[derive(Debug, Default, Clone)]
pub struct ImplicationGraph {
    implieds: FnvHashMap<Literal, Vec<Literal>>,
    representatives: FnvHashMap<Literal, Literal>,
}

impl ImplicationGraph {
    /// Records `antecedent -> consequent`, and thereby `!consequent -> !antecedent`.
    pub fn add_implication(&mut self, antecedent: Literal, consequent: Literal) {
        Self::insert(&mut self.implieds, antecedent, consequent);
        Self::insert(&mut self.implieds, !consequent, !antecedent);
    }

    /// Records that `literal` is equivalent to `representative`, making `literal` (and its
    /// negation) non-canonical.
    pub fn add_equivalence(&mut self, representative: Literal, literal: Literal) {
        let representative = self.representative(representative);
        if representative.variable() == literal.variable() {
            return;
        }
        let _ = self.representatives.insert(literal, representative);
        let _ = self.representatives.insert(!literal, !representative);
    }

    pub fn representative(&self, literal: Literal) -> Literal {
        let mut current = literal;
        while let Some(&next) = self.representatives.get(&current) {
            current = next;
        }
        current
    }

    fn insert(map: &mut FnvHashMap<Literal, Vec<Literal>>, from: Literal, to: Literal) {
        let implieds = map.entry(from).or_default();
        if !implieds.contains(&to) {
            implieds.push(to);
        }
    }
}

impl ImplicationOracle for ImplicationGraph {
    fn is_canonical(&self, literal: Literal) -> bool {
        !self.representatives.contains_key(&literal)
    }

    fn has_implieds(&self, literal: Literal) -> bool {
        self.implieds
            .get(&literal)
            .is_some_and(|implieds| !implieds.is_empty())
    }

    fn implieds(&self, literal: Literal) -> &[Literal] {
        self.implieds
            .get(&literal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
