use std::fmt::Display;
use std::fmt::Formatter;

use fnv::FnvHashMap;
use num::BigInt;
use num::Integer;
use num::One;
use num::Signed;
use num::Zero;

use crate::basic_types::Literal;
use crate::basic_types::Origin;
use crate::basic_types::Variable;
use crate::constraints::ConstraintId;
use crate::engine::Assignments;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// A term of an [`ExpandedConstraint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    pub coefficient: BigInt,
    pub literal: Literal,
}

/// An arbitrary precision linear constraint `sum coefficient * literal >= degree`, used to build
/// new constraints and to accumulate the result of conflict analysis.
///
/// The representation is normalised: every variable occurs at most once and every coefficient is
/// positive. Adding a term with a negative coefficient, or a term over a literal whose negation is
/// already present, moves the constant part to the degree.
#[derive(Clone, Debug, Default)]
pub struct ExpandedConstraint {
    terms: Vec<Term>,
    positions: FnvHashMap<Variable, usize>,
    degree: BigInt,
    origin: Origin,
    antecedents: Vec<ConstraintId>,
}

impl ExpandedConstraint {
    pub fn new(origin: Origin) -> Self {
        ExpandedConstraint {
            origin,
            ..Default::default()
        }
    }

    /// Creates `sum coefficient * literal >= degree` from the provided terms.
    pub fn from_terms<Value: Into<BigInt>>(
        terms: impl IntoIterator<Item = (Value, Literal)>,
        degree: impl Into<BigInt>,
        origin: Origin,
    ) -> Self {
        let mut expanded = ExpandedConstraint::new(origin);
        for (coefficient, literal) in terms {
            expanded.add_lhs(coefficient, literal);
        }
        expanded.add_rhs(degree);
        expanded
    }

    /// Creates the clause `literal_1 \/ ... \/ literal_n`.
    pub fn clause(literals: impl IntoIterator<Item = Literal>, origin: Origin) -> Self {
        Self::from_terms(literals.into_iter().map(|literal| (1, literal)), 1, origin)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn degree(&self) -> &BigInt {
        &self.degree
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter()
    }

    pub fn largest_coefficient(&self) -> Option<&BigInt> {
        self.terms.iter().map(|term| &term.coefficient).max()
    }

    /// The identities of the constraints that were combined into this one.
    pub fn antecedents(&self) -> &[ConstraintId] {
        &self.antecedents
    }

    /// The coefficient of `literal`; zero if the variable does not occur or occurs negated.
    pub fn coefficient(&self, literal: Literal) -> BigInt {
        self.positions
            .get(&literal.variable())
            .map(|&position| &self.terms[position])
            .filter(|term| term.literal == literal)
            .map_or_else(BigInt::zero, |term| term.coefficient.clone())
    }

    /// Whether the constraint is satisfied by every assignment.
    pub fn is_tautology(&self) -> bool {
        !self.degree.is_positive()
    }

    /// Adds `coefficient * literal` to the left-hand side.
    pub fn add_lhs(&mut self, coefficient: impl Into<BigInt>, literal: Literal) {
        let mut coefficient = coefficient.into();
        let mut literal = literal;
        if coefficient.is_zero() {
            return;
        }
        if coefficient.is_negative() {
            // c * l = c + |c| * ~l
            self.degree -= &coefficient;
            coefficient = -coefficient;
            literal = !literal;
        }

        let Some(&position) = self.positions.get(&literal.variable()) else {
            let _ = self.positions.insert(literal.variable(), self.terms.len());
            self.terms.push(Term {
                coefficient,
                literal,
            });
            return;
        };

        let term = &mut self.terms[position];
        if term.literal == literal {
            term.coefficient += coefficient;
            return;
        }

        // e * ~l + c * l = (e - c) * ~l + c
        self.degree -= &coefficient;
        term.coefficient -= coefficient;
        if term.coefficient.is_negative() {
            let magnitude = -std::mem::take(&mut term.coefficient);
            self.degree += &magnitude;
            term.coefficient = magnitude;
            term.literal = literal;
        } else if term.coefficient.is_zero() {
            self.remove_term(position);
        }
    }

    /// Adds `value` to the degree.
    pub fn add_rhs(&mut self, value: impl Into<BigInt>) {
        self.degree += value.into();
    }

    fn remove_term(&mut self, position: usize) {
        let removed = self.terms.swap_remove(position);
        let _ = self.positions.remove(&removed.literal.variable());
        if let Some(moved) = self.terms.get(position) {
            let _ = self.positions.insert(moved.literal.variable(), position);
        }
    }

    pub fn multiply(&mut self, factor: &BigInt) {
        pb_assert_simple!(factor.is_positive());
        if factor.is_one() {
            return;
        }
        for term in self.terms.iter_mut() {
            term.coefficient *= factor;
        }
        self.degree *= factor;
    }

    /// Lowers every coefficient larger than the degree to the degree.
    pub fn saturate(&mut self) {
        if self.is_tautology() {
            return;
        }
        for term in self.terms.iter_mut() {
            if term.coefficient > self.degree {
                term.coefficient = self.degree.clone();
            }
        }
    }

    /// The sum of the coefficients of the literals that are not false, minus the degree.
    pub fn slack(&self, assignments: &Assignments) -> BigInt {
        self.terms
            .iter()
            .filter(|term| !assignments.is_literal_false(term.literal))
            .map(|term| &term.coefficient)
            .sum::<BigInt>()
            - &self.degree
    }

    /// Whether the assignments made at levels below `decision_level` falsify the constraint or
    /// imply one of its literals, i.e. whether some literal which is not false at those levels
    /// has a (saturated) coefficient larger than the slack.
    ///
    /// If this does not hold, it also does not hold for any lower level.
    pub fn propagates_below_level(&self, assignments: &Assignments, decision_level: usize) -> bool {
        let is_false_below = |literal: Literal| {
            assignments.is_literal_false(literal)
                && assignments
                    .decision_level_of(literal.variable())
                    .is_some_and(|level| level < decision_level)
        };
        let open_terms = || {
            self.terms
                .iter()
                .filter(move |term| !is_false_below(term.literal))
        };

        let slack = open_terms().map(|term| &term.coefficient).sum::<BigInt>() - &self.degree;
        slack.is_negative()
            || (self.degree > slack && open_terms().any(|term| term.coefficient > slack))
    }

    pub fn is_sorted_by_decreasing_coefficient(&self) -> bool {
        self.terms
            .windows(2)
            .all(|pair| pair[0].coefficient >= pair[1].coefficient)
    }

    /// Sorts the terms by decreasing coefficient; ties are ordered by literal.
    pub fn sort_by_decreasing_coefficient(&mut self) {
        self.terms.sort_by(|left, right| {
            right
                .coefficient
                .cmp(&left.coefficient)
                .then(left.literal.cmp(&right.literal))
        });
        for (position, term) in self.terms.iter().enumerate() {
            let _ = self.positions.insert(term.literal.variable(), position);
        }
    }

    /// Performs a cutting planes resolution step on `propagated`.
    ///
    /// The reason `sum reason_terms >= reason_degree` propagated `propagated`, and its negation
    /// occurs in this constraint. Both are scaled so that the coefficients of `propagated` and its
    /// negation become equal, after which they are added and the result is saturated.
    pub fn resolve_with(
        &mut self,
        reason_terms: Vec<(BigInt, Literal)>,
        reason_degree: BigInt,
        reason_id: ConstraintId,
        propagated: Literal,
    ) {
        let own_coefficient = self.coefficient(!propagated);
        let reason_coefficient = reason_terms
            .iter()
            .find(|(_, literal)| *literal == propagated)
            .map_or_else(BigInt::zero, |(coefficient, _)| coefficient.clone());
        pb_assert_simple!(
            own_coefficient.is_positive() && reason_coefficient.is_positive(),
            "{propagated} is not a resolvable pivot"
        );

        let gcd = own_coefficient.gcd(&reason_coefficient);
        let own_multiplier = &reason_coefficient / &gcd;
        let reason_multiplier = &own_coefficient / &gcd;

        self.multiply(&own_multiplier);
        for (coefficient, literal) in reason_terms {
            self.add_lhs(coefficient * &reason_multiplier, literal);
        }
        self.add_rhs(reason_degree * &reason_multiplier);
        self.saturate();
        self.antecedents.push(reason_id);

        pb_assert_moderate!(self.coefficient(!propagated).is_zero());
        pb_assert_moderate!(self.coefficient(propagated).is_zero());
    }

    /// Attempts self-subsuming resolution with the reason for `propagated`.
    ///
    /// If every other literal of the reason occurs in this constraint with a saturated
    /// coefficient, resolving would only remove `~propagated`; this is done directly and `true` is
    /// returned. Otherwise the constraint is left untouched.
    pub fn subsume_with(
        &mut self,
        reason_literals: impl IntoIterator<Item = Literal>,
        reason_id: ConstraintId,
        propagated: Literal,
    ) -> bool {
        let Some(&position) = self.positions.get(&propagated.variable()) else {
            return false;
        };
        if self.terms[position].literal != !propagated || self.is_tautology() {
            return false;
        }

        let all_saturated = reason_literals
            .into_iter()
            .filter(|&literal| literal != propagated)
            .all(|literal| self.coefficient(literal) >= self.degree);
        if !all_saturated {
            return false;
        }

        self.remove_term(position);
        self.antecedents.push(reason_id);
        true
    }
}

impl Display for ExpandedConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            write!(f, "0")?;
        }
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} {}", term.coefficient, term.literal)?;
        }
        write!(f, " >= {}", self.degree)
    }
}
