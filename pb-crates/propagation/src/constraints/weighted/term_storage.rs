#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

use std::fmt::Debug;
use std::mem::size_of;

use bitfield_struct::bitfield;

use crate::basic_types::Literal;

/// A literal code together with a flag recording whether the term is currently watched.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct WatchedLiteral {
    watched: bool,
    #[bits(31)]
    code: u32,
}

impl WatchedLiteral {
    pub(crate) fn unwatched(literal: Literal) -> Self {
        WatchedLiteral::new().with_code(literal.to_u32())
    }

    pub fn literal(&self) -> Literal {
        Literal::from_u32(self.code())
    }
}

/// Owned storage for the terms of a weighted constraint.
pub trait TermStorage<CF>: Clone + Debug {
    /// Takes ownership of the terms, which are sorted by non-increasing coefficient.
    fn from_terms(terms: Vec<(CF, Literal)>) -> Self;

    fn len(&self) -> usize;

    fn coefficient(&self, index: usize) -> &CF;

    fn literal(&self, index: usize) -> Literal;

    fn is_watched(&self, index: usize) -> bool;

    fn set_watched(&mut self, index: usize, watched: bool);

    /// The number of bytes needed to store `length` terms.
    fn required_bytes(length: usize) -> usize;
}

#[derive(Clone, Debug)]
struct PackedTerm<CF> {
    coefficient: CF,
    literal: WatchedLiteral,
}

/// Stores every coefficient right next to its literal; used for fixed width coefficients.
#[derive(Clone, Debug)]
pub struct PackedTerms<CF> {
    terms: Box<[PackedTerm<CF>]>,
}

impl<CF: Clone + Debug> TermStorage<CF> for PackedTerms<CF> {
    fn from_terms(terms: Vec<(CF, Literal)>) -> Self {
        PackedTerms {
            terms: terms
                .into_iter()
                .map(|(coefficient, literal)| PackedTerm {
                    coefficient,
                    literal: WatchedLiteral::unwatched(literal),
                })
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.terms.len()
    }

    fn coefficient(&self, index: usize) -> &CF {
        &self.terms[index].coefficient
    }

    fn literal(&self, index: usize) -> Literal {
        self.terms[index].literal.literal()
    }

    fn is_watched(&self, index: usize) -> bool {
        self.terms[index].literal.watched()
    }

    fn set_watched(&mut self, index: usize, watched: bool) {
        self.terms[index].literal.set_watched(watched)
    }

    fn required_bytes(length: usize) -> usize {
        length * size_of::<PackedTerm<CF>>()
    }
}

/// Stores the literals and the coefficients in separate buffers; used for coefficient types that
/// own heap memory, where keeping the literal scan compact matters most.
#[derive(Clone, Debug)]
pub struct WideTerms<CF> {
    literals: Box<[WatchedLiteral]>,
    coefficients: Box<[CF]>,
}

impl<CF: Clone + Debug> TermStorage<CF> for WideTerms<CF> {
    fn from_terms(terms: Vec<(CF, Literal)>) -> Self {
        let (coefficients, literals): (Vec<CF>, Vec<WatchedLiteral>) = terms
            .into_iter()
            .map(|(coefficient, literal)| (coefficient, WatchedLiteral::unwatched(literal)))
            .unzip();
        WideTerms {
            literals: literals.into_boxed_slice(),
            coefficients: coefficients.into_boxed_slice(),
        }
    }

    fn len(&self) -> usize {
        self.literals.len()
    }

    fn coefficient(&self, index: usize) -> &CF {
        &self.coefficients[index]
    }

    fn literal(&self, index: usize) -> Literal {
        self.literals[index].literal()
    }

    fn is_watched(&self, index: usize) -> bool {
        self.literals[index].watched()
    }

    fn set_watched(&mut self, index: usize, watched: bool) {
        self.literals[index].set_watched(watched)
    }

    fn required_bytes(length: usize) -> usize {
        length * (size_of::<WatchedLiteral>() + size_of::<CF>())
    }
}
