//! Interchangeable genetic operators.
//!
//! The generational loop only talks to the [`Selection`], [`Crossover`] and
//! [`Mutation`] traits, so any of the default strategies can be swapped out.

use rand::Rng;

use crate::encoding::Roster;
use crate::ga::Population;

/// Picks parents from an evaluated population.
pub trait Selection {
    /// Return `count` indices into `population`. Indices may repeat.
    fn select<R: Rng + ?Sized>(&self, rng: &mut R, population: &Population, count: usize) -> Vec<usize>;
}

/// Recombines two rosters in place.
pub trait Crossover {
    /// Returns true if the content of either roster changed.
    fn crossover<R: Rng + ?Sized>(&self, rng: &mut R, first: &mut Roster, second: &mut Roster) -> bool;
}

/// Perturbs a single roster in place.
pub trait Mutation {
    /// Returns true if the content changed.
    fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, roster: &mut Roster) -> bool;
}

/// Best-of-`size` tournament, sampling contestants uniformly with replacement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tournament {
    size: usize,
}

impl Tournament {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "tournament size must be at least 1");
        Tournament { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run one tournament. The first contestant drawn wins ties.
    pub fn compete<R: Rng + ?Sized>(&self, rng: &mut R, population: &Population) -> usize {
        let len = population.len();
        Tournament::winner(population, (0..self.size).map(|_| rng.gen_range(0, len)))
    }

    /// The lowest-cost contestant, earliest on ties.
    pub fn winner<I: IntoIterator<Item = usize>>(population: &Population, contestants: I) -> usize {
        contestants
            .into_iter()
            .min_by_key(|index| population.evaluated(*index))
            .expect("a tournament has at least one contestant")
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Tournament::new(2)
    }
}

impl Selection for Tournament {
    fn select<R: Rng + ?Sized>(&self, rng: &mut R, population: &Population, count: usize) -> Vec<usize> {
        assert!(!population.is_empty(), "cannot select from an empty population");
        std::iter::repeat_with(|| self.compete(rng, population))
            .take(count)
            .collect()
    }
}

/// Exchanges the segment between two uniformly drawn cut points.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TwoPoint;

impl TwoPoint {
    /// Swap `first[start..end]` with `second[start..end]`. Returns true if the
    /// swapped segments differed.
    pub fn exchange(first: &mut Roster, second: &mut Roster, start: usize, end: usize) -> bool {
        assert_eq!(first.len(), second.len(), "crossover needs rosters of equal length");
        let first = &mut first.shifts_mut()[start..end];
        let second = &mut second.shifts_mut()[start..end];
        if first == second {
            return false;
        }
        first.swap_with_slice(second);
        true
    }
}

impl Crossover for TwoPoint {
    fn crossover<R: Rng + ?Sized>(&self, rng: &mut R, first: &mut Roster, second: &mut Roster) -> bool {
        let length = first.len();
        let a = rng.gen_range(0, length + 1);
        let b = rng.gen_range(0, length + 1);
        TwoPoint::exchange(first, second, a.min(b), a.max(b))
    }
}

/// Flips every bit independently with probability `rate`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlipBit {
    rate: f64,
}

impl FlipBit {
    pub fn new(rate: f64) -> Self {
        assert!((0.0..=1.0).contains(&rate), "bit flip rate must be a probability");
        FlipBit { rate }
    }

    /// About one flip per roster of the given length.
    pub fn for_length(length: usize) -> Self {
        assert!(length > 0, "roster length must be positive");
        FlipBit::new(1.0 / length as f64)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Mutation for FlipBit {
    fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, roster: &mut Roster) -> bool {
        let mut flipped = false;
        for shift in roster.shifts_mut() {
            if rng.gen_bool(self.rate) {
                *shift = !*shift;
                flipped = true;
            }
        }
        flipped
    }
}
