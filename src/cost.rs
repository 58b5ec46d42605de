use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::encoding::{Roster, RosterEncoding};
use crate::ga::Fitness;
use crate::problem::ShiftProblem;

/// Violation counts of a single roster, per constraint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    /// Pairs of immediately adjacent worked slots.
    pub consecutive: usize,
    /// Shifts worked above the per-period maximum, summed over workers and periods.
    pub overload: usize,
    /// Headcount outside the allowed window, summed over all positions.
    pub capacity: usize,
    /// Worked slots of a shift type the worker does not want.
    pub preference: usize,
}

impl Violations {
    pub fn hard(&self) -> usize {
        self.consecutive + self.overload + self.capacity
    }

    pub fn soft(&self) -> usize {
        self.preference
    }
}

/// Maps a roster to its weighted violation count.
///
/// Hard violations are scaled by `hard_penalty`, soft violations count once each.
#[derive(Debug, Clone)]
pub struct CostModel {
    problem: ShiftProblem,
    encoding: RosterEncoding,
    hard_penalty: f64,
}

impl CostModel {
    pub fn new(problem: &ShiftProblem, hard_penalty: f64) -> Self {
        assert!(
            hard_penalty.is_finite() && hard_penalty >= 0.0,
            "hard constraint penalty must be a non-negative number"
        );
        CostModel {
            problem: problem.clone(),
            encoding: problem.encoding(),
            hard_penalty,
        }
    }

    pub fn problem(&self) -> &ShiftProblem {
        &self.problem
    }

    pub fn encoding(&self) -> RosterEncoding {
        self.encoding
    }

    pub fn length(&self) -> usize {
        self.encoding.length()
    }

    pub fn hard_penalty(&self) -> f64 {
        self.hard_penalty
    }

    pub fn cost(&self, roster: &Roster) -> Fitness {
        let violations = self.violations(roster);
        Fitness::new(self.hard_penalty * violations.hard() as f64 + violations.soft() as f64)
    }

    pub fn violations(&self, roster: &Roster) -> Violations {
        let table = self.encoding.decode(roster);
        Violations {
            consecutive: self.consecutive_violations(table),
            overload: self.overload_violations(table),
            capacity: self.capacity_violations(table),
            preference: self.preference_violations(table),
        }
    }

    /// Each worker's timeline is one flat sequence, so a night shift followed by
    /// the next morning's shift also counts.
    pub fn consecutive_violations(&self, table: ArrayView2<bool>) -> usize {
        table
            .outer_iter()
            .map(|timeline| {
                timeline
                    .iter()
                    .tuple_windows()
                    .filter(|(first, second)| **first && **second)
                    .count()
            })
            .sum()
    }

    pub fn overload_violations(&self, table: ArrayView2<bool>) -> usize {
        let max = self.problem.max_shifts_per_period();
        self.period_totals(table)
            .iter()
            .map(|total| total.saturating_sub(max))
            .sum()
    }

    pub fn capacity_violations(&self, table: ArrayView2<bool>) -> usize {
        let capacities = self.problem.capacities();
        let slots = self.encoding.slots();
        self.headcounts(table)
            .indexed_iter()
            .map(|(position, headcount)| capacities[position % slots].deviation(*headcount))
            .sum()
    }

    pub fn preference_violations(&self, table: ArrayView2<bool>) -> usize {
        let preferences = self.problem.preferences();
        let slots = self.encoding.slots();
        table
            .indexed_iter()
            .filter(|((worker, position), worked)| {
                **worked && !preferences.is_desired(*worker, position % slots)
            })
            .count()
    }

    /// Shifts worked by each worker in each period, shaped `workers × periods`.
    pub fn period_totals(&self, table: ArrayView2<bool>) -> Array2<usize> {
        let workers = self.encoding.workers();
        let periods = self.problem.periods();
        let per_period = self.problem.shifts_per_period();
        table
            .mapv(|worked| worked as usize)
            .into_shape((workers, periods, per_period))
            .expect("a worker timeline is a whole number of periods")
            .sum_axis(Axis(2))
    }

    /// Number of workers scheduled at each position of the timeline.
    pub fn headcounts(&self, table: ArrayView2<bool>) -> Array1<usize> {
        table.fold_axis(Axis(0), 0, |count, worked| count + (*worked as usize))
    }
}
