use ndarray::{Array1, Array2};

use crate::cost::{CostModel, Violations};
use crate::encoding::Roster;
use crate::ga::Fitness;

/// A breakdown of one roster for display: who works when, how busy each worker
/// is per period, how many workers cover each slot, and what it all costs.
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    pub workers: Vec<String>,
    /// `workers × (days · slots)`, one row per worker timeline.
    pub shifts: Array2<bool>,
    /// `workers × periods`.
    pub period_totals: Array2<usize>,
    /// Workers scheduled at each timeline position.
    pub headcounts: Array1<usize>,
    pub violations: Violations,
    pub fitness: Fitness,
}

impl ScheduleReport {
    pub fn new(cost: &CostModel, roster: &Roster) -> Self {
        let table = cost.encoding().decode(roster);
        ScheduleReport {
            workers: cost.problem().workers().to_vec(),
            shifts: table.to_owned(),
            period_totals: cost.period_totals(table),
            headcounts: cost.headcounts(table),
            violations: cost.violations(roster),
            fitness: cost.cost(roster),
        }
    }

    /// Timeline of a single worker as 0/1 values.
    pub fn worker_line(&self, worker: usize) -> Vec<u8> {
        self.shifts.row(worker).iter().map(|worked| *worked as u8).collect()
    }
}
