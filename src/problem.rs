use ndarray::Array2;

use crate::encoding::RosterEncoding;

/// Allowed headcount for one shift type. A missing maximum means unbounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShiftCapacity {
    pub min: usize,
    pub max: Option<usize>,
}

impl ShiftCapacity {
    pub fn new(min: usize, max: usize) -> Self {
        ShiftCapacity { min, max: Some(max) }
    }

    pub fn at_least(min: usize) -> Self {
        ShiftCapacity { min, max: None }
    }

    /// How far the headcount lies outside the allowed window.
    pub fn deviation(&self, headcount: usize) -> usize {
        match self.max {
            Some(max) if headcount > max => headcount - max,
            _ if headcount < self.min => self.min - headcount,
            _ => 0,
        }
    }
}

/// Which shift types each worker is happy to work.
/// Rows are workers, columns are shift types.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftPreferenceTable {
    desired: Array2<bool>,
}

impl ShiftPreferenceTable {
    pub fn new(desired: Array2<bool>) -> Self {
        ShiftPreferenceTable { desired }
    }

    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let shift_types = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == shift_types),
            "all preference rows must have the same length"
        );
        let flat = rows.iter().flatten().cloned().collect();
        let desired = Array2::from_shape_vec((rows.len(), shift_types), flat)
            .expect("row lengths were checked");
        ShiftPreferenceTable { desired }
    }

    pub fn is_desired(&self, worker: usize, shift_type: usize) -> bool {
        self.desired[(worker, shift_type)]
    }

    pub fn dim(&self) -> (usize, usize) {
        self.desired.dim()
    }
}

/// The immutable description of a rostering problem.
#[derive(Debug, Clone)]
pub struct ShiftProblem {
    workers: Vec<String>,
    shift_types: Vec<String>,
    capacities: Vec<ShiftCapacity>,
    preferences: ShiftPreferenceTable,
    days_per_period: usize,
    periods: usize,
    max_shifts_per_period: usize,
}

impl ShiftProblem {
    pub fn new(
        workers: Vec<String>,
        shift_types: Vec<String>,
        capacities: Vec<ShiftCapacity>,
        preferences: ShiftPreferenceTable,
        days_per_period: usize,
        periods: usize,
        max_shifts_per_period: usize,
    ) -> Self {
        assert_eq!(
            capacities.len(),
            shift_types.len(),
            "one capacity per shift type is required"
        );
        assert_eq!(
            preferences.dim(),
            (workers.len(), shift_types.len()),
            "one preference per worker and shift type is required"
        );
        assert!(
            capacities.iter().all(|c| c.max.map_or(true, |max| c.min <= max)),
            "shift minimum must not exceed its maximum"
        );
        ShiftProblem {
            workers,
            shift_types,
            capacities,
            preferences,
            days_per_period,
            periods,
            max_shifts_per_period,
        }
    }

    /// The eight-worker, three-shift weekly instance used as the default problem.
    pub fn reference() -> Self {
        let workers = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let preferences = [
            [1, 0, 0],
            [1, 1, 0],
            [0, 0, 1],
            [0, 1, 0],
            [0, 0, 1],
            [1, 1, 1],
            [0, 1, 1],
            [1, 1, 1],
        ];
        let rows: Vec<Vec<bool>> = preferences
            .iter()
            .map(|row| row.iter().map(|flag| *flag == 1).collect())
            .collect();

        ShiftProblem::new(
            workers.iter().map(|name| name.to_string()).collect(),
            vec!["morning".into(), "evening".into(), "night".into()],
            vec![
                ShiftCapacity::new(2, 3),
                ShiftCapacity::new(2, 4),
                ShiftCapacity::new(1, 2),
            ],
            ShiftPreferenceTable::from_rows(&rows),
            7,
            1,
            5,
        )
    }

    /// The same workers and shift types over a different scheduling horizon.
    pub fn with_horizon(self, days_per_period: usize, periods: usize, max_shifts_per_period: usize) -> Self {
        ShiftProblem {
            days_per_period,
            periods,
            max_shifts_per_period,
            ..self
        }
    }

    pub fn encoding(&self) -> RosterEncoding {
        RosterEncoding::new(
            self.workers.len(),
            self.days_per_period * self.periods,
            self.shift_types.len(),
        )
    }

    pub fn workers(&self) -> &[String] {
        self.workers.as_slice()
    }

    pub fn shift_types(&self) -> &[String] {
        self.shift_types.as_slice()
    }

    pub fn capacities(&self) -> &[ShiftCapacity] {
        self.capacities.as_slice()
    }

    pub fn preferences(&self) -> &ShiftPreferenceTable {
        &self.preferences
    }

    pub fn days_per_period(&self) -> usize {
        self.days_per_period
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn max_shifts_per_period(&self) -> usize {
        self.max_shifts_per_period
    }

    /// Number of slots in one scheduling period of one worker.
    pub fn shifts_per_period(&self) -> usize {
        self.days_per_period * self.shift_types.len()
    }
}
