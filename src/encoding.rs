use ndarray::{ArrayView2, ShapeError};

/// A candidate roster. One flag per (worker, day, shift slot), stored worker-major.
/// A set flag means the worker works that slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Roster {
    shifts: Vec<bool>,
}

impl Roster {
    pub fn new(shifts: Vec<bool>) -> Self {
        Roster { shifts }
    }

    /// An all-zero roster of the given length.
    pub fn empty(length: usize) -> Self {
        Roster {
            shifts: vec![false; length],
        }
    }

    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R, length: usize) -> Self {
        let shifts = std::iter::repeat_with(|| rng.gen_bool(0.5))
            .take(length)
            .collect();
        Roster { shifts }
    }

    /// Build a roster from 0/1 values. Any non-zero value counts as worked.
    pub fn from_bits(bits: &[u8]) -> Self {
        Roster {
            shifts: bits.iter().map(|bit| *bit != 0).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn shifts(&self) -> &[bool] {
        self.shifts.as_slice()
    }

    pub fn shifts_mut(&mut self) -> &mut [bool] {
        self.shifts.as_mut_slice()
    }

    pub fn worked_count(&self) -> usize {
        self.shifts.iter().filter(|worked| **worked).count()
    }
}

/// The decoded coordinates of a flat roster position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub worker: usize,
    pub day: usize,
    pub slot: usize,
}

/// Fixed-radix layout of a roster: `workers × days × slots`, worker-major.
///
/// Worker `k` owns the contiguous range `[k·D·S, (k+1)·D·S)`, within which
/// day `d` and slot `s` sit at offset `d·S + s`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RosterEncoding {
    workers: usize,
    days: usize,
    slots: usize,
}

impl RosterEncoding {
    pub fn new(workers: usize, days: usize, slots: usize) -> Self {
        RosterEncoding {
            workers,
            days,
            slots,
        }
    }

    pub fn length(&self) -> usize {
        self.workers * self.shifts_per_worker()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Length of a single worker's timeline, `D·S`.
    pub fn shifts_per_worker(&self) -> usize {
        self.days * self.slots
    }

    pub fn position(&self, index: usize) -> Position {
        assert!(index < self.length(), "position {} out of range", index);
        let per_worker = self.shifts_per_worker();
        let offset = index % per_worker;
        Position {
            worker: index / per_worker,
            day: offset / self.slots,
            slot: offset % self.slots,
        }
    }

    pub fn index(&self, position: Position) -> usize {
        assert!(position.worker < self.workers && position.day < self.days && position.slot < self.slots);
        position.worker * self.shifts_per_worker() + position.day * self.slots + position.slot
    }

    /// View the roster as a `workers × (D·S)` table. Row `k` is worker `k`'s timeline.
    ///
    /// Panics if the roster length does not match the encoding.
    pub fn decode<'a>(&self, roster: &'a Roster) -> ArrayView2<'a, bool> {
        assert_eq!(
            roster.len(),
            self.length(),
            "roster length must match the encoding length"
        );
        self.view(roster)
            .expect("shape matches once the length has been checked")
    }

    fn view<'a>(&self, roster: &'a Roster) -> Result<ArrayView2<'a, bool>, ShapeError> {
        ArrayView2::from_shape((self.workers, self.shifts_per_worker()), roster.shifts())
    }
}
