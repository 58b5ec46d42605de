use crate::encoding::Roster;
use crate::ga::{Fitness, Population};

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub fitness: Fitness,
    pub roster: Roster,
}

/// The best rosters seen so far, at most `capacity` of them, sorted by ascending cost.
///
/// Entries are owned copies, so the population can be overwritten freely. Equal
/// costs keep their insertion order, and a roster whose content is already
/// archived is never added twice.
#[derive(Debug, Clone)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Entry>,
}

impl HallOfFame {
    pub fn new(capacity: usize) -> Self {
        HallOfFame {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn entries(&self) -> &[Entry] {
        self.entries.as_slice()
    }

    pub fn best(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn worst(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Offer a single roster. Returns true if it was archived.
    pub fn insert(&mut self, roster: &Roster, fitness: Fitness) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_full() {
            match self.worst() {
                Some(worst) if fitness < worst.fitness => {}
                _ => return false,
            }
        }
        if self.entries.iter().any(|entry| entry.roster == *roster) {
            return false;
        }
        if self.is_full() {
            self.entries.pop();
        }
        let position = self.entries.partition_point(|entry| entry.fitness <= fitness);
        self.entries.insert(
            position,
            Entry {
                fitness,
                roster: roster.clone(),
            },
        );
        true
    }

    /// Offer every individual of an evaluated population, in order.
    /// Returns the number of rosters archived.
    pub fn update(&mut self, population: &Population) -> usize {
        (0..population.len())
            .filter(|index| self.insert(population.roster(*index), population.evaluated(*index)))
            .count()
    }
}
