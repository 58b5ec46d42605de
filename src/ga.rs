use rayon::prelude::*;

use crate::cost::CostModel;
use crate::encoding::Roster;

/// A cost value. Lower is better.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Fitness(f64);

impl Fitness {
    pub fn new(fitness: f64) -> Self {
        assert!(!fitness.is_nan(), "fitness must not be Nan");
        assert!(fitness >= 0.0, "fitness must not be negative");
        Fitness(fitness)
    }

    pub fn raw(self) -> f64 {
        self.0
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl Eq for Fitness {}

impl std::fmt::Display for Fitness {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-size set of rosters with a parallel array of cached fitness values.
///
/// A fitness of `None` means the roster changed since it was last costed.
#[derive(Debug, Clone, Default)]
pub struct Population {
    rosters: Vec<Roster>,
    fitness: Vec<Option<Fitness>>,
}

impl Population {
    pub fn new() -> Self {
        Population::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Population {
            rosters: Vec::with_capacity(capacity),
            fitness: Vec::with_capacity(capacity),
        }
    }

    /// `size` uniformly random rosters, none of them evaluated.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R, size: usize, length: usize) -> Self {
        let mut population = Population::with_capacity(size);
        for _ in 0..size {
            population.push(Roster::random(rng, length), None);
        }
        population
    }

    pub fn push(&mut self, roster: Roster, fitness: Option<Fitness>) {
        self.rosters.push(roster);
        self.fitness.push(fitness);
    }

    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }

    pub fn roster(&self, index: usize) -> &Roster {
        &self.rosters[index]
    }

    pub fn rosters(&self) -> &[Roster] {
        self.rosters.as_slice()
    }

    pub fn fitness(&self, index: usize) -> Option<Fitness> {
        self.fitness[index]
    }

    /// The cached fitness of an individual that must already be evaluated.
    pub fn evaluated(&self, index: usize) -> Fitness {
        self.fitness[index].expect("individual must be evaluated before use")
    }

    /// Mutable access to a roster. The caller is responsible for calling
    /// [`Population::invalidate`] if the content changed.
    pub fn roster_mut(&mut self, index: usize) -> &mut Roster {
        &mut self.rosters[index]
    }

    /// Mutable access to two distinct rosters at once.
    pub fn pair_mut(&mut self, first: usize, second: usize) -> (&mut Roster, &mut Roster) {
        assert!(first < second, "pair indices must be increasing");
        let (head, tail) = self.rosters.split_at_mut(second);
        (&mut head[first], &mut tail[0])
    }

    pub fn invalidate(&mut self, index: usize) {
        self.fitness[index] = None;
    }

    /// Copy the selected individuals (and their cached fitness) into a new population.
    pub fn gather(&self, indices: &[usize]) -> Population {
        let mut selected = Population::with_capacity(indices.len());
        for &index in indices {
            selected.push(self.rosters[index].clone(), self.fitness[index]);
        }
        selected
    }

    pub fn unevaluated_count(&self) -> usize {
        self.fitness.iter().filter(|fitness| fitness.is_none()).count()
    }

    /// Cost every individual without a cached fitness. Returns how many were costed.
    pub fn evaluate(&mut self, cost: &CostModel, parallel: bool) -> usize {
        let rosters = &self.rosters;
        let pending = self.fitness.iter().filter(|fitness| fitness.is_none()).count();

        if parallel {
            self.fitness
                .par_iter_mut()
                .zip(rosters.par_iter())
                .filter(|(fitness, _)| fitness.is_none())
                .for_each(|(fitness, roster)| *fitness = Some(cost.cost(roster)));
        } else {
            for (fitness, roster) in self.fitness.iter_mut().zip(rosters.iter()) {
                if fitness.is_none() {
                    *fitness = Some(cost.cost(roster));
                }
            }
        }
        pending
    }

    /// Lowest fitness in a fully evaluated population.
    pub fn min_fitness(&self) -> Fitness {
        (0..self.len())
            .map(|index| self.evaluated(index))
            .min()
            .expect("population is at least 1")
    }

    pub fn mean_fitness(&self) -> f64 {
        assert!(!self.is_empty(), "population is at least 1");
        let sum = (0..self.len())
            .map(|index| self.evaluated(index).raw())
            .sum::<f64>();
        sum / self.len() as f64
    }

    /// Drop the `count` highest-cost individuals. Among equal costs the later
    /// individuals go first. The survivors are left ordered by ascending cost.
    pub fn remove_worst(&mut self, count: usize) {
        let keep = self.len().saturating_sub(count);
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|index| self.evaluated(*index));
        order.truncate(keep);

        let rosters = std::mem::replace(&mut self.rosters, Vec::new());
        let fitness = std::mem::replace(&mut self.fitness, Vec::new());
        let mut slots: Vec<Option<(Roster, Option<Fitness>)>> =
            rosters.into_iter().zip(fitness).map(Some).collect();

        for index in order {
            if let Some((roster, fitness)) = slots[index].take() {
                self.push(roster, fitness);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ShiftProblem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluated(values: &[f64]) -> Population {
        let mut population = Population::new();
        for (index, value) in values.iter().enumerate() {
            population.push(Roster::from_bits(&[index as u8 % 2]), Some(Fitness::new(*value)));
        }
        population
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn negative_fitness_is_rejected() {
        Fitness::new(-1.0);
    }

    #[test]
    fn random_population_starts_unevaluated() {
        let mut rng = StdRng::seed_from_u64(42);
        let population = Population::random(&mut rng, 10, 21);
        assert_eq!(population.len(), 10);
        assert_eq!(population.unevaluated_count(), 10);
        assert!(population.rosters().iter().all(|roster| roster.len() == 21));
    }

    #[test]
    fn evaluate_only_costs_invalidated_individuals() {
        let problem = ShiftProblem::reference();
        let cost = CostModel::new(&problem, 10.0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut population = Population::random(&mut rng, 6, problem.encoding().length());

        assert_eq!(population.evaluate(&cost, false), 6);
        assert_eq!(population.evaluate(&cost, false), 0);

        population.invalidate(3);
        assert_eq!(population.evaluate(&cost, false), 1);
        assert_eq!(population.evaluated(3), cost.cost(population.roster(3)));
    }

    #[test]
    fn parallel_evaluation_matches_sequential() {
        let problem = ShiftProblem::reference();
        let cost = CostModel::new(&problem, 10.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut sequential = Population::random(&mut rng, 32, problem.encoding().length());
        let mut parallel = sequential.clone();

        sequential.evaluate(&cost, false);
        parallel.evaluate(&cost, true);
        for index in 0..sequential.len() {
            assert_eq!(sequential.fitness(index), parallel.fitness(index));
        }
    }

    #[test]
    fn statistics_over_population() {
        let population = evaluated(&[4.0, 1.0, 7.0]);
        assert_eq!(population.min_fitness(), Fitness::new(1.0));
        assert!((population.mean_fitness() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn remove_worst_drops_highest_costs() {
        let mut population = evaluated(&[5.0, 1.0, 9.0, 3.0, 9.0]);
        population.remove_worst(2);
        let left: Vec<f64> = (0..population.len())
            .map(|index| population.evaluated(index).raw())
            .collect();
        assert_eq!(left, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn gather_copies_cached_fitness() {
        let population = evaluated(&[2.0, 8.0]);
        let selected = population.gather(&[1, 1, 0]);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected.fitness(0), Some(Fitness::new(8.0)));
        assert_eq!(selected.roster(2), population.roster(0));
    }
}
