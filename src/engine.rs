use log::{debug, info, trace};
use rand::Rng;

use crate::cost::CostModel;
use crate::encoding::Roster;
use crate::errors::ConfigError;
use crate::ga::{Fitness, Population};
use crate::hall_of_fame::HallOfFame;
use crate::operators::{Crossover, FlipBit, Mutation, Selection, Tournament, TwoPoint};
use crate::stats::{GenerationStats, StatisticsLog};

/// Tweakables of the generational loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Probability that a pair of parents is recombined.
    pub crossover_probability: f64,
    /// Probability that an offspring goes through mutation at all.
    pub mutation_probability: f64,
    /// Per-bit flip probability. `None` means `1 / roster length`.
    pub bit_flip_rate: Option<f64>,
    pub generations: usize,
    pub hall_of_fame_size: usize,
    /// Cost individuals on the rayon thread pool.
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            population_size: 300,
            crossover_probability: 0.9,
            mutation_probability: 1.0,
            bit_flip_rate: None,
            generations: 200,
            hall_of_fame_size: 30,
            parallel_evaluation: false,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.hall_of_fame_size > self.population_size {
            return Err(ConfigError::HallOfFameTooLarge {
                hall_of_fame: self.hall_of_fame_size,
                population: self.population_size,
            });
        }
        let probabilities = [
            ("crossover probability", Some(self.crossover_probability)),
            ("mutation probability", Some(self.mutation_probability)),
            ("bit flip rate", self.bit_flip_rate),
        ];
        for (name, value) in probabilities.iter() {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(value) {
                    return Err(ConfigError::InvalidProbability {
                        name: *name,
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Where the generational loop currently stands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Evaluating,
    Selecting,
    Recombining,
    Mutating,
    ReEvaluating,
    Electing,
    Logging,
    Terminated,
}

/// The result of a finished run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub best: Roster,
    pub best_fitness: Fitness,
    pub hall_of_fame: HallOfFame,
    pub statistics: StatisticsLog,
}

/// Elitist generational genetic algorithm over rosters.
///
/// Every generation the population is replaced by mutated offspring of
/// tournament winners, after which the worst offspring make room for the
/// hall of fame so the best roster found so far can never be lost.
#[derive(Debug)]
pub struct EvolutionEngine<R, S = Tournament, C = TwoPoint, M = FlipBit> {
    rng: R,
    cost: CostModel,
    config: EvolutionConfig,
    selection: S,
    crossover: C,
    mutation: M,
    population: Population,
    hall_of_fame: HallOfFame,
    statistics: StatisticsLog,
    generation: usize,
    phase: Phase,
}

impl<R: Rng> EvolutionEngine<R> {
    /// Engine with tournament selection of size 2, two-point crossover and bit-flip mutation.
    pub fn new(rng: R, cost: CostModel, config: EvolutionConfig) -> Self {
        assert!(cost.length() > 0, "rosters must not be empty");
        let mutation = match config.bit_flip_rate {
            Some(rate) => FlipBit::new(rate),
            None => FlipBit::for_length(cost.length()),
        };
        EvolutionEngine::with_operators(rng, cost, config, Tournament::default(), TwoPoint, mutation)
    }
}

impl<R: Rng, S: Selection, C: Crossover, M: Mutation> EvolutionEngine<R, S, C, M> {
    /// Create the initial generation, evaluate it and record it as generation 0.
    pub fn with_operators(
        mut rng: R,
        cost: CostModel,
        config: EvolutionConfig,
        selection: S,
        crossover: C,
        mutation: M,
    ) -> Self {
        if let Err(err) = config.validate() {
            panic!("{}", err);
        }

        info!(
            "Initializing population of {} rosters with {} shifts each",
            config.population_size,
            cost.length()
        );
        let population = Population::random(&mut rng, config.population_size, cost.length());

        let mut engine = EvolutionEngine {
            rng,
            cost,
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size),
            config,
            selection,
            crossover,
            mutation,
            population,
            statistics: StatisticsLog::new(),
            generation: 0,
            phase: Phase::Initialized,
        };

        engine.enter(Phase::Evaluating);
        engine.population.evaluate(&engine.cost, engine.config.parallel_evaluation);
        engine.hall_of_fame.update(&engine.population);
        engine.log_generation();
        engine.enter(if engine.config.generations == 0 {
            Phase::Terminated
        } else {
            Phase::Initialized
        });
        engine
    }

    /// Run one generation. Returns true while generations remain.
    pub fn improve(&mut self) -> bool {
        if self.phase == Phase::Terminated {
            return false;
        }
        self.generation += 1;
        let size = self.config.population_size;

        self.enter(Phase::Selecting);
        let parents = self.selection.select(&mut self.rng, &self.population, size);
        let mut offspring = self.population.gather(&parents);

        self.enter(Phase::Recombining);
        for first in (0..size.saturating_sub(1)).step_by(2) {
            if self.rng.gen_bool(self.config.crossover_probability) {
                let (a, b) = offspring.pair_mut(first, first + 1);
                if self.crossover.crossover(&mut self.rng, a, b) {
                    offspring.invalidate(first);
                    offspring.invalidate(first + 1);
                }
            }
        }

        self.enter(Phase::Mutating);
        for index in 0..size {
            if self.rng.gen_bool(self.config.mutation_probability)
                && self.mutation.mutate(&mut self.rng, offspring.roster_mut(index))
            {
                offspring.invalidate(index);
            }
        }

        self.enter(Phase::ReEvaluating);
        let evaluated = offspring.evaluate(&self.cost, self.config.parallel_evaluation);
        trace!("Evaluated {} changed rosters", evaluated);

        self.enter(Phase::Electing);
        let elites = self.hall_of_fame.len().min(self.config.hall_of_fame_size);
        offspring.remove_worst(elites);
        for entry in self.hall_of_fame.entries().iter().take(elites) {
            offspring.push(entry.roster.clone(), Some(entry.fitness));
        }
        self.hall_of_fame.update(&offspring);
        self.population = offspring;

        self.enter(Phase::Logging);
        self.log_generation();

        if self.generation >= self.config.generations {
            self.enter(Phase::Terminated);
            false
        } else {
            true
        }
    }

    /// Run all remaining generations and report the result.
    pub fn run(mut self) -> Outcome {
        while self.improve() {}
        self.into_outcome()
    }

    pub fn into_outcome(self) -> Outcome {
        let (best, best_fitness) = match self.hall_of_fame.best() {
            Some(entry) => (entry.roster.clone(), entry.fitness),
            None => {
                let index = self.best_index();
                (self.population.roster(index).clone(), self.population.evaluated(index))
            }
        };
        info!(
            "Finished after {} generations, best fitness {}",
            self.generation, best_fitness
        );
        Outcome {
            best,
            best_fitness,
            hall_of_fame: self.hall_of_fame,
            statistics: self.statistics,
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn statistics(&self) -> &StatisticsLog {
        &self.statistics
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// The best individual of the current population, earliest on ties.
    pub fn best_index(&self) -> usize {
        (0..self.population.len())
            .min_by_key(|index| self.population.evaluated(*index))
            .expect("population is at least 1")
    }

    /// Snapshot taken after the hall of fame has been injected, i.e. the
    /// population the next selection will draw from.
    fn log_generation(&mut self) -> GenerationStats {
        let stats = self.statistics.record(self.generation, &self.population);
        debug!(
            "Generation {}: min fitness {}, mean fitness {:.3}",
            stats.generation, stats.min, stats.mean
        );
        stats
    }

    fn enter(&mut self, phase: Phase) {
        trace!("Generation {}: {:?} -> {:?}", self.generation, self.phase, phase);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ShiftProblem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 40,
            generations: 15,
            hall_of_fame_size: 4,
            ..EvolutionConfig::default()
        }
    }

    fn engine(seed: u64, config: EvolutionConfig) -> EvolutionEngine<StdRng> {
        let cost = CostModel::new(&ShiftProblem::reference(), 10.0);
        EvolutionEngine::new(StdRng::seed_from_u64(seed), cost, config)
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EvolutionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let empty = EvolutionConfig {
            population_size: 0,
            hall_of_fame_size: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyPopulation));

        let oversized = EvolutionConfig {
            population_size: 10,
            hall_of_fame_size: 11,
            ..EvolutionConfig::default()
        };
        assert_eq!(
            oversized.validate(),
            Err(ConfigError::HallOfFameTooLarge {
                hall_of_fame: 11,
                population: 10
            })
        );

        let improbable = EvolutionConfig {
            crossover_probability: 1.5,
            ..EvolutionConfig::default()
        };
        assert!(improbable.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "population size must be at least 1")]
    fn zero_population_is_fatal() {
        engine(
            1,
            EvolutionConfig {
                population_size: 0,
                hall_of_fame_size: 0,
                ..small_config()
            },
        );
    }

    #[test]
    fn initial_generation_is_evaluated_and_logged() {
        let engine = engine(42, small_config());
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.phase(), Phase::Initialized);
        assert_eq!(engine.population().unevaluated_count(), 0);
        assert_eq!(engine.statistics().len(), 1);
        assert_eq!(engine.hall_of_fame().len(), 4);
    }

    #[test]
    fn population_size_and_evaluation_are_kept() {
        let mut engine = engine(42, small_config());
        while engine.improve() {
            assert_eq!(engine.population().len(), 40);
            assert_eq!(engine.population().unevaluated_count(), 0);
        }
        assert_eq!(engine.phase(), Phase::Terminated);
        assert_eq!(engine.generation(), 15);
        assert!(!engine.improve());
        assert_eq!(engine.generation(), 15);
    }

    #[test]
    fn hall_of_fame_best_never_regresses() {
        let mut engine = engine(7, small_config());
        let mut best = engine.hall_of_fame().best().map(|entry| entry.fitness);
        let mut size = engine.hall_of_fame().len();
        while engine.improve() {
            let current = engine.hall_of_fame().best().map(|entry| entry.fitness);
            assert!(current <= best);
            assert!(engine.hall_of_fame().len() >= size);
            assert!(engine.hall_of_fame().len() <= 4);
            best = current;
            size = engine.hall_of_fame().len();
        }
    }

    #[test]
    fn population_always_contains_the_best_ever() {
        let mut engine = engine(3, small_config());
        while engine.improve() {
            let best = engine.hall_of_fame().best().map(|entry| entry.fitness);
            assert_eq!(Some(engine.population().min_fitness()), best);
        }
    }

    #[test]
    fn statistics_track_the_current_population() {
        let mut engine = engine(5, small_config());
        while engine.improve() {
            let last = engine.statistics().last().cloned().unwrap();
            assert_eq!(last.generation, engine.generation());
            assert_eq!(last.min, engine.population().min_fitness().raw());
            assert!((last.mean - engine.population().mean_fitness()).abs() < 1e-9);
        }
        assert_eq!(engine.statistics().len(), 16);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let first = engine(99, small_config()).run();
        let second = engine(99, small_config()).run();
        assert_eq!(first.best, second.best);
        assert_eq!(first.statistics.records(), second.statistics.records());
    }

    #[test]
    fn parallel_evaluation_does_not_change_the_run() {
        let sequential = engine(21, small_config()).run();
        let parallel = engine(
            21,
            EvolutionConfig {
                parallel_evaluation: true,
                ..small_config()
            },
        )
        .run();
        assert_eq!(sequential.best, parallel.best);
        assert_eq!(sequential.statistics.records(), parallel.statistics.records());
    }

    #[test]
    fn zero_generations_reports_initial_best() {
        let outcome = engine(
            11,
            EvolutionConfig {
                generations: 0,
                ..small_config()
            },
        )
        .run();
        assert_eq!(outcome.statistics.len(), 1);
        assert_eq!(outcome.best_fitness.raw(), outcome.statistics.records()[0].min);
    }

    #[test]
    fn empty_hall_of_fame_falls_back_to_population() {
        let outcome = engine(
            13,
            EvolutionConfig {
                hall_of_fame_size: 0,
                ..small_config()
            },
        )
        .run();
        assert!(outcome.hall_of_fame.is_empty());
        assert_eq!(outcome.best_fitness.raw(), outcome.statistics.last().unwrap().min);
    }
}
