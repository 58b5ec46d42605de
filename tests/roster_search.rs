use rand::rngs::StdRng;
use rand::SeedableRng;

use shift_roster::operators::{FlipBit, Tournament, TwoPoint};
use shift_roster::{
    CostModel, EvolutionConfig, EvolutionEngine, Roster, ShiftCapacity, ShiftPreferenceTable,
    ShiftProblem,
};

fn permissive_pair() -> ShiftProblem {
    ShiftProblem::new(
        vec!["A".into(), "B".into()],
        vec!["morning".into(), "evening".into(), "night".into()],
        vec![ShiftCapacity::at_least(0); 3],
        ShiftPreferenceTable::from_rows(&[vec![true; 3], vec![true; 3]]),
        7,
        1,
        5,
    )
}

#[test]
fn reference_problem_improves_over_random_start() {
    let cost = CostModel::new(&ShiftProblem::reference(), 10.0);
    let config = EvolutionConfig {
        population_size: 100,
        generations: 60,
        hall_of_fame_size: 10,
        ..EvolutionConfig::default()
    };
    let outcome = EvolutionEngine::new(StdRng::seed_from_u64(42), cost.clone(), config).run();

    let records = outcome.statistics.records();
    assert_eq!(records.len(), 61);
    assert!(records.last().unwrap().min < records[0].min);
    assert!(records.windows(2).all(|pair| pair[1].min <= pair[0].min));

    assert_eq!(outcome.best_fitness, cost.cost(&outcome.best));
    assert_eq!(outcome.best_fitness.raw(), records.last().unwrap().min);
    assert!(outcome.hall_of_fame.len() <= 10);
}

#[test]
fn permissive_problem_only_sees_consecutive_and_overload() {
    let cost = CostModel::new(&permissive_pair(), 10.0);
    let config = EvolutionConfig {
        population_size: 30,
        generations: 20,
        hall_of_fame_size: 3,
        ..EvolutionConfig::default()
    };
    let outcome = EvolutionEngine::new(StdRng::seed_from_u64(8), cost.clone(), config).run();

    for entry in outcome.hall_of_fame.entries() {
        let violations = cost.violations(&entry.roster);
        assert_eq!(violations.capacity, 0);
        assert_eq!(violations.preference, 0);
    }
    // an empty roster breaks nothing here, so zero cost is reachable
    assert_eq!(cost.cost(&Roster::empty(cost.length())).raw(), 0.0);
}

#[test]
fn custom_operators_plug_into_the_loop() {
    let cost = CostModel::new(&ShiftProblem::reference(), 10.0);
    let config = EvolutionConfig {
        population_size: 20,
        generations: 5,
        hall_of_fame_size: 2,
        ..EvolutionConfig::default()
    };
    let mut engine = EvolutionEngine::with_operators(
        StdRng::seed_from_u64(1),
        cost,
        config,
        Tournament::new(4),
        TwoPoint,
        FlipBit::new(0.02),
    );
    while engine.improve() {}
    assert_eq!(engine.generation(), 5);
    assert_eq!(engine.statistics().len(), 6);
}

#[test]
#[should_panic(expected = "exceeds population size")]
fn oversized_hall_of_fame_is_fatal() {
    let cost = CostModel::new(&ShiftProblem::reference(), 10.0);
    let config = EvolutionConfig {
        population_size: 5,
        hall_of_fame_size: 6,
        ..EvolutionConfig::default()
    };
    EvolutionEngine::new(StdRng::seed_from_u64(1), cost, config);
}
