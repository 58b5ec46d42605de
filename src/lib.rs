//! Evolutionary search for weekly shift rosters.
//!
//! A roster is a flat bit string with one bit per worker, day and shift slot.
//! [`cost::CostModel`] turns a roster into a weighted violation count, and
//! [`engine::EvolutionEngine`] searches for a low-cost roster with an elitist
//! genetic algorithm backed by a [`hall_of_fame::HallOfFame`].

pub mod cost;
pub mod encoding;
pub mod engine;
pub mod errors;
pub mod ga;
pub mod hall_of_fame;
pub mod input;
pub mod operators;
pub mod problem;
pub mod report;
pub mod stats;

pub use cost::{CostModel, Violations};
pub use encoding::{Position, Roster, RosterEncoding};
pub use engine::{EvolutionConfig, EvolutionEngine, Outcome, Phase};
pub use ga::{Fitness, Population};
pub use hall_of_fame::HallOfFame;
pub use problem::{ShiftCapacity, ShiftPreferenceTable, ShiftProblem};
pub use stats::{GenerationStats, StatisticsLog};
