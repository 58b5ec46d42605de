use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use rand::SeedableRng;
use structopt::StructOpt;

use shift_roster::errors;
use shift_roster::input::{self, PeriodSettings};
use shift_roster::report::ScheduleReport;
use shift_roster::{CostModel, EvolutionConfig, EvolutionEngine, Roster, ShiftProblem};

/// The command line options that can be given to this application.
#[derive(Debug, StructOpt)]
#[structopt(name = "shift-roster", about = "An evolutionary planning application for assigning workers to shifts.")]
struct Opt {
    /// Population size used for the evolutionary algorithm.
    #[structopt(short = "n", long = "population", default_value = "300")]
    population_size: usize,

    /// Number of generations to run.
    #[structopt(short = "g", long = "generations", default_value = "200")]
    generations: usize,

    /// Probability of recombining a pair of parents.
    #[structopt(long = "crossover", default_value = "0.9")]
    crossover_probability: f64,

    /// Probability that an offspring is mutated at all.
    #[structopt(long = "mutation", default_value = "1.0")]
    mutation_probability: f64,

    /// Per-shift flip probability of a mutation, 1 / roster length if not present
    #[structopt(long = "bit-flip-rate")]
    bit_flip_rate: Option<f64>,

    /// Number of best rosters carried over into every generation.
    #[structopt(short = "k", long = "hall-of-fame", default_value = "30")]
    hall_of_fame_size: usize,

    /// Penalty factor for a hard constraint violation.
    #[structopt(long = "penalty", default_value = "10")]
    hard_penalty: f64,

    /// Seed of the random number generator.
    #[structopt(short = "s", long = "seed", default_value = "42")]
    seed: u64,

    /// Evaluate rosters on all cores.
    #[structopt(long = "parallel")]
    parallel: bool,

    /// Problem definition file, built-in instance if not present
    #[structopt(short = "i", long = "input", parse(from_os_str))]
    input: Option<PathBuf>,

    /// Days in one scheduling period.
    #[structopt(long = "days", default_value = "7")]
    days_per_period: usize,

    /// Number of scheduling periods.
    #[structopt(long = "periods", default_value = "1")]
    periods: usize,

    /// Maximum shifts per worker and period.
    #[structopt(long = "max-shifts", default_value = "5")]
    max_shifts_per_period: usize,

    /// Output file for the best roster, stdout if not present
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Output file for the per-generation statistics
    #[structopt(long = "stats", parse(from_os_str))]
    stats: Option<PathBuf>,

    /// Quiet mode, do not print anything to stderr
    #[structopt(short = "q", long = "quiet")]
    quiet: bool,
}

/// Implements Write but doesn't write anything.
struct NullWrite;

impl Write for NullWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn main() -> ! {
    env_logger::init();
    let opt = Opt::from_args();
    match run(opt) {
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1)
        }
        Ok(_) => std::process::exit(0),
    }
}

fn run(opt: Opt) -> errors::Result<()> {
    let settings = PeriodSettings {
        days_per_period: opt.days_per_period,
        periods: opt.periods,
        max_shifts_per_period: opt.max_shifts_per_period,
    };
    settings.validate()?;

    let problem = match opt.input {
        None => ShiftProblem::reference().with_horizon(
            settings.days_per_period,
            settings.periods,
            settings.max_shifts_per_period,
        ),
        Some(ref file_name) => {
            let file = File::open(file_name)?;
            input::load_problem(file, file_name, settings)?
        }
    };

    let config = EvolutionConfig {
        population_size: opt.population_size,
        crossover_probability: opt.crossover_probability,
        mutation_probability: opt.mutation_probability,
        bit_flip_rate: opt.bit_flip_rate,
        generations: opt.generations,
        hall_of_fame_size: opt.hall_of_fame_size,
        parallel_evaluation: opt.parallel,
    };
    config.validate()?;
    if !(opt.hard_penalty.is_finite() && opt.hard_penalty >= 0.0) {
        return Err(errors::ConfigError::InvalidPenalty(opt.hard_penalty).into());
    }

    let mut log_out: Box<dyn Write> = if opt.quiet {
        Box::new(NullWrite)
    } else {
        Box::new(std::io::stderr())
    };

    let cost = CostModel::new(&problem, opt.hard_penalty);

    writeln!(log_out, "Number of workers: {}", problem.workers().len())?;
    writeln!(log_out, "Shifts per roster: {}", cost.length())?;
    writeln!(log_out, "Random seed: {}\n", opt.seed)?;

    let rng = rand::rngs::StdRng::seed_from_u64(opt.seed);
    let mut engine = EvolutionEngine::new(rng, cost.clone(), config);

    writeln!(log_out, "Beginning evolutionary optimization")?;
    writeln!(log_out, "Population size: {}", opt.population_size)?;

    writeln!(log_out, "Generation | Mean fitness | Min fitness")?;

    let mut print_stats = |engine: &EvolutionEngine<_>| -> std::io::Result<()> {
        if let Some(stats) = engine.statistics().last() {
            writeln!(log_out, "{: >10} | {: >12.3} | {: >11.3}", stats.generation, stats.mean, stats.min)?;
        }
        Ok(())
    };

    print_stats(&engine)?;

    while engine.improve() {
        print_stats(&engine)?;
    }

    let outcome = engine.into_outcome();
    let report = ScheduleReport::new(&cost, &outcome.best);

    writeln!(log_out, "\nBest fitness: {}\n", outcome.best_fitness)?;
    print_report(&mut log_out, &problem, &report)?;

    match opt.output {
        None => print_solution(std::io::stdout(), &problem, &outcome.best)?,
        Some(file_name) => {
            let file = File::create(&file_name)?;
            print_solution(file, &problem, &outcome.best)?;
        }
    }

    if let Some(file_name) = opt.stats {
        let file = File::create(&file_name)?;
        outcome.statistics.write_tsv(file)?;
    }

    Ok(())
}

fn print_report<W: Write>(out: &mut W, problem: &ShiftProblem, report: &ScheduleReport) -> errors::Result<()> {
    writeln!(out, "Schedule for each worker:")?;
    for (index, name) in report.workers.iter().enumerate() {
        writeln!(out, "{}: {:?}", name, report.worker_line(index))?;
    }
    writeln!(out, "Consecutive shift violations = {}\n", report.violations.consecutive)?;

    for (index, name) in report.workers.iter().enumerate() {
        writeln!(out, "{} shifts per period = {}", name, report.period_totals.row(index))?;
    }
    writeln!(out, "Shifts per period violations = {}\n", report.violations.overload)?;

    writeln!(out, "Workers per shift = {}", report.headcounts)?;
    writeln!(out, "Workers per shift violations = {}\n", report.violations.capacity)?;

    writeln!(out, "Shift preference violations = {}", report.violations.preference)?;
    writeln!(
        out,
        "Hard violations = {}, soft violations = {} ({} shift types over {} days)",
        report.violations.hard(),
        report.violations.soft(),
        problem.shift_types().len(),
        problem.days_per_period() * problem.periods()
    )?;
    Ok(())
}

fn print_solution<W: Write>(out: W, problem: &ShiftProblem, roster: &Roster) -> errors::Result<()> {
    let encoding = problem.encoding();
    let table = encoding.decode(roster);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(out);

    // Header, the day and shift columns followed by the worker names
    writer.write_record(
        ["day", "shift"]
            .iter()
            .map(|column| column.to_string())
            .chain(problem.workers().iter().cloned()),
    )?;

    // Rows, one for each shift of each day. Contains a 1 in the columns of the workers on that shift.
    for (position, column) in table.gencolumns().into_iter().enumerate() {
        let day = position / encoding.slots();
        let shift = &problem.shift_types()[position % encoding.slots()];
        writer.write_record(
            [(day + 1).to_string(), shift.clone()]
                .iter()
                .cloned()
                .chain(column.iter().map(|worked| (if *worked { "1" } else { "" }).to_string())),
        )?;
    }
    writer.flush()?;
    Ok(())
}
