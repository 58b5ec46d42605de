use std::io::Read;
use std::path::Path;

use crate::errors::{ConfigError, Error, ProblemError, Result};
use crate::problem::{ShiftCapacity, ShiftPreferenceTable, ShiftProblem};

/// The scheduling horizon, which is not part of the problem file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PeriodSettings {
    pub days_per_period: usize,
    pub periods: usize,
    pub max_shifts_per_period: usize,
}

impl Default for PeriodSettings {
    fn default() -> Self {
        PeriodSettings {
            days_per_period: 7,
            periods: 1,
            max_shifts_per_period: 5,
        }
    }
}

impl PeriodSettings {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.days_per_period == 0 || self.periods == 0 {
            return Err(ConfigError::EmptyPeriod);
        }
        Ok(())
    }
}

/// Read a problem definition from a tab separated stream.
///
/// The header is `worker` followed by the shift type names. The `@min` row gives
/// the minimum headcount per shift type, the optional `@max` row the maximum (an
/// empty cell means unbounded). Every other row is a worker name followed by a
/// `1` or `0` per shift type telling whether the worker wants that shift.
/// `source` is only used for error messages.
pub fn load_problem<In: Read>(
    stream: In,
    source: &Path,
    settings: PeriodSettings,
) -> Result<ShiftProblem> {
    let invalid = |line: usize, error: ProblemError| Error::InvalidProblem {
        file: source.to_path_buf(),
        line,
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(stream);

    let header = reader.headers()?.clone();
    if header.len() < 2 || !header[0].eq_ignore_ascii_case("worker") {
        return Err(invalid(1, ProblemError::MissingShiftTypes));
    }
    let shift_types: Vec<String> = header.iter().skip(1).map(str::to_owned).collect();

    let mut minimums: Option<Vec<usize>> = None;
    let mut maximums: Option<(usize, Vec<Option<usize>>)> = None;
    let mut workers = Vec::new();
    let mut preferences = Vec::new();

    for (record_num, record) in reader.into_records().enumerate() {
        let record = record?;
        let line = record_num + 2;

        if record.len() != header.len() {
            return Err(invalid(
                line,
                ProblemError::ColumnCount {
                    expected: header.len(),
                    found: record.len(),
                },
            ));
        }

        let cells = record.iter().skip(1);
        match &record[0] {
            "@min" => {
                let values = cells
                    .map(|cell| parse_count(cell))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|error| invalid(line, error))?;
                minimums = Some(values);
            }
            "@max" => {
                let values = cells
                    .map(|cell| {
                        if cell.is_empty() {
                            Ok(None)
                        } else {
                            parse_count(cell).map(Some)
                        }
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|error| invalid(line, error))?;
                maximums = Some((line, values));
            }
            name => {
                let flags = cells
                    .map(|cell| match cell {
                        "1" => Ok(true),
                        "0" => Ok(false),
                        other => Err(ProblemError::InvalidValue(other.to_owned())),
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|error| invalid(line, error))?;
                workers.push(name.to_owned());
                preferences.push(flags);
            }
        }
    }

    let minimums = minimums.ok_or_else(|| invalid(1, ProblemError::MissingMinimum))?;
    if workers.is_empty() {
        return Err(invalid(1, ProblemError::NoWorkers));
    }

    let (max_line, maximums) = maximums.unwrap_or_else(|| (1, vec![None; shift_types.len()]));
    let mut capacities = Vec::with_capacity(shift_types.len());
    for ((min, max), shift_type) in minimums.into_iter().zip(maximums).zip(shift_types.iter()) {
        if max.map_or(false, |max| min > max) {
            return Err(invalid(
                max_line,
                ProblemError::MinAboveMax {
                    shift_type: shift_type.clone(),
                },
            ));
        }
        capacities.push(ShiftCapacity { min, max });
    }

    Ok(ShiftProblem::new(
        workers,
        shift_types,
        capacities,
        ShiftPreferenceTable::from_rows(&preferences),
        settings.days_per_period,
        settings.periods,
        settings.max_shifts_per_period,
    ))
}

fn parse_count(cell: &str) -> std::result::Result<usize, ProblemError> {
    cell.parse()
        .map_err(|_| ProblemError::InvalidValue(cell.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAFF: &str = "worker\tmorning\tevening\tnight
@min\t2\t2\t1
@max\t3\t4\t2
A\t1\t0\t0
B\t1\t1\t0
";

    fn load(text: &str) -> Result<ShiftProblem> {
        load_problem(text.as_bytes(), Path::new("problem.tsv"), PeriodSettings::default())
    }

    fn problem_error(text: &str) -> (usize, ProblemError) {
        match load(text) {
            Err(Error::InvalidProblem { line, error, .. }) => (line, error),
            other => panic!("expected a problem error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn loads_workers_and_capacities() {
        let problem = load(STAFF).unwrap();
        assert_eq!(problem.workers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(problem.shift_types().len(), 3);
        assert_eq!(problem.capacities()[2], ShiftCapacity::new(1, 2));
        assert!(problem.preferences().is_desired(1, 1));
        assert!(!problem.preferences().is_desired(0, 2));
        assert_eq!(problem.encoding().length(), 2 * 7 * 3);
    }

    #[test]
    fn missing_max_row_means_unbounded() {
        let problem = load("worker\tday\n@min\t1\nA\t1\n").unwrap();
        assert_eq!(problem.capacities()[0], ShiftCapacity::at_least(1));
    }

    #[test]
    fn empty_max_cell_means_unbounded() {
        let problem = load("worker\tearly\tlate\n@min\t0\t0\n@max\t\t2\nA\t1\t1\n").unwrap();
        assert_eq!(problem.capacities()[0].max, None);
        assert_eq!(problem.capacities()[1].max, Some(2));
    }

    #[test]
    fn reports_line_of_bad_flag() {
        let (line, error) = problem_error("worker\tday\n@min\t1\nA\t1\nB\tyes\n");
        assert_eq!(line, 4);
        assert_eq!(error, ProblemError::InvalidValue("yes".into()));
    }

    #[test]
    fn reports_column_mismatch() {
        let (line, error) = problem_error("worker\ta\tb\n@min\t1\t1\nA\t1\n");
        assert_eq!(line, 3);
        assert_eq!(error, ProblemError::ColumnCount { expected: 3, found: 2 });
    }

    #[test]
    fn rejects_inverted_capacity() {
        let (line, error) = problem_error("worker\tday\n@min\t3\n@max\t2\nA\t1\n");
        assert_eq!(line, 3);
        assert_eq!(error, ProblemError::MinAboveMax { shift_type: "day".into() });
    }

    #[test]
    fn requires_minimums_and_workers() {
        assert_eq!(problem_error("worker\tday\nA\t1\n").1, ProblemError::MissingMinimum);
        assert_eq!(problem_error("worker\tday\n@min\t1\n").1, ProblemError::NoWorkers);
        assert_eq!(problem_error("name\n").1, ProblemError::MissingShiftTypes);
    }

    #[test]
    fn period_settings_must_be_positive() {
        let settings = PeriodSettings {
            periods: 0,
            ..PeriodSettings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::EmptyPeriod));
    }
}
