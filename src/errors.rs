use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// The various kinds of errors that can happen outside the search itself.
#[derive(Debug)]
pub enum Error {
    /// An I/O error (such as not being able to read the input file)
    Io(std::io::Error),
    /// An error while reading or writing CSV.
    Csv(csv::Error),
    /// The problem definition file is not valid.
    InvalidProblem {
        file: PathBuf,
        line: usize,
        error: ProblemError,
    },
    /// The run configuration is not usable.
    InvalidConfig(ConfigError),
}

#[derive(Debug, PartialEq)]
pub enum ProblemError {
    /// The header must start with `worker` and name at least one shift type.
    MissingShiftTypes,
    /// A row has a different number of columns than the header.
    ColumnCount { expected: usize, found: usize },
    /// A cell that should hold a number or a preference flag does not.
    InvalidValue(String),
    /// The `@min` row is missing.
    MissingMinimum,
    /// A shift type's minimum exceeds its maximum.
    MinAboveMax { shift_type: String },
    /// There are no worker rows.
    NoWorkers,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The population must hold at least one roster.
    EmptyPopulation,
    /// The hall of fame cannot be larger than the population.
    HallOfFameTooLarge { hall_of_fame: usize, population: usize },
    /// A probability outside of `[0, 1]`.
    InvalidProbability { name: &'static str, value: f64 },
    /// The hard constraint penalty must be a non-negative number.
    InvalidPenalty(f64),
    /// Days per period and number of periods must both be positive.
    EmptyPeriod,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::Csv(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::InvalidConfig(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::Csv(err) => write!(f, "{}", err),
            Error::InvalidProblem { file, line, error } => {
                write!(f, "{}:{}: {}", file.to_string_lossy(), line, error)
            }
            Error::InvalidConfig(err) => write!(f, "invalid configuration: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Csv(error) => Some(error),
            Error::InvalidProblem { error, .. } => Some(error),
            Error::InvalidConfig(error) => Some(error),
        }
    }
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProblemError::MissingShiftTypes => {
                write!(f, "Header must be `worker` followed by at least one shift type")
            }
            ProblemError::ColumnCount { expected, found } => {
                write!(f, "Expected {} columns, found {}", expected, found)
            }
            ProblemError::InvalidValue(value) => write!(f, "Invalid value `{}`", value),
            ProblemError::MissingMinimum => write!(f, "No `@min` row with shift minimums"),
            ProblemError::MinAboveMax { shift_type } => {
                write!(f, "Minimum of shift `{}` exceeds its maximum", shift_type)
            }
            ProblemError::NoWorkers => write!(f, "No workers defined"),
        }
    }
}

impl std::error::Error for ProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::EmptyPopulation => write!(f, "population size must be at least 1"),
            ConfigError::HallOfFameTooLarge {
                hall_of_fame,
                population,
            } => write!(
                f,
                "hall of fame size {} exceeds population size {}",
                hall_of_fame, population
            ),
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{} must be between 0 and 1, got {}", name, value)
            }
            ConfigError::InvalidPenalty(value) => {
                write!(f, "hard constraint penalty must be non-negative, got {}", value)
            }
            ConfigError::EmptyPeriod => {
                write!(f, "days per period and number of periods must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
