// Calculation errors are plain input-validation failures; AppError adds the CLI plumbing on top.
use thiserror::Error;

/// Rejected input to one of the planning formulas.
///
/// Nothing is clamped: a value outside its physical range is returned to the
/// caller as one of these variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasError {
    #[error("Depth must not be negative (got {0})")]
    NegativeDepth(f64),

    #[error("{name} must be a finite number (got {value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero (got {value})")]
    NonPositiveRate { name: &'static str, value: f64 },

    #[error("{name} must not be negative (got {value})")]
    NegativeValue { name: &'static str, value: f64 },

    #[error("Duration must not be negative (got {0} min)")]
    NegativeDuration(f64),

    #[error("Duration must be greater than zero (got {0} min)")]
    NonPositiveDuration(f64),

    #[error("Ambient pressure must be at least 1 (got {0})")]
    PressureBelowSurface(f64),

    #[error("{name} must be a fraction within {range} (got {value})")]
    InvalidFraction {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Gas fractions sum to {0:.3}, more than the whole mix")]
    MixExceedsWhole(f64),

    #[error("Gas switch depth {switch_depth} is deeper than the current depth {depth}")]
    SwitchDeeperThanDepth { depth: f64, switch_depth: f64 },

    #[error(
        "Insufficient gas: reserve of {required:.1} exceeds the starting pressure of {available:.1}"
    )]
    InsufficientGas { required: f64, available: f64 },

    #[error("Reserve pressure {reserve} exceeds the current pressure {current}")]
    ReserveExceedsPressure { reserve: f64, current: f64 },

    #[error(
        "{mix} cannot be blended by topping up with air: the nitrox portion needs {fo2:.3} O2, less than air"
    )]
    UnblendableMix { mix: String, fo2: f64 },

    #[error("Ascent time of {0} min is out of range")]
    TimeOutOfRange(f64),

    #[error("Ascent profile has no stages")]
    EmptyProfile,

    #[error("Tank '{name}' not found. Available tanks: {available}")]
    UnknownTank { name: String, available: String },

    #[error("Tank '{tank}' is rated in {tank_units}, but the plan uses {plan_units}")]
    UnitsMismatch {
        tank: String,
        tank_units: &'static str,
        plan_units: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Calculation(#[from] GasError),

    #[cfg(feature = "cli")]
    #[error("Error reading from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --assumptions-json: {source}")]
    ParseAssumptionsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON in assumptions document: {source}")]
    ParseAssumptionsDoc {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Could not serialize output to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected error: {0}")]
    Other(String),
}

pub type GasResult<T> = Result<T, GasError>;
