//! Error taxonomy for schema construction, parsing, and verification.
//!
//! Four error families cover the distinct failure phases: [`ConfigError`] for
//! schema problems caught before any token is read, [`ParseError`] for
//! malformed input tokens, [`ValidationError`] for semantic failures found
//! during verification, and [`ConversionError`] for type-coercion failures.
//! The umbrella [`Error`] folds all four so results can bubble unchanged to
//! the top-level parse call.

use thiserror::Error;

/// Schema construction failures.
///
/// Always detected before any input token is read, always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two options in the same command share a name.
    #[error("duplicate option name: '{0}'")]
    DuplicateName(String),
    /// Two flag spellings in the same command collide (including generated
    /// negated spellings).
    #[error("duplicate flag: '{0}'")]
    DuplicateFlag(String),
    /// Short flag is not a dash followed by a single character.
    #[error("invalid short flag format: '{0}'")]
    InvalidShortFlag(String),
    /// Long flag does not start with `--` or is too short.
    #[error("invalid long flag format: '{0}'")]
    InvalidLongFlag(String),
    /// An option defines neither a short nor a long flag.
    #[error("option '{0}' must define a short or long flag")]
    MissingFlagName(String),
    /// Arity lower bound exceeds the upper bound.
    #[error("option '{option}' has an invalid arity range: {min}..{max}")]
    InvalidArity {
        option: String,
        min: usize,
        max: usize,
    },
    /// Negation declared on an option that is not boolean.
    #[error("negation on option '{0}' requires a boolean arity")]
    NegationRequiresBoolean(String),
    /// Negation declared on an option without a long flag to negate.
    #[error("negation on option '{0}' requires a long flag")]
    NegationRequiresLongFlag(String),
    /// Allowed-value restriction declared on a boolean option.
    #[error("allowed values on option '{0}' are incompatible with a boolean arity")]
    RestrictionOnBoolean(String),
    /// An option depends on a name that is not an option of its command.
    #[error("option '{option}' depends on unknown option '{dependency}'")]
    UnknownDependency { option: String, dependency: String },
    /// The dependency graph over a command's options contains a cycle.
    #[error("cyclic option dependencies: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
    /// Two sub-commands in the same super-command share a name.
    #[error("duplicate command: '{0}'")]
    DuplicateCommand(String),
    /// The configured default sub-command does not exist.
    #[error("default command '{0}' is not a known command")]
    UnknownDefaultCommand(String),
    /// A command was executed without an executor callback.
    #[error("no executor given for command '{0}'")]
    MissingExecutor(String),
}

/// Malformed input tokens, surfaced unchanged to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A lone `-` outside a multi-value run, in strict mode.
    #[error("unfinished option: '-'")]
    BareDash,
    /// A flag-looking token with no matching option.
    #[error("unrecognized option: '{0}'")]
    UnrecognizedOption(String),
    /// A sub-command name with no matching descriptor.
    #[error("unrecognized command: '{0}'")]
    UnrecognizedCommand(String),
    /// An inline `=value` attached to a boolean flag.
    #[error("argument given to boolean flag: '{0}'")]
    ArgumentToBoolean(String),
    /// A single-arity flag with no value available.
    #[error("argument missing for option: '{0}'")]
    MissingArgument(String),
    /// A multi-arity flag that gathered fewer values than its minimum.
    #[error("the '{flag}' flag requires at least {min} arguments")]
    InsufficientValues { flag: String, min: usize },
    /// A super-command invocation that never named a sub-command.
    #[error("requires a command")]
    CommandRequired,
}

/// Semantic failures found by the verifier.
///
/// Messages are prefixed with the offending flag or metaname.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required option absent from the input.
    #[error("required option '{0}' missing")]
    Required(String),
    /// A value outside the option's allowed set.
    #[error("{flag}: unexpected value '{value}'")]
    ValueNotAllowed { flag: String, value: String },
    /// Fewer positional arguments than the declared minimum.
    #[error("{metaname}: requires at least {min} arguments")]
    TooFewArguments { metaname: String, min: usize },
    /// Positional arguments given to a command that declares none.
    #[error("{metaname}: no arguments allowed: '{token}'")]
    NoArgumentsAllowed { metaname: String, token: String },
    /// More positional arguments than the declared maximum.
    #[error("{metaname}: too many arguments: '{token}'")]
    TooManyArguments { metaname: String, token: String },
    /// A user validation callback rejected the value.
    #[error("{flag}: {message}")]
    Rejected { flag: String, message: String },
}

/// Type-coercion failures raised by the converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The raw value cannot be interpreted as the target type.
    #[error("cannot interpret '{value}' as {target}")]
    Invalid { value: String, target: &'static str },
    /// A file-typed value naming a path that does not exist.
    #[error("no such file: '{0}'")]
    MissingFile(String),
    /// A structured-file value that could not be read or parsed.
    #[error("cannot load document '{path}': {detail}")]
    Document { path: String, detail: String },
}

/// Umbrella error covering every failure phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages_name_the_offender() {
        let err = ParseError::UnrecognizedOption("-l".to_string());
        assert_eq!(err.to_string(), "unrecognized option: '-l'");

        let err = ParseError::InsufficientValues {
            flag: "-o".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "the '-o' flag requires at least 3 arguments");
    }

    #[test]
    fn test_cycle_error_names_participants() {
        let err = ConfigError::DependencyCycle(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "alpha".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "cyclic option dependencies: alpha -> beta -> alpha"
        );
    }

    #[test]
    fn test_umbrella_wraps_transparently() {
        let err: Error = ValidationError::Required("--count".to_string()).into();
        assert_eq!(err.to_string(), "required option '--count' missing");
    }
}
