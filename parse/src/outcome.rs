//! Tagged terminal outcomes of a parse.
//!
//! Help and version requests are distinguished outcome variants rather than
//! errors, so they can short-circuit ahead of required-option checks without
//! being classified as user mistakes. Call sites pattern-match on
//! [`Outcome`]; the intended exit-code mapping (help/version to success,
//! failure to non-zero) belongs to the caller.

use argot_core::Error;

/// What a help request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpScope {
    /// A single command's own help option.
    Command(String),
    /// The super-command itself.
    Super(String),
    /// A specific sub-command, named through the help sub-command.
    Sub(String),
}

/// Terminal outcome of a parse call.
#[derive(Debug)]
pub enum Outcome<R> {
    /// Input parsed and verified; ready for dispatch.
    Success(R),
    /// Help was requested for the given scope.
    Help(HelpScope),
    /// The version message was requested.
    Version(String),
    /// A configuration, parse, validation, or conversion failure.
    Failure(Error),
}

impl<R> Outcome<R> {
    /// Whether this outcome carries a result.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Unwraps the result, if any.
    pub fn success(self) -> Option<R> {
        match self {
            Outcome::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Unwraps the failure, if any.
    pub fn failure(self) -> Option<Error> {
        match self {
            Outcome::Failure(error) => Some(error),
            _ => None,
        }
    }
}

/// Internal control flow: anything that stops a parse before success.
///
/// Bubbles through the engine via `?` and is folded into an [`Outcome`] at
/// the top-level entry points.
#[derive(Debug)]
pub(crate) enum Halt {
    Fail(Error),
    Help(HelpScope),
    Version(String),
}

impl From<Error> for Halt {
    fn from(error: Error) -> Self {
        Halt::Fail(error)
    }
}

impl From<argot_core::ParseError> for Halt {
    fn from(error: argot_core::ParseError) -> Self {
        Halt::Fail(error.into())
    }
}

pub(crate) fn finish<R>(run: Result<R, Halt>) -> Outcome<R> {
    match run {
        Ok(result) => Outcome::Success(result),
        Err(Halt::Help(scope)) => Outcome::Help(scope),
        Err(Halt::Version(message)) => Outcome::Version(message),
        Err(Halt::Fail(error)) => Outcome::Failure(error),
    }
}
