//! Token parsing, verification, and sub-command orchestration for argot.
//!
//! This crate hosts the engine that consumes the `argot-core` schema types:
//! the single-command token classifier ([`Parser`]), the post-parse
//! verification engine ([`Verifier`]), and the multi-command orchestrator
//! ([`SuperParser`]). The entry points below fold everything into a tagged
//! [`Outcome`] that callers pattern-match for dispatch.
//!
//! # Examples
//!
//! ```
//! use argot_core::{Cast, CommandBuilder, OptionSchema};
//! use argot_parse::{parse_command, Outcome};
//!
//! let command = CommandBuilder::new("greet")
//!     .option(OptionSchema::single("count", Cast::Integer).flags("-c", "--count"))
//!     .build()
//!     .unwrap();
//!
//! match parse_command(&command, ["--count", "3"]) {
//!     Outcome::Success(result) => {
//!         assert_eq!(result.get("count").and_then(|v| v.as_int()), Some(3));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

mod outcome;
mod parser;
mod super_parser;
mod verifier;

pub use outcome::{HelpScope, Outcome};
pub use parser::{Mode, ParseResult, Parser};
pub use super_parser::{SubResult, SuperParseResult, SuperParser};
pub use verifier::Verifier;

use argot_core::{Command, ConfigError, SuperCommand};

use crate::outcome::{finish, Halt};

/// Parses and verifies a token sequence against a single command.
pub fn parse_command<I, S>(command: &Command, argv: I) -> Outcome<ParseResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    finish(run_command(command, &argv))
}

fn run_command(command: &Command, argv: &[String]) -> Result<ParseResult, Halt> {
    let parser = Parser::new(command.options(), Mode::Strict, &[])?;
    let mut result = ParseResult::new();
    parser.parse_into(argv, &mut result)?;

    let verifier = Verifier::for_command(command);
    verifier.check_requests(&result)?;
    verifier.verify(&mut result)?;
    Ok(result)
}

/// Parses and verifies a token sequence against a super-command tree.
pub fn parse_super<I, S>(super_command: &SuperCommand, argv: I) -> Outcome<SuperParseResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SuperParser::new(super_command).parse(argv)
}

/// Parses a token sequence and dispatches the command's executor on success.
///
/// Executing a command that declares no executor is a configuration error.
pub fn execute_command<I, S>(command: &Command, argv: I) -> Outcome<ParseResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let Some(executor) = &command.executor else {
        return Outcome::Failure(ConfigError::MissingExecutor(command.name.clone()).into());
    };
    match parse_command(command, argv) {
        Outcome::Success(result) => {
            executor.call(&result.args, &result.options);
            Outcome::Success(result)
        }
        other => other,
    }
}
