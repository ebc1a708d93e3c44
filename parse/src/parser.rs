//! Single-command token classification.
//!
//! The parser walks the raw token sequence left to right with one token of
//! lookahead, routing each token into the options map, the positional list,
//! or the unparsed list. In [`Mode::Defer`] unrecognized tokens are collected
//! instead of raising, which is how the super-parser pre-scans global options
//! before it knows where sub-commands begin. A terminal set marks tokens that
//! stop positional consumption early and defer everything that follows; the
//! super-parser uses this to find sub-command boundaries.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use argot_core::{ConfigError, Error, OptionMap, OptionSchema, ParseError, Value};

/// Parsing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unknown flags and stray tokens are errors.
    Strict,
    /// Unknown flags and stray tokens are deferred for a later pass.
    Defer,
}

/// Mutable product of a parse: options, positionals, and deferred tokens.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    /// Parsed option values keyed by option name.
    pub options: OptionMap,
    /// Positional arguments in input order.
    pub args: Vec<Value>,
    /// Tokens deferred for a later pass, in input order.
    pub unparsed: Vec<String>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an option value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Whether the named option holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Whether any tokens were deferred.
    pub fn has_unparsed(&self) -> bool {
        !self.unparsed.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct FlagEntry<'a> {
    option: &'a OptionSchema,
    negated: bool,
}

/// Single-command token classifier.
///
/// Construction builds the flag lookup table (short, long, and generated
/// negated spellings) and fails on a collision.
#[derive(Debug)]
pub struct Parser<'a> {
    flags: HashMap<String, FlagEntry<'a>>,
    mode: Mode,
    terminals: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Builds a parser over the given option set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateFlag`] when two spellings collide, including
    /// a generated negated spelling colliding with a declared flag.
    pub fn new(
        options: impl IntoIterator<Item = &'a OptionSchema>,
        mode: Mode,
        terminals: &[String],
    ) -> Result<Self, Error> {
        let mut flags = HashMap::new();
        for option in options {
            if let Some(short) = &option.short {
                insert_flag(&mut flags, short.clone(), option, false)?;
            }
            if let Some(long) = &option.long {
                insert_flag(&mut flags, long.clone(), option, false)?;
            }
            if let Some(negated) = option.negated_long() {
                insert_flag(&mut flags, negated, option, true)?;
            }
        }
        Ok(Self {
            flags,
            mode,
            terminals: terminals.to_vec(),
        })
    }

    /// Parses a token sequence into a fresh result.
    pub fn parse<I, S>(&self, argv: I) -> Result<ParseResult, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut result = ParseResult::new();
        self.parse_into(&argv, &mut result)?;
        Ok(result)
    }

    /// Parses a token sequence into an existing result.
    pub fn parse_into(&self, argv: &[String], result: &mut ParseResult) -> Result<(), Error> {
        debug!(mode = ?self.mode, tokens = argv.len(), "parsing token stream");
        let mut index = 0;
        while index < argv.len() {
            index = match argv[index].as_str() {
                "-" => match self.mode {
                    Mode::Defer => {
                        result.unparsed.push("-".to_string());
                        index + 1
                    }
                    Mode::Strict => return Err(ParseError::BareDash.into()),
                },
                "--" => self.parse_rest(argv, index, result),
                token if token.starts_with('-') => self.parse_option(argv, index, result)?,
                _ => self.parse_positionals(argv, index, result),
            };
        }
        Ok(())
    }

    /// Everything after `--` goes verbatim to positionals (strict) or the
    /// deferred list (defer, which also keeps the `--` itself for the next
    /// pass).
    fn parse_rest(&self, argv: &[String], index: usize, result: &mut ParseResult) -> usize {
        if self.mode == Mode::Defer {
            result.unparsed.push("--".to_string());
        }
        for token in &argv[index + 1..] {
            match self.mode {
                Mode::Defer => result.unparsed.push(token.clone()),
                Mode::Strict => result.args.push(Value::from(token.as_str())),
            }
        }
        argv.len()
    }

    fn parse_option(
        &self,
        argv: &[String],
        index: usize,
        result: &mut ParseResult,
    ) -> Result<usize, Error> {
        let token = argv[index].as_str();
        // Split on the first '=' only; the value may itself contain '='.
        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token, None),
        };

        let Some(entry) = self.flags.get(flag) else {
            return match self.mode {
                Mode::Defer => {
                    result.unparsed.push(token.to_string());
                    Ok(index + 1)
                }
                Mode::Strict => Err(ParseError::UnrecognizedOption(flag.to_string()).into()),
            };
        };
        let option = entry.option;

        if option.arity.is_boolean() {
            if inline.is_some() {
                return Err(ParseError::ArgumentToBoolean(token.to_string()).into());
            }
            // The plain spelling stores the complement of the default; the
            // negated spelling resolves to the same option with the sense
            // flipped back.
            let default = option.default_bool();
            let stored = if entry.negated { default } else { !default };
            result.options.insert(option.name.clone(), Value::Bool(stored));
            Ok(index + 1)
        } else if option.arity.is_single() {
            if let Some(value) = inline {
                result.options.insert(option.name.clone(), Value::from(value));
                return Ok(index + 1);
            }
            let (value, next) = self.read_value(argv, index + 1, result);
            match value {
                Some(value) => {
                    result.options.insert(option.name.clone(), Value::from(value));
                    Ok(next)
                }
                None => Err(ParseError::MissingArgument(flag.to_string()).into()),
            }
        } else {
            self.parse_multi(argv, index, result, flag, inline, option)
        }
    }

    fn parse_multi(
        &self,
        argv: &[String],
        index: usize,
        result: &mut ParseResult,
        flag: &str,
        inline: Option<&str>,
        option: &OptionSchema,
    ) -> Result<usize, Error> {
        if let Some(value) = inline {
            // An inline value is exactly one value; a minimum above one can
            // never be satisfied this way.
            if option.arity.min > 1 {
                return Err(ParseError::InsufficientValues {
                    flag: flag.to_string(),
                    min: option.arity.min,
                }
                .into());
            }
            result
                .options
                .insert(option.name.clone(), Value::List(vec![Value::from(value)]));
            return Ok(index + 1);
        }

        let mut index = index + 1;
        let mut values = Vec::new();
        while values.len() < option.arity.max && index < argv.len() {
            let (value, next) = self.read_value(argv, index, result);
            match value {
                Some(value) => {
                    values.push(Value::from(value));
                    index = next;
                }
                None => {
                    index = next;
                    break;
                }
            }
        }

        if values.len() < option.arity.min {
            return Err(ParseError::InsufficientValues {
                flag: flag.to_string(),
                min: option.arity.min,
            }
            .into());
        }

        // A standalone '-' closes the run; it is consumed, never emitted.
        if index < argv.len() && argv[index] == "-" {
            index += 1;
        }

        result.options.insert(option.name.clone(), Value::List(values));
        Ok(index)
    }

    fn parse_positionals(&self, argv: &[String], index: usize, result: &mut ParseResult) -> usize {
        let mut index = index;
        while index < argv.len() {
            let (value, next) = self.read_value(argv, index, result);
            let Some(token) = value else {
                return next;
            };
            match self.mode {
                Mode::Defer => result.unparsed.push(token.to_string()),
                Mode::Strict => result.args.push(Value::from(token)),
            }
            index = next;
        }
        index
    }

    /// Reads one plain value token. Stops (returning `None`) at end of
    /// input, a flag-looking token, or a terminal token; a terminal defers
    /// itself and every remaining token for the next pass.
    fn read_value<'b>(
        &self,
        argv: &'b [String],
        index: usize,
        result: &mut ParseResult,
    ) -> (Option<&'b str>, usize) {
        if index >= argv.len() {
            return (None, index);
        }
        let token = argv[index].as_str();
        if token.starts_with('-') {
            return (None, index);
        }
        if self.terminals.iter().any(|terminal| terminal == token) {
            debug!(token, "terminal token; deferring remainder");
            for rest in &argv[index..] {
                result.unparsed.push(rest.clone());
            }
            return (None, argv.len());
        }
        (Some(token), index + 1)
    }
}

fn insert_flag<'a>(
    flags: &mut HashMap<String, FlagEntry<'a>>,
    spelling: String,
    option: &'a OptionSchema,
    negated: bool,
) -> Result<(), Error> {
    if flags.contains_key(&spelling) {
        return Err(ConfigError::DuplicateFlag(spelling).into());
    }
    flags.insert(spelling, FlagEntry { option, negated });
    Ok(())
}
