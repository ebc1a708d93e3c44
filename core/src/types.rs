//! Schema type definitions for commands, options, and positional arguments.
//!
//! These are the immutable entities the parser and verifier consume. They are
//! produced by the builder API ([`crate::builder`]) and are read-only for the
//! lifetime of a parse.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{OptionMap, Value};

/// Reserved name of the help pseudo-option.
pub const HELP_OPTION: &str = "__help__";

/// Reserved name of the version pseudo-option.
pub const VERSION_OPTION: &str = "__version__";

/// Reserved name of a super-command's help sub-command.
pub const HELP_COMMAND: &str = "help";

/// Inclusive `[min, max]` count of values an option or argument group accepts.
///
/// `0..0` is a boolean flag, `1..1` a single-valued option, `1..N` a
/// multi-valued option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    /// Boolean arity: no values.
    pub const fn zero() -> Self {
        Self { min: 0, max: 0 }
    }

    /// Exactly one value.
    pub const fn one() -> Self {
        Self { min: 1, max: 1 }
    }

    /// One or more values, up to the conventional open bound.
    pub const fn many() -> Self {
        Self { min: 1, max: 1000 }
    }

    /// An explicit inclusive range.
    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn is_boolean(&self) -> bool {
        self.max == 0
    }

    pub fn is_single(&self) -> bool {
        self.min == 1 && self.max == 1
    }

    pub fn is_multiple(&self) -> bool {
        self.max > 1
    }
}

/// Closed cast tag selecting a converter function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cast {
    /// String passthrough.
    #[default]
    String,
    /// Boolean passthrough.
    Boolean,
    /// Integer (`i64`).
    Integer,
    /// Float (`f64`).
    Float,
    /// Symbol-like atom.
    Atom,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Combined date and time.
    DateTime,
    /// Existing filesystem path.
    File,
    /// Structured document loaded from a JSON or YAML file.
    Document,
}

/// Per-option validation callback, invoked with `(value, all-options)`.
///
/// The callback may read and write other options. A returned error message is
/// wrapped into a flag-prefixed validation error by the verifier.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

type ValidatorFn = dyn Fn(&Value, &mut OptionMap) -> std::result::Result<(), String> + Send + Sync;

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut OptionMap) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, value: &Value, options: &mut OptionMap) -> std::result::Result<(), String> {
        (self.0)(value, options)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Positional-argument validation callback, invoked with `(args, options)`.
#[derive(Clone)]
pub struct ArgsValidator(Arc<ArgsValidatorFn>);

type ArgsValidatorFn =
    dyn Fn(&[Value], &mut OptionMap) -> std::result::Result<(), String> + Send + Sync;

impl ArgsValidator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value], &mut OptionMap) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value], options: &mut OptionMap) -> std::result::Result<(), String> {
        (self.0)(args, options)
    }
}

impl fmt::Debug for ArgsValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArgsValidator(..)")
    }
}

/// Executor callback dispatched after a successful parse.
#[derive(Clone)]
pub struct Executor(Arc<dyn Fn(&[Value], &OptionMap) + Send + Sync>);

impl Executor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value], &OptionMap) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value], options: &OptionMap) {
        (self.0)(args, options)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Executor(..)")
    }
}

/// Schema for a command option.
///
/// # Examples
///
/// ```
/// use argot_core::{Cast, OptionSchema};
///
/// let opt = OptionSchema::single("count", Cast::Integer)
///     .flags("-c", "--count")
///     .summary("How many times to run");
///
/// assert_eq!(opt.display_flag(), "--count");
/// assert!(opt.arity.is_single());
/// ```
#[derive(Debug, Clone)]
pub struct OptionSchema {
    /// Unique option name, the key under which its value is stored.
    pub name: String,
    /// Short spelling (e.g. `-c`).
    pub short: Option<String>,
    /// Long spelling (e.g. `--count`).
    pub long: Option<String>,
    /// Display name for the option's value in diagnostics.
    pub metaname: Option<String>,
    /// One-line description.
    pub summary: Option<String>,
    /// Value count this option accepts.
    pub arity: Arity,
    /// Converter selection for its values.
    pub cast: Cast,
    /// Value used when the option is absent from input.
    pub default: Option<Value>,
    /// Whether absence is a validation error.
    pub required: bool,
    /// Restriction of values to a fixed set.
    pub allowed: Option<Vec<String>>,
    /// Names of options whose validation must run before this one.
    pub depends_on: Vec<String>,
    /// Negation prefix for the long flag (boolean options only).
    pub negation: Option<String>,
    /// Validation callback.
    pub validator: Option<Validator>,
}

impl OptionSchema {
    fn new(name: &str, arity: Arity, cast: Cast) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            long: None,
            metaname: None,
            summary: None,
            arity,
            cast,
            default: None,
            required: false,
            allowed: None,
            depends_on: Vec::new(),
            negation: None,
            validator: None,
        }
    }

    /// Creates a boolean flag (no value).
    pub fn boolean(name: &str) -> Self {
        Self::new(name, Arity::zero(), Cast::Boolean)
    }

    /// Creates a single-valued option.
    pub fn single(name: &str, cast: Cast) -> Self {
        Self::new(name, Arity::one(), cast)
    }

    /// Creates a multi-valued option with an explicit arity range.
    pub fn multiple(name: &str, cast: Cast, arity: Arity) -> Self {
        Self::new(name, arity, cast)
    }

    /// Sets both flag spellings.
    pub fn flags(self, short: &str, long: &str) -> Self {
        self.short(short).long(long)
    }

    /// Sets the short flag spelling.
    pub fn short(mut self, flag: &str) -> Self {
        self.short = Some(flag.to_string());
        self
    }

    /// Sets the long flag spelling.
    pub fn long(mut self, flag: &str) -> Self {
        self.long = Some(flag.to_string());
        self
    }

    /// Sets the value display name.
    pub fn metaname(mut self, meta: &str) -> Self {
        self.metaname = Some(meta.to_string());
        self
    }

    /// Sets the one-line description.
    pub fn summary(mut self, text: &str) -> Self {
        self.summary = Some(text.to_string());
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts values to the given set.
    pub fn allow(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Declares options whose validation must precede this one.
    pub fn depends_on(mut self, names: &[&str]) -> Self {
        self.depends_on = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Declares a negation prefix, accepting e.g. `--un-bold` for `--bold`.
    pub fn negation(mut self, prefix: &str) -> Self {
        self.negation = Some(prefix.to_string());
        self
    }

    /// Attaches a validation callback.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &mut OptionMap) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Validator::new(f));
        self
    }

    /// Returns the canonical flag spelling for diagnostics (long preferred).
    pub fn display_flag(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or(&self.name)
    }

    /// The configured boolean default, `false` when unset.
    pub fn default_bool(&self) -> bool {
        matches!(self.default, Some(Value::Bool(true)))
    }

    /// The generated negated long spelling, when negation is configured.
    ///
    /// The prefix is inserted after the leading dashes: prefix `un` on
    /// `--bold` yields `--un-bold`.
    pub fn negated_long(&self) -> Option<String> {
        let prefix = self.negation.as_deref()?;
        let body = self.long.as_deref()?.strip_prefix("--")?;
        Some(format!("--{prefix}-{body}"))
    }

    /// Whether values are restricted to a fixed set.
    pub fn is_restricted(&self) -> bool {
        self.allowed.as_ref().is_some_and(|set| !set.is_empty())
    }

    /// Whether this is one of the reserved help/version pseudo-options.
    pub fn is_reserved(&self) -> bool {
        self.name == HELP_OPTION || self.name == VERSION_OPTION
    }
}

/// Schema for a command's positional-argument group.
#[derive(Debug, Clone)]
pub struct ArgumentSchema {
    /// Display name for the group in diagnostics.
    pub metaname: String,
    /// Accepted argument count.
    pub arity: Arity,
    /// Converter selection for each argument.
    pub cast: Cast,
    /// Restriction of arguments to a fixed set.
    pub allowed: Option<Vec<String>>,
    /// Validation callback invoked with `(args, options)`.
    pub validator: Option<ArgsValidator>,
}

impl ArgumentSchema {
    /// Creates a free-form argument group accepting any number of values.
    pub fn new() -> Self {
        Self {
            metaname: "ARGS".to_string(),
            arity: Arity::range(0, 1000),
            cast: Cast::String,
            allowed: None,
            validator: None,
        }
    }

    /// Sets the accepted argument count.
    pub fn count(mut self, min: usize, max: usize) -> Self {
        self.arity = Arity::range(min, max);
        self
    }

    /// Sets the display name.
    pub fn metaname(mut self, meta: &str) -> Self {
        self.metaname = meta.to_string();
        self
    }

    /// Sets the converter for each argument.
    pub fn cast(mut self, cast: Cast) -> Self {
        self.cast = cast;
        self
    }

    /// Restricts arguments to the given set.
    pub fn allow(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Attaches a validation callback.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &mut OptionMap) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(ArgsValidator::new(f));
        self
    }
}

impl Default for ArgumentSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// An entry in a command's ordered listing.
///
/// The listing mixes options, nested sub-commands, and display annotations in
/// declaration order; printers and completion collaborators consume it as-is.
#[derive(Debug, Clone)]
pub enum Item {
    Option(OptionSchema),
    Command(Command),
    Heading(String),
    Paragraph(String),
}

/// A single command: options, an optional positional-argument group, and an
/// optional executor.
#[derive(Debug, Clone)]
pub struct Command {
    /// Command name.
    pub name: String,
    /// One-line description.
    pub summary: Option<String>,
    /// Ordered listing of options, nested commands, and annotations.
    pub items: Vec<Item>,
    /// Positional-argument group, absent when the command takes none.
    pub argument: Option<ArgumentSchema>,
    /// Callback dispatched after a successful parse.
    pub executor: Option<Executor>,
    /// Version message, set when the version pseudo-option is installed.
    pub version: Option<String>,
    pub(crate) dependency_order: Vec<String>,
}

impl Command {
    /// Iterates the command's options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionSchema> {
        self.items.iter().filter_map(|item| match item {
            Item::Option(option) => Some(option),
            _ => None,
        })
    }

    /// Looks up an option by name.
    pub fn find_option(&self, name: &str) -> Option<&OptionSchema> {
        self.options().find(|option| option.name == name)
    }

    /// Option names in dependency order, computed at build time.
    pub fn dependency_order(&self) -> &[String] {
        &self.dependency_order
    }
}

/// A super-command: global options plus an ordered set of sub-commands.
#[derive(Debug, Clone)]
pub struct SuperCommand {
    /// Super-command name.
    pub name: String,
    /// One-line description.
    pub summary: Option<String>,
    /// Ordered listing of global options, sub-commands, and annotations.
    pub items: Vec<Item>,
    /// Whether sub-command names terminate positional consumption.
    pub parsimonious: bool,
    /// Sub-command synthesized when input names none.
    pub default_command: Option<String>,
    /// Version message, set when the version pseudo-option is installed.
    pub version: Option<String>,
    pub(crate) has_help_command: bool,
    pub(crate) dependency_order: Vec<String>,
}

impl SuperCommand {
    /// Iterates the global options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionSchema> {
        self.items.iter().filter_map(|item| match item {
            Item::Option(option) => Some(option),
            _ => None,
        })
    }

    /// Iterates the sub-commands in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.items.iter().filter_map(|item| match item {
            Item::Command(command) => Some(command),
            _ => None,
        })
    }

    /// Looks up a sub-command by name.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands().find(|command| command.name == name)
    }

    /// All sub-command names in declaration order.
    pub fn command_names(&self) -> Vec<String> {
        self.commands().map(|command| command.name.clone()).collect()
    }

    /// Whether the reserved help sub-command is installed.
    pub fn has_help_command(&self) -> bool {
        self.has_help_command
    }

    /// Global option names in dependency order, computed at build time.
    pub fn dependency_order(&self) -> &[String] {
        &self.dependency_order
    }
}
