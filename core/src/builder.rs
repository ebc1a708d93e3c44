//! Eagerly-validated builder API producing the immutable schema types.
//!
//! Builders collect options, sub-commands, and annotations in declaration
//! order; `build` checks every schema invariant and computes the option
//! dependency order, so that all configuration errors surface before a single
//! input token is read.
//!
//! # Examples
//!
//! ```
//! use argot_core::{Cast, CommandBuilder, OptionSchema};
//!
//! let command = CommandBuilder::new("greet")
//!     .summary("Print a greeting")
//!     .option(OptionSchema::single("count", Cast::Integer).flags("-c", "--count"))
//!     .option(OptionSchema::boolean("loud").flags("-l", "--loud"))
//!     .help()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(command.options().count(), 3);
//! ```

use std::collections::HashSet;

use crate::depend;
use crate::error::{ConfigError, Error, Result};
use crate::types::{
    ArgumentSchema, Command, Executor, Item, OptionSchema, SuperCommand, HELP_COMMAND,
    HELP_OPTION, VERSION_OPTION,
};
use crate::value::{OptionMap, Value};

fn help_option() -> OptionSchema {
    OptionSchema::boolean(HELP_OPTION)
        .flags("-h", "--help")
        .summary("Show this help message")
}

fn version_option() -> OptionSchema {
    OptionSchema::boolean(VERSION_OPTION)
        .long("--version")
        .summary("The version number")
}

/// Builder for a single [`Command`].
#[derive(Debug)]
pub struct CommandBuilder {
    name: String,
    summary: Option<String>,
    items: Vec<Item>,
    argument: Option<ArgumentSchema>,
    executor: Option<Executor>,
    version: Option<String>,
}

impl CommandBuilder {
    /// Creates a builder for the named command.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            summary: None,
            items: Vec::new(),
            argument: None,
            executor: None,
            version: None,
        }
    }

    /// Sets the one-line description.
    pub fn summary(mut self, text: &str) -> Self {
        self.summary = Some(text.to_string());
        self
    }

    /// Adds an option.
    pub fn option(mut self, option: OptionSchema) -> Self {
        self.items.push(Item::Option(option));
        self
    }

    /// Adds a display heading to the listing.
    pub fn heading(mut self, text: &str) -> Self {
        self.items.push(Item::Heading(text.to_string()));
        self
    }

    /// Adds a display paragraph to the listing.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.items.push(Item::Paragraph(text.to_string()));
        self
    }

    /// Declares the positional-argument group.
    pub fn argument(mut self, spec: ArgumentSchema) -> Self {
        self.argument = Some(spec);
        self
    }

    /// Attaches the executor dispatched after a successful parse.
    pub fn executor<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &OptionMap) + Send + Sync + 'static,
    {
        self.executor = Some(Executor::new(f));
        self
    }

    /// Installs the reserved help pseudo-option (`-h` / `--help`).
    pub fn help(self) -> Self {
        self.option(help_option())
    }

    /// Installs the reserved version pseudo-option (`--version`) with the
    /// message reported when it is requested.
    pub fn version(mut self, message: &str) -> Self {
        self.version = Some(message.to_string());
        self.option(version_option())
    }

    /// Validates the schema and produces the immutable [`Command`].
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from the invariant checks or the dependency
    /// orderer.
    pub fn build(self) -> Result<Command> {
        let options: Vec<&OptionSchema> = self
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Option(option) => Some(option),
                _ => None,
            })
            .collect();
        validate_option_set(&options)?;
        let dependency_order = depend::dependency_order(&options)?;

        Ok(Command {
            name: self.name,
            summary: self.summary,
            items: self.items,
            argument: self.argument,
            executor: self.executor,
            version: self.version,
            dependency_order,
        })
    }
}

/// Builder for a [`SuperCommand`].
#[derive(Debug)]
pub struct SuperCommandBuilder {
    name: String,
    summary: Option<String>,
    items: Vec<Item>,
    parsimonious: bool,
    default_command: Option<String>,
    version: Option<String>,
    has_help_command: bool,
}

impl SuperCommandBuilder {
    /// Creates a builder for the named super-command.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            summary: None,
            items: Vec::new(),
            parsimonious: false,
            default_command: None,
            version: None,
            has_help_command: false,
        }
    }

    /// Sets the one-line description.
    pub fn summary(mut self, text: &str) -> Self {
        self.summary = Some(text.to_string());
        self
    }

    /// Adds a global option, shared by every sub-command.
    pub fn option(mut self, option: OptionSchema) -> Self {
        self.items.push(Item::Option(option));
        self
    }

    /// Adds a sub-command.
    pub fn command(mut self, command: Command) -> Self {
        self.items.push(Item::Command(command));
        self
    }

    /// Adds a display heading to the listing.
    pub fn heading(mut self, text: &str) -> Self {
        self.items.push(Item::Heading(text.to_string()));
        self
    }

    /// Adds a display paragraph to the listing.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.items.push(Item::Paragraph(text.to_string()));
        self
    }

    /// Installs the reserved help sub-command.
    ///
    /// It takes at most one positional argument naming the sub-command to
    /// describe; with none, help is requested for the super-command itself.
    pub fn help(mut self) -> Self {
        let help = Command {
            name: HELP_COMMAND.to_string(),
            summary: Some("Show the info for a command, or this message".to_string()),
            items: Vec::new(),
            argument: Some(ArgumentSchema::new().count(0, 1).metaname("COMMAND")),
            executor: None,
            version: None,
            dependency_order: Vec::new(),
        };
        self.has_help_command = true;
        self.items.push(Item::Command(help));
        self
    }

    /// Installs the reserved version pseudo-option as a global option.
    pub fn version(mut self, message: &str) -> Self {
        self.version = Some(message.to_string());
        self.option(version_option())
    }

    /// Makes every sub-command name terminate positional consumption.
    pub fn parsimonious(mut self) -> Self {
        self.parsimonious = true;
        self
    }

    /// Names the sub-command synthesized when input names none.
    pub fn default_command(mut self, name: &str) -> Self {
        self.default_command = Some(name.to_string());
        self
    }

    /// Validates the schema and produces the immutable [`SuperCommand`].
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from the invariant checks, duplicate sub-command
    /// names, an unknown default sub-command, or the dependency orderer.
    pub fn build(self) -> Result<SuperCommand> {
        let options: Vec<&OptionSchema> = self
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Option(option) => Some(option),
                _ => None,
            })
            .collect();
        validate_option_set(&options)?;
        let dependency_order = depend::dependency_order(&options)?;

        let mut seen = HashSet::new();
        for item in &self.items {
            if let Item::Command(command) = item {
                if !seen.insert(command.name.as_str()) {
                    return Err(ConfigError::DuplicateCommand(command.name.clone()).into());
                }
            }
        }

        if let Some(default) = &self.default_command {
            if !seen.contains(default.as_str()) {
                return Err(ConfigError::UnknownDefaultCommand(default.clone()).into());
            }
        }

        Ok(SuperCommand {
            name: self.name,
            summary: self.summary,
            items: self.items,
            parsimonious: self.parsimonious,
            default_command: self.default_command,
            version: self.version,
            has_help_command: self.has_help_command,
            dependency_order,
        })
    }
}

fn validate_option_set(options: &[&OptionSchema]) -> std::result::Result<(), Error> {
    let mut names = HashSet::new();
    for option in options {
        if !names.insert(option.name.as_str()) {
            return Err(ConfigError::DuplicateName(option.name.clone()).into());
        }
        validate_option(option)?;
    }
    Ok(())
}

fn validate_option(option: &OptionSchema) -> std::result::Result<(), ConfigError> {
    if option.short.is_none() && option.long.is_none() {
        return Err(ConfigError::MissingFlagName(option.name.clone()));
    }

    if let Some(short) = &option.short {
        if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
            return Err(ConfigError::InvalidShortFlag(short.clone()));
        }
    }

    if let Some(long) = &option.long {
        if !long.starts_with("--") || long.len() < 3 {
            return Err(ConfigError::InvalidLongFlag(long.clone()));
        }
    }

    if option.arity.min > option.arity.max {
        return Err(ConfigError::InvalidArity {
            option: option.name.clone(),
            min: option.arity.min,
            max: option.arity.max,
        });
    }

    if option.negation.is_some() {
        if !option.arity.is_boolean() {
            return Err(ConfigError::NegationRequiresBoolean(option.name.clone()));
        }
        if option.long.is_none() {
            return Err(ConfigError::NegationRequiresLongFlag(option.name.clone()));
        }
    }

    if option.is_restricted() && option.arity.is_boolean() {
        return Err(ConfigError::RestrictionOnBoolean(option.name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Arity, Cast};

    #[test]
    fn test_build_collects_options_in_declaration_order() {
        let command = CommandBuilder::new("run")
            .option(OptionSchema::boolean("verbose").flags("-v", "--verbose"))
            .heading("Tuning:")
            .option(OptionSchema::single("count", Cast::Integer).flags("-c", "--count"))
            .build()
            .unwrap();

        let names: Vec<&str> = command.options().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["verbose", "count"]);
        assert_eq!(command.dependency_order(), ["verbose", "count"]);
    }

    #[test]
    fn test_build_orders_options_by_dependency() {
        let command = CommandBuilder::new("render")
            .option(
                OptionSchema::single("count", Cast::Integer)
                    .flags("-c", "--count")
                    .depends_on(&["bold"]),
            )
            .option(
                OptionSchema::boolean("bold")
                    .flags("-b", "--bold")
                    .depends_on(&["font", "config"]),
            )
            .option(
                OptionSchema::single("font", Cast::Atom)
                    .flags("-f", "--font")
                    .depends_on(&["config"]),
            )
            .option(OptionSchema::single("config", Cast::File).long("--config"))
            .option(
                OptionSchema::single("access", Cast::File)
                    .flags("-a", "--access")
                    .depends_on(&["config", "count"]),
            )
            .build()
            .unwrap();

        assert_eq!(
            command.dependency_order(),
            ["config", "font", "bold", "count", "access"]
        );
    }

    #[test]
    fn test_cyclic_dependencies_fail_at_build() {
        let err = CommandBuilder::new("run")
            .option(
                OptionSchema::boolean("a")
                    .long("--a-flag")
                    .depends_on(&["b"]),
            )
            .option(
                OptionSchema::boolean("b")
                    .long("--b-flag")
                    .depends_on(&["a"]),
            )
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Config(ConfigError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_duplicate_option_names_rejected() {
        let err = CommandBuilder::new("run")
            .option(OptionSchema::boolean("x").short("-x"))
            .option(OptionSchema::boolean("x").short("-y"))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            Error::Config(ConfigError::DuplicateName("x".to_string()))
        );
    }

    #[test]
    fn test_flag_format_checks() {
        let err = CommandBuilder::new("run")
            .option(OptionSchema::boolean("x").short("x"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::InvalidShortFlag("x".to_string()))
        );

        let err = CommandBuilder::new("run")
            .option(OptionSchema::boolean("x").long("-x"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::InvalidLongFlag("-x".to_string()))
        );

        let err = CommandBuilder::new("run")
            .option(OptionSchema::boolean("x"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::MissingFlagName("x".to_string()))
        );
    }

    #[test]
    fn test_arity_bounds_checked() {
        let err = CommandBuilder::new("run")
            .option(OptionSchema::multiple(
                "xs",
                Cast::String,
                Arity::range(3, 2),
            ).short("-x"))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::InvalidArity { .. })));
    }

    #[test]
    fn test_negation_requires_boolean_and_long_flag() {
        let err = CommandBuilder::new("run")
            .option(
                OptionSchema::single("level", Cast::Integer)
                    .long("--level")
                    .negation("no"),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::NegationRequiresBoolean("level".to_string()))
        );

        let err = CommandBuilder::new("run")
            .option(OptionSchema::boolean("bold").short("-b").negation("no"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::NegationRequiresLongFlag("bold".to_string()))
        );
    }

    #[test]
    fn test_restriction_rejected_on_booleans() {
        let err = CommandBuilder::new("run")
            .option(
                OptionSchema::boolean("mode")
                    .long("--mode")
                    .allow(&["on", "off"]),
            )
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            Error::Config(ConfigError::RestrictionOnBoolean("mode".to_string()))
        );
    }

    #[test]
    fn test_help_and_version_install_reserved_options() {
        let command = CommandBuilder::new("run")
            .help()
            .version("1.2.3")
            .build()
            .unwrap();

        assert!(command.find_option(HELP_OPTION).is_some());
        assert!(command.find_option(VERSION_OPTION).is_some());
        assert_eq!(command.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_super_build_rejects_duplicate_commands() {
        let bar = CommandBuilder::new("bar").build().unwrap();
        let bar_again = CommandBuilder::new("bar").build().unwrap();

        let err = SuperCommandBuilder::new("tool")
            .command(bar)
            .command(bar_again)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            Error::Config(ConfigError::DuplicateCommand("bar".to_string()))
        );
    }

    #[test]
    fn test_super_build_rejects_unknown_default() {
        let bar = CommandBuilder::new("bar").build().unwrap();

        let err = SuperCommandBuilder::new("tool")
            .command(bar)
            .default_command("baz")
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            Error::Config(ConfigError::UnknownDefaultCommand("baz".to_string()))
        );
    }

    #[test]
    fn test_super_help_installs_reserved_command() {
        let sc = SuperCommandBuilder::new("tool").help().build().unwrap();

        assert!(sc.has_help_command());
        let help = sc.find_command(HELP_COMMAND).unwrap();
        assert_eq!(help.argument.as_ref().unwrap().arity, Arity::range(0, 1));
    }
}
