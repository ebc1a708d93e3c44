//! Post-parse defaulting, conversion, and validation.
//!
//! Options are processed in the dependency order computed at schema-build
//! time, so a validation callback can rely on the options it depends on
//! having been verified first. The help/version pre-pass runs before
//! anything else: a help or version request always wins over a missing
//! required option.

use tracing::debug;

use argot_core::{
    convert, ArgumentSchema, Command, Error, OptionSchema, SuperCommand, ValidationError, Value,
    HELP_OPTION, VERSION_OPTION,
};

use crate::outcome::{Halt, HelpScope};
use crate::parser::ParseResult;

/// Verification engine for one command's parse result.
#[derive(Debug)]
pub struct Verifier<'a> {
    name: String,
    options: Vec<&'a OptionSchema>,
    order: &'a [String],
    argument: Option<&'a ArgumentSchema>,
    version: Option<&'a str>,
    help_scope: HelpScope,
}

impl<'a> Verifier<'a> {
    /// Builds a verifier for a single command.
    pub fn for_command(command: &'a Command) -> Self {
        Self {
            name: command.name.clone(),
            options: command.options().collect(),
            order: command.dependency_order(),
            argument: command.argument.as_ref(),
            version: command.version.as_deref(),
            help_scope: HelpScope::Command(command.name.clone()),
        }
    }

    /// Builds a verifier for a super-command's global options.
    pub fn for_super(super_command: &'a SuperCommand) -> Self {
        Self {
            name: super_command.name.clone(),
            options: super_command.options().collect(),
            order: super_command.dependency_order(),
            argument: None,
            version: super_command.version.as_deref(),
            help_scope: HelpScope::Super(super_command.name.clone()),
        }
    }

    /// Help/version pre-pass: inspects only the reserved pseudo-options.
    ///
    /// Runs before any required-option check so a help or version request
    /// short-circuits ahead of validation failures.
    pub(crate) fn check_requests(&self, result: &ParseResult) -> Result<(), Halt> {
        if matches!(result.get(HELP_OPTION), Some(Value::Bool(true))) {
            return Err(Halt::Help(self.help_scope.clone()));
        }
        if matches!(result.get(VERSION_OPTION), Some(Value::Bool(true))) {
            let message = self.version.unwrap_or_default().to_string();
            return Err(Halt::Version(message));
        }
        Ok(())
    }

    /// Runs option verification then positional verification.
    pub fn verify(&self, result: &mut ParseResult) -> Result<(), Error> {
        self.verify_options(result)?;
        self.verify_args(result)
    }

    /// Verifies every option in dependency order.
    pub fn verify_options(&self, result: &mut ParseResult) -> Result<(), Error> {
        for option in self.ordered() {
            debug!(option = %option.name, "verifying option");
            self.require(option, result)?;
            self.populate(option, result);
            self.convert(option, result)?;
            self.check_allowed(option, result)?;
            self.validate(option, result)?;
        }
        Ok(())
    }

    /// Checks the positional count, converts each argument, and invokes the
    /// positional validation callback.
    pub fn verify_args(&self, result: &mut ParseResult) -> Result<(), Error> {
        let Some(spec) = self.argument else {
            if let Some(first) = result.args.first() {
                return Err(ValidationError::NoArgumentsAllowed {
                    metaname: self.name.clone(),
                    token: first.to_string(),
                }
                .into());
            }
            return Ok(());
        };

        if result.args.len() < spec.arity.min {
            return Err(ValidationError::TooFewArguments {
                metaname: spec.metaname.clone(),
                min: spec.arity.min,
            }
            .into());
        }
        if result.args.len() > spec.arity.max {
            let first_excess = result.args[spec.arity.max].to_string();
            if spec.arity.max == 0 {
                return Err(ValidationError::NoArgumentsAllowed {
                    metaname: spec.metaname.clone(),
                    token: first_excess,
                }
                .into());
            }
            return Err(ValidationError::TooManyArguments {
                metaname: spec.metaname.clone(),
                token: first_excess,
            }
            .into());
        }

        for slot in result.args.iter_mut() {
            *slot = convert(spec.cast, slot.clone())?;
        }

        if let Some(allowed) = &spec.allowed {
            for value in &result.args {
                let rendered = value.to_string();
                if !allowed.contains(&rendered) {
                    return Err(ValidationError::ValueNotAllowed {
                        flag: spec.metaname.clone(),
                        value: rendered,
                    }
                    .into());
                }
            }
        }

        if let Some(validator) = &spec.validator {
            let args = result.args.clone();
            validator
                .call(&args, &mut result.options)
                .map_err(|message| ValidationError::Rejected {
                    flag: spec.metaname.clone(),
                    message,
                })?;
        }

        Ok(())
    }

    /// Options in dependency order; anything the order does not name keeps
    /// declaration order at the end.
    fn ordered(&self) -> Vec<&'a OptionSchema> {
        if self.order.is_empty() {
            return self.options.clone();
        }
        let mut ordered = Vec::with_capacity(self.options.len());
        for name in self.order {
            if let Some(option) = self.options.iter().find(|o| &o.name == name) {
                ordered.push(*option);
            }
        }
        for option in &self.options {
            if !self.order.contains(&option.name) {
                ordered.push(*option);
            }
        }
        ordered
    }

    fn require(&self, option: &OptionSchema, result: &ParseResult) -> Result<(), Error> {
        if option.required && !result.is_set(&option.name) {
            return Err(ValidationError::Required(option.display_flag().to_string()).into());
        }
        Ok(())
    }

    fn populate(&self, option: &OptionSchema, result: &mut ParseResult) {
        if result.is_set(&option.name) || option.is_reserved() {
            return;
        }
        if let Some(default) = &option.default {
            result.options.insert(option.name.clone(), default.clone());
        } else if option.arity.is_boolean() {
            result.options.insert(option.name.clone(), Value::Bool(false));
        } else if option.arity.is_multiple() {
            result
                .options
                .insert(option.name.clone(), Value::List(Vec::new()));
        }
        // Single-arity options without a default stay unset.
    }

    fn convert(&self, option: &OptionSchema, result: &mut ParseResult) -> Result<(), Error> {
        let Some(value) = result.get(&option.name) else {
            return Ok(());
        };
        if !present(value) {
            return Ok(());
        }
        let converted = convert(option.cast, value.clone())?;
        result.options.insert(option.name.clone(), converted);
        Ok(())
    }

    fn check_allowed(&self, option: &OptionSchema, result: &ParseResult) -> Result<(), Error> {
        let Some(allowed) = &option.allowed else {
            return Ok(());
        };
        let Some(value) = result.get(&option.name) else {
            return Ok(());
        };
        if !present(value) {
            return Ok(());
        }

        let scalars = match value {
            Value::List(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        for scalar in scalars {
            let rendered = scalar.to_string();
            if !allowed.contains(&rendered) {
                return Err(ValidationError::ValueNotAllowed {
                    flag: option.display_flag().to_string(),
                    value: rendered,
                }
                .into());
            }
        }
        Ok(())
    }

    fn validate(&self, option: &OptionSchema, result: &mut ParseResult) -> Result<(), Error> {
        let Some(validator) = &option.validator else {
            return Ok(());
        };
        let Some(value) = result.get(&option.name) else {
            return Ok(());
        };
        if !present(value) {
            return Ok(());
        }

        let value = value.clone();
        validator
            .call(&value, &mut result.options)
            .map_err(|message| {
                ValidationError::Rejected {
                    flag: option.display_flag().to_string(),
                    message,
                }
                .into()
            })
    }
}

/// A value counts as present unless it is `false` or an empty list; absent
/// and not-present values skip conversion, restriction, and validation.
fn present(value: &Value) -> bool {
    match value {
        Value::Bool(false) => false,
        Value::List(items) => !items.is_empty(),
        _ => true,
    }
}
