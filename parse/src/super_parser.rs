//! Multi-command orchestration over a super-command tree.
//!
//! A super-command parse runs in phases: a deferred global scan over the
//! whole input, a dispatch loop that carves the remainder into per-command
//! parses, and a fixed-order verification pass (help sub-result first, then
//! the global result, then every other sub-result with global values merged
//! underneath its own).

use serde::Serialize;
use tracing::debug;

use argot_core::{ParseError, SuperCommand, HELP_COMMAND};

use crate::outcome::{finish, Halt, HelpScope, Outcome};
use crate::parser::{Mode, ParseResult, Parser};
use crate::verifier::Verifier;

/// One sub-command's verified parse result.
#[derive(Debug, Clone, Serialize)]
pub struct SubResult {
    /// Name of the sub-command this result belongs to.
    pub command: String,
    /// The sub-command's own options, positionals, and merged global values.
    pub result: ParseResult,
}

/// Aggregate result of a super-command parse.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuperParseResult {
    /// Verified global option values.
    pub options: argot_core::OptionMap,
    /// Per-command results in invocation order.
    pub subresults: Vec<SubResult>,
}

/// Orchestrates parsing across a super-command's sub-command tree.
#[derive(Debug)]
pub struct SuperParser<'a> {
    super_command: &'a SuperCommand,
    terminals: Vec<String>,
}

impl<'a> SuperParser<'a> {
    /// Builds a super-parser.
    ///
    /// In parsimonious mode every sub-command name becomes a terminal, so
    /// one sub-command's positional consumption stops at the next name;
    /// otherwise other names are absorbed as ordinary positionals.
    pub fn new(super_command: &'a SuperCommand) -> Self {
        let terminals = if super_command.parsimonious {
            super_command.command_names()
        } else {
            Vec::new()
        };
        Self {
            super_command,
            terminals,
        }
    }

    /// Parses a full token sequence into per-command results.
    pub fn parse<I, S>(&self, argv: I) -> Outcome<SuperParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        finish(self.run(argv))
    }

    fn run(&self, argv: Vec<String>) -> Result<SuperParseResult, Halt> {
        // Global phase: deferred scan of the entire input.
        let global_parser = Parser::new(self.super_command.options(), Mode::Defer, &[])?;
        let mut global = global_parser.parse(argv)?;
        let global_verifier = Verifier::for_super(self.super_command);
        global_verifier.check_requests(&global)?;

        let mut unparsed = std::mem::take(&mut global.unparsed);
        if unparsed.is_empty() {
            // A global action would have fired by now.
            if self.super_command.has_help_command() {
                return Err(Halt::Help(HelpScope::Super(self.super_command.name.clone())));
            }
            match &self.super_command.default_command {
                Some(default) => unparsed.push(default.clone()),
                None => return Err(ParseError::CommandRequired.into()),
            }
        }

        // Dispatch loop: carve the remainder into per-command parses.
        let mut subresults = Vec::new();
        while !unparsed.is_empty() {
            let name = unparsed.remove(0);
            let Some(command) = self.super_command.find_command(&name) else {
                return Err(if name.starts_with('-') {
                    ParseError::UnrecognizedOption(name).into()
                } else {
                    ParseError::UnrecognizedCommand(name).into()
                });
            };
            debug!(command = %command.name, remaining = unparsed.len(), "dispatching sub-command");

            // The help sub-command's positionals ARE command names, so it
            // parses without terminals even in parsimonious mode.
            let no_terminals: &[String] = &[];
            let terminals = if command.name == HELP_COMMAND && self.super_command.has_help_command()
            {
                no_terminals
            } else {
                self.terminals.as_slice()
            };
            let parser = Parser::new(command.options(), Mode::Strict, terminals)?;
            let mut result = ParseResult::new();
            parser.parse_into(&unparsed, &mut result)?;

            unparsed = std::mem::take(&mut result.unparsed);
            subresults.push(SubResult {
                command: command.name.clone(),
                result,
            });
        }

        // Post-verify, fixed order: help sub-result first.
        if self.super_command.has_help_command() {
            let help_index = subresults.iter().position(|s| s.command == HELP_COMMAND);
            if let Some(index) = help_index {
                if let Some(help_command) = self.super_command.find_command(HELP_COMMAND) {
                    Verifier::for_command(help_command).verify(&mut subresults[index].result)?;
                }
                let scope = match subresults[index].result.args.first() {
                    Some(target) => HelpScope::Sub(target.to_string()),
                    None => HelpScope::Super(self.super_command.name.clone()),
                };
                return Err(Halt::Help(scope));
            }
        }

        // Then the aggregate global result.
        global_verifier.verify_options(&mut global)?;

        // Then every other sub-result, with global values merged underneath:
        // a global value never overrides an explicitly-set local one.
        for sub in &mut subresults {
            let Some(command) = self.super_command.find_command(&sub.command) else {
                continue;
            };
            let verifier = Verifier::for_command(command);
            verifier.check_requests(&sub.result)?;
            for (name, value) in &global.options {
                sub.result
                    .options
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
            verifier.verify(&mut sub.result)?;
        }

        Ok(SuperParseResult {
            options: global.options,
            subresults,
        })
    }
}
