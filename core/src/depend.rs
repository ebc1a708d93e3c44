//! Dependency ordering for option validation.
//!
//! An option may declare that its validation callback reads the values of
//! other options, which therefore must be verified first. This module turns
//! those declarations into a linear order via a DFS topological sort, with
//! ties broken by declaration order. Cycles and unknown names are
//! configuration errors raised at schema-build time, never during parsing.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::types::OptionSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Computes the validation order for a set of options.
///
/// Every dependency precedes its dependents; independent options keep their
/// declaration order.
///
/// # Errors
///
/// [`ConfigError::UnknownDependency`] when an option names a dependency that
/// is not in the set, [`ConfigError::DependencyCycle`] naming the
/// participating options when the graph is cyclic.
pub fn dependency_order(options: &[&OptionSchema]) -> Result<Vec<String>, ConfigError> {
    let index: HashMap<&str, usize> = options
        .iter()
        .enumerate()
        .map(|(i, option)| (option.name.as_str(), i))
        .collect();

    let mut marks = vec![Mark::Unvisited; options.len()];
    let mut trail = Vec::new();
    let mut order = Vec::with_capacity(options.len());

    for i in 0..options.len() {
        visit(i, options, &index, &mut marks, &mut trail, &mut order)?;
    }

    Ok(order)
}

fn visit(
    i: usize,
    options: &[&OptionSchema],
    index: &HashMap<&str, usize>,
    marks: &mut Vec<Mark>,
    trail: &mut Vec<usize>,
    order: &mut Vec<String>,
) -> Result<(), ConfigError> {
    match marks[i] {
        Mark::Done => return Ok(()),
        Mark::InProgress => {
            let start = trail.iter().position(|&t| t == i).unwrap_or(0);
            let mut cycle: Vec<String> = trail[start..]
                .iter()
                .map(|&t| options[t].name.clone())
                .collect();
            cycle.push(options[i].name.clone());
            return Err(ConfigError::DependencyCycle(cycle));
        }
        Mark::Unvisited => {}
    }

    marks[i] = Mark::InProgress;
    trail.push(i);

    for dependency in &options[i].depends_on {
        match index.get(dependency.as_str()) {
            Some(&j) => visit(j, options, index, marks, trail, order)?,
            None => {
                return Err(ConfigError::UnknownDependency {
                    option: options[i].name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    trail.pop();
    marks[i] = Mark::Done;
    order.push(options[i].name.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Arity, Cast};

    fn opt(name: &str, deps: &[&str]) -> OptionSchema {
        OptionSchema::single(name, Cast::String)
            .long(&format!("--{name}"))
            .depends_on(deps)
    }

    #[test]
    fn test_independent_options_keep_declaration_order() {
        let a = opt("alpha", &[]);
        let b = opt("beta", &[]);
        let c = opt("gamma", &[]);

        let order = dependency_order(&[&a, &b, &c]).unwrap();
        assert_eq!(order, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        // count -> bold -> {font, config}, font -> config, access -> {config, count}
        let count = opt("count", &["bold"]);
        let bold = opt("bold", &["font", "config"]);
        let font = opt("font", &["config"]);
        let config = opt("config", &[]);
        let access = opt("access", &["config", "count"]);

        let order = dependency_order(&[&count, &bold, &font, &config, &access]).unwrap();
        assert_eq!(order, vec!["config", "font", "bold", "count", "access"]);
    }

    #[test]
    fn test_chain_reverses_regardless_of_declaration_order() {
        let a = opt("a", &["b"]);
        let b = opt("b", &["c"]);
        let c = opt("c", &[]);

        let order = dependency_order(&[&a, &b, &c]).unwrap();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_cycle_is_a_configuration_error() {
        let a = opt("a", &["b"]);
        let b = opt("b", &["a"]);

        let err = dependency_order(&[&a, &b]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DependencyCycle(vec![
                "a".to_string(),
                "b".to_string(),
                "a".to_string()
            ])
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let a = opt("a", &["a"]);

        let err = dependency_order(&[&a]).unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle(_)));
    }

    #[test]
    fn test_unknown_dependency_is_a_configuration_error() {
        let a = opt("a", &["ghost"]);

        let err = dependency_order(&[&a]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownDependency {
                option: "a".to_string(),
                dependency: "ghost".to_string(),
            }
        );
    }
}
