//! Core schema model, runtime values, conversion, and dependency ordering
//! for the argot command-line parsing engine.
//!
//! This crate holds everything the parsing engine consumes: the immutable
//! option/argument/command schema types, the eagerly-validated builders that
//! produce them, the closed [`Cast`] tag and its converter, the dependency
//! orderer that sequences option validation, and the shared error taxonomy.
//! The token state machine itself lives in the `argot-parse` crate.

mod builder;
mod convert;
mod depend;
mod error;
mod types;
mod value;

pub use builder::{CommandBuilder, SuperCommandBuilder};
pub use convert::convert;
pub use depend::dependency_order;
pub use error::{ConfigError, ConversionError, Error, ParseError, Result, ValidationError};
pub use types::*;
pub use value::{OptionMap, Value};
