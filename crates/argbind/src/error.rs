use thiserror::Error;

use crate::value::ValueError;

/// A broken schema declaration, reported while registering fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{name} is already in use, duplicate definition with {owner}")]
    Duplicate { name: String, owner: String },

    #[error("is already in use: env={0}")]
    DuplicateEnv(String),

    #[error("is already in use: args={0}")]
    DuplicateArgs(String),

    #[error("subcommand {0} is already in use")]
    DuplicateSubcommand(String),

    #[error("illegal option name:{name}:unsupported characters found({ch})")]
    IllegalCharacter { name: String, ch: char },

    #[error("illegal command line option:{0}")]
    EmptyName(String),

    #[error("unsupported directive:({clause}) in ({directive})")]
    Unsupported { clause: String, directive: String },

    #[error("default value of {field}: {source}")]
    Default {
        field: String,
        #[source]
        source: ValueError,
    },
}

/// Bad user input found while walking the argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "Found argument '--{name}' which wasn't expected, or isn't valid in this context{}",
        hint(.suggestion)
    )]
    UnknownLong {
        name: String,
        suggestion: Option<String>,
    },

    #[error(
        "Found argument '-{name}' which wasn't expected, or isn't valid in this context (in '{token}'){}",
        hint(.suggestion)
    )]
    UnknownShort {
        name: char,
        token: String,
        suggestion: Option<String>,
    },

    #[error("Unknown subcommand:{name}{}", hint(.suggestion))]
    UnknownSubcommand {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Illegal character set in '{0}', only ASCII short options are supported")]
    IllegalCharset(String),

    #[error("The argument '{0}' was provided more than once, but cannot be used multiple times")]
    Once(String),

    #[error("The argument '{0}' requires a value but none was supplied")]
    MissingValue(String),

    #[error("{option}: {source}")]
    Value {
        option: String,
        #[source]
        source: ValueError,
    },

    #[error("{option}: {message}")]
    Callback { option: String, message: String },
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("\n\n\tDid you mean '{s}'?"),
        None => String::new(),
    }
}

/// Everything [`Parser::bind`](crate::Parser::bind) can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// First violation reported by [`Command::validate`](crate::Command::validate).
    #[error("{0}")]
    Validation(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
