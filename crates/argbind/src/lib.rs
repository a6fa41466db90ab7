//! Bind command-line arguments, environment variables and positionals onto
//! typed configuration values.
//!
//! A configuration type implements [`Command`] and lists its fields with a
//! directive string each (`"-d;--debug"`, `"--level;once"`, `"env=TOKEN"`,
//! `"args=file"`, `"subcommand"`). [`Parser::bind`] then walks the argument
//! vector once, writes every value straight into the fields, fills the
//! remaining ones from the environment and leftover tokens, and finally runs
//! [`Command::validate`] on the chosen subcommand.
//!
//! Precedence is command line, then environment, then declared default.

mod context;
mod descriptor;
mod directive;
mod env;
mod error;
mod fallback;
mod help;
mod parser;
mod schema;
mod subcommand;
mod suggest;
mod value;

pub use argbind_help::{Help, HelpEntry, JsonRenderer, PlainRenderer, Render};
pub use descriptor::OrderKey;
pub use env::{Env, ProcessEnv};
pub use error::{Error, ParseError, Result, SchemaError};
pub use parser::{DEFAULT_VERSION, Outcome, Parser, bind};
pub use schema::{Command, DEFAULT_CALLBACK, Field, Nested, Schema, Violation};
pub use value::{Destination, Kind, Slot, ValueError, parse_bool};
