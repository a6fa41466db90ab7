//! Typed destinations and string coercion.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// The closed set of destination kinds a field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Duration,
    Bools,
    Ints,
    Uints,
    Floats,
    Strs,
    Durations,
}

impl Kind {
    /// Bool and bool-sequence destinations never need an explicit value.
    pub fn is_bool(self) -> bool {
        matches!(self, Kind::Bool | Kind::Bools)
    }

    pub fn is_sequence(self) -> bool {
        matches!(
            self,
            Kind::Bools | Kind::Ints | Kind::Uints | Kind::Floats | Kind::Strs | Kind::Durations
        )
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Bool | Kind::Bools => "bool",
            Kind::Int | Kind::Ints => "integer",
            Kind::Uint | Kind::Uints => "unsigned integer",
            Kind::Float | Kind::Floats => "float",
            Kind::Str | Kind::Strs => "string",
            Kind::Duration | Kind::Durations => "duration",
        }
    }
}

/// A value that could not be coerced into its destination type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {expected} value '{value}': {reason}")]
pub struct ValueError {
    pub value: String,
    pub expected: &'static str,
    pub reason: String,
}

/// A borrowed, typed write target.
#[derive(Debug)]
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Uint(&'a mut u64),
    Float(&'a mut f64),
    Str(&'a mut String),
    Duration(&'a mut Duration),
    Bools(&'a mut Vec<bool>),
    Ints(&'a mut Vec<i64>),
    Uints(&'a mut Vec<u64>),
    Floats(&'a mut Vec<f64>),
    Strs(&'a mut Vec<String>),
    Durations(&'a mut Vec<Duration>),
}

impl Slot<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Slot::Bool(_) => Kind::Bool,
            Slot::Int(_) => Kind::Int,
            Slot::Uint(_) => Kind::Uint,
            Slot::Float(_) => Kind::Float,
            Slot::Str(_) => Kind::Str,
            Slot::Duration(_) => Kind::Duration,
            Slot::Bools(_) => Kind::Bools,
            Slot::Ints(_) => Kind::Ints,
            Slot::Uints(_) => Kind::Uints,
            Slot::Floats(_) => Kind::Floats,
            Slot::Strs(_) => Kind::Strs,
            Slot::Durations(_) => Kind::Durations,
        }
    }

    /// Coerce `raw` and store it. Scalars are overwritten, sequences appended to.
    pub fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match self {
            Slot::Bool(v) => **v = parse_bool(raw)?,
            Slot::Int(v) => **v = coerce(raw, Kind::Int)?,
            Slot::Uint(v) => **v = coerce(raw, Kind::Uint)?,
            Slot::Float(v) => **v = coerce(raw, Kind::Float)?,
            Slot::Str(v) => **v = raw.to_string(),
            Slot::Duration(v) => **v = parse_duration(raw)?,
            Slot::Bools(v) => v.push(parse_bool(raw)?),
            Slot::Ints(v) => v.push(coerce(raw, Kind::Int)?),
            Slot::Uints(v) => v.push(coerce(raw, Kind::Uint)?),
            Slot::Floats(v) => v.push(coerce(raw, Kind::Float)?),
            Slot::Strs(v) => v.push(raw.to_string()),
            Slot::Durations(v) => v.push(parse_duration(raw)?),
        }
        Ok(())
    }

    /// Apply a declared default. Sequence defaults are comma separated.
    pub fn set_default(&mut self, raw: &str) -> Result<(), ValueError> {
        if !self.kind().is_sequence() {
            return self.set(raw);
        }
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            self.set(item)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        match self {
            Slot::Bool(v) => **v = false,
            Slot::Int(v) => **v = 0,
            Slot::Uint(v) => **v = 0,
            Slot::Float(v) => **v = 0.0,
            Slot::Str(v) => v.clear(),
            Slot::Duration(v) => **v = Duration::ZERO,
            Slot::Bools(v) => v.clear(),
            Slot::Ints(v) => v.clear(),
            Slot::Uints(v) => v.clear(),
            Slot::Floats(v) => v.clear(),
            Slot::Strs(v) => v.clear(),
            Slot::Durations(v) => v.clear(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Slot::Bool(v) => !**v,
            Slot::Int(v) => **v == 0,
            Slot::Uint(v) => **v == 0,
            Slot::Float(v) => **v == 0.0,
            Slot::Str(v) => v.is_empty(),
            Slot::Duration(v) => v.is_zero(),
            Slot::Bools(v) => v.is_empty(),
            Slot::Ints(v) => v.is_empty(),
            Slot::Uints(v) => v.is_empty(),
            Slot::Floats(v) => v.is_empty(),
            Slot::Strs(v) => v.is_empty(),
            Slot::Durations(v) => v.is_empty(),
        }
    }
}

/// A field type that can be bound from the command line.
pub trait Destination {
    fn slot(&mut self) -> Slot<'_>;
}

macro_rules! destination {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Destination for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::$variant(self)
                }
            }
        )*
    };
}

destination! {
    bool => Bool,
    i64 => Int,
    u64 => Uint,
    f64 => Float,
    String => Str,
    Duration => Duration,
    Vec<bool> => Bools,
    Vec<i64> => Ints,
    Vec<u64> => Uints,
    Vec<f64> => Floats,
    Vec<String> => Strs,
    Vec<Duration> => Durations,
}

fn coerce<T>(raw: &str, kind: Kind) -> Result<T, ValueError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ValueError {
        value: raw.to_string(),
        expected: kind.type_name(),
        reason: e.to_string(),
    })
}

/// Accepts the usual spellings: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError {
            value: raw.to_string(),
            expected: Kind::Bool.type_name(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    humantime::parse_duration(raw).map_err(|e| ValueError {
        value: raw.to_string(),
        expected: Kind::Duration.type_name(),
        reason: e.to_string(),
    })
}
