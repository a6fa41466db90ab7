//! Directive strings: `"-d;--debug;once"`, `"env=TOKEN"`, `"args=file"`, ...

use crate::error::SchemaError;

/// One `;`-separated clause of a directive. `None` names are derived from the
/// field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause<'a> {
    Long(Option<&'a str>),
    Short(Option<&'a str>),
    Greedy,
    Once,
    Env(Option<&'a str>),
    Args(&'a str),
    Callback(Option<&'a str>),
    Subcommand(Option<&'a str>),
}

impl Clause<'_> {
    /// Whether this clause gives the field a way to be found on the command line.
    pub(crate) fn names_option(&self) -> bool {
        matches!(
            self,
            Clause::Long(_) | Clause::Short(_) | Clause::Env(_) | Clause::Args(_)
        )
    }
}

fn equals<'a>(clause: &'a str, key: &str) -> Option<&'a str> {
    clause.strip_prefix(key)?.strip_prefix('=')
}

fn classify(clause: &str) -> Option<Clause<'_>> {
    if let Some(name) = clause.strip_prefix("--") {
        return Some(Clause::Long(Some(name)));
    }
    if let Some(name) = clause.strip_prefix('-') {
        return Some(Clause::Short(Some(name)));
    }
    let clause = match clause {
        "long" => Clause::Long(None),
        "short" => Clause::Short(None),
        "greedy" => Clause::Greedy,
        "once" => Clause::Once,
        "env" => Clause::Env(None),
        "callback" => Clause::Callback(None),
        "subcommand" => Clause::Subcommand(None),
        _ => {
            if let Some(name) = equals(clause, "long") {
                Clause::Long(Some(name))
            } else if let Some(name) = equals(clause, "short") {
                Clause::Short(Some(name))
            } else if let Some(name) = equals(clause, "env") {
                Clause::Env(Some(name))
            } else if let Some(name) = equals(clause, "args") {
                Clause::Args(name)
            } else if let Some(name) = equals(clause, "callback") {
                Clause::Callback(Some(name))
            } else if let Some(name) = equals(clause, "subcommand") {
                Clause::Subcommand(Some(name))
            } else {
                return None;
            }
        }
    };
    Some(clause)
}

/// Split and classify a directive. Empty clauses are skipped.
pub(crate) fn parse(directive: &str) -> Result<Vec<Clause<'_>>, SchemaError> {
    let mut out = Vec::new();
    for raw in directive.split(';') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let clause = classify(raw).ok_or_else(|| SchemaError::Unsupported {
            clause: raw.to_string(),
            directive: directive.to_string(),
        })?;
        let empty = match clause {
            Clause::Long(Some(n))
            | Clause::Short(Some(n))
            | Clause::Env(Some(n))
            | Clause::Args(n)
            | Clause::Callback(Some(n))
            | Clause::Subcommand(Some(n)) => n.is_empty(),
            _ => false,
        };
        if empty {
            return Err(SchemaError::EmptyName(raw.to_string()));
        }
        out.push(clause);
    }
    Ok(out)
}

/// The subcommand name a nested field's directive asks for, if any.
/// Other clauses on a nested field are ignored.
pub(crate) fn subcommand_name(
    directive: &str,
    ident: &str,
) -> Result<Option<String>, SchemaError> {
    for raw in directive.split(';').map(str::trim) {
        if raw == "subcommand" {
            return Ok(Some(ident.to_lowercase()));
        }
        if let Some(name) = equals(raw, "subcommand") {
            if name.is_empty() {
                return Err(SchemaError::EmptyName(raw.to_string()));
            }
            return Ok(Some(name.to_string()));
        }
    }
    Ok(None)
}

/// Option names are limited to `[A-Za-z0-9_-]`.
pub(crate) fn check_name(name: &str) -> Result<(), SchemaError> {
    match name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(ch) => Err(SchemaError::IllegalCharacter {
            name: name.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}
