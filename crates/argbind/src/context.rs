//! One command level: its registry, its argument vector and the main loop.

use std::collections::{HashMap, HashSet};

use argbind_help::Help;
use indexmap::IndexMap;
use tracing::trace;

use crate::descriptor::{Descriptor, OrderKey};
use crate::directive::check_name;
use crate::env::Env;
use crate::error::{ParseError, SchemaError};
use crate::schema::Validator;
use crate::subcommand::Subcommand;
use crate::suggest::closest;

/// A token nothing claimed during the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unparsed {
    pub(crate) arg: String,
    pub(crate) index: usize,
}

/// How a context run ended.
#[derive(Debug)]
pub(crate) enum Flow {
    Done,
    Help(Help),
    Version(String),
}

/// State owned by the root and threaded through every level of a bind.
pub(crate) struct Bookkeeping<'e, R> {
    pub(crate) env: &'e dyn Env,
    pub(crate) proc_name: String,
    pub(crate) version: String,
    /// Chosen subcommand names, outermost first.
    pub(crate) path: Vec<String>,
    /// Validator of the deepest chosen subcommand.
    pub(crate) validator: Option<Validator<R>>,
}

impl<'e, R> Bookkeeping<'e, R> {
    pub(crate) fn new(env: &'e dyn Env, proc_name: &str, version: &str) -> Self {
        Self {
            env,
            proc_name: proc_name.to_string(),
            version: version.to_string(),
            path: Vec::new(),
            validator: None,
        }
    }

    /// `proc sub subsub`, used as the process name in nested help.
    pub(crate) fn display_path(&self) -> String {
        let mut out = self.proc_name.clone();
        for name in &self.path {
            out.push(' ');
            out.push_str(name);
        }
        out
    }
}

pub(crate) struct Context<R> {
    /// Process name at the root, subcommand name below it.
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) about: String,
    pub(crate) descriptors: Vec<Descriptor<R>>,
    /// Short and long names share one namespace.
    pub(crate) registry: HashMap<String, usize>,
    pub(crate) env_names: HashSet<String>,
    pub(crate) arg_names: HashSet<String>,
    /// Descriptors with an env or positional binding, in declaration order.
    pub(crate) env_and_args: Vec<usize>,
    pub(crate) args: Vec<String>,
    pub(crate) unparsed: Vec<Unparsed>,
    pub(crate) subcommands: IndexMap<String, Subcommand<R>>,
}

impl<R> Context<R> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            about: String::new(),
            descriptors: Vec::new(),
            registry: HashMap::new(),
            env_names: HashSet::new(),
            arg_names: HashSet::new(),
            env_and_args: Vec::new(),
            args: Vec::new(),
            unparsed: Vec::new(),
            subcommands: IndexMap::new(),
        }
    }

    /// Reserve `name` for descriptor `id`, which may still be under construction.
    pub(crate) fn claim(
        &mut self,
        display: &str,
        name: &str,
        id: usize,
        pending: &Descriptor<R>,
    ) -> Result<(), SchemaError> {
        check_name(name)?;
        if let Some(&owner) = self.registry.get(name) {
            let owner = match self.descriptors.get(owner) {
                Some(existing) if owner != id => existing.aliases(),
                _ => pending.aliases(),
            };
            return Err(SchemaError::Duplicate {
                name: display.to_string(),
                owner,
            });
        }
        self.registry.insert(name.to_string(), id);
        Ok(())
    }

    fn long_id(&self, name: &str) -> Option<usize> {
        let id = *self.registry.get(name)?;
        self.descriptors[id].long.iter().any(|l| l == name).then_some(id)
    }

    fn short_id(&self, name: &str) -> Option<usize> {
        let id = *self.registry.get(name)?;
        self.descriptors[id].short.iter().any(|s| s == name).then_some(id)
    }

    /// Whether a would-be value token is itself a registered option.
    fn looks_registered(&self, token: &str) -> bool {
        let Some(stripped) = token.strip_prefix('-') else {
            return false;
        };
        let stripped = stripped.strip_prefix('-').unwrap_or(stripped);
        let name = stripped.split_once('=').map_or(stripped, |(name, _)| name);
        self.registry.contains_key(name)
    }

    fn unknown_long(&self, name: &str) -> ParseError {
        let longs = self
            .descriptors
            .iter()
            .flat_map(|d| d.long.iter().map(String::as_str));
        ParseError::UnknownLong {
            name: name.to_string(),
            suggestion: closest(name, longs).map(|s| format!("--{s}")),
        }
    }

    fn unknown_short(&self, name: char, token: &str) -> ParseError {
        let longs = self
            .descriptors
            .iter()
            .flat_map(|d| d.long.iter().map(String::as_str));
        let input = name.to_string();
        // One letter is within edit distance 2 of every other name, so only
        // a long name starting with it is worth suggesting.
        let suggestion = longs
            .into_iter()
            .find(|l| l.starts_with(&input))
            .map(|s| format!("--{s}"));
        ParseError::UnknownShort {
            name,
            token: token.to_string(),
            suggestion,
        }
    }

    /// Help or version requested by `token`, unless the name is registered.
    fn builtin(&self, token: &str, book: &Bookkeeping<'_, R>) -> Option<Flow> {
        let body = token.strip_prefix('-')?;
        let body = body.strip_prefix('-').unwrap_or(body);
        if self.registry.contains_key(body) {
            return None;
        }
        match body {
            "h" | "help" => Some(Flow::Help(self.help(book))),
            "v" | "version" => Some(Flow::Version(self.effective_version(book))),
            _ => None,
        }
    }

    pub(crate) fn effective_version(&self, book: &Bookkeeping<'_, R>) -> String {
        if self.version.is_empty() {
            book.version.clone()
        } else {
            self.version.clone()
        }
    }

    /// Walk `self.args`, then fill env and positional bindings.
    pub(crate) fn run(
        &mut self,
        root: &mut R,
        book: &mut Bookkeeping<'_, R>,
    ) -> Result<Flow, ParseError> {
        let mut i = 0;
        while i < self.args.len() {
            let token = self.args[i].clone();
            trace!(command = %self.name, index = i, token = %token, "token");

            if token == "--" {
                let tail = self.args[i + 1..].iter().enumerate();
                self.unparsed.extend(tail.map(|(offset, arg)| Unparsed {
                    arg: arg.clone(),
                    index: i + 1 + offset,
                }));
                break;
            }

            if let Some(flow) = self.builtin(&token, book) {
                return Ok(flow);
            }

            if let Some(body) = token.strip_prefix("--") {
                i = self.parse_long(body, i, root)?;
            } else if token.len() > 1 && token.starts_with('-') {
                i = self.parse_short(&token, i, root)?;
            } else if let Some(sub) = self.subcommands.get_mut(&token) {
                let rest = self.args.split_off(i + 1);
                match sub.enter(&token, rest, root, book)? {
                    Flow::Done => break,
                    flow => return Ok(flow),
                }
            } else {
                if !token.is_empty()
                    && token != "-"
                    && !self.subcommands.is_empty()
                    && self.env_and_args.is_empty()
                {
                    return Err(ParseError::UnknownSubcommand {
                        suggestion: closest(&token, self.subcommands.keys().map(String::as_str))
                            .map(str::to_string),
                        name: token,
                    });
                }
                self.unparsed.push(Unparsed { arg: token, index: i });
                i += 1;
            }
        }

        self.bind_fallback(root, book.env)?;
        Ok(Flow::Done)
    }

    /// `--name`, `--name=value`, `--name value...`. Returns the next cursor.
    fn parse_long(&mut self, body: &str, i: usize, root: &mut R) -> Result<usize, ParseError> {
        if let Some(id) = self.long_id(body) {
            return self.parse_named(id, &format!("--{body}"), None, i, root);
        }
        match body.split_once('=') {
            Some((name, value)) => match self.long_id(name) {
                Some(id) => self.parse_named(id, &format!("--{name}"), Some(value), i, root),
                None => Err(self.unknown_long(name)),
            },
            None => Err(self.unknown_long(body)),
        }
    }

    fn parse_named(
        &mut self,
        id: usize,
        display: &str,
        inline: Option<&str>,
        i: usize,
        root: &mut R,
    ) -> Result<usize, ParseError> {
        let occurrence = OrderKey::new(i, 0);
        let is_bool = self.descriptors[id].kind.is_bool();
        let value = match inline {
            Some("") if is_bool => "true",
            Some(value) => value,
            None if is_bool => "true",
            None => return self.take_values(id, display, occurrence, i, root, true),
        };
        self.descriptors[id].write_explicit(root, value, occurrence, occurrence, display)?;
        Ok(i + 1)
    }

    /// `-d`, `-abc`, `-fvalue`, `-f=value`, `-d=false`, `-f value`.
    fn parse_short(&mut self, token: &str, i: usize, root: &mut R) -> Result<usize, ParseError> {
        let body = &token[1..];
        if !body.is_ascii() {
            return Err(ParseError::IllegalCharset(token.to_string()));
        }

        // Multi-character short names read like single-dash long options.
        if body.len() > 1 {
            if let Some(id) = self.short_id(body) {
                return self.parse_named(id, token, None, i, root);
            }
            if let Some((name, value)) = body.split_once('=')
                && name.len() > 1
                && let Some(id) = self.short_id(name)
            {
                return self.parse_named(id, &format!("-{name}"), Some(value), i, root);
            }
        }

        let mut p = 0;
        while p < body.len() {
            let name = &body[p..p + 1];
            let Some(id) = self.short_id(name) else {
                let ch = name.chars().next().unwrap_or('-');
                return Err(self.unknown_short(ch, token));
            };
            let display = format!("-{name}");
            let occurrence = OrderKey::new(i, p);
            let rest = &body[p + 1..];
            let desc = &mut self.descriptors[id];

            if desc.kind.is_bool() {
                if let Some(value) = rest.strip_prefix('=') {
                    let value = if value.is_empty() { "true" } else { value };
                    desc.write_explicit(root, value, occurrence, occurrence, &display)?;
                    return Ok(i + 1);
                }
                desc.write_explicit(root, "true", occurrence, occurrence, &display)?;
                p += 1;
                continue;
            }

            if rest.is_empty() {
                return self.take_values(id, &display, occurrence, i, root, true);
            }
            let value = rest.strip_prefix('=').unwrap_or(rest);
            desc.write_explicit(root, value, occurrence, occurrence, &display)?;
            if desc.greedy {
                return self.take_values(id, &display, occurrence, i, root, false);
            }
            return Ok(i + 1);
        }
        Ok(i + 1)
    }

    /// Consume value tokens after `args[i]`: one, or all of them up to the next
    /// registered option when greedy.
    fn take_values(
        &mut self,
        id: usize,
        shown: &str,
        occurrence: OrderKey,
        i: usize,
        root: &mut R,
        required: bool,
    ) -> Result<usize, ParseError> {
        let mut next = i + 1;
        let mut taken = 0;
        while next < self.args.len() {
            let value = &self.args[next];
            if value == "--" || self.looks_registered(value) {
                break;
            }
            let desc = &mut self.descriptors[id];
            desc.write_explicit(root, value, OrderKey::new(next, 0), occurrence, shown)?;
            taken += 1;
            next += 1;
            if !desc.greedy {
                break;
            }
        }
        if required && taken == 0 && next >= self.args.len() {
            return Err(ParseError::MissingValue(shown.to_string()));
        }
        trace!(option = shown, taken, "values consumed");
        Ok(next)
    }
}
