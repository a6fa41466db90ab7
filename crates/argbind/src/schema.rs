//! Turning a configuration type's field list into a parsing context.
//!
//! A configuration type implements [`Command`] and declares its fields, in
//! order, through a [`Schema`]:
//!
//! ```rust,ignore
//! impl Command for Opts {
//!     fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
//!         s.field("debug", |o| &mut o.debug).tag("-d;--debug").usage("debug output").add()?;
//!         s.field("level", |o| &mut o.level).tag("--level;once").default_value("1").add()?;
//!         s.nested("add", |o| &mut o.add).tag("subcommand").usage("add an item").add()
//!     }
//! }
//! ```
//!
//! Each accessor is a plain `fn(&mut Self) -> &mut Field`. Accessors are
//! composed with the path from the root value, so a subcommand's fields are
//! written through the same root reference as top-level ones.

use std::collections::HashMap;
use std::rc::Rc;

use crate::context::Context;
use crate::descriptor::{CallbackFn, Descriptor, SlotFn, slot_fn};
use crate::directive::{self, Clause};
use crate::error::SchemaError;
use crate::subcommand::Subcommand;
use crate::value::Destination;

/// Handler name used by a bare `callback` clause.
pub const DEFAULT_CALLBACK: &str = "parse";

/// A configuration value that can be bound from the command line.
pub trait Command: Sized + 'static {
    /// Declare the bindable fields of `Self`, in order.
    fn describe<R: 'static>(schema: &mut Schema<'_, R, Self>) -> Result<(), SchemaError>;

    /// Runs after this value, bound as a subcommand, finished binding.
    fn sub_main(&mut self) {}

    /// Structural checks after binding. Only the chosen subcommand (or the
    /// root when none was chosen) is validated.
    fn validate(&self) -> Vec<Violation> {
        Vec::new()
    }
}

/// One failed structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub(crate) type Projection<R, C> = Rc<dyn for<'a> Fn(&'a mut R) -> &'a mut C>;
pub(crate) type Hook<R> = Rc<dyn Fn(&mut R)>;
pub(crate) type Validator<R> = Rc<dyn Fn(&mut R) -> Vec<Violation>>;

fn projection<R, C, F>(f: F) -> Projection<R, C>
where
    F: for<'a> Fn(&'a mut R) -> &'a mut C + 'static,
{
    Rc::new(f)
}

/// Registration handle for the fields of `C`, nested somewhere inside root `R`.
pub struct Schema<'s, R, C> {
    ctx: &'s mut Context<R>,
    root: &'s mut R,
    project: Projection<R, C>,
    handlers: HashMap<String, CallbackFn<R>>,
}

impl<'s, R: 'static> Schema<'s, R, R> {
    pub(crate) fn new_root(ctx: &'s mut Context<R>, root: &'s mut R) -> Self {
        Self {
            ctx,
            root,
            project: projection(|r: &mut R| r),
            handlers: HashMap::new(),
        }
    }
}

impl<'s, R: 'static, C: 'static> Schema<'s, R, C> {
    /// Start declaring a field. Nothing is registered until [`Field::add`].
    pub fn field<V>(&mut self, ident: &str, access: fn(&mut C) -> &mut V) -> Field<'_, 's, R, C>
    where
        V: Destination + 'static,
    {
        let project = self.project.clone();
        let slot = slot_fn(move |r: &mut R| access(project(r)).slot());
        Field {
            schema: self,
            ident: ident.to_string(),
            slot,
            tag: String::new(),
            usage: String::new(),
            default: String::new(),
        }
    }

    /// Start declaring a nested configuration value: a subcommand when its tag
    /// has a `subcommand` clause, otherwise its fields join this level.
    pub fn nested<N: Command>(
        &mut self,
        ident: &str,
        access: fn(&mut C) -> &mut N,
    ) -> Nested<'_, 's, R, C, N> {
        let outer = self.project.clone();
        Nested {
            schema: self,
            ident: ident.to_string(),
            project: projection(move |r: &mut R| access(outer(r))),
            tag: String::new(),
            usage: String::new(),
        }
    }

    /// Make `f` reachable from `callback=name` clauses of later fields.
    pub fn handler(
        &mut self,
        name: &str,
        f: fn(&mut C, &str) -> Result<(), String>,
    ) -> &mut Self {
        let project = self.project.clone();
        let callback: CallbackFn<R> = Rc::new(move |r: &mut R, v: &str| f(project(r), v));
        self.handlers.insert(name.to_string(), callback);
        self
    }

    pub fn version(&mut self, version: &str) -> &mut Self {
        self.ctx.version = version.to_string();
        self
    }

    pub fn about(&mut self, about: &str) -> &mut Self {
        self.ctx.about = about.to_string();
        self
    }

    fn register(
        &mut self,
        ident: &str,
        slot: SlotFn<R>,
        tag: &str,
        usage: &str,
        default: &str,
    ) -> Result<(), SchemaError> {
        let kind = slot(&mut *self.root).kind();
        if !default.is_empty() {
            slot(&mut *self.root)
                .set_default(default)
                .map_err(|source| SchemaError::Default {
                    field: ident.to_string(),
                    source,
                })?;
        }

        if tag.is_empty() && usage.is_empty() {
            return Ok(());
        }
        if let Some(version) = tag.strip_prefix("version=") {
            self.ctx.version = version.to_string();
            return Ok(());
        }
        if let Some(about) = tag.strip_prefix("about=") {
            self.ctx.about = about.to_string();
            return Ok(());
        }

        let lower = ident.to_lowercase();
        let first_len = lower.chars().next().map_or(0, char::len_utf8);
        let mut clauses = directive::parse(tag)?;
        if !clauses.iter().any(Clause::names_option) {
            if usage.is_empty() {
                return Ok(());
            }
            clauses.push(Clause::Short(Some(&lower[..first_len])));
            if lower.chars().count() > 1 {
                clauses.push(Clause::Long(Some(lower.as_str())));
            }
        }

        let id = self.ctx.descriptors.len();
        let mut desc = Descriptor::new(ident, slot, kind);
        desc.usage = usage.to_string();
        desc.default_display = default.to_string();

        for clause in clauses {
            match clause {
                Clause::Long(name) => {
                    let name = name.unwrap_or(lower.as_str()).to_string();
                    self.ctx.claim(&format!("--{name}"), &name, id, &desc)?;
                    desc.long.push(name);
                }
                Clause::Short(name) => {
                    let name = name.unwrap_or(&lower[..first_len]).to_string();
                    self.ctx.claim(&format!("-{name}"), &name, id, &desc)?;
                    desc.short.push(name);
                }
                Clause::Greedy => desc.greedy = true,
                Clause::Once => desc.once = true,
                Clause::Env(name) => {
                    let name = name.map_or_else(|| ident.to_uppercase(), str::to_string);
                    if !self.ctx.env_names.insert(name.clone()) {
                        return Err(SchemaError::DuplicateEnv(name));
                    }
                    desc.env = Some(name);
                }
                Clause::Args(name) => {
                    if desc.has_name() {
                        continue;
                    }
                    if !self.ctx.arg_names.insert(name.to_string()) {
                        return Err(SchemaError::DuplicateArgs(name.to_string()));
                    }
                    desc.positional = Some(name.to_string());
                }
                Clause::Callback(name) => {
                    let name = name.unwrap_or(DEFAULT_CALLBACK);
                    let Some(callback) = self.handlers.get(name) else {
                        panic!(
                            "field `{ident}` names callback `{name}`, but no handler \
                             fn(&mut Self, &str) -> Result<(), String> \
                             was registered under that name"
                        );
                    };
                    desc.callback = Some(callback.clone());
                }
                Clause::Subcommand(name) => {
                    return Err(SchemaError::Unsupported {
                        clause: name.map_or_else(
                            || "subcommand".to_string(),
                            |n| format!("subcommand={n}"),
                        ),
                        directive: tag.to_string(),
                    });
                }
            }
        }

        if desc.env.is_some() || desc.positional.is_some() {
            self.ctx.env_and_args.push(id);
        }
        tracing::trace!(field = ident, names = %desc.aliases(), "registered");
        self.ctx.descriptors.push(desc);
        Ok(())
    }
}

/// Builder returned by [`Schema::field`].
#[must_use = "a field is only registered by calling `add`"]
pub struct Field<'b, 's, R, C> {
    schema: &'b mut Schema<'s, R, C>,
    ident: String,
    slot: SlotFn<R>,
    tag: String,
    usage: String,
    default: String,
}

impl<R: 'static, C: 'static> Field<'_, '_, R, C> {
    /// Parsing directive, e.g. `"-d;--debug;once"`.
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Applied to the destination right away, before any parsing.
    pub fn default_value(mut self, default: &str) -> Self {
        self.default = default.trim().to_string();
        self
    }

    pub fn add(self) -> Result<(), SchemaError> {
        let Field {
            schema,
            ident,
            slot,
            tag,
            usage,
            default,
        } = self;
        schema.register(&ident, slot, &tag, &usage, &default)
    }
}

/// Builder returned by [`Schema::nested`].
#[must_use = "a nested value is only registered by calling `add`"]
pub struct Nested<'b, 's, R, C, N> {
    schema: &'b mut Schema<'s, R, C>,
    ident: String,
    project: Projection<R, N>,
    tag: String,
    usage: String,
}

impl<R: 'static, C: 'static, N: Command> Nested<'_, '_, R, C, N> {
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn add(self) -> Result<(), SchemaError> {
        let Nested {
            schema,
            ident,
            project,
            tag,
            usage,
        } = self;

        let Some(name) = directive::subcommand_name(&tag, &ident)? else {
            let mut flat = Schema {
                ctx: &mut *schema.ctx,
                root: &mut *schema.root,
                project,
                handlers: HashMap::new(),
            };
            return N::describe(&mut flat);
        };

        if schema.ctx.subcommands.contains_key(&name) {
            return Err(SchemaError::DuplicateSubcommand(name));
        }

        let mut child = Context::new(&name);
        N::describe(&mut Schema {
            ctx: &mut child,
            root: &mut *schema.root,
            project: project.clone(),
            handlers: HashMap::new(),
        })?;

        let hook_project = project.clone();
        let sub_main: Hook<R> = Rc::new(move |r: &mut R| hook_project(r).sub_main());
        let validate: Validator<R> = Rc::new(move |r: &mut R| project(r).validate());

        schema.ctx.subcommands.insert(
            name,
            Subcommand {
                context: child,
                usage,
                sub_main,
                validate,
            },
        );
        Ok(())
    }
}
