//! The caller-facing entry point.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use argbind_help::{Help, PlainRenderer, Render};
use tracing::debug;

use crate::context::{Bookkeeping, Context, Flow};
use crate::descriptor::OrderKey;
use crate::env::{Env, ProcessEnv};
use crate::error::{Error, Result};
use crate::schema::{Command, Schema};

pub const DEFAULT_VERSION: &str = "v1.0.1";

/// What a successful [`Parser::bind`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Arguments, environment and positionals were bound and validated.
    Bound,
    /// Help was written to the output sink; nothing after `--help` was parsed.
    Help,
    /// The version was written to the output sink.
    Version,
}

/// Binds one argument vector onto a [`Command`] value.
///
/// ```rust,ignore
/// let mut opts = Opts::default();
/// Parser::from_env().version("v0.3.0").bind(&mut opts)?;
/// ```
pub struct Parser {
    args: Vec<String>,
    proc_name: String,
    version: String,
    about: String,
    exit: bool,
    out: Box<dyn Write>,
    env: Box<dyn Env>,
    renderer: Box<dyn Render>,
    chosen: Vec<String>,
    orders: HashMap<String, OrderKey>,
    rest: Vec<String>,
}

impl Parser {
    /// `args` excludes the program name.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            proc_name: String::new(),
            version: DEFAULT_VERSION.to_string(),
            about: String::new(),
            exit: true,
            out: Box::new(io::stdout()),
            env: Box::new(ProcessEnv),
            renderer: Box::new(PlainRenderer),
            chosen: Vec::new(),
            orders: HashMap::new(),
            rest: Vec::new(),
        }
    }

    /// Process arguments, with the program's file name as process name.
    pub fn from_env() -> Self {
        let mut args = std::env::args();
        let proc_name = args
            .next()
            .map(|p| {
                Path::new(&p)
                    .file_name()
                    .map_or_else(|| p.clone(), |n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_default();
        Self::new(args).proc_name(&proc_name)
    }

    /// Exit the process on errors (status 1) and after help or version
    /// (status 0). On by default.
    pub fn exit_on_error(mut self, exit: bool) -> Self {
        self.exit = exit;
        self
    }

    /// Sink for help, version and error diagnostics. Stdout by default.
    pub fn output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn env_source(mut self, env: impl Env + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn proc_name(mut self, name: &str) -> Self {
        self.proc_name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn about(mut self, about: &str) -> Self {
        self.about = about.to_string();
        self
    }

    pub fn renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Register, parse, fill env and positionals, validate.
    ///
    /// Errors are written to the output sink followed by a `--help` hint;
    /// with exit enabled the process then exits with status 1.
    pub fn bind<R: Command>(&mut self, cfg: &mut R) -> Result<Outcome> {
        match self.try_bind(cfg) {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Declare `cfg`'s fields and apply their defaults without parsing anything.
    pub fn register<R: Command>(&mut self, cfg: &mut R) -> Result<()> {
        self.build(cfg)?;
        Ok(())
    }

    /// The root help model of `cfg`.
    pub fn collect_help<R: Command>(&self, cfg: &mut R) -> Result<Help> {
        let ctx = self.build(cfg)?;
        let book = Bookkeeping::new(self.env.as_ref(), &self.proc_name, &self.version);
        Ok(ctx.help(&book))
    }

    /// Render the root help of `cfg` to the output sink.
    pub fn usage<R: Command>(&mut self, cfg: &mut R) -> Result<()> {
        let help = self.collect_help(cfg)?;
        self.renderer.render(&help, self.out.as_mut())?;
        self.out.flush()?;
        Ok(())
    }

    /// Whether `name` is on the chosen subcommand path of the last bind.
    pub fn is_subcommand_set(&self, name: &str) -> bool {
        self.chosen.iter().any(|c| c == name)
    }

    /// Chosen subcommand names of the last bind, outermost first.
    pub fn chosen(&self) -> &[String] {
        &self.chosen
    }

    /// Where a root-level option or positional was last written, by any of
    /// its names (`l`, `-l`, `--level`, `file`).
    pub fn order_of(&self, name: &str) -> Option<OrderKey> {
        let name = name.trim_start_matches('-');
        let name = name
            .strip_prefix('<')
            .and_then(|n| n.strip_suffix('>'))
            .unwrap_or(name);
        self.orders.get(name).copied()
    }

    /// Root-level tokens no option or positional claimed.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    fn build<R: Command>(&self, cfg: &mut R) -> Result<Context<R>> {
        let mut ctx = Context::new(&self.proc_name);
        R::describe(&mut Schema::new_root(&mut ctx, cfg))?;
        if ctx.version.is_empty() {
            ctx.version = self.version.clone();
        }
        if ctx.about.is_empty() {
            ctx.about = self.about.clone();
        }
        Ok(ctx)
    }

    fn try_bind<R: Command>(&mut self, cfg: &mut R) -> Result<Outcome> {
        let mut ctx = self.build(cfg)?;
        ctx.args = self.args.clone();

        let mut book = Bookkeeping::new(self.env.as_ref(), &self.proc_name, &ctx.version);
        let flow = ctx.run(cfg, &mut book)?;
        let Bookkeeping { path, validator, .. } = book;

        self.chosen = path;
        self.orders.clear();
        for desc in &ctx.descriptors {
            let Some(order) = desc.order else {
                continue;
            };
            for name in desc.short.iter().chain(&desc.long).chain(&desc.positional) {
                self.orders.insert(name.clone(), order);
            }
        }
        self.rest = ctx.unparsed.iter().map(|u| u.arg.clone()).collect();

        match flow {
            Flow::Help(help) => {
                self.renderer.render(&help, self.out.as_mut())?;
                return self.finish(Outcome::Help);
            }
            Flow::Version(version) => {
                writeln!(self.out, "{version}")?;
                return self.finish(Outcome::Version);
            }
            Flow::Done => {}
        }

        let violations = match validator {
            Some(validate) => validate(cfg),
            None => cfg.validate(),
        };
        if let Some(first) = violations.into_iter().next() {
            debug!(field = %first.field, "validation failed");
            return Err(Error::Validation(first.message));
        }

        debug!(path = ?self.chosen, rest = self.rest.len(), "bind complete");
        Ok(Outcome::Bound)
    }

    fn finish(&mut self, outcome: Outcome) -> Result<Outcome> {
        self.out.flush()?;
        if self.exit {
            std::process::exit(0);
        }
        Ok(outcome)
    }

    fn fail(&mut self, err: Error) -> Error {
        // Diagnostics are best effort; the bind error is what matters.
        let _ = writeln!(self.out, "error: {err}");
        let _ = writeln!(self.out, "For more information try --help");
        let _ = self.out.flush();
        if self.exit {
            std::process::exit(1);
        }
        err
    }
}

/// Bind the process arguments onto `cfg`, exiting on errors, help and version.
pub fn bind<R: Command>(cfg: &mut R) -> Result<Outcome> {
    Parser::from_env().bind(cfg)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    use argbind_help::JsonRenderer;

    use super::*;
    use crate::error::{ParseError, SchemaError};
    use crate::schema::Violation;

    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Cli {
        debug: bool,
        level: i64,
        headers: Vec<String>,
        timeout: Duration,
        token: String,
        files: Vec<String>,
        add: Add,
        remove: Remove,
    }

    #[derive(Debug, Default)]
    struct Add {
        name: String,
    }

    #[derive(Debug, Default)]
    struct Remove {
        id: u64,
    }

    impl Cli {
        fn level_word(&mut self, v: &str) -> Result<(), String> {
            self.level = match v {
                "low" => 1,
                "high" => 9,
                other => return Err(format!("unknown level {other}")),
            };
            Ok(())
        }
    }

    impl Command for Cli {
        fn describe<R: 'static>(
            s: &mut Schema<'_, R, Self>,
        ) -> std::result::Result<(), SchemaError> {
            s.handler("parse", Self::level_word);
            s.field("debug", |c| &mut c.debug).tag("-d;--debug").usage("debug output").add()?;
            s.field("level", |c| &mut c.level)
                .tag("-l;--level;once;callback")
                .usage("low or high")
                .add()?;
            s.field("headers", |c| &mut c.headers).tag("-H;--header;greedy").add()?;
            s.field("timeout", |c| &mut c.timeout)
                .tag("--timeout")
                .default_value("30s")
                .add()?;
            s.field("token", |c| &mut c.token).tag("--token;env=CLI_TOKEN").add()?;
            s.field("files", |c| &mut c.files).tag("args=files").add()?;
            s.nested("add", |c| &mut c.add).tag("subcommand").usage("add an item").add()?;
            s.nested("remove", |c| &mut c.remove).tag("subcommand").add()
        }

        fn validate(&self) -> Vec<Violation> {
            if self.headers.len() > 3 {
                vec![Violation::new("headers", "at most three headers")]
            } else {
                Vec::new()
            }
        }
    }

    impl Command for Add {
        fn describe<R: 'static>(
            s: &mut Schema<'_, R, Self>,
        ) -> std::result::Result<(), SchemaError> {
            s.field("name", |a| &mut a.name).tag("-n;--name").add()
        }

        fn validate(&self) -> Vec<Violation> {
            if self.name.is_empty() {
                vec![Violation::new("name", "name is required")]
            } else {
                Vec::new()
            }
        }
    }

    impl Command for Remove {
        fn describe<R: 'static>(
            s: &mut Schema<'_, R, Self>,
        ) -> std::result::Result<(), SchemaError> {
            s.field("id", |r| &mut r.id).tag("args=id").add()
        }
    }

    fn parser(args: &[&str], vars: &[(&str, &str)]) -> (Parser, Sink) {
        let sink = Sink::default();
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let parser = Parser::new(args.iter().copied())
            .proc_name("cli")
            .exit_on_error(false)
            .output(sink.clone())
            .env_source(env);
        (parser, sink)
    }

    #[test]
    fn binds_options_env_and_positionals() {
        let (mut p, _) = parser(
            &["-d", "-H", "a", "b", "--level", "high", "f1", "f2"],
            &[("CLI_TOKEN", "t")],
        );
        let mut cli = Cli::default();
        assert_eq!(p.bind(&mut cli).unwrap(), Outcome::Bound);
        assert!(cli.debug);
        // greedy headers take everything up to the next option
        assert_eq!(cli.headers, ["a", "b"]);
        assert_eq!(cli.level, 9);
        assert_eq!(cli.token, "t");
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert_eq!(cli.files, ["f1", "f2"]);
        assert!(p.rest().is_empty());
    }

    #[test]
    fn positionals_after_options() {
        let (mut p, _) = parser(&["f1", "-d", "f2"], &[]);
        let mut cli = Cli::default();
        p.bind(&mut cli).unwrap();
        assert_eq!(cli.files, ["f1", "f2"]);
        assert!(p.rest().is_empty());
        assert_eq!(p.order_of("files"), Some(OrderKey::new(2, 0)));
        assert_eq!(p.order_of("-d"), Some(OrderKey::new(1, 0)));
        assert_eq!(p.order_of("--debug"), Some(OrderKey::new(1, 0)));
        assert_eq!(p.order_of("token"), None);
    }

    #[test]
    fn callback_errors_name_the_option() {
        let (mut p, sink) = parser(&["-l", "medium"], &[]);
        let err = p.bind(&mut Cli::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::Callback { ref option, ref message })
                if option == "-l" && message == "unknown level medium"
        ));
        let out = sink.text();
        assert!(out.starts_with("error: -l: unknown level medium\n"));
        assert!(out.ends_with("For more information try --help\n"));
    }

    #[test]
    fn subcommand_is_recorded_and_validated_alone() {
        let (mut p, _) = parser(&["-H", "1", "2", "3", "--header=4", "remove", "7"], &[]);
        let mut cli = Cli::default();
        // root validation would reject four headers; only `remove` is checked
        assert_eq!(p.bind(&mut cli).unwrap(), Outcome::Bound);
        assert!(p.is_subcommand_set("remove"));
        assert!(!p.is_subcommand_set("add"));
        assert_eq!(cli.remove.id, 7);

        let (mut p, _) = parser(&["add"], &[]);
        let err = p.bind(&mut Cli::default()).unwrap_err();
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(p.chosen(), ["add"]);
    }

    #[test]
    fn root_validation_without_subcommand() {
        let (mut p, _) = parser(&["-H", "1", "2", "3", "4"], &[]);
        let err = p.bind(&mut Cli::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == "at most three headers"));
    }

    #[test]
    fn help_and_version_return_outcomes() {
        let (mut p, sink) = parser(&["--help"], &[]);
        assert_eq!(p.bind(&mut Cli::default()).unwrap(), Outcome::Help);
        let text = sink.text();
        assert!(text.starts_with("cli v1.0.1\n"));
        assert!(text.contains("-d,--debug"));
        assert!(text.contains("[default: 30s]"));

        let (p, sink) = parser(&["-v"], &[]);
        let mut p = p.version("v2.0.0");
        assert_eq!(p.bind(&mut Cli::default()).unwrap(), Outcome::Version);
        assert_eq!(sink.text(), "v2.0.0\n");
    }

    #[test]
    fn json_renderer_for_usage() {
        let (p, sink) = parser(&[], &[]);
        let mut p = p.renderer(JsonRenderer).about("demo");
        p.usage(&mut Cli::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&sink.text()).unwrap();
        assert_eq!(json["process-name"], "cli");
        assert_eq!(json["about"], "demo");
        assert_eq!(json["subcommands"][0]["name"], "add");
    }

    #[test]
    fn register_applies_defaults_only() {
        let (mut p, _) = parser(&["--timeout", "1s"], &[]);
        let mut cli = Cli::default();
        p.register(&mut cli).unwrap();
        assert_eq!(cli.timeout, Duration::from_secs(30));
    }

    #[test]
    fn command_line_replaces_default() {
        let (mut p, _) = parser(&["--timeout", "1s"], &[]);
        let mut cli = Cli::default();
        p.bind(&mut cli).unwrap();
        assert_eq!(cli.timeout, Duration::from_secs(1));
    }
}
