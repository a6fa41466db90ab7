use argbind_help::{Help, HelpEntry};

use crate::context::{Bookkeeping, Context};

impl<R> Context<R> {
    /// Collect the help model of this level.
    pub(crate) fn help(&self, book: &Bookkeeping<'_, R>) -> Help {
        let mut help = Help {
            process_name: book.display_path(),
            version: self.effective_version(book),
            about: self.about.clone(),
            ..Default::default()
        };

        for desc in &self.descriptors {
            let env = match &desc.env {
                Some(name) => match book.env.lookup(name) {
                    Some(value) if !value.is_empty() => format!("{name}={value}"),
                    _ => name.clone(),
                },
                None => String::new(),
            };

            if desc.has_name() {
                let entry = HelpEntry {
                    name: desc.aliases(),
                    usage: desc.usage.clone(),
                    env,
                    default: desc.default_display.clone(),
                };
                if desc.kind.is_bool() {
                    help.flags.push(entry);
                } else {
                    help.options.push(entry);
                }
            } else if desc.env.is_some() {
                help.envs.push(HelpEntry {
                    name: env,
                    usage: desc.usage.clone(),
                    env: String::new(),
                    default: desc.default_display.clone(),
                });
            } else if let Some(pos) = &desc.positional {
                help.args.push(HelpEntry {
                    name: format!("<{pos}>"),
                    usage: desc.usage.clone(),
                    env: String::new(),
                    default: desc.default_display.clone(),
                });
            }
        }

        for (name, sub) in &self.subcommands {
            help.subcommands.push(HelpEntry::new(name.clone(), sub.usage.clone()));
        }

        if !self.registry.contains_key("h") && !self.registry.contains_key("help") {
            help.flags.push(HelpEntry::new("-h,--help", "print the help information"));
        }
        if !self.registry.contains_key("v") && !self.registry.contains_key("version") {
            help.flags.push(HelpEntry::new("-v,--version", "print version information"));
        }

        help.update_width();
        help
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use argbind_help::PlainRenderer;

    use crate::context::{Bookkeeping, Context};
    use crate::error::SchemaError;
    use crate::schema::{Command, Schema};

    #[derive(Default)]
    struct Todo {
        debug: bool,
        level: i64,
        home: String,
        file: String,
        add: Add,
    }

    #[derive(Default)]
    struct Add {
        item: String,
    }

    impl Command for Add {
        fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
            s.field("item", |a| &mut a.item).tag("--item").add()
        }
    }

    impl Command for Todo {
        fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
            s.about("Track things to do");
            s.field("debug", |t| &mut t.debug).usage("debug output").add()?;
            s.field("level", |t| &mut t.level)
                .tag("-l;--level;env=TODO_LEVEL")
                .usage("log level")
                .default_value("1")
                .add()?;
            s.field("home", |t| &mut t.home).tag("env=TODO_HOME").usage("data dir").add()?;
            s.field("file", |t| &mut t.file).tag("args=file").usage("input").add()?;
            s.nested("add", |t| &mut t.add).tag("subcommand").usage("add an item").add()
        }
    }

    #[test]
    fn groups_entries_and_adds_builtins() {
        let env: HashMap<String, String> =
            [("TODO_HOME".to_string(), "/tmp/todo".to_string())].into();
        let mut todo = Todo::default();
        let mut ctx = Context::new("todo");
        Todo::describe(&mut Schema::new_root(&mut ctx, &mut todo)).unwrap();
        let book = Bookkeeping::new(&env, "todo", "v1.0.1");
        let help = ctx.help(&book);

        let flags: Vec<_> = help.flags.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(flags, ["-d,--debug", "-h,--help", "-v,--version"]);
        assert_eq!(help.options[0].name, "-l,--level");
        assert_eq!(help.options[0].env, "TODO_LEVEL");
        assert_eq!(help.options[0].default, "1");
        assert_eq!(help.envs[0].name, "TODO_HOME=/tmp/todo");
        assert_eq!(help.args[0].name, "<file>");
        assert_eq!(help.subcommands[0].name, "add");
        assert_eq!(help.about, "Track things to do");
        assert_eq!(help.max_name_len, "TODO_HOME=/tmp/todo".len());

        let text = PlainRenderer::to_text(&help);
        assert!(text.starts_with("todo v1.0.1\nTrack things to do\n"));
        assert!(text.contains("todo [Flags] [Options] <file> [Subcommand]"));
    }
}
