use std::time::Duration;

use argbind::{Command, Schema, SchemaError, Violation};
use serde::Serialize;
use tracing::info;

const FORMATS: &[&str] = &["json", "text"];
const PRIORITIES: &[&str] = &["low", "normal", "high"];

/// Top-level options of the demo.
#[derive(Debug, Default)]
pub struct Cli {
    pub debug: bool,
    pub level: i64,
    pub headers: Vec<String>,
    pub config: String,
    pub quiet: bool,
    pub timeout: Duration,
    pub format: String,
    pub add: AddArgs,
    pub remove: RemoveArgs,
}

impl Command for Cli {
    fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
        s.field("debug", |c| &mut c.debug)
            .usage("Enable debug output")
            .add()?;
        s.field("level", |c| &mut c.level)
            .tag("-l;--level;once")
            .usage("Verbosity level")
            .default_value("1")
            .add()?;
        s.field("headers", |c| &mut c.headers)
            .tag("-H;--header;greedy")
            .usage("Extra headers, all values up to the next option")
            .add()?;
        s.field("config", |c| &mut c.config)
            .tag("-c;--config;env=ARGBIND_DEMO_CONFIG")
            .usage("Config file path")
            .add()?;
        s.field("quiet", |c| &mut c.quiet)
            .tag("env=ARGBIND_DEMO_QUIET")
            .usage("Suppress the report")
            .add()?;
        s.field("timeout", |c| &mut c.timeout)
            .tag("-t;--timeout")
            .usage("Request timeout")
            .default_value("30s")
            .add()?;
        s.field("format", |c| &mut c.format)
            .tag("-f;--format")
            .usage("Report format: json or text")
            .default_value("json")
            .add()?;
        s.nested("add", |c| &mut c.add)
            .tag("subcommand")
            .usage("Add items")
            .add()?;
        s.nested("remove", |c| &mut c.remove)
            .tag("subcommand=rm")
            .usage("Remove an item by id")
            .add()
    }

    fn validate(&self) -> Vec<Violation> {
        if FORMATS.contains(&self.format.as_str()) {
            Vec::new()
        } else {
            vec![Violation::new(
                "format",
                format!("unsupported format '{}', expected one of {FORMATS:?}", self.format),
            )]
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddArgs {
    pub items: Vec<String>,
    pub priority: String,
    pub tags: Vec<String>,
}

impl AddArgs {
    fn priority(&mut self, value: &str) -> Result<(), String> {
        let value = value.to_ascii_lowercase();
        if !PRIORITIES.contains(&value.as_str()) {
            return Err(format!("expected one of {PRIORITIES:?}"));
        }
        self.priority = value;
        Ok(())
    }
}

impl Command for AddArgs {
    fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
        s.handler("priority", Self::priority);
        s.field("priority", |a| &mut a.priority)
            .tag("-p;--priority;once;callback=priority")
            .usage("low, normal or high")
            .default_value("normal")
            .add()?;
        s.field("tags", |a| &mut a.tags)
            .tag("-T;--tag")
            .usage("Tag to attach, repeatable")
            .add()?;
        s.field("items", |a| &mut a.items)
            .tag("args=items")
            .usage("Items to add")
            .add()
    }

    fn sub_main(&mut self) {
        self.items.dedup();
        info!(items = self.items.len(), priority = %self.priority, "add selected");
    }

    fn validate(&self) -> Vec<Violation> {
        if self.items.is_empty() {
            vec![Violation::new("items", "add needs at least one item")]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoveArgs {
    pub id: u64,
    pub force: bool,
}

impl Command for RemoveArgs {
    fn describe<R: 'static>(s: &mut Schema<'_, R, Self>) -> Result<(), SchemaError> {
        s.field("force", |r| &mut r.force)
            .tag("--force")
            .usage("Remove even if referenced")
            .add()?;
        s.field("id", |r| &mut r.id).tag("args=id").usage("Item id").add()
    }

    fn validate(&self) -> Vec<Violation> {
        if self.id == 0 {
            vec![Violation::new("id", "rm needs a non-zero id")]
        } else {
            Vec::new()
        }
    }
}
