//! Help model shared between the argbind engine and help renderers.
//!
//! The engine only *collects* a [`Help`] value from a command's registry.
//! Turning it into text is the job of a [`Render`] implementation, so callers
//! can swap the layout (or emit JSON for tooling) without touching parsing.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// One row of help output: a display name plus its descriptive metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HelpEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    /// Environment display, `NAME` or `NAME=value` when the variable is set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
}

impl HelpEntry {
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
            ..Default::default()
        }
    }
}

/// Everything a renderer needs to print the help of one command level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Help {
    pub process_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<HelpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<HelpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<HelpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<HelpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<HelpEntry>,
    /// Width of the longest display name across all groups.
    #[serde(default)]
    pub max_name_len: usize,
}

impl Help {
    /// Recompute `max_name_len` from the current entries.
    pub fn update_width(&mut self) {
        self.max_name_len = self
            .flags
            .iter()
            .chain(&self.options)
            .chain(&self.args)
            .chain(&self.envs)
            .chain(&self.subcommands)
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0);
    }

    fn usage_line(&self) -> String {
        let mut out = self.process_name.clone();
        if !self.flags.is_empty() {
            out.push_str(" [Flags]");
        }
        if !self.options.is_empty() {
            out.push_str(" [Options]");
        }
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.name);
        }
        if !self.subcommands.is_empty() {
            out.push_str(" [Subcommand]");
        }
        out
    }
}

/// Turns a collected [`Help`] into output.
pub trait Render {
    fn render(&self, help: &Help, out: &mut dyn Write) -> io::Result<()>;
}

/// Column-aligned plain text, in the spirit of clap's default help.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl PlainRenderer {
    fn section(out: &mut String, title: &str, entries: &[HelpEntry], width: usize) {
        if entries.is_empty() {
            return;
        }
        out.push_str(&format!("\n{title}:\n"));
        for entry in entries {
            let mut text = entry.usage.trim().to_string();
            if !entry.default.is_empty() {
                text.push_str(&format!(" [default: {}]", entry.default));
            }
            if !entry.env.is_empty() {
                text.push_str(&format!(" [env: {}]", entry.env));
            }
            let text = text.trim_start();
            if text.is_empty() {
                out.push_str(&format!("    {}\n", entry.name));
            } else {
                out.push_str(&format!("    {:width$}    {}\n", entry.name, text, width = width));
            }
        }
    }

    /// Render into a string (used by tests and callers that post-process text).
    pub fn to_text(help: &Help) -> String {
        let mut out = String::new();
        if help.version.trim().is_empty() {
            out.push_str(&format!("{}\n", help.process_name));
        } else {
            out.push_str(&format!("{} {}\n", help.process_name, help.version.trim()));
        }
        if !help.about.trim().is_empty() {
            out.push_str(help.about.trim_end());
            out.push('\n');
        }
        out.push_str(&format!("\nUsage:\n    {}\n", help.usage_line()));

        let width = help.max_name_len;
        Self::section(&mut out, "Flags", &help.flags, width);
        Self::section(&mut out, "Options", &help.options, width);
        Self::section(&mut out, "Args", &help.args, width);
        Self::section(&mut out, "Environment", &help.envs, width);
        Self::section(&mut out, "Subcommands", &help.subcommands, width);
        out
    }
}

impl Render for PlainRenderer {
    fn render(&self, help: &Help, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(Self::to_text(help).as_bytes())
    }
}

/// Pretty JSON of the [`Help`] value, for shell completion generators and the like.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Render for JsonRenderer {
    fn render(&self, help: &Help, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, help)?;
        out.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Help {
        let mut help = Help {
            process_name: "todo".to_string(),
            version: "v1.0.1".to_string(),
            about: "Track things to do".to_string(),
            flags: vec![HelpEntry::new("-d,--debug", "Enable debug output")],
            options: vec![HelpEntry {
                name: "-l,--level".to_string(),
                usage: "Log level".to_string(),
                env: "LEVEL".to_string(),
                default: "1".to_string(),
            }],
            args: vec![HelpEntry::new("<file>", "Input file")],
            subcommands: vec![HelpEntry::new("add", "Add an item")],
            ..Default::default()
        };
        help.update_width();
        help
    }

    #[test]
    fn width_tracks_longest_name() {
        assert_eq!(sample().max_name_len, "-l,--level".len());
    }

    #[test]
    fn plain_text_lists_every_group() {
        let text = PlainRenderer::to_text(&sample());
        assert!(text.starts_with("todo v1.0.1\n"));
        assert!(text.contains("todo [Flags] [Options] <file> [Subcommand]"));
        assert!(text.contains("Flags:\n    -d,--debug    Enable debug output"));
        assert!(text.contains("Log level [default: 1] [env: LEVEL]"));
        assert!(text.contains("Subcommands:\n    add"));
        assert!(!text.contains("Environment:"));
    }

    #[test]
    fn json_skips_empty_groups() {
        let mut buf = Vec::new();
        JsonRenderer.render(&sample(), &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["process-name"], "todo");
        assert_eq!(json["options"][0]["default"], "1");
        assert!(json.get("envs").is_none());
    }
}
