//! Environment and positional binding after the main loop.

use tracing::debug;

use crate::context::Context;
use crate::descriptor::OrderKey;
use crate::env::Env;
use crate::error::ParseError;

impl<R> Context<R> {
    /// Apply env bindings, then positionals from the front of `unparsed`.
    ///
    /// A set variable is written even over a command-line value and never
    /// counts against `once`; sequences get it appended. An env hit wins over
    /// a positional binding on the same descriptor.
    pub(crate) fn bind_fallback(
        &mut self,
        root: &mut R,
        env: &dyn Env,
    ) -> Result<(), ParseError> {
        for n in 0..self.env_and_args.len() {
            let id = self.env_and_args[n];
            let desc = &mut self.descriptors[id];

            if let Some(name) = desc.env.clone()
                && let Some(value) = env.lookup(&name)
            {
                let value = if desc.kind.is_bool() && value != "false" {
                    "true".to_string()
                } else {
                    value
                };
                debug!(env = %name, field = %desc.ident, "bound from environment");
                desc.write(root, &value, OrderKey::default(), &format!("${name}"))?;
                continue;
            }

            let Some(name) = desc.positional.clone() else {
                continue;
            };
            if self.unparsed.is_empty() {
                continue;
            }
            let take = if desc.kind.is_sequence() {
                self.unparsed.len()
            } else {
                1
            };
            let display = format!("<{name}>");
            debug!(positional = %name, count = take, "bound from arguments");
            for entry in self.unparsed.drain(..take) {
                desc.write(root, &entry.arg, OrderKey::new(entry.index, 0), &display)?;
            }
        }
        Ok(())
    }
}
