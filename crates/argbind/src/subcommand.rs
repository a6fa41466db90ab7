use tracing::debug;

use crate::context::{Bookkeeping, Context, Flow};
use crate::error::ParseError;
use crate::schema::{Hook, Validator};

/// A named child level, built together with its parent.
pub(crate) struct Subcommand<R> {
    pub(crate) context: Context<R>,
    pub(crate) usage: String,
    pub(crate) sub_main: Hook<R>,
    pub(crate) validate: Validator<R>,
}

impl<R> Subcommand<R> {
    /// Hand the rest of the parent's argument vector to this level and run it.
    pub(crate) fn enter(
        &mut self,
        name: &str,
        args: Vec<String>,
        root: &mut R,
        book: &mut Bookkeeping<'_, R>,
    ) -> Result<Flow, ParseError> {
        debug!(subcommand = name, args = args.len(), "dispatching");
        book.path.push(name.to_string());
        book.validator = Some(self.validate.clone());

        self.context.args = args;
        let flow = self.context.run(root, book)?;
        if let Flow::Done = flow {
            (self.sub_main)(root);
        }
        Ok(flow)
    }
}
