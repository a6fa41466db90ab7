use std::rc::Rc;

use crate::error::ParseError;
use crate::value::{Kind, Slot};

pub(crate) type SlotFn<R> = Rc<dyn for<'a> Fn(&'a mut R) -> Slot<'a>>;
pub(crate) type CallbackFn<R> = Rc<dyn Fn(&mut R, &str) -> Result<(), String>>;

/// Pin the higher-ranked signature on a slot accessor closure.
pub(crate) fn slot_fn<R, F>(f: F) -> SlotFn<R>
where
    F: for<'a> Fn(&'a mut R) -> Slot<'a> + 'static,
{
    Rc::new(f)
}

/// Where a value landed: token index in the owning argument vector and the
/// position inside a bundled short cluster (`-abc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey {
    pub token: usize,
    pub sub: usize,
}

impl OrderKey {
    pub fn new(token: usize, sub: usize) -> Self {
        Self { token, sub }
    }
}

/// One bindable destination and everything the parser knows about it.
pub(crate) struct Descriptor<R> {
    pub(crate) ident: String,
    slot: SlotFn<R>,
    pub(crate) kind: Kind,
    pub(crate) callback: Option<CallbackFn<R>>,
    pub(crate) short: Vec<String>,
    pub(crate) long: Vec<String>,
    pub(crate) env: Option<String>,
    pub(crate) positional: Option<String>,
    pub(crate) usage: String,
    pub(crate) default_display: String,
    pub(crate) greedy: bool,
    pub(crate) once: bool,
    pub(crate) order: Option<OrderKey>,
    /// Command-line occurrence that last wrote this descriptor.
    pub(crate) written: Option<OrderKey>,
    touched: bool,
}

impl<R> Descriptor<R> {
    pub(crate) fn new(ident: &str, slot: SlotFn<R>, kind: Kind) -> Self {
        Self {
            ident: ident.to_string(),
            slot,
            kind,
            callback: None,
            short: Vec::new(),
            long: Vec::new(),
            env: None,
            positional: None,
            usage: String::new(),
            default_display: String::new(),
            greedy: false,
            once: false,
            order: None,
            written: None,
            touched: false,
        }
    }

    pub(crate) fn slot<'a>(&self, root: &'a mut R) -> Slot<'a> {
        (self.slot)(root)
    }

    pub(crate) fn has_name(&self) -> bool {
        !self.short.is_empty() || !self.long.is_empty()
    }

    /// `-d,--debug` style list of every alias.
    pub(crate) fn aliases(&self) -> String {
        self.short
            .iter()
            .map(|s| format!("-{s}"))
            .chain(self.long.iter().map(|l| format!("--{l}")))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Reject a second command-line occurrence of a `once` option. Values taken
    /// by the same occurrence (greedy runs) do not count.
    pub(crate) fn check_once(&self, display: &str, occurrence: OrderKey) -> Result<(), ParseError> {
        match self.written {
            Some(prev) if self.once && prev != occurrence => {
                Err(ParseError::Once(display.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Store `value`. The first write replaces a declared default instead of
    /// adding to it.
    pub(crate) fn write(
        &mut self,
        root: &mut R,
        value: &str,
        order: OrderKey,
        display: &str,
    ) -> Result<(), ParseError> {
        {
            let mut slot = self.slot(root);
            if !self.touched && !self.default_display.is_empty() && !slot.is_zero() {
                slot.reset();
            }
        }
        self.touched = true;
        self.order = Some(order);

        if let Some(callback) = &self.callback {
            return callback(root, value).map_err(|message| ParseError::Callback {
                option: display.to_string(),
                message,
            });
        }

        self.slot(root)
            .set(value)
            .map_err(|source| ParseError::Value {
                option: display.to_string(),
                source,
            })
    }

    /// Explicit command-line write: `once` check, store, remember the occurrence.
    pub(crate) fn write_explicit(
        &mut self,
        root: &mut R,
        value: &str,
        order: OrderKey,
        occurrence: OrderKey,
        display: &str,
    ) -> Result<(), ParseError> {
        self.check_once(display, occurrence)?;
        self.write(root, value, order, display)?;
        self.written = Some(occurrence);
        Ok(())
    }
}
