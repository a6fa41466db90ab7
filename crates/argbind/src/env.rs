use std::collections::HashMap;

/// Read-only key lookup used for `env=` bindings.
pub trait Env {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Env for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Env for Vec<(String, String)> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}
