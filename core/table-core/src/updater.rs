//! FILENAME: core/table-core/src/updater.rs
//! PURPOSE: The value-or-function contract shared by every mutation API.

use std::fmt;

/// Either a literal next value or a function of the current value.
pub enum Updater<S> {
    Value(S),
    Fn(Box<dyn FnOnce(&S) -> S>),
}

impl<S> Updater<S> {
    /// Builds a functional updater.
    pub fn with(f: impl FnOnce(&S) -> S + 'static) -> Self {
        Updater::Fn(Box::new(f))
    }

    /// Resolves the updater against the current value.
    pub fn resolve(self, current: &S) -> S {
        match self {
            Updater::Value(value) => value,
            Updater::Fn(f) => f(current),
        }
    }
}

impl<S> From<S> for Updater<S> {
    fn from(value: S) -> Self {
        Updater::Value(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for Updater<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Updater::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_updater_ignores_current() {
        assert_eq!(Updater::from(3).resolve(&1), 3);
    }

    #[test]
    fn test_fn_updater_sees_current() {
        assert_eq!(Updater::with(|old: &i32| old + 1).resolve(&1), 2);
    }
}
