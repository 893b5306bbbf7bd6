use std::{
    collections::{BTreeMap, HashSet},
    fmt::{Display, Formatter},
    hash::Hash,
};

use serde::Serialize;

/// Accumulates validation failures keyed by field name.
///
/// Checks never short-circuit, so every problem of a submission is reported
/// in one pass. Only the first failure recorded for a key is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    /// Folds a garde report into this validator, keyed by the report's field paths.
    pub fn merge_report(&mut self, report: &garde::Report) {
        for (path, error) in report.iter() {
            self.add_error(path.to_string(), error.message());
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Consumes the validator, failing if anything was recorded.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.valid() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// True iff all values are pairwise distinct.
pub fn unique<T, I>(values: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Hash + Eq,
{
    let mut seen = HashSet::new();
    values.into_iter().all(|v| seen.insert(v))
}

pub fn permitted_value<T, Q>(value: &Q, permitted: &[T]) -> bool
where
    T: AsRef<Q>,
    Q: PartialEq + ?Sized,
{
    permitted.iter().any(|p| p.as_ref() == value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
