//! Named record storage shared by every table kind.

use serde::{Deserialize, Serialize};

/// A named entry in a [`Registry`].
///
/// `Default` is the blank record the first entry starts from.
pub trait Record: Clone + Default {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

/// Records in load order with case-insensitive name lookup.
///
/// The first record created is the template: it starts blank, and every
/// later record starts as a copy of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry<T> {
    records: Vec<T>,
    max_records: usize,
    default_name: Option<String>,
    default_index: usize,
}

impl<T: Record> Registry<T> {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Vec::new(),
            max_records,
            default_name: None,
            default_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.max_records
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.records.get_mut(index)
    }

    /// Index of the record named `name`, ignoring ASCII case.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.name().eq_ignore_ascii_case(name))
    }

    /// Appends a record seeded from the template. `None` when full.
    pub fn create(&mut self, name: &str) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let mut record = self.records.first().cloned().unwrap_or_default();
        record.set_name(name.to_string());
        self.records.push(record);
        Some(self.records.len() - 1)
    }

    /// Records the name requested for the default entry. Resolved by
    /// [`Self::resolve_default`].
    pub fn set_default_name(&mut self, name: impl Into<String>) {
        self.default_name = Some(name.into());
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Points the default at the requested record. A name that matches no
    /// record falls back to the first record with a warning; with no name
    /// the current default is kept.
    pub fn resolve_default(&mut self) -> usize {
        if let Some(name) = self.default_name.as_deref() {
            self.default_index = match self.lookup(name) {
                Some(index) => index,
                None => {
                    tracing::warn!(name = %name, "Default record not found, using the first record");
                    0
                }
            };
        }
        self.default_index
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn default_record(&self) -> Option<&T> {
        self.records.get(self.default_index)
    }
}
