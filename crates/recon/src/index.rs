use std::collections::HashMap;

use crate::error::ReconError;
use crate::key::normalize_cell;
use crate::model::Table;

/// Outcome of looking a key up in a [`KeyIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    None,
    One(usize),
    Many(&'a [usize]),
}

/// Rows of one table grouped by normalized key.
///
/// Every row lands in exactly one bucket. `keys()` yields keys in order of
/// first occurrence.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    order: Vec<String>,
    buckets: HashMap<String, Vec<usize>>,
}

impl KeyIndex {
    /// Index `table` by `key_column`. Fails if the column does not exist.
    pub fn build(table: &Table, key_column: &str) -> Result<Self, ReconError> {
        let col = table.require_column(key_column)?;

        let mut index = Self::default();
        for record in table.records() {
            let key = normalize_cell(&record.values[col]);
            match index.buckets.get_mut(&key) {
                Some(rows) => rows.push(record.row),
                None => {
                    index.order.push(key.clone());
                    index.buckets.insert(key, vec![record.row]);
                }
            }
        }
        Ok(index)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }

    /// Rows sharing `key` (empty slice if none).
    pub fn rows(&self, key: &str) -> &[usize] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve(&self, key: &str) -> Resolution<'_> {
        match self.rows(key) {
            [] => Resolution::None,
            [row] => Resolution::One(*row),
            rows => Resolution::Many(rows),
        }
    }

    /// Keys present in both indexes, in `self`'s first-occurrence order.
    pub fn intersection<'a>(&'a self, other: &'a KeyIndex) -> impl Iterator<Item = &'a str> + 'a {
        self.keys().filter(move |k| other.contains(k))
    }
}
