//! Header lines (`key: value`) seen before and between data blocks.
//!
//! Headers are kept in the order first seen. The `events` header is the one
//! the decoder depends on: its tokens size every cost vector.

use log::trace;

/// Ordered `key -> value` mapping of header lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a header, keeping the position of the first occurrence
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Ordered metric names from the `events` header, if present
    pub fn events(&self) -> Option<Vec<String>> {
        self.get("events")
            .map(|events| events.split_whitespace().map(str::to_string).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a header line on its first `": "` and record it
///
/// Lines without a `": "` separator carry no value and are ignored.
/// Returns true when a header was recorded.
pub fn read_header_line(metadata: &mut Metadata, line: &str) -> bool {
    let Some((key, value)) = line.split_once(": ") else {
        trace!("Ignoring header line without value: {}", line);
        return false;
    };

    let key = key.trim();
    let value = value.trim();
    trace!("Header {} => {}", key, value);
    metadata.upsert(key, value);
    true
}
