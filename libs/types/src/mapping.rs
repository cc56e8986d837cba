//! Identifier → display name lookup table
//!
//! Rebuilt from scratch on every poll cycle and never merged with the
//! previous cycle's table.

use std::collections::HashMap;

/// Lookup from opaque upstream identifier to display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping. A later insert for the same identifier wins.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(id.into(), name.into());
    }

    /// Resolve an identifier to its display name.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MappingTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (id, name) in iter {
            table.insert(id, name);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let table: MappingTable = [("id1", "TeamA"), ("id2", "TeamB")].into_iter().collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("id1"), Some("TeamA"));
        assert_eq!(table.resolve("id3"), None);
    }

    #[test]
    fn test_last_insert_wins() {
        let mut table = MappingTable::new();
        table.insert("id1", "TeamA");
        table.insert("id1", "TeamC");

        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("id1"), Some("TeamC"));
    }

    #[test]
    fn test_empty_table() {
        let table = MappingTable::new();
        assert!(table.is_empty());
        assert_eq!(table.resolve(""), None);
    }
}
