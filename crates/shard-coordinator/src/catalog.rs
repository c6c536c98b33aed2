//! Coordinator-side table catalog

use dashmap::DashMap;
use shard_core::RowId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableEntry {
    /// Number of fragments the table was split into
    pub fragment_count: usize,
    /// Every row id ever handed out for the table, in write order. Ids stay
    /// here even if no replica accepted the row.
    pub row_ids: Vec<RowId>,
}

/// Fragment counts and row ids of every built table
#[derive(Debug, Default)]
pub struct TableCatalog {
    tables: DashMap<String, TableEntry>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly built table. Rebuilding a table resets its entry.
    pub fn register(&self, table: &str, fragment_count: usize) {
        self.tables.insert(
            table.to_string(),
            TableEntry {
                fragment_count,
                row_ids: Vec::new(),
            },
        );
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn fragment_count(&self, table: &str) -> Option<usize> {
        self.tables.get(table).map(|entry| entry.fragment_count)
    }

    /// Append a row id; false if the table is unknown
    pub fn record_row(&self, table: &str, row_id: RowId) -> bool {
        match self.tables.get_mut(table) {
            Some(mut entry) => {
                entry.row_ids.push(row_id);
                true
            }
            None => false,
        }
    }

    pub fn row_ids(&self, table: &str) -> Option<Vec<RowId>> {
        self.tables.get(table).map(|entry| entry.row_ids.clone())
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_record() {
        let catalog = TableCatalog::new();
        assert!(catalog.is_empty());
        assert!(!catalog.record_row("Person", RowId::new()));

        catalog.register("Person", 2);
        let first = RowId::new();
        let second = RowId::new();
        assert!(catalog.record_row("Person", first));
        assert!(catalog.record_row("Person", second));

        assert_eq!(catalog.fragment_count("Person"), Some(2));
        assert_eq!(catalog.row_ids("Person"), Some(vec![first, second]));
        assert_eq!(catalog.fragment_count("Course"), None);
    }

    #[test]
    fn test_rebuild_resets_entry() {
        let catalog = TableCatalog::new();
        catalog.register("Person", 2);
        catalog.record_row("Person", RowId::new());

        catalog.register("Person", 3);
        assert_eq!(catalog.fragment_count("Person"), Some(3));
        assert_eq!(catalog.row_ids("Person"), Some(vec![]));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_table_names_sorted() {
        let catalog = TableCatalog::new();
        catalog.register("Student", 1);
        catalog.register("Course", 1);
        assert_eq!(catalog.table_names(), vec!["Course", "Student"]);
        assert!(catalog.contains("Course"));
    }
}
