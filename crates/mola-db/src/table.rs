//! Tabular query results with JSON-typed cells

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::DataError;

/// A shaped query result: named columns over rows of JSON values.
///
/// The column list is part of each view function's contract; callers may
/// rely on both the count and the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns), pandas-style.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// All values of one column by name.
    pub fn column(&self, name: &str) -> Option<Vec<&serde_json::Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// String values of one column, skipping nulls.
    pub fn column_strings(&self, name: &str) -> Vec<String> {
        self.column(name)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keep only the named column, preserving row order.
    pub fn single_column(&self, name: &str) -> Option<Table> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(Table {
            columns: vec![name.to_string()],
            rows: self.rows.iter().map(|r| vec![r[idx].clone()]).collect(),
        })
    }
}

/// Run `sql` against `conn` and shape the full result set.
pub fn query_table(conn: &Connection, sql: &str) -> Result<Table, DataError> {
    tracing::debug!(sql, "executing query");

    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut table = Table::new(columns);
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = match row.get_ref(i)? {
                ValueRef::Null => serde_json::Value::Null,
                ValueRef::Integer(n) => serde_json::Value::from(n),
                ValueRef::Real(f) => serde_json::json!(f),
                ValueRef::Text(bytes) => {
                    let s = std::str::from_utf8(bytes).unwrap_or("");
                    serde_json::Value::String(s.to_string())
                }
                ValueRef::Blob(_) => serde_json::Value::Null,
            };
            cells.push(value);
        }
        table.rows.push(cells);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_column_access() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (ID INTEGER, NAME TEXT);
             INSERT INTO t VALUES (1, 'a'), (2, 'b');",
        )
        .unwrap();

        let table = query_table(&conn, "SELECT ID, NAME FROM t ORDER BY ID").unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column_strings("NAME"), vec!["a", "b"]);

        let single = table.single_column("NAME").unwrap();
        assert_eq!(single.shape(), (2, 1));
    }
}
