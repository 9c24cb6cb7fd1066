//! Per-connection cache of reference lookup tables
//!
//! Lookup tables back the database-sourced model sets: process listings,
//! product/elementary flow listings, impact categories. Column count is
//! part of each lookup's contract. Entries are built lazily and kept for
//! the connection's lifetime; there is no partial invalidation — fresh data
//! means a new `LookupTables` on a new connection.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rusqlite::Connection;

use crate::table::{query_table, Table};
use crate::DataError;

const PROCESS_SQL: &str =
    "SELECT DISTINCT REF_ID, NAME FROM TBL_PROCESSES ORDER BY NAME";
const PRODUCT_FLOW_SQL: &str =
    "SELECT DISTINCT REF_ID, NAME FROM TBL_FLOWS WHERE FLOW_TYPE = 'PRODUCT_FLOW' ORDER BY NAME";
const ELEMENTARY_FLOW_SQL: &str =
    "SELECT DISTINCT REF_ID, NAME FROM TBL_FLOWS WHERE FLOW_TYPE = 'ELEMENTARY_FLOW' ORDER BY NAME";
const IMPACT_CATEGORY_SQL: &str =
    "SELECT DISTINCT REF_ID, NAME, REFERENCE_UNIT FROM TBL_IMPACT_CATEGORIES ORDER BY NAME";

/// Lookup names and the query behind each. The material, service and
/// transport process sets share the process listing; their membership is
/// narrowed by configuration, not by the database.
const LOOKUPS: &[(&str, &str)] = &[
    ("P_m", PROCESS_SQL),
    ("P_s", PROCESS_SQL),
    ("P_t", PROCESS_SQL),
    ("F_m", PRODUCT_FLOW_SQL),
    ("E", ELEMENTARY_FLOW_SQL),
    ("KPI", IMPACT_CATEGORY_SQL),
];

/// Cached lookup tables bound to one open database connection.
pub struct LookupTables {
    conn: Connection,
    cache: RefCell<HashMap<String, Table>>,
}

impl LookupTables {
    /// Bind a cache to an already open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn, cache: RefCell::new(HashMap::new()) }
    }

    /// Open a database file and bind a cache to it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// The names this cache can resolve.
    pub fn names() -> Vec<&'static str> {
        LOOKUPS.iter().map(|(name, _)| *name).collect()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The named lookup table, built on first access.
    pub fn get(&self, name: &str) -> Result<Table, DataError> {
        if let Some(table) = self.cache.borrow().get(name) {
            return Ok(table.clone());
        }
        let sql = LOOKUPS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, sql)| *sql)
            .ok_or_else(|| DataError::UnknownLookup(name.to_string()))?;
        let table = query_table(&self.conn, sql)?;
        self.cache.borrow_mut().insert(name.to_string(), table.clone());
        Ok(table)
    }

    /// Only the display column of the named lookup, for label listings.
    pub fn get_single_column(&self, name: &str) -> Result<Table, DataError> {
        let table = self.get(name)?;
        table
            .single_column("NAME")
            .ok_or_else(|| DataError::UnknownLookup(name.to_string()))
    }

    /// Every lookup table, keyed by name.
    pub fn get_all(&self) -> Result<BTreeMap<String, Table>, DataError> {
        let mut all = BTreeMap::new();
        for (name, _) in LOOKUPS {
            all.insert(name.to_string(), self.get(name)?);
        }
        Ok(all)
    }
}
