//! Data view over an openLCA-style SQLite database
//!
//! Executes the queries produced by `mola-sql` and shapes rows into
//! semantic tables, plus a per-connection cache of the reference lookup
//! tables used to populate model sets.

use thiserror::Error;

mod lookup;
mod table;
mod view;

pub mod testing;

pub use lookup::LookupTables;
pub use table::{query_table, Table};
pub use view::{
    get_elementary_flows, get_ids, get_impact_categories, get_impact_category_elementary_flow,
    get_process_elementary_flow, get_process_locations, get_process_product_flow,
    get_process_product_flow_costs, get_process_product_flow_units, get_processes,
    get_ref_id_dicts, get_ref_ids, get_table,
};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid table name: {0}")]
    BadTableName(String),

    #[error("unknown lookup table: {0}")]
    UnknownLookup(String),

    #[error("filter shape mismatch: {0}")]
    EmptyFilterMismatch(String),
}
